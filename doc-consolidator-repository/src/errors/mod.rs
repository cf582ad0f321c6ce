//! Error types for the consolidator repository.

mod storage_error;

pub use storage_error::StorageError;
