//! # Document Consolidator Repository
//!
//! This crate provides the storage seams of the consolidator: where relation
//! sources are read from and where the consolidated document stream is
//! written to. It includes definitions for errors, interfaces, and concrete
//! implementations backed by the local filesystem and by memory.

pub mod config;
pub mod errors;
pub mod fs;
pub mod interfaces;
pub mod memory;

pub use config::SourceConfig;
pub use errors::StorageError;
pub use fs::{FsDocumentSink, FsRelationSource};
pub use interfaces::{DocumentSink, RelationSource};
pub use memory::{InMemoryDocumentSink, InMemoryRelationSource};
