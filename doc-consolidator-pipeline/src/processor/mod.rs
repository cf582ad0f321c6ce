//! Processor module for the consolidation pipeline.
//!
//! Folds child and dimension relations into the subject table.

mod executor;
pub mod ops;
mod rollup;

pub use executor::MergeExecutor;
