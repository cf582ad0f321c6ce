//! # Document Consolidator Pipeline
//!
//! This crate provides the consolidation engine: it loads normalized
//! relations, folds them into a subject table through an ordered table of
//! merge directives and assembles one document per subject row.
//!
//! ## Architecture
//!
//! The pipeline follows the Loader-Processor-Assembler pattern:
//!
//! 1. **Loader**: Reads relation sources into memory
//! 2. **Processor**: Applies merge directives to the subject table
//! 3. **Assembler**: Finalizes rows into documents and encodes them
//! 4. **Orchestrator**: Coordinates the pipeline flow

pub mod assembler;
pub mod directive;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod profile;
pub mod report;

pub use errors::{DirectiveError, PipelineError};
pub use orchestrator::{consolidate, Consolidation, Orchestrator};
pub use profile::Profile;
pub use report::{RunReport, RunWarning};
