//! # Document Consolidator
//!
//! Main library for the physician document consolidator.
//!
//! This crate provides the settings, dependency wiring and logging setup
//! for running one consolidation profile against a local data directory.

pub mod config;
pub mod telemetry;

pub use config::{Dependencies, LogFormat, Settings, SettingsOverrides};

use thiserror::Error;

/// Errors that can occur during consolidator initialization or execution.
#[derive(Error, Debug)]
pub enum ConsolidatorError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] doc_consolidator_pipeline::PipelineError),

    /// Directive or profile error.
    #[error("Directive error: {0}")]
    DirectiveError(#[from] doc_consolidator_pipeline::DirectiveError),

    /// Storage error.
    #[error("Storage error: {0}")]
    StorageError(#[from] doc_consolidator_repository::StorageError),

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConsolidatorError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
