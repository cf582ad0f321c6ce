//! Error types for the consolidation pipeline.

use doc_consolidator_repository::StorageError;
use thiserror::Error;

/// Errors that can occur in the consolidation pipeline.
///
/// A `MalformedSource` is absorbed by the loader into a run warning; missing
/// relations never surface as errors. The remaining variants abort the run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A relation's payload could not be parsed into a table.
    #[error("Malformed source '{relation}': {reason}")]
    MalformedSource { relation: String, reason: String },

    /// The subject relation is absent; nothing can be produced.
    #[error("Primary relation '{0}' not found. Cannot proceed.")]
    PrimaryEntityMissing(String),

    /// A document could not be serialized.
    #[error("Failed to serialize document for subject {subject_id}: {reason}")]
    SerializationError { subject_id: String, reason: String },

    /// Error from the storage layer.
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    /// The directive table is invalid.
    #[error("Directive error: {0}")]
    DirectiveError(#[from] DirectiveError),
}

impl PipelineError {
    /// Create a malformed source error.
    pub fn malformed(relation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSource {
            relation: relation.into(),
            reason: reason.into(),
        }
    }

    /// Create a primary entity missing error.
    pub fn primary_missing(relation: impl Into<String>) -> Self {
        Self::PrimaryEntityMissing(relation.into())
    }

    /// Create a serialization error.
    pub fn serialization(subject_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SerializationError {
            subject_id: subject_id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building a directive table.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectiveError {
    /// A directive has an empty name.
    #[error("Directive at position {0} has an empty name")]
    EmptyName(usize),

    /// A required column or relation name is empty.
    #[error("Directive '{directive}': field '{field}' must not be empty")]
    EmptyField { directive: String, field: String },

    /// Two directives write the same output field.
    #[error("Output field '{0}' is produced by more than one directive")]
    DuplicateOutput(String),

    /// An explicit projection lists no columns.
    #[error("Directive '{0}' projects no columns")]
    EmptyProjection(String),

    /// Dimension-column projection without a dimension join.
    #[error("Directive '{0}' projects dimension columns but joins no dimension")]
    ProjectionWithoutDimension(String),

    /// No built-in profile has this name.
    #[error("Unknown profile '{0}'")]
    UnknownProfile(String),
}

impl DirectiveError {
    /// Create an empty field error.
    pub fn empty_field(directive: impl Into<String>, field: impl Into<String>) -> Self {
        Self::EmptyField {
            directive: directive.into(),
            field: field.into(),
        }
    }
}
