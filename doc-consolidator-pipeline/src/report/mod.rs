//! Run report and recoverable warnings.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A recoverable condition recorded during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunWarning {
    /// A relation a directive needs is not in the relation map.
    SourceMissing { directive: String, relation: String },
    /// A relation a directive needs has zero rows.
    EmptyRelation { directive: String, relation: String },
    /// A source could not be parsed and was left out of the relation map.
    MalformedSource { relation: String, reason: String },
    /// A listed source could not be read.
    SourceUnreadable { source_id: String, reason: String },
    /// Columns a directive refers to are absent from a relation.
    MissingColumns {
        directive: String,
        relation: String,
        columns: Vec<String>,
    },
    /// A directive replaced a column the subject already had.
    ColumnOverwritten { directive: String, column: String },
    /// A side relation configured for the output is not loaded.
    SideRelationMissing { relation: String },
}

impl fmt::Display for RunWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceMissing { directive, relation } => {
                write!(f, "{}: relation '{}' not found, skipped", directive, relation)
            }
            Self::EmptyRelation { directive, relation } => {
                write!(f, "{}: relation '{}' is empty, skipped", directive, relation)
            }
            Self::MalformedSource { relation, reason } => {
                write!(f, "relation '{}' is empty or not valid JSON: {}", relation, reason)
            }
            Self::SourceUnreadable { source_id, reason } => {
                write!(f, "source '{}' could not be read: {}", source_id, reason)
            }
            Self::MissingColumns {
                directive,
                relation,
                columns,
            } => write!(
                f,
                "{}: relation '{}' lacks columns [{}]",
                directive,
                relation,
                columns.join(", ")
            ),
            Self::ColumnOverwritten { directive, column } => {
                write!(f, "{}: replaced existing column '{}'", directive, column)
            }
            Self::SideRelationMissing { relation } => {
                write!(f, "side relation '{}' not found, not appended", relation)
            }
        }
    }
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub profile: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub relations_loaded: usize,
    pub documents: usize,
    pub output_location: Option<String>,
    pub warnings: Vec<RunWarning>,
}

impl RunReport {
    /// Start a report for `profile` stamped with the current time.
    pub fn start(profile: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            profile: profile.into(),
            started_at: now,
            finished_at: now,
            relations_loaded: 0,
            documents: 0,
            output_location: None,
            warnings: Vec::new(),
        }
    }

    /// Stamp the finish time.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn elapsed_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
