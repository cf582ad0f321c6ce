//! Consolidated output document.

use serde_json::Value;
use uuid::Uuid;

use crate::Record;

/// Field name used for the document key unless configured otherwise.
pub const DEFAULT_ID_FIELD: &str = "_id";

/// A fully enriched record ready for bulk indexing.
///
/// `id` is a freshly generated document key for the indexing target. It is
/// unrelated to any business identifier inside `body` and is never used for
/// joins.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub body: Record,
}

impl Document {
    /// Create a document with a new random key.
    pub fn new(body: Record) -> Self {
        Self {
            id: Uuid::new_v4(),
            body,
        }
    }

    pub fn with_id(id: Uuid, body: Record) -> Self {
        Self { id, body }
    }

    /// The body followed by the document key under `id_field`.
    ///
    /// A body column already named `id_field` is overwritten.
    pub fn to_record(&self, id_field: &str) -> Record {
        let mut record = self.body.clone();
        record.insert(id_field.to_string(), Value::String(self.id.to_string()));
        record
    }

    /// Serialize to a single JSON line (without the trailing newline).
    pub fn to_json_line(&self, id_field: &str) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_record(id_field))
    }
}
