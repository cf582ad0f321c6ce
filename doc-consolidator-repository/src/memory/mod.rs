//! In-memory implementations of the storage interfaces.
//!
//! Used by callers that already hold relations in memory (for example a
//! request handler receiving them in a payload) and by tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StorageError;
use crate::interfaces::{DocumentSink, RelationSource};

/// Relation source holding raw payloads keyed by source identifier.
#[derive(Debug, Default)]
pub struct InMemoryRelationSource {
    sources: BTreeMap<String, Vec<u8>>,
}

impl InMemoryRelationSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw payload under `source_id`.
    pub fn with_bytes(mut self, source_id: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        self.sources.insert(source_id.into(), payload.into());
        self
    }

    /// Add a JSON value (normally an array of records) under `source_id`.
    pub fn with_json(self, source_id: impl Into<String>, value: &Value) -> Self {
        let payload = value.to_string().into_bytes();
        self.with_bytes(source_id, payload)
    }
}

#[async_trait]
impl RelationSource for InMemoryRelationSource {
    async fn list_sources(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.sources.keys().cloned().collect())
    }

    async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, StorageError> {
        self.sources
            .get(source_id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(source_id))
    }
}

/// Document sink keeping every written payload in memory.
#[derive(Debug, Default)]
pub struct InMemoryDocumentSink {
    written: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryDocumentSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload last written under `name`, if any.
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.written
            .lock()
            .ok()
            .and_then(|written| written.get(name).cloned())
    }

    /// Number of distinct payloads written.
    pub fn len(&self) -> usize {
        self.written.lock().map(|w| w.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl DocumentSink for InMemoryDocumentSink {
    async fn write(&self, name: &str, payload: &[u8]) -> Result<String, StorageError> {
        let mut written = self
            .written
            .lock()
            .map_err(|e| StorageError::write(e.to_string()))?;
        written.insert(name.to_string(), payload.to_vec());
        Ok(format!("memory://{}", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_source_round_trip() {
        let source = InMemoryRelationSource::new()
            .with_json("Physician", &json!([{"PhysicianId": 1}]))
            .with_bytes("Empty", "");

        assert_eq!(source.list_sources().await.unwrap(), vec!["Empty", "Physician"]);
        assert_eq!(source.fetch("Empty").await.unwrap(), Vec::<u8>::new());
        assert!(source.fetch("Missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_sink_keeps_last_write() {
        let sink = InMemoryDocumentSink::new();
        sink.write("out.jsonl", b"first").await.unwrap();
        let location = sink.write("out.jsonl", b"second").await.unwrap();

        assert_eq!(location, "memory://out.jsonl");
        assert_eq!(sink.get("out.jsonl").unwrap(), b"second");
        assert_eq!(sink.len(), 1);
    }
}
