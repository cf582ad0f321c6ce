//! Directory-backed document sink.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, instrument};

use crate::errors::StorageError;
use crate::interfaces::DocumentSink;

/// Writes payloads as files inside one output directory, creating it on
/// first write.
pub struct FsDocumentSink {
    root: PathBuf,
}

impl FsDocumentSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl DocumentSink for FsDocumentSink {
    #[instrument(skip(self, payload), fields(bytes = payload.len()))]
    async fn write(&self, name: &str, payload: &[u8]) -> Result<String, StorageError> {
        if name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') {
            return Err(StorageError::invalid_location(format!(
                "output name must be a plain file name, got '{}'",
                name
            )));
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StorageError::write(format!("{}: {}", self.root.display(), e)))?;

        let path = self.root.join(name);
        tokio::fs::write(&path, payload)
            .await
            .map_err(|e| StorageError::write(format!("{}: {}", path.display(), e)))?;

        let location = path.display().to_string();
        info!(location = %location, "Wrote document stream");
        Ok(location)
    }
}
