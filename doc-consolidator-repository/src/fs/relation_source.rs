//! Directory-backed relation source.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, instrument};

use crate::config::SourceConfig;
use crate::errors::StorageError;
use crate::interfaces::RelationSource;

/// Reads relation sources from the files of one directory.
///
/// Only regular files carrying the configured extension are listed;
/// subdirectories are ignored.
pub struct FsRelationSource {
    root: PathBuf,
    config: SourceConfig,
}

impl FsRelationSource {
    /// Create a source over `root` with the default configuration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_config(root, SourceConfig::default())
    }

    /// Create a source over `root` with a custom configuration.
    pub fn with_config(root: impl Into<PathBuf>, config: SourceConfig) -> Self {
        let root = root.into();
        info!(root = %root.display(), extension = %config.extension, "Created filesystem relation source");
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.config.extension))
    }
}

#[async_trait]
impl RelationSource for FsRelationSource {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn list_sources(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::not_found(self.root.display().to_string()))
            }
            Err(e) => return Err(StorageError::read(format!("{}: {}", self.root.display(), e))),
        };

        let mut sources = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::read(e.to_string()))?
        {
            let path = entry.path();
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file || !self.has_extension(&path) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                sources.push(name.to_string());
            }
        }

        sources.sort();
        debug!(count = sources.len(), "Listed relation sources");
        Ok(sources)
    }

    async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.root.join(source_id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                debug!(path = %path.display(), bytes = bytes.len(), "Read relation source");
                Ok(bytes)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::not_found(path.display().to_string()))
            }
            Err(e) => Err(StorageError::read(format!("{}: {}", path.display(), e))),
        }
    }
}
