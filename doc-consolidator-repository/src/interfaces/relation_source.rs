//! Relation source trait definition.

use async_trait::async_trait;

use crate::errors::StorageError;

/// Abstract supplier of raw relation payloads.
///
/// A source exposes a flat namespace of source identifiers (for a directory,
/// file names). Identifiers are turned into relation names by the loader.
#[async_trait]
pub trait RelationSource: Send + Sync {
    /// List the identifiers of every available source.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<String>)` - Identifiers in sorted order
    /// * `Err(StorageError)` - If the listing itself fails
    async fn list_sources(&self) -> Result<Vec<String>, StorageError>;

    /// Fetch the raw bytes of one source.
    ///
    /// # Arguments
    ///
    /// * `source_id` - An identifier returned by `list_sources`
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - The payload, possibly empty
    /// * `Err(StorageError::NotFound)` - If the source does not exist
    /// * `Err(StorageError)` - If reading fails
    async fn fetch(&self, source_id: &str) -> Result<Vec<u8>, StorageError>;
}
