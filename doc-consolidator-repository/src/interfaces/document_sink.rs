//! Document sink trait definition.

use async_trait::async_trait;

use crate::errors::StorageError;

/// Abstract receiver of the serialized document stream.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Write a complete payload under `name`, replacing anything already there.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - A human-readable location of the written payload
    /// * `Err(StorageError)` - If the write fails
    async fn write(&self, name: &str, payload: &[u8]) -> Result<String, StorageError>;
}
