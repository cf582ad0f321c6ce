//! Configuration types for relation sources.

/// Default file extension of relation sources.
pub const DEFAULT_SOURCE_EXTENSION: &str = "json";

/// Configuration for listing relation sources.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Only sources with this extension (without the dot) are listed.
    pub extension: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            extension: DEFAULT_SOURCE_EXTENSION.to_string(),
        }
    }
}

impl SourceConfig {
    /// Create a config listing sources with a custom extension.
    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }
}
