//! Loader module for the consolidation pipeline.
//!
//! Reads every relation source into an in-memory [`RelationMap`]. A source
//! that cannot be read or parsed is left out of the map and recorded as a
//! warning; only a failure to list the sources aborts the load.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::errors::PipelineError;
use crate::report::RunWarning;
use doc_consolidator_repository::RelationSource;
use doc_consolidator_shared::{Record, Relation, RelationMap};

/// Dataset prefix stripped from source identifiers by default.
pub const DEFAULT_DATASET_PREFIX: &str = "HartfordHealthCare_";

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Configuration for the relation loader.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Prefix removed from each source identifier.
    pub dataset_prefix: String,
    /// Extension (without the dot) removed from each source identifier.
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            dataset_prefix: DEFAULT_DATASET_PREFIX.to_string(),
            extension: "json".to_string(),
        }
    }
}

/// Relations read in one load, with the warnings raised along the way.
#[derive(Debug, Default)]
pub struct LoadedRelations {
    pub relations: RelationMap,
    pub warnings: Vec<RunWarning>,
}

/// Loader that reads relation sources into memory.
pub struct RelationLoader {
    source: Arc<dyn RelationSource>,
    config: LoaderConfig,
}

impl RelationLoader {
    /// Create a new relation loader with the given source.
    pub fn new(source: Arc<dyn RelationSource>) -> Self {
        Self::with_config(source, LoaderConfig::default())
    }

    /// Create a new relation loader with custom configuration.
    pub fn with_config(source: Arc<dyn RelationSource>, config: LoaderConfig) -> Self {
        Self { source, config }
    }

    /// Relation name for a source identifier: extension, then dataset prefix removed.
    ///
    /// The extension matches regardless of ASCII case, as the filesystem
    /// source lists it.
    pub fn relation_name(&self, source_id: &str) -> String {
        let suffix = format!(".{}", self.config.extension);
        let stem = source_id
            .len()
            .checked_sub(suffix.len())
            .and_then(|split| Some((source_id.get(..split)?, source_id.get(split..)?)))
            .filter(|(_, ext)| ext.eq_ignore_ascii_case(&suffix))
            .map_or(source_id, |(stem, _)| stem);
        stem.strip_prefix(self.config.dataset_prefix.as_str())
            .unwrap_or(stem)
            .to_string()
    }

    /// Load every listed source.
    ///
    /// Sources are fetched concurrently. Results are inserted in listing
    /// order, so when two identifiers map to the same relation name the later
    /// one wins.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<LoadedRelations, PipelineError> {
        let source_ids = self.source.list_sources().await?;
        info!(count = source_ids.len(), "Loading relation sources");

        let fetches = source_ids.iter().map(|id| self.source.fetch(id));
        let payloads = join_all(fetches).await;

        let mut loaded = LoadedRelations::default();
        for (source_id, payload) in source_ids.iter().zip(payloads) {
            let name = self.relation_name(source_id);

            let bytes = match payload {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(source_id = %source_id, error = %e, "Could not read relation source");
                    loaded.warnings.push(RunWarning::SourceUnreadable {
                        source_id: source_id.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            match parse_relation(&name, &bytes) {
                Ok(relation) => {
                    debug!(relation = %name, rows = relation.len(), "Loaded relation");
                    if loaded.relations.contains(&name) {
                        warn!(relation = %name, source_id = %source_id, "Relation loaded twice, keeping the later source");
                    }
                    loaded.relations.insert(relation);
                }
                Err(PipelineError::MalformedSource { relation, reason }) => {
                    warn!(relation = %relation, reason = %reason, "Skipping malformed relation source");
                    loaded
                        .warnings
                        .push(RunWarning::MalformedSource { relation, reason });
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            relations = loaded.relations.len(),
            skipped = loaded.warnings.len(),
            "Relation sources loaded"
        );
        Ok(loaded)
    }
}

/// Parse one relation payload.
///
/// Accepts an optional UTF-8 byte order mark followed by either a JSON array
/// of objects or a stream of JSON objects (JSON Lines). Empty payloads and
/// rows that are not objects are rejected.
pub fn parse_relation(name: &str, bytes: &[u8]) -> Result<Relation, PipelineError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| PipelineError::malformed(name, e.to_string()))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(PipelineError::malformed(name, "empty payload"));
    }

    let values: Vec<Value> = if text.starts_with('[') {
        serde_json::from_str(text).map_err(|e| PipelineError::malformed(name, e.to_string()))?
    } else {
        serde_json::Deserializer::from_str(text)
            .into_iter::<Value>()
            .collect::<Result<_, _>>()
            .map_err(|e| PipelineError::malformed(name, e.to_string()))?
    };

    let rows = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(record) => Ok(record),
            other => Err(PipelineError::malformed(
                name,
                format!("row {} is not an object: {}", index, other),
            )),
        })
        .collect::<Result<Vec<Record>, _>>()?;

    Ok(Relation::from_records(name, rows))
}
