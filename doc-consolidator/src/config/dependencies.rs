//! Dependency initialization and wiring for the consolidator.

use std::sync::Arc;
use tracing::info;

use crate::config::Settings;
use crate::ConsolidatorError;
use doc_consolidator_pipeline::{loader::LoaderConfig, Orchestrator, Profile};
use doc_consolidator_repository::{FsDocumentSink, FsRelationSource, SourceConfig};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Wire a filesystem source and sink around the named profile.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(ConsolidatorError)` - If the profile is unknown or the input
    ///   directory does not exist
    pub fn new(settings: &Settings, profile_name: &str) -> Result<Self, ConsolidatorError> {
        let mut profile = Profile::by_name(profile_name)?;
        if let Some(name) = &settings.transformed_filename {
            profile = profile.with_output_name(name.clone());
        }

        let input_dir = settings.input_dir(profile_name);
        let output_dir = settings.output_dir();
        if !input_dir.is_dir() {
            return Err(ConsolidatorError::config(format!(
                "Input directory {} does not exist",
                input_dir.display()
            )));
        }

        info!(
            profile = %profile.name,
            input_dir = %input_dir.display(),
            output_dir = %output_dir.display(),
            output_name = %profile.output_name,
            "Initializing dependencies"
        );

        let loader_config = LoaderConfig {
            dataset_prefix: settings.dataset_prefix.clone(),
            ..LoaderConfig::default()
        };
        let source = FsRelationSource::with_config(
            input_dir,
            SourceConfig::with_extension(loader_config.extension.clone()),
        );
        let sink = FsDocumentSink::new(output_dir);

        let orchestrator =
            Orchestrator::with_config(profile, Arc::new(source), Arc::new(sink), loader_config);

        Ok(Self { orchestrator })
    }
}
