//! Orchestrator module for the consolidation pipeline.
//!
//! Coordinates the loader, the merge executor and the assembler for one run.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::assembler::DocumentAssembler;
use crate::errors::PipelineError;
use crate::loader::{LoaderConfig, RelationLoader};
use crate::processor::MergeExecutor;
use crate::profile::Profile;
use crate::report::{RunReport, RunWarning};
use doc_consolidator_repository::{DocumentSink, RelationSource};
use doc_consolidator_shared::{Document, RelationMap};

/// Documents produced from one relation map, with the warnings raised.
#[derive(Debug)]
pub struct Consolidation {
    pub documents: Vec<Document>,
    pub warnings: Vec<RunWarning>,
}

/// Run the profile's directives over `relations` and assemble documents.
///
/// Storage free. The subject relation is taken out of the map; every other
/// relation is only read.
#[instrument(skip_all, fields(profile = %profile.name, relations = relations.len()))]
pub fn consolidate(profile: &Profile, mut relations: RelationMap) -> Result<Consolidation, PipelineError> {
    let subject = relations
        .remove(&profile.subject)
        .ok_or_else(|| PipelineError::primary_missing(&profile.subject))?;
    info!(subject = %profile.subject, rows = subject.len(), "Merging relations");

    let mut executor = MergeExecutor::new(&relations);
    let merged = executor.apply_all(subject, &profile.directives);
    let mut warnings = executor.into_warnings();

    let assembler = DocumentAssembler::new(profile.assembler.clone());
    let (documents, assembly_warnings) = assembler.assemble(merged, &relations);
    warnings.extend(assembly_warnings);

    info!(documents = documents.len(), warnings = warnings.len(), "Data processing complete");
    Ok(Consolidation { documents, warnings })
}

/// Orchestrator that runs one profile from source to sink.
pub struct Orchestrator {
    profile: Profile,
    loader: RelationLoader,
    sink: Arc<dyn DocumentSink>,
}

impl Orchestrator {
    /// Create a new orchestrator with the default loader configuration.
    pub fn new(profile: Profile, source: Arc<dyn RelationSource>, sink: Arc<dyn DocumentSink>) -> Self {
        Self::with_config(profile, source, sink, LoaderConfig::default())
    }

    /// Create a new orchestrator with a custom loader configuration.
    pub fn with_config(
        profile: Profile,
        source: Arc<dyn RelationSource>,
        sink: Arc<dyn DocumentSink>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            profile,
            loader: RelationLoader::with_config(source, config),
            sink,
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Consolidate in-memory relations without touching storage.
    pub fn consolidate(&self, relations: RelationMap) -> Result<(Vec<Document>, RunReport), PipelineError> {
        let mut report = RunReport::start(&self.profile.name);
        report.relations_loaded = relations.len();

        let consolidation = consolidate(&self.profile, relations)?;
        report.documents = consolidation.documents.len();
        report.warnings = consolidation.warnings;
        report.finish();

        Ok((consolidation.documents, report))
    }

    /// Load, consolidate, encode and write the output.
    ///
    /// Nothing is written unless every earlier step succeeds.
    #[instrument(skip(self), fields(profile = %self.profile.name))]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        info!("Starting consolidation run");
        let mut report = RunReport::start(&self.profile.name);

        let loaded = self.loader.load().await?;
        report.relations_loaded = loaded.relations.len();
        report.warnings = loaded.warnings;

        let consolidation = consolidate(&self.profile, loaded.relations)?;
        report.documents = consolidation.documents.len();
        report.warnings.extend(consolidation.warnings);

        let assembler = DocumentAssembler::new(self.profile.assembler.clone());
        let payload = assembler.encode(&consolidation.documents, &self.profile.subject_key)?;

        let location = self.sink.write(&self.profile.output_name, &payload).await?;
        info!(location = %location, documents = report.documents, "Output written");

        report.output_location = Some(location);
        report.finish();
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_consolidator_repository::{InMemoryDocumentSink, InMemoryRelationSource};
    use serde_json::json;

    fn source() -> InMemoryRelationSource {
        InMemoryRelationSource::new()
            .with_json(
                "HartfordHealthCare_Physician.json",
                &json!([{"PhysicianId": 1, "AcceptingNewPatients": true}]),
            )
            .with_json(
                "HartfordHealthCare_PhysicianLanguage.json",
                &json!([{"PhysicianId": 1, "Language": "English"}]),
            )
    }

    #[tokio::test]
    async fn test_run_writes_output() {
        let sink = Arc::new(InMemoryDocumentSink::new());
        let orchestrator = Orchestrator::new(Profile::physician().unwrap(), Arc::new(source()), sink.clone());

        let report = orchestrator.run().await.unwrap();

        assert_eq!(report.documents, 1);
        assert_eq!(report.relations_loaded, 2);
        assert_eq!(
            report.output_location.as_deref(),
            Some("memory://transformed_physician_data.jsonl")
        );

        let payload = sink.get("transformed_physician_data.jsonl").unwrap();
        let line: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(line["languages"], json!(["English"]));
        assert_eq!(line.get("insurance"), Some(&serde_json::Value::Null));
        assert_eq!(line.get("education"), Some(&serde_json::Value::Null));
        assert!(line.get("AcceptingNewPatients").is_none());
        assert!(line["_id"].is_string());
    }

    #[tokio::test]
    async fn test_missing_subject_writes_nothing() {
        let sink = Arc::new(InMemoryDocumentSink::new());
        let source = InMemoryRelationSource::new().with_json("Symptom.json", &json!([{"SpecialtyId": 1}]));
        let orchestrator = Orchestrator::new(Profile::physician().unwrap(), Arc::new(source), sink.clone());

        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, PipelineError::PrimaryEntityMissing(name) if name == "Physician"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_consolidate_reports_skipped_directives() {
        let orchestrator = Orchestrator::new(
            Profile::physician().unwrap(),
            Arc::new(InMemoryRelationSource::new()),
            Arc::new(InMemoryDocumentSink::new()),
        );
        let relations: RelationMap = vec![doc_consolidator_shared::Relation::new("Physician")]
            .into_iter()
            .collect();

        let (documents, report) = orchestrator.consolidate(relations).unwrap();

        assert!(documents.is_empty());
        assert_eq!(report.warnings.len(), 10);
        assert!(report.finished_at >= report.started_at);
    }
}
