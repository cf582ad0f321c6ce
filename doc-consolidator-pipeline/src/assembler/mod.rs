//! Document assembler.
//!
//! Turns the enriched subject table into documents and encodes them as
//! JSON Lines.

use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::PipelineError;
use crate::report::RunWarning;
use doc_consolidator_shared::{Document, Relation, RelationMap, DEFAULT_ID_FIELD};

/// A relation appended to the output verbatim, without joining.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideRelation {
    pub relation: String,
    /// Column renames applied before appending, as `(from, to)`.
    pub renames: Vec<(String, String)>,
}

impl SideRelation {
    pub fn new(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            renames: Vec::new(),
        }
    }

    pub fn rename(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.renames.push((from.into(), to.into()));
        self
    }
}

/// Configuration for the document assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Subject columns left out of every document.
    pub drop_columns: Vec<String>,
    /// Relations appended after the subject documents, in order.
    pub side_relations: Vec<SideRelation>,
    /// Field holding the generated document key.
    pub id_field: String,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            drop_columns: Vec::new(),
            side_relations: Vec::new(),
            id_field: DEFAULT_ID_FIELD.to_string(),
        }
    }
}

/// Assembler that finalizes subject rows into documents.
pub struct DocumentAssembler {
    config: AssemblerConfig,
}

impl DocumentAssembler {
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    /// Build one document per subject row, followed by one per side relation row.
    ///
    /// Every document carries exactly its relation's columns, with missing
    /// cells written as null.
    #[instrument(skip_all, fields(subject = %subject.name(), rows = subject.len()))]
    pub fn assemble(
        &self,
        mut subject: Relation,
        relations: &RelationMap,
    ) -> (Vec<Document>, Vec<RunWarning>) {
        let mut warnings = Vec::new();

        subject.drop_columns(&self.config.drop_columns);
        let mut documents: Vec<Document> = (0..subject.len())
            .map(|row| Document::new(subject.normalized_row(row)))
            .collect();

        for side in &self.config.side_relations {
            let Some(source) = relations.get(&side.relation) else {
                let warning = RunWarning::SideRelationMissing {
                    relation: side.relation.clone(),
                };
                warn!(%warning, "Side relation not appended");
                warnings.push(warning);
                continue;
            };

            let mut appended = source.clone();
            let renames: Vec<(&str, &str)> = side
                .renames
                .iter()
                .map(|(from, to)| (from.as_str(), to.as_str()))
                .collect();
            appended.rename_columns(&renames);

            debug!(relation = %side.relation, rows = appended.len(), "Appending side relation");
            documents.extend((0..appended.len()).map(|row| Document::new(appended.normalized_row(row))));
        }

        info!(documents = documents.len(), "Assembled documents");
        (documents, warnings)
    }

    /// Encode documents as JSON Lines, one newline-terminated record each.
    pub fn encode(&self, documents: &[Document], subject_key: &str) -> Result<Vec<u8>, PipelineError> {
        encode_json_lines(documents, &self.config.id_field, subject_key)
    }
}

/// Encode documents as JSON Lines.
///
/// A failing document is reported by its `subject_key` value, or by its
/// position when it has none. No documents encode to an empty stream.
pub fn encode_json_lines(
    documents: &[Document],
    id_field: &str,
    subject_key: &str,
) -> Result<Vec<u8>, PipelineError> {
    let mut out = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        let line = document.to_json_line(id_field).map_err(|e| {
            let subject_id = match document.body.get(subject_key) {
                Some(Value::Null) | None => format!("row {}", index),
                Some(Value::String(id)) => id.clone(),
                Some(id) => id.to_string(),
            };
            error!(subject_id = %subject_id, error = %e, "Failed to serialize document");
            PipelineError::serialization(subject_id, e.to_string())
        })?;
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn relation(name: &str, rows: Value) -> Relation {
        let rows = rows
            .as_array()
            .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
            .unwrap_or_default();
        Relation::from_records(name, rows)
    }

    #[test]
    fn test_assemble_drops_columns_and_fills_nulls() {
        let assembler = DocumentAssembler::new(AssemblerConfig {
            drop_columns: vec!["AcceptingNewPatients".to_string()],
            ..AssemblerConfig::default()
        });
        let subject = relation(
            "Physician",
            json!([
                {"PhysicianId": 1, "AcceptingNewPatients": true, "Title": "MD"},
                {"PhysicianId": 2}
            ]),
        );

        let (documents, warnings) = assembler.assemble(subject, &RelationMap::new());

        assert!(warnings.is_empty());
        assert_eq!(documents.len(), 2);
        assert_eq!(Value::Object(documents[1].body.clone()), json!({"PhysicianId": 2, "Title": null}));
        assert_ne!(documents[0].id, documents[1].id);
    }

    #[test]
    fn test_side_relation_is_appended_with_renames() {
        let assembler = DocumentAssembler::new(AssemblerConfig {
            side_relations: vec![SideRelation::new("AreaOfExpertise").rename("Id", "AreaofExpertiseId")],
            ..AssemblerConfig::default()
        });
        let relations: RelationMap = vec![relation("AreaOfExpertise", json!([{"Id": 5, "Name": "Sports"}]))]
            .into_iter()
            .collect();
        let subject = relation("PhysicianRollupSpecialties", json!([{"Id": 10}]));

        let (documents, _) = assembler.assemble(subject, &relations);

        assert_eq!(documents.len(), 2);
        assert_eq!(
            Value::Object(documents[1].body.clone()),
            json!({"AreaofExpertiseId": 5, "Name": "Sports"})
        );
    }

    #[test]
    fn test_missing_side_relation_is_a_warning() {
        let assembler = DocumentAssembler::new(AssemblerConfig {
            side_relations: vec![SideRelation::new("AreaOfExpertise")],
            ..AssemblerConfig::default()
        });

        let (documents, warnings) = assembler.assemble(Relation::new("Subject"), &RelationMap::new());

        assert!(documents.is_empty());
        assert_eq!(
            warnings,
            [RunWarning::SideRelationMissing {
                relation: "AreaOfExpertise".to_string()
            }]
        );
    }

    #[test]
    fn test_encode_json_lines() {
        let assembler = DocumentAssembler::new(AssemblerConfig::default());
        let subject = relation("Physician", json!([{"PhysicianId": 1}, {"PhysicianId": 2}]));
        let (documents, _) = assembler.assemble(subject, &RelationMap::new());

        let bytes = assembler.encode(&documents, "PhysicianId").unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(text.ends_with('\n'));
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            format!(r#"{{"PhysicianId":1,"_id":"{}"}}"#, documents[0].id)
        );
    }

    #[test]
    fn test_encode_empty_stream() {
        let bytes = encode_json_lines(&[], DEFAULT_ID_FIELD, "PhysicianId").unwrap();
        assert!(bytes.is_empty());
    }
}
