//! Specialty rollup resolution.
//!
//! Exactly one parent hop is resolved. A specialty whose parent cannot be
//! found gets an empty parent name rather than null.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::directive::RollupSpec;
use crate::processor::ops::left_join;
use crate::processor::MergeExecutor;
use crate::report::RunWarning;
use doc_consolidator_shared::Relation;

impl MergeExecutor<'_> {
    #[instrument(skip(self, subject, spec), fields(rows = subject.len()))]
    pub(crate) fn rollup(&mut self, subject: Relation, directive: &str, spec: &RollupSpec) -> Relation {
        let mut rolled = self.join_canonical_names(&subject, directive, spec);
        rolled = self.join_parent_names(rolled, &subject, directive, spec);

        let parent_names = (0..rolled.len())
            .map(|row| match rolled.cell(row, &spec.parent_name_output) {
                Value::Null => Value::String(String::new()),
                name => name.clone(),
            })
            .collect();
        rolled.set_column(&spec.parent_name_output, parent_names);

        self.enrich_list(directive, &mut rolled, &spec.specialty_key, &spec.symptoms);
        self.enrich_list(directive, &mut rolled, &spec.specialty_key, &spec.synonyms);

        debug!(rows = rolled.len(), "Resolved specialty rollup");
        rolled
    }

    /// Join the specialty dimension for the canonical name.
    ///
    /// Without a usable dimension the canonical name column is all null.
    fn join_canonical_names(&mut self, subject: &Relation, directive: &str, spec: &RollupSpec) -> Relation {
        let relations = self.relations;
        let mut joined = match relations.get(&spec.dimension) {
            None => {
                self.record(RunWarning::SourceMissing {
                    directive: directive.to_string(),
                    relation: spec.dimension.clone(),
                });
                subject.clone()
            }
            Some(dimension) => {
                if self.require_columns(directive, subject, &[spec.specialty_key.as_str()]) {
                    let mut lookup = dimension.clone();
                    lookup.rename_columns(&[
                        (spec.dimension_key.as_str(), spec.specialty_key.as_str()),
                        (spec.dimension_name.as_str(), spec.canonical_name_output.as_str()),
                    ]);
                    left_join(subject, &lookup, &spec.specialty_key)
                } else {
                    subject.clone()
                }
            }
        };

        if !joined.has_column(&spec.canonical_name_output) {
            joined.set_column(&spec.canonical_name_output, vec![Value::Null; joined.len()]);
        }
        joined
    }

    /// Join the subject against itself through the parent column.
    fn join_parent_names(
        &mut self,
        rolled: Relation,
        subject: &Relation,
        directive: &str,
        spec: &RollupSpec,
    ) -> Relation {
        let lookup_columns = [spec.id_column.as_str(), spec.display_name_column.as_str()];
        if !self.require_columns(directive, subject, &lookup_columns)
            || !self.require_columns(directive, &rolled, &[spec.parent_column.as_str()])
        {
            return rolled;
        }

        let mut parents = subject.select(&lookup_columns);
        parents.rename_columns(&[
            (spec.id_column.as_str(), spec.parent_column.as_str()),
            (spec.display_name_column.as_str(), spec.parent_name_output.as_str()),
        ]);
        left_join(&rolled, &parents, &spec.parent_column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Directive;
    use doc_consolidator_shared::RelationMap;
    use serde_json::json;

    fn relation(name: &str, rows: Value) -> Relation {
        let rows = rows
            .as_array()
            .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
            .unwrap_or_default();
        Relation::from_records(name, rows)
    }

    fn rollup_subject() -> Relation {
        relation(
            "PhysicianRollupSpecialties",
            json!([
                {"Id": 10, "Specialty": "Cardiology", "SpecialtyId": 100, "ParentSpecialty": null},
                {"Id": 11, "Specialty": "Interventional Cardiology", "SpecialtyId": 101, "ParentSpecialty": 10.0}
            ]),
        )
    }

    fn directive() -> Directive {
        Directive::rollup("Specialty Rollup", RollupSpec::specialty_rollup())
    }

    #[test]
    fn test_rollup_resolves_parent_and_lists() {
        let relations: RelationMap = vec![
            relation(
                "Specialty",
                json!([{"Id": 100, "Name": "Cardiovascular Disease"}, {"Id": 101, "Name": "Interventional"}]),
            ),
            relation(
                "Symptom",
                json!([
                    {"SpecialtyId": 100, "SymptomText": "Chest pain"},
                    {"SpecialtyId": 100, "SymptomText": "Palpitations"}
                ]),
            ),
            relation("Synonym", json!([{"SpecialtyId": 101, "SynonymText": "Cath"}])),
        ]
        .into_iter()
        .collect();
        let mut executor = MergeExecutor::new(&relations);

        let rolled = executor.apply(rollup_subject(), &directive());

        assert_eq!(
            rolled.columns(),
            [
                "Id",
                "Specialty",
                "SpecialtyId",
                "ParentSpecialty",
                "CanonicalSpecialtyName",
                "ParentSpecialtyName",
                "SymptomText",
                "SynonymText"
            ]
        );
        assert_eq!(rolled.cell(0, "ParentSpecialtyName"), &json!(""));
        assert_eq!(rolled.cell(1, "ParentSpecialtyName"), &json!("Cardiology"));
        assert_eq!(rolled.cell(0, "CanonicalSpecialtyName"), &json!("Cardiovascular Disease"));
        assert_eq!(rolled.cell(0, "SymptomText"), &json!(["Chest pain", "Palpitations"]));
        assert_eq!(rolled.cell(1, "SymptomText"), &json!([]));
        assert_eq!(rolled.cell(1, "SynonymText"), &json!(["Cath"]));
        assert!(executor.warnings().is_empty());
    }

    #[test]
    fn test_rollup_without_auxiliary_relations() {
        let relations = RelationMap::new();
        let mut executor = MergeExecutor::new(&relations);

        let rolled = executor.apply(rollup_subject(), &directive());

        assert_eq!(rolled.len(), 2);
        assert_eq!(rolled.cell(0, "CanonicalSpecialtyName"), &Value::Null);
        assert_eq!(rolled.cell(1, "ParentSpecialtyName"), &json!("Cardiology"));
        assert_eq!(rolled.cell(0, "SymptomText"), &json!([]));
        assert_eq!(rolled.cell(0, "SynonymText"), &json!([]));
        assert_eq!(executor.warnings().len(), 3);
    }

    #[test]
    fn test_unknown_parent_resolves_to_empty_string() {
        let subject = relation(
            "PhysicianRollupSpecialties",
            json!([{"Id": 12, "Specialty": "Orphan", "SpecialtyId": 102, "ParentSpecialty": 99}]),
        );
        let relations = RelationMap::new();
        let mut executor = MergeExecutor::new(&relations);

        let rolled = executor.apply(subject, &directive());

        assert_eq!(rolled.cell(0, "ParentSpecialtyName"), &json!(""));
    }
}
