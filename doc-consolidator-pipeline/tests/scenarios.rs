//! End-to-end consolidation scenarios.

use std::sync::Arc;

use serde_json::{json, Value};

use doc_consolidator_pipeline::assembler::encode_json_lines;
use doc_consolidator_pipeline::directive::{Directive, DirectiveTable, ListSpec};
use doc_consolidator_pipeline::{consolidate, Orchestrator, PipelineError, Profile, RunWarning};
use doc_consolidator_repository::{FsDocumentSink, FsRelationSource, InMemoryDocumentSink};
use doc_consolidator_shared::{Relation, RelationMap};

fn relation(name: &str, rows: Value) -> Relation {
    let rows = rows
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r.as_object().cloned()).collect())
        .unwrap_or_default();
    Relation::from_records(name, rows)
}

/// A profile with one group-and-list directive over `Child.val`.
fn list_profile() -> Profile {
    let mut profile = Profile::physician().unwrap();
    profile.subject = "Subject".to_string();
    profile.subject_key = "id".to_string();
    profile.directives = DirectiveTable::new(vec![Directive::group_and_list(
        "Values",
        ListSpec::new("Child", "id", "val", "vals"),
    )])
    .unwrap();
    profile.assembler.drop_columns.clear();
    profile
}

fn bodies(profile: &Profile, relations: RelationMap) -> Vec<Value> {
    consolidate(profile, relations)
        .unwrap()
        .documents
        .into_iter()
        .map(|d| Value::Object(d.body))
        .collect()
}

#[test]
fn test_scenario_a_group_and_list() {
    let relations: RelationMap = vec![
        relation("Subject", json!([{"id": 1, "name": "A"}])),
        relation("Child", json!([{"id": 1, "val": "x"}, {"id": 1, "val": "y"}])),
    ]
    .into_iter()
    .collect();

    let bodies = bodies(&list_profile(), relations);

    assert_eq!(bodies, [json!({"id": 1, "name": "A", "vals": ["x", "y"]})]);
}

#[test]
fn test_scenario_b_unmatched_subject_gets_empty_list() {
    let relations: RelationMap = vec![
        relation("Subject", json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}])),
        relation("Child", json!([{"id": 1, "val": "x"}])),
    ]
    .into_iter()
    .collect();

    let bodies = bodies(&list_profile(), relations);

    assert_eq!(bodies[1]["vals"], json!([]));
}

#[test]
fn test_scenario_c_rollup_parent_names() {
    let relations: RelationMap = vec![relation(
        "PhysicianRollupSpecialties",
        json!([
            {"Id": 10, "Specialty": "Cardiology", "ParentSpecialty": null, "SpecialtyId": 1},
            {"Id": 11, "Specialty": "Interventional Cardiology", "ParentSpecialty": 10, "SpecialtyId": 2}
        ]),
    )]
    .into_iter()
    .collect();

    let consolidation = consolidate(&Profile::specialty_rollup().unwrap(), relations).unwrap();
    let bodies: Vec<&serde_json::Map<String, Value>> =
        consolidation.documents.iter().map(|d| &d.body).collect();

    assert_eq!(bodies.len(), 2);
    assert_eq!(bodies[0]["ParentSpecialtyName"], json!(""));
    assert_eq!(bodies[1]["ParentSpecialtyName"], json!("Cardiology"));
    assert_eq!(bodies[0]["SymptomText"], json!([]));
    assert_eq!(bodies[0]["SynonymText"], json!([]));
    assert_eq!(bodies[0]["CanonicalSpecialtyName"], Value::Null);
}

#[test]
fn test_scenario_d_missing_relation_is_a_warning() {
    let relations: RelationMap = vec![relation("Subject", json!([{"id": 1, "name": "A"}]))]
        .into_iter()
        .collect();

    let consolidation = consolidate(&list_profile(), relations).unwrap();

    assert_eq!(consolidation.documents.len(), 1);
    assert_eq!(
        Value::Object(consolidation.documents[0].body.clone()),
        json!({"id": 1, "name": "A", "vals": null})
    );
    assert_eq!(
        consolidation.warnings,
        [RunWarning::SourceMissing {
            directive: "Values".to_string(),
            relation: "Child".to_string(),
        }]
    );
}

#[test]
fn test_missing_subject_is_fatal() {
    let err = consolidate(&list_profile(), RelationMap::new()).unwrap_err();
    assert!(matches!(err, PipelineError::PrimaryEntityMissing(_)));
}

#[test]
fn test_output_order_follows_subject_and_source_rows() {
    let relations: RelationMap = vec![
        relation("Subject", json!([{"id": 3}, {"id": 1}, {"id": 2}])),
        relation(
            "Child",
            json!([
                {"id": 1, "val": "b"},
                {"id": 3, "val": "z"},
                {"id": 1, "val": "a"}
            ]),
        ),
    ]
    .into_iter()
    .collect();

    let bodies = bodies(&list_profile(), relations);
    let ids: Vec<&Value> = bodies.iter().map(|b| &b["id"]).collect();

    assert_eq!(ids, [&json!(3), &json!(1), &json!(2)]);
    assert_eq!(bodies[1]["vals"], json!(["b", "a"]));
}

fn physician_relations() -> RelationMap {
    vec![
        relation(
            "Physician",
            json!([
                {"PhysicianId": 1, "FirstName": "Ada", "AcceptingNewPatients": true},
                {"PhysicianId": 2, "FirstName": "Ben", "AcceptingNewPatients": false}
            ]),
        ),
        relation("PhysicianLanguage", json!([{"PhysicianId": 1, "Language": "English"}])),
        relation("PhysicianInsurance", json!([{"PhysicianId": 2, "InsuranceId": 30}])),
        relation("Insurance", json!([{"Id": 30, "Name": "Aetna", "Code": "AET"}])),
        relation(
            "PhysicianSpecialty",
            json!([{
                "PhysicianId": 1,
                "SpecialtyId": 10,
                "BoardCertification": "ABIM",
                "AcceptingNewPatients": true,
                "Primary": true
            }]),
        ),
        relation("Specialty", json!([{"Id": 10, "Name": "Cardiology"}])),
        relation("Symptom", json!([{"SpecialtyId": 10, "SymptomText": "Chest pain"}])),
    ]
    .into_iter()
    .collect()
}

#[test]
fn test_physician_profile_fields() {
    let bodies = bodies(&Profile::physician().unwrap(), physician_relations());

    let ada = &bodies[0];
    assert!(ada.get("AcceptingNewPatients").is_none());
    assert_eq!(ada["languages"], json!(["English"]));
    assert_eq!(ada["insurance"], json!([]));
    assert_eq!(
        ada["specialties"],
        json!([{
            "SpecialtyId": 10,
            "BoardCertification": "ABIM",
            "AcceptingNewPatients": true,
            "Primary": true,
            "Name": "Cardiology",
            "SynonymTexts": [],
            "SymptomTexts": ["Chest pain"]
        }])
    );

    let ben = &bodies[1];
    assert_eq!(ben["languages"], json!([]));
    assert_eq!(ben["insurance"], json!([{"InsuranceId": 30, "Name": "Aetna"}]));
    assert_eq!(ben["specialties"], json!([]));
}

#[test]
fn test_runs_are_identical_apart_from_document_keys() {
    let profile = Profile::physician().unwrap();
    let encode = || -> Vec<u8> {
        let documents = consolidate(&profile, physician_relations()).unwrap().documents;
        encode_json_lines(&documents, "_id", &profile.subject_key).unwrap()
    };
    let without_keys = |stream: &[u8]| -> Vec<String> {
        std::str::from_utf8(stream)
            .unwrap()
            .lines()
            .map(|line| {
                let mut record: serde_json::Map<String, Value> = serde_json::from_str(line).unwrap();
                assert!(record.remove("_id").is_some());
                serde_json::to_string(&record).unwrap()
            })
            .collect()
    };

    let first = encode();
    let second = encode();

    assert_ne!(first, second);
    assert_eq!(without_keys(&first), without_keys(&second));
    assert_eq!(without_keys(&first).len(), 2);
}

#[test]
fn test_skipped_directives_leave_null_fields() {
    let profile = Profile::physician().unwrap();
    let relations: RelationMap = vec![relation("Physician", json!([{"PhysicianId": 1}]))]
        .into_iter()
        .collect();

    let consolidation = consolidate(&profile, relations).unwrap();
    let body = &consolidation.documents[0].body;

    for directive in profile.directives.iter() {
        for output in directive.outputs() {
            assert_eq!(body.get(output), Some(&Value::Null), "field {}", output);
        }
    }
    assert_eq!(consolidation.warnings.len(), profile.directives.len());
}

#[test]
fn test_unmatched_dimension_row_has_null_columns() {
    let mut relations = physician_relations();
    relations.insert(relation(
        "PhysicianInsurance",
        json!([
            {"PhysicianId": 2, "InsuranceId": 30},
            {"PhysicianId": 2, "InsuranceId": 99}
        ]),
    ));

    let bodies = bodies(&Profile::physician().unwrap(), relations);

    assert_eq!(
        bodies[1]["insurance"],
        json!([
            {"InsuranceId": 30, "Name": "Aetna"},
            {"InsuranceId": 99, "Name": null}
        ])
    );
}

#[tokio::test]
async fn test_empty_subject_writes_empty_stream() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("physician-data");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(input.join("HartfordHealthCare_PhysicianRollupSpecialties.json"), "[]").unwrap();

    let sink = Arc::new(InMemoryDocumentSink::new());
    let orchestrator = Orchestrator::new(
        Profile::specialty_rollup().unwrap(),
        Arc::new(FsRelationSource::new(&input)),
        sink.clone(),
    );

    // An empty array is a valid, empty relation.
    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.documents, 0);
    assert_eq!(sink.get("transformed_rollup_data.jsonl"), Some(Vec::new()));
}

#[tokio::test]
async fn test_filesystem_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("physician-data");
    let output = dir.path().join("transformed-data");
    std::fs::create_dir_all(&input).unwrap();
    std::fs::write(
        input.join("HartfordHealthCare_PhysicianRollupSpecialties.json"),
        "\u{feff}[{\"Id\": 10, \"Specialty\": \"Cardiology\", \"ParentSpecialty\": null, \"SpecialtyId\": 1}]",
    )
    .unwrap();
    std::fs::write(
        input.join("HartfordHealthCare_AreaOfExpertise.json"),
        "{\"Id\": 5, \"Name\": \"Sports Medicine\"}\n",
    )
    .unwrap();
    std::fs::write(input.join("HartfordHealthCare_Symptom.json"), "").unwrap();

    let orchestrator = Orchestrator::new(
        Profile::specialty_rollup().unwrap(),
        Arc::new(FsRelationSource::new(&input)),
        Arc::new(FsDocumentSink::new(&output)),
    );

    let report = orchestrator.run().await.unwrap();

    assert_eq!(report.documents, 2);
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, RunWarning::MalformedSource { relation, .. } if relation == "Symptom")));

    let written = std::fs::read_to_string(output.join("transformed_rollup_data.jsonl")).unwrap();
    let lines: Vec<Value> = written
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["ParentSpecialtyName"], json!(""));
    assert_eq!(lines[1]["AreaofExpertiseId"], json!(5));
    assert!(lines[1]["_id"].is_string());
}
