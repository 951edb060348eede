//! Integration tests for the complete mapping flow
//!
//! These tests verify end-to-end functionality across the workspace:
//! - Session file on disk → `SessionFile` → `MappingSession`
//! - Edits through the selection negotiator → final mapping JSON
//!
//! Run with: cargo test --test integration_tests

use srm_mapping::{
    LoadError, MappingError, MappingSession, OntologyId, SessionFile, SessionOutcome, SrmId,
};
use std::fs;
use tempfile::tempdir;

const SESSION_JSON: &str = r#"{
    "catalog": {
        "classes": {
            "person": {"name": "Person"},
            "org": {"name": "Organisation"},
            "place": {"name": "place"}
        },
        "relations": {
            "worksFor": {"name": "works for", "fromClass": "person", "toClass": "org"},
            "locatedIn": {"name": "located in", "fromClass": "org", "toClass": "place"}
        }
    },
    "ontology_ids": ["foaf:Person", "foaf:Organization", "schema:Place", "schema:worksFor"],
    "initial_mapping": {
        "person": "foaf:Person",
        "org": "",
        "place": "",
        "worksFor": "schema:worksFor",
        "locatedIn": ""
    },
    "labels": {"heading": "Map the reference model"}
}"#;

fn oid(s: &str) -> OntologyId {
    OntologyId::new(s).unwrap()
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_session_file_round_trip_through_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("session.json");
    fs::write(&path, SESSION_JSON).unwrap();

    let file = SessionFile::load(&path).unwrap();
    assert_eq!(file.labels.heading, "Map the reference model");
    assert_eq!(file.labels.done_button, "Done");

    let session = MappingSession::from_file(file).unwrap();
    let labels: Vec<String> = session.rows().into_iter().map(|r| r.label).collect();
    assert_eq!(
        labels,
        vec![
            "located in (Organisation → place)",
            "Organisation",
            "Person",
            "place",
            "works for (Person → Organisation)",
        ]
    );
}

#[test]
fn test_missing_session_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = SessionFile::load(&dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, LoadError::Io(_)));
}

#[test]
fn test_session_with_unknown_element_is_rejected() {
    let mut file = SessionFile::from_json_str(SESSION_JSON).unwrap();
    file.initial_mapping.insert(SrmId::from("ghost"), None);
    let err = MappingSession::from_file(file).unwrap_err();
    assert!(matches!(err, MappingError::UnknownElement(id) if id.as_str() == "ghost"));
}

// ============================================================================
// Editing end to end
// ============================================================================

#[test]
fn test_full_editing_session() {
    let file = SessionFile::from_json_str(SESSION_JSON).unwrap();
    let mut session = MappingSession::from_file(file).unwrap();
    let org = SrmId::from("org");
    let place = SrmId::from("place");
    let person = SrmId::from("person");

    let scope = session.open_edit(&org).unwrap().unwrap();
    assert_eq!(scope.choices(), &[oid("foaf:Organization"), oid("schema:Place")]);
    session.commit(oid("foaf:Organization")).unwrap();

    let scope = session.open_edit(&place).unwrap().unwrap();
    assert_eq!(scope.choices(), &[oid("schema:Place")]);
    session.commit(oid("schema:Place")).unwrap();

    // Pool exhausted: unmapped relation cannot be edited, holders still can
    let located = SrmId::from("locatedIn");
    assert!(session.open_edit(&located).unwrap().is_none());
    assert!(session.store().can_edit(&person));

    // Swap person's value out and back in
    session.clear(&person).unwrap();
    assert!(session.store().assignable_pool().contains(&oid("foaf:Person")));
    session.restore_default(&person).unwrap();

    let outcome = session.done().unwrap();
    let SessionOutcome::Done(mapping) = outcome else {
        panic!("expected done");
    };
    let json: serde_json::Value = serde_json::from_str(&mapping.to_json_string().unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "person": "foaf:Person",
            "org": "foaf:Organization",
            "place": "schema:Place",
            "worksFor": "schema:worksFor",
            "locatedIn": ""
        })
    );
    assert!(mapping.duplicate_assignments().is_empty());
}

#[test]
fn test_context_switch_resets_working_mapping() {
    let file = SessionFile::from_json_str(SESSION_JSON).unwrap();
    let mut session = MappingSession::from_file(file).unwrap();

    session.clear(&SrmId::from("person")).unwrap();
    session.open_edit(&SrmId::from("org")).unwrap();

    let next = srm_mapping::Mapping::from_json_str(r#"{"person": "", "org": "foaf:Person"}"#).unwrap();
    session.resync(next.clone()).unwrap();

    assert!(session.selection().is_none());
    assert_eq!(session.mapping(), &next);
    assert_eq!(session.rows().len(), 2);
    assert_eq!(session.cancel(), SessionOutcome::Cancelled);
}
