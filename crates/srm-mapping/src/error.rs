//! Errors raised by the mapping core.
//!
//! Nothing here is a user-facing failure: every variant reports a caller or
//! catalog inconsistency, or an action the renderer should have disabled.

use crate::catalog::{OntologyId, SrmId};

#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("unknown SRM element `{0}`")]
    UnknownElement(SrmId),
    #[error("relation `{relation}` references unknown class `{class}`")]
    UnknownCatalogClass { relation: SrmId, class: SrmId },
    #[error("SRM id `{0}` is declared both as a class and as a relation")]
    ConflictingCatalogId(SrmId),
    #[error("ontology ids must not be empty")]
    EmptyOntologyId,
    #[error("ontology id `{id}` is assigned to both `{first}` and `{second}`")]
    DuplicateAssignment {
        id: OntologyId,
        first: SrmId,
        second: SrmId,
    },
    #[error("default `{id}` of `{target}` is held by `{owner}`")]
    DefaultHeldElsewhere {
        target: SrmId,
        id: OntologyId,
        owner: SrmId,
    },
    #[error("a selection is already open for `{0}`")]
    SelectionOpen(SrmId),
    #[error("no selection is open")]
    NoSelectionOpen,
    #[error("`{chosen}` was not offered for `{target}`")]
    ChoiceNotOffered { target: SrmId, chosen: OntologyId },
    #[error("mapping has no SRM elements")]
    EmptyMapping,
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
