//! Session state machine: `Viewing ⇄ Selecting`.
//!
//! The session owns the catalog, the [`MappingStore`] and at most one open
//! [`SelectionScope`]. Holding the scope inside [`SessionState::Selecting`]
//! makes "one dialog at a time" a property of the type rather than a runtime
//! check on a nullable field.

use crate::catalog::{OntologyId, SchemaCatalog, SrmId};
use crate::config::{SessionFile, SessionLabels};
use crate::error::MappingError;
use crate::label::{compare_labels, display_label};
use crate::mapping::{Mapping, MappingStore};
use crate::selection::SelectionScope;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Viewing,
    Selecting(SelectionScope),
}

/// One line of the mapping table, ready for a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub srm_id: SrmId,
    pub label: String,
    pub value: Option<OntologyId>,
    pub can_edit: bool,
    pub can_restore: bool,
    pub can_clear: bool,
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Done(Mapping),
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct MappingSession {
    catalog: SchemaCatalog,
    store: MappingStore,
    labels: SessionLabels,
    state: SessionState,
}

impl MappingSession {
    pub fn new(
        catalog: SchemaCatalog,
        ontology_ids: impl IntoIterator<Item = OntologyId>,
        initial: Mapping,
        labels: SessionLabels,
    ) -> Result<Self, MappingError> {
        ensure_known(&catalog, &initial)?;
        let store = MappingStore::new(ontology_ids, initial)?;
        Ok(Self {
            catalog,
            store,
            labels,
            state: SessionState::Viewing,
        })
    }

    pub fn from_file(file: SessionFile) -> Result<Self, MappingError> {
        Self::new(
            file.catalog,
            file.ontology_ids,
            file.initial_mapping,
            file.labels,
        )
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &MappingStore {
        &self.store
    }

    pub fn mapping(&self) -> &Mapping {
        self.store.current()
    }

    pub fn labels(&self) -> &SessionLabels {
        &self.labels
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn selection(&self) -> Option<&SelectionScope> {
        match &self.state {
            SessionState::Selecting(scope) => Some(scope),
            SessionState::Viewing => None,
        }
    }

    pub fn label(&self, id: &SrmId) -> Option<String> {
        display_label(&self.catalog, id, false)
    }

    /// Mapping table sorted by label. Row actions are disabled while a
    /// selection is open.
    pub fn rows(&self) -> Vec<MappingRow> {
        let viewing = matches!(self.state, SessionState::Viewing);
        let mut rows: Vec<MappingRow> = self
            .store
            .current()
            .iter()
            .map(|(id, value)| MappingRow {
                srm_id: id.clone(),
                label: self.label(id).unwrap_or_else(|| id.to_string()),
                value: value.cloned(),
                can_edit: viewing && self.store.can_edit(id),
                can_restore: viewing && self.store.can_restore(id),
                can_clear: viewing && self.store.can_clear(id),
            })
            .collect();
        rows.sort_by(|a, b| compare_labels(&a.label, &b.label));
        rows
    }

    pub fn can_done(&self) -> bool {
        matches!(self.state, SessionState::Viewing) && !self.store.current().is_empty()
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// `Viewing → Selecting`. Returns `Ok(None)` and stays in `Viewing` when
    /// there is nothing to offer for `id`.
    pub fn open_edit(&mut self, id: &SrmId) -> Result<Option<&SelectionScope>, MappingError> {
        self.ensure_viewing()?;
        if let Some(scope) = SelectionScope::open(&self.store, &self.catalog, &self.labels, id)? {
            self.state = SessionState::Selecting(scope);
        }
        Ok(self.selection())
    }

    /// Commit the open selection. The session is back in `Viewing`
    /// afterwards, whether or not the choice was accepted.
    pub fn commit(&mut self, chosen: OntologyId) -> Result<Option<OntologyId>, MappingError> {
        match std::mem::take(&mut self.state) {
            SessionState::Selecting(scope) => scope.commit(&mut self.store, chosen),
            SessionState::Viewing => Err(MappingError::NoSelectionOpen),
        }
    }

    /// Close the open selection without changes. Returns `false` if none was open.
    pub fn abandon(&mut self) -> bool {
        match std::mem::take(&mut self.state) {
            SessionState::Selecting(scope) => {
                scope.abandon();
                true
            }
            SessionState::Viewing => false,
        }
    }

    // ========================================================================
    // Direct edits
    // ========================================================================

    pub fn clear(&mut self, id: &SrmId) -> Result<Option<OntologyId>, MappingError> {
        self.ensure_viewing()?;
        self.store.clear(id)
    }

    /// Restore `id` to its initial value. Refused when that value now belongs
    /// to another element, which would otherwise end up duplicated.
    pub fn restore_default(&mut self, id: &SrmId) -> Result<Option<OntologyId>, MappingError> {
        self.ensure_viewing()?;
        if let Some((default, owner)) = self.store.default_held_elsewhere(id) {
            return Err(MappingError::DefaultHeldElsewhere {
                target: id.clone(),
                id: default.clone(),
                owner: owner.clone(),
            });
        }
        self.store.restore_default(id)
    }

    // ========================================================================
    // External re-supply
    // ========================================================================

    /// Replace the ontology id catalog. An open selection is re-scoped against
    /// the new pool, or closed if nothing is left to offer.
    pub fn set_ontology_ids(
        &mut self,
        ontology_ids: impl IntoIterator<Item = OntologyId>,
    ) -> Result<(), MappingError> {
        self.store.set_ontology_ids(ontology_ids);
        if let SessionState::Selecting(scope) = std::mem::take(&mut self.state) {
            if let Some(rescoped) =
                SelectionScope::open(&self.store, &self.catalog, &self.labels, scope.target())?
            {
                self.state = SessionState::Selecting(rescoped);
            }
        }
        Ok(())
    }

    /// Adopt a new initial mapping (the caller switched contexts). Any open
    /// selection is abandoned.
    pub fn resync(&mut self, initial: Mapping) -> Result<(), MappingError> {
        ensure_known(&self.catalog, &initial)?;
        self.store.resync(initial)?;
        self.abandon();
        Ok(())
    }

    // ========================================================================
    // Terminal actions
    // ========================================================================

    pub fn done(&self) -> Result<SessionOutcome, MappingError> {
        self.ensure_viewing()?;
        if self.store.current().is_empty() {
            return Err(MappingError::EmptyMapping);
        }
        tracing::info!(elements = self.store.current().len(), "mapping session done");
        Ok(SessionOutcome::Done(self.store.current().clone()))
    }

    pub fn cancel(&self) -> SessionOutcome {
        tracing::info!("mapping session cancelled");
        SessionOutcome::Cancelled
    }

    fn ensure_viewing(&self) -> Result<(), MappingError> {
        match &self.state {
            SessionState::Viewing => Ok(()),
            SessionState::Selecting(scope) => Err(MappingError::SelectionOpen(scope.target().clone())),
        }
    }
}

fn ensure_known(catalog: &SchemaCatalog, mapping: &Mapping) -> Result<(), MappingError> {
    match mapping.keys().find(|id| !catalog.contains(id)) {
        Some(unknown) => Err(MappingError::UnknownElement(unknown.clone())),
        None => Ok(()),
    }
}
