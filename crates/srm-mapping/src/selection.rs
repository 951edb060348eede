//! The "pick one ontology id" interaction for a single SRM element.
//!
//! A [`SelectionScope`] is built from the store's assignable pool plus the
//! element's own current value. It never offers an id held by a different
//! element, which is what keeps committed mappings duplicate-free.

use crate::catalog::{OntologyId, SchemaCatalog, SrmId};
use crate::config::SessionLabels;
use crate::error::MappingError;
use crate::label::display_label;
use crate::mapping::MappingStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionScope {
    target: SrmId,
    title: String,
    prompt: String,
    choices: Vec<OntologyId>,
    preselected: Option<OntologyId>,
}

impl SelectionScope {
    /// Open a scope for `target`. Returns `Ok(None)` when there is nothing to
    /// offer: empty pool and no current value.
    pub fn open(
        store: &MappingStore,
        catalog: &SchemaCatalog,
        labels: &SessionLabels,
        target: &SrmId,
    ) -> Result<Option<Self>, MappingError> {
        if !store.current().contains_key(target) {
            return Err(MappingError::UnknownElement(target.clone()));
        }
        let label = display_label(catalog, target, true)
            .ok_or_else(|| MappingError::UnknownElement(target.clone()))?;

        let preselected = store.value_of(target).cloned();
        let mut choices = store.assignable_pool();
        if let Some(current) = &preselected {
            choices.insert(current.clone());
        }
        if choices.is_empty() {
            tracing::debug!(srm_id = %target, "nothing to offer, selection not opened");
            return Ok(None);
        }

        tracing::debug!(srm_id = %target, choices = choices.len(), "selection opened");
        Ok(Some(Self {
            target: target.clone(),
            title: labels.dialog_title.clone(),
            prompt: format!("Please select the ontology equivalent for SRM {label}."),
            choices: choices.into_iter().collect(),
            preselected,
        }))
    }

    pub fn target(&self) -> &SrmId {
        &self.target
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Offered ids, sorted and without duplicates.
    pub fn choices(&self) -> &[OntologyId] {
        &self.choices
    }

    pub fn preselected(&self) -> Option<&OntologyId> {
        self.preselected.as_ref()
    }

    pub fn offers(&self, id: &OntologyId) -> bool {
        self.choices.binary_search(id).is_ok()
    }

    /// Assign `chosen` to the target and close the scope.
    ///
    /// A choice that was not offered closes the scope without touching the
    /// store.
    pub fn commit(
        self,
        store: &mut MappingStore,
        chosen: OntologyId,
    ) -> Result<Option<OntologyId>, MappingError> {
        if !self.offers(&chosen) {
            return Err(MappingError::ChoiceNotOffered {
                target: self.target,
                chosen,
            });
        }
        store.assign(&self.target, chosen)
    }

    pub fn abandon(self) {
        tracing::debug!(srm_id = %self.target, "selection abandoned");
    }
}
