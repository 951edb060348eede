//! Mapping table and the store that owns it
//!
//! [`MappingStore`] is the single source of truth for the working mapping. It
//! keeps the snapshot the session started from (the restore target) and the
//! catalog of ontology ids, and derives the assignable pool on demand instead
//! of caching it, so the pool can never go stale after a mutation.
//!
//! The store does not enforce uniqueness on [`MappingStore::assign`]. Callers
//! go through [`crate::SelectionScope`], whose choice set already excludes ids
//! held by other elements.

use crate::catalog::{OntologyId, SrmId};
use crate::error::MappingError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet};

// ============================================================================
// Mapping
// ============================================================================

/// SRM element → ontology id (or nothing).
///
/// On the JSON wire this is an object of strings where `""` means unassigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mapping {
    entries: BTreeMap<SrmId, Option<OntologyId>>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, MappingError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Insert or overwrite an entry. Used to build mappings, not to edit a
    /// live session.
    pub fn insert(&mut self, id: SrmId, value: Option<OntologyId>) {
        self.entries.insert(id, value);
    }

    pub fn contains_key(&self, id: &SrmId) -> bool {
        self.entries.contains_key(id)
    }

    /// Value held by `id`; `None` both for unassigned and unknown elements.
    pub fn value(&self, id: &SrmId) -> Option<&OntologyId> {
        self.entries.get(id).and_then(Option::as_ref)
    }

    pub fn keys(&self) -> impl Iterator<Item = &SrmId> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SrmId, Option<&OntologyId>)> {
        self.entries.iter().map(|(k, v)| (k, v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every non-empty value currently present.
    pub fn assigned_values(&self) -> BTreeSet<&OntologyId> {
        self.entries.values().flatten().collect()
    }

    /// First element (in key order) holding `value`.
    pub fn owner_of(&self, value: &OntologyId) -> Option<&SrmId> {
        self.entries
            .iter()
            .find(|(_, v)| v.as_ref() == Some(value))
            .map(|(k, _)| k)
    }

    /// Ontology ids held by more than one element, with two of their holders.
    pub fn duplicate_assignments(&self) -> Vec<(OntologyId, SrmId, SrmId)> {
        let mut seen: BTreeMap<&OntologyId, &SrmId> = BTreeMap::new();
        let mut duplicates = Vec::new();
        for (id, value) in &self.entries {
            let Some(value) = value else { continue };
            match seen.get(value) {
                Some(first) => duplicates.push((value.clone(), (*first).clone(), id.clone())),
                None => {
                    seen.insert(value, id);
                }
            }
        }
        duplicates
    }

    fn ensure_unique(&self) -> Result<(), MappingError> {
        match self.duplicate_assignments().into_iter().next() {
            Some((id, first, second)) => Err(MappingError::DuplicateAssignment { id, first, second }),
            None => Ok(()),
        }
    }
}

impl FromIterator<(SrmId, Option<OntologyId>)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (SrmId, Option<OntologyId>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for Mapping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire: BTreeMap<&SrmId, &str> = self
            .entries
            .iter()
            .map(|(k, v)| (k, v.as_ref().map_or("", OntologyId::as_str)))
            .collect();
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Mapping {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = BTreeMap::<SrmId, String>::deserialize(deserializer)?;
        let mut mapping = Mapping::new();
        for (k, v) in wire {
            let value = if v.is_empty() {
                None
            } else {
                Some(OntologyId::new(v).map_err(serde::de::Error::custom)?)
            };
            mapping.insert(k, value);
        }
        Ok(mapping)
    }
}

// ============================================================================
// MappingStore
// ============================================================================

#[derive(Debug, Clone)]
pub struct MappingStore {
    ontology_ids: BTreeSet<OntologyId>,
    current: Mapping,
    initial: Mapping,
}

impl MappingStore {
    /// Start a store from the initial mapping. Fails if the initial mapping
    /// already assigns one ontology id to two elements.
    pub fn new(
        ontology_ids: impl IntoIterator<Item = OntologyId>,
        initial: Mapping,
    ) -> Result<Self, MappingError> {
        initial.ensure_unique()?;
        Ok(Self {
            ontology_ids: ontology_ids.into_iter().collect(),
            current: initial.clone(),
            initial,
        })
    }

    pub fn current(&self) -> &Mapping {
        &self.current
    }

    pub fn initial(&self) -> &Mapping {
        &self.initial
    }

    pub fn ontology_ids(&self) -> &BTreeSet<OntologyId> {
        &self.ontology_ids
    }

    pub fn value_of(&self, id: &SrmId) -> Option<&OntologyId> {
        self.current.value(id)
    }

    pub fn default_of(&self, id: &SrmId) -> Option<&OntologyId> {
        self.initial.value(id)
    }

    /// Set `id` to `value` and return the previous value.
    ///
    /// Does not check whether another element already holds `value`; that
    /// is the caller's job (see [`crate::SelectionScope`]).
    pub fn assign(
        &mut self,
        id: &SrmId,
        value: OntologyId,
    ) -> Result<Option<OntologyId>, MappingError> {
        if let Some(owner) = self.current.owner_of(&value) {
            if owner != id {
                tracing::warn!(
                    srm_id = %id,
                    ontology_id = %value,
                    owner = %owner,
                    "assigning an ontology id that is already held by another element"
                );
            }
        }
        self.set(id, Some(value))
    }

    pub fn clear(&mut self, id: &SrmId) -> Result<Option<OntologyId>, MappingError> {
        self.set(id, None)
    }

    pub fn restore_default(&mut self, id: &SrmId) -> Result<Option<OntologyId>, MappingError> {
        let default = self.initial.value(id).cloned();
        self.set(id, default)
    }

    /// Ontology ids with no current owner: catalog minus assigned values.
    pub fn assignable_pool(&self) -> BTreeSet<OntologyId> {
        let assigned = self.current.assigned_values();
        self.ontology_ids
            .iter()
            .filter(|id| !assigned.contains(id))
            .cloned()
            .collect()
    }

    pub fn can_edit(&self, id: &SrmId) -> bool {
        if !self.current.contains_key(id) {
            return false;
        }
        self.value_of(id).is_some() || !self.assignable_pool().is_empty()
    }

    pub fn can_clear(&self, id: &SrmId) -> bool {
        self.value_of(id).is_some()
    }

    /// Restore is offered when the element differs from its default and the
    /// default is not meanwhile held by another element.
    pub fn can_restore(&self, id: &SrmId) -> bool {
        self.current.contains_key(id)
            && self.value_of(id) != self.default_of(id)
            && self.default_held_elsewhere(id).is_none()
    }

    /// `id`'s default value together with the other element now holding it.
    pub fn default_held_elsewhere(&self, id: &SrmId) -> Option<(&OntologyId, &SrmId)> {
        let default = self.default_of(id)?;
        let owner = self.current.owner_of(default).filter(|owner| *owner != id)?;
        Some((default, owner))
    }

    /// Replace the ontology id catalog. Values that dropped out of the catalog
    /// stay assigned; they are simply no longer offered to anyone else.
    pub fn set_ontology_ids(&mut self, ontology_ids: impl IntoIterator<Item = OntologyId>) {
        self.ontology_ids = ontology_ids.into_iter().collect();
        let orphaned = self
            .current
            .assigned_values()
            .into_iter()
            .filter(|v| !self.ontology_ids.contains(*v))
            .count();
        tracing::debug!(
            ontology_ids = self.ontology_ids.len(),
            orphaned,
            "ontology id catalog replaced"
        );
    }

    /// Adopt a newly supplied initial mapping; the working mapping is reset to it.
    pub fn resync(&mut self, initial: Mapping) -> Result<(), MappingError> {
        initial.ensure_unique()?;
        tracing::debug!(elements = initial.len(), "initial mapping re-supplied");
        self.current = initial.clone();
        self.initial = initial;
        Ok(())
    }

    fn set(
        &mut self,
        id: &SrmId,
        value: Option<OntologyId>,
    ) -> Result<Option<OntologyId>, MappingError> {
        let slot = self
            .current
            .entries
            .get_mut(id)
            .ok_or_else(|| MappingError::UnknownElement(id.clone()))?;
        tracing::debug!(
            srm_id = %id,
            previous = ?slot.as_ref().map(OntologyId::as_str),
            new = ?value.as_ref().map(OntologyId::as_str),
            "mapping updated"
        );
        Ok(std::mem::replace(slot, value))
    }
}
