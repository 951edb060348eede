//! Session configuration and the JSON session file.

use crate::catalog::{OntologyId, SchemaCatalog};
use crate::error::MappingError;
use crate::mapping::Mapping;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Texts shown around the mapping table and the selection dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionLabels {
    pub heading: String,
    pub done_button: String,
    pub cancel_button: String,
    pub dialog_title: String,
}

impl Default for SessionLabels {
    fn default() -> Self {
        Self {
            heading: "SRM mapping".to_string(),
            done_button: "Done".to_string(),
            cancel_button: "Cancel".to_string(),
            dialog_title: "Select ontology equivalent".to_string(),
        }
    }
}

/// Everything needed to start a session, as supplied by the caller.
///
/// ```json
/// {
///   "catalog": { "classes": {...}, "relations": {...} },
///   "ontology_ids": ["x1", "x2"],
///   "initial_mapping": { "c1": "x1", "c2": "" },
///   "labels": { "heading": "Map SRM" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionFile {
    pub catalog: SchemaCatalog,
    #[serde(default)]
    pub ontology_ids: Vec<OntologyId>,
    pub initial_mapping: Mapping,
    #[serde(default)]
    pub labels: SessionLabels,
}

impl SessionFile {
    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&contents)?)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Mapping(#[from] MappingError),
}
