//! SRM ↔ ontology mapping
//!
//! Reconciles two identifier spaces: the fixed set of SRM schema elements
//! (classes and relations) and a user-selectable set of ontology ids. Each
//! schema element holds at most one ontology id, and no ontology id is held by
//! two elements at once.
//!
//! ```text
//! ┌───────────────┐   open_edit    ┌──────────────────┐
//! │    Viewing    │───────────────►│    Selecting     │
//! │ (MappingStore)│◄───────────────│ (SelectionScope) │
//! └───────────────┘ commit/abandon └──────────────────┘
//!         │
//!         ├── clear / restore_default
//!         └── done / cancel ──► SessionOutcome
//! ```
//!
//! Uniqueness is kept by restricting what a [`SelectionScope`] offers, not by
//! checking inside [`MappingStore::assign`].

pub mod catalog;
pub mod config;
pub mod error;
pub mod label;
pub mod mapping;
pub mod selection;
pub mod session;

pub use catalog::{OntologyId, SchemaCatalog, SchemaElement, SrmId};
pub use config::{LoadError, SessionFile, SessionLabels};
pub use error::MappingError;
pub use mapping::{Mapping, MappingStore};
pub use selection::SelectionScope;
pub use session::{MappingRow, MappingSession, SessionOutcome, SessionState};
