//! SRM schema catalog and identifier types
//!
//! The catalog is the fixed set of schema elements a session maps. It is
//! validated once at construction (every relation endpoint must be a known
//! class), so lookups downstream never have to deal with dangling references.

use crate::error::MappingError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of an SRM class or relation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SrmId(String);

impl SrmId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SrmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SrmId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SrmId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A non-empty ontology identifier.
///
/// "No ontology id" is spelled `Option::None` everywhere in this crate; the
/// empty string only exists on the JSON wire.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OntologyId(String);

impl OntologyId {
    pub fn new(id: impl Into<String>) -> Result<Self, MappingError> {
        let id = id.into();
        if id.is_empty() {
            return Err(MappingError::EmptyOntologyId);
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OntologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for OntologyId {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for OntologyId {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<OntologyId> for String {
    fn from(value: OntologyId) -> Self {
        value.0
    }
}

// ============================================================================
// Schema elements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaElement {
    Class {
        name: String,
    },
    Relation {
        name: String,
        from_class: SrmId,
        to_class: SrmId,
    },
}

impl SchemaElement {
    pub fn name(&self) -> &str {
        match self {
            SchemaElement::Class { name } | SchemaElement::Relation { name, .. } => name,
        }
    }

    /// Kind keyword used in prefixed labels.
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaElement::Class { .. } => "class",
            SchemaElement::Relation { .. } => "relation",
        }
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Immutable catalog of SRM classes and relations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaCatalog {
    elements: BTreeMap<SrmId, SchemaElement>,
}

impl SchemaCatalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    pub fn from_json_str(json: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, id: &SrmId) -> Option<&SchemaElement> {
        self.elements.get(id)
    }

    pub fn contains(&self, id: &SrmId) -> bool {
        self.elements.contains_key(id)
    }

    /// Name of a class, `None` if `id` is not a class.
    pub fn class_name(&self, id: &SrmId) -> Option<&str> {
        match self.elements.get(id)? {
            SchemaElement::Class { name } => Some(name),
            SchemaElement::Relation { .. } => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SrmId, &SchemaElement)> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn from_wire(wire: CatalogWire) -> Result<Self, MappingError> {
        let mut builder = CatalogBuilder::default();
        for (id, class) in wire.classes {
            builder = builder.class(id, class.name);
        }
        for (id, rel) in wire.relations {
            builder = builder.relation(id, rel.name, rel.from_class, rel.to_class);
        }
        builder.build()
    }

    fn to_wire(&self) -> CatalogWire {
        let mut wire = CatalogWire::default();
        for (id, element) in &self.elements {
            match element {
                SchemaElement::Class { name } => {
                    wire.classes
                        .insert(id.clone(), ClassWire { name: name.clone() });
                }
                SchemaElement::Relation {
                    name,
                    from_class,
                    to_class,
                } => {
                    wire.relations.insert(
                        id.clone(),
                        RelationWire {
                            name: name.clone(),
                            from_class: from_class.clone(),
                            to_class: to_class.clone(),
                        },
                    );
                }
            }
        }
        wire
    }
}

/// Collects classes and relations, then validates them in [`CatalogBuilder::build`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    classes: Vec<(SrmId, String)>,
    relations: Vec<(SrmId, String, SrmId, SrmId)>,
}

impl CatalogBuilder {
    pub fn class(mut self, id: impl Into<SrmId>, name: impl Into<String>) -> Self {
        self.classes.push((id.into(), name.into()));
        self
    }

    pub fn relation(
        mut self,
        id: impl Into<SrmId>,
        name: impl Into<String>,
        from_class: impl Into<SrmId>,
        to_class: impl Into<SrmId>,
    ) -> Self {
        self.relations
            .push((id.into(), name.into(), from_class.into(), to_class.into()));
        self
    }

    pub fn build(self) -> Result<SchemaCatalog, MappingError> {
        let mut elements = BTreeMap::new();
        for (id, name) in self.classes {
            if elements.contains_key(&id) {
                return Err(MappingError::ConflictingCatalogId(id));
            }
            elements.insert(id, SchemaElement::Class { name });
        }

        for (id, name, from_class, to_class) in self.relations {
            if elements.contains_key(&id) {
                return Err(MappingError::ConflictingCatalogId(id));
            }
            for endpoint in [&from_class, &to_class] {
                let known = matches!(elements.get(endpoint), Some(SchemaElement::Class { .. }));
                if !known {
                    return Err(MappingError::UnknownCatalogClass {
                        relation: id,
                        class: endpoint.clone(),
                    });
                }
            }
            elements.insert(
                id,
                SchemaElement::Relation {
                    name,
                    from_class,
                    to_class,
                },
            );
        }

        Ok(SchemaCatalog { elements })
    }
}

// ============================================================================
// JSON wire shape
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogWire {
    #[serde(default)]
    classes: BTreeMap<SrmId, ClassWire>,
    #[serde(default)]
    relations: BTreeMap<SrmId, RelationWire>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClassWire {
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelationWire {
    name: String,
    from_class: SrmId,
    to_class: SrmId,
}

impl Serialize for SchemaCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SchemaCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = CatalogWire::deserialize(deserializer)?;
        SchemaCatalog::from_wire(wire).map_err(serde::de::Error::custom)
    }
}
