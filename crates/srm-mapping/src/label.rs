//! Display labels for SRM elements.
//!
//! Labels are a pure function of the catalog; mapping state never affects them.

use crate::catalog::{SchemaCatalog, SchemaElement, SrmId};
use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Human-readable label for `id`, or `None` if the catalog does not know it.
///
/// Classes render as their name, relations as `name (From → To)`. With
/// `prefixed` the kind keyword is prepended (`class A`, `relation r (A → B)`).
pub fn display_label(catalog: &SchemaCatalog, id: &SrmId, prefixed: bool) -> Option<String> {
    let element = catalog.get(id)?;
    let label = match element {
        SchemaElement::Class { name } => name.clone(),
        SchemaElement::Relation {
            name,
            from_class,
            to_class,
        } => format!(
            "{} ({} \u{2192} {})",
            name,
            catalog.class_name(from_class)?,
            catalog.class_name(to_class)?
        ),
    };

    if prefixed {
        Some(format!("{} {}", element.kind(), label))
    } else {
        Some(label)
    }
}

/// Ordering used for the mapping table, following English collation levels:
///
/// 1. base letters, ignoring case and accents (`Éclair` sorts with `Eclair`)
/// 2. accents, unaccented first
/// 3. case, lowercase first (`apple` before `Apple`)
///
/// Raw text breaks any remaining tie so the order is total.
pub fn compare_labels(lhs: &str, rhs: &str) -> Ordering {
    let primary = |s: &str| {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .flat_map(char::to_lowercase)
            .collect::<Vec<_>>()
    };
    let accents = |s: &str| s.nfd().filter(|c| is_combining_mark(*c)).collect::<Vec<_>>();
    let case = |s: &str| {
        s.nfd()
            .filter(|c| !is_combining_mark(*c))
            .map(char::is_uppercase)
            .collect::<Vec<_>>()
    };

    primary(lhs)
        .cmp(&primary(rhs))
        .then_with(|| accents(lhs).cmp(&accents(rhs)))
        .then_with(|| case(lhs).cmp(&case(rhs)))
        .then_with(|| lhs.cmp(rhs))
}
