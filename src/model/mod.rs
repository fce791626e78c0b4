//! Materialized datasheet model.
//!
//! These are the output types of an extraction: a fully resolved entry tree
//! with every link substituted. They own their data and stay valid after the
//! parsed sources are dropped.

use std::fmt;

use serde::{Serialize, Serializer};

/// What kind of selectable component an entry is.
///
/// The extractor's behavior differs by kind in a small, enumerable number of
/// ways; unknown kinds are carried through as [`EntryKind::Other`] with the
/// raw value preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Unit,
    Model,
    Upgrade,
    WeaponOption,
    CategoryGroup,
    Other(String),
}

impl EntryKind {
    /// Map an authored `type` value onto a kind.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "unit" => EntryKind::Unit,
            "model" => EntryKind::Model,
            "upgrade" => EntryKind::Upgrade,
            "weapon" | "weapon-option" => EntryKind::WeaponOption,
            "group" => EntryKind::CategoryGroup,
            other => EntryKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntryKind::Unit => "unit",
            EntryKind::Model => "model",
            EntryKind::Upgrade => "upgrade",
            EntryKind::WeaponOption => "weapon-option",
            EntryKind::CategoryGroup => "category-group",
            EntryKind::Other(raw) => raw,
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EntryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One named characteristic value within a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Characteristic {
    pub name: String,
    pub value: String,
}

/// A typed set of characteristic values attached to an entry.
///
/// Values are ordered by the schema's characteristic order, and their count
/// always equals the schema's characteristic count; a mismatch fails the
/// extraction rather than being silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub type_id: String,
    pub type_name: String,
    pub characteristics: Vec<Characteristic>,
}

/// A category tag attached to an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTag {
    pub id: String,
    pub name: String,
    pub primary: bool,
}

/// A raw cost record attached to an entry. No totals are computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostRecord {
    pub type_id: String,
    pub name: String,
    pub value: f64,
}

/// A fully materialized entry: profiles, category tags, costs, and child
/// entries, with every link already resolved to its target's content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub kind: EntryKind,
    /// Display name of the link this entry was reached through, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_from: Option<String>,
    /// Selection count, when the entry or the link reaching it declares one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    pub categories: Vec<CategoryTag>,
    pub costs: Vec<CostRecord>,
    pub profiles: Vec<Profile>,
    pub children: Vec<Entry>,
}
