//! Catalogue entry index.
//!
//! Walks one or more parsed catalogue sources and builds a flat lookup from
//! entry identifier to its node, so links pointing forward, backward, or
//! across files resolve as ordinary lookups. The index owns the parsed
//! documents; extraction borrows into them and never mutates source entries.

use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::markup::{Document, NodeId};
use crate::model::EntryKind;

/// Identifies one loaded catalogue source within the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId(u32);

/// A reference to an entry node in a loaded source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryRef {
    pub source: SourceId,
    pub node: NodeId,
}

/// Load priority of a catalogue source. A lower-priority source never
/// overrides an identifier already claimed by a higher-priority one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourcePriority {
    /// A shared library catalogue pulled in through an import declaration.
    Library,
    /// The directly requested catalogue.
    Primary,
}

/// Kind of a link element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Entry,
    Info,
    Category,
}

/// A reference from one entry's position to another definition, resolved at
/// extraction time. A link is not an entry; the local `name` and `number`
/// fields override the target's own when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReference {
    pub target: String,
    pub kind: LinkKind,
    pub name: Option<String>,
    pub number: Option<u32>,
}

impl LinkReference {
    /// Read a link element. Returns `None` for non-link elements and for
    /// links missing a target identifier.
    pub fn from_node(doc: &Document, node: NodeId) -> Option<Self> {
        let kind = match doc.local_name(node)? {
            "entryLink" => LinkKind::Entry,
            "infoLink" => LinkKind::Info,
            "categoryLink" => LinkKind::Category,
            _ => return None,
        };
        let target = doc.attr(node, "targetId")?.to_string();
        Some(LinkReference {
            target,
            kind,
            name: doc.attr(node, "name").map(str::to_string),
            number: doc.attr(node, "number").and_then(|v| v.parse().ok()),
        })
    }
}

/// An import declared by a catalogue, naming a library catalogue whose
/// entries it links to. Locating the library file is the caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogueImport {
    pub target_id: String,
    pub name: String,
}

/// Elements that can be the target of a link.
const INDEXED_ELEMENTS: &[&str] = &[
    "selectionEntry",
    "selectionEntryGroup",
    "profile",
    "categoryEntry",
];

const ENTRY_ELEMENTS: &[&str] = &["selectionEntry", "selectionEntryGroup"];

const TOP_LEVEL_CONTAINERS: &[&str] = &[
    "selectionEntries",
    "sharedSelectionEntries",
    "selectionEntryGroups",
    "sharedSelectionEntryGroups",
];

/// Identifier lookup across every loaded catalogue source.
#[derive(Debug, Default)]
pub struct CatalogueIndex {
    sources: Vec<(Document, SourcePriority)>,
    entries: HashMap<String, EntryRef>,
    top_level: Vec<String>,
}

impl CatalogueIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every identifiable element of a parsed catalogue.
    ///
    /// Within one source, a duplicate identifier overwrites the earlier
    /// definition with a warning. Across sources, the higher-priority source
    /// keeps the identifier no matter the load order.
    pub fn load_catalogue(&mut self, doc: Document, priority: SourcePriority) {
        let source = SourceId(self.sources.len() as u32);
        let mut claimed: HashSet<String> = HashSet::new();

        for node in doc.descendant_elements(doc.root()) {
            let Some(local) = doc.local_name(node) else {
                continue;
            };
            if !INDEXED_ELEMENTS.contains(&local) {
                continue;
            }
            let Some(id) = doc.attr(node, "id") else {
                continue;
            };
            let entry = EntryRef { source, node };
            if claimed.contains(id) {
                warn!(id, "duplicate identifier in catalogue source, keeping the later definition");
                self.entries.insert(id.to_string(), entry);
            } else if let Some(existing) = self.entries.get(id) {
                let existing_priority = self.sources[existing.source.0 as usize].1;
                if priority > existing_priority {
                    claimed.insert(id.to_string());
                    self.entries.insert(id.to_string(), entry);
                }
            } else {
                claimed.insert(id.to_string());
                self.entries.insert(id.to_string(), entry);
            }
        }

        // Record top-level entries this source won, for lookup by name.
        for container in doc.element_children(doc.root()) {
            let Some(local) = doc.local_name(container) else {
                continue;
            };
            if !TOP_LEVEL_CONTAINERS.contains(&local) {
                continue;
            }
            for node in doc.element_children(container) {
                let Some(local) = doc.local_name(node) else {
                    continue;
                };
                if !ENTRY_ELEMENTS.contains(&local) {
                    continue;
                }
                if let Some(id) = doc.attr(node, "id")
                    && self.entries.get(id) == Some(&EntryRef { source, node })
                    && !self.top_level.iter().any(|t| t == id)
                {
                    self.top_level.push(id.to_string());
                }
            }
        }

        self.sources.push((doc, priority));
    }

    /// Look up an entry node by identifier.
    pub fn lookup_entry(&self, id: &str) -> Option<EntryRef> {
        self.entries.get(id).copied()
    }

    /// The parsed source a reference points into.
    pub fn document(&self, source: SourceId) -> &Document {
        &self.sources[source.0 as usize].0
    }

    /// Identifiers of top-level entries whose display name matches exactly.
    ///
    /// Case-sensitive; several entries sharing a name is a valid data state,
    /// so all matches are returned in load order.
    pub fn find_by_name(&self, name: &str) -> Vec<String> {
        self.top_level
            .iter()
            .filter(|id| {
                self.lookup_entry(id).is_some_and(|entry| {
                    self.document(entry.source).attr(entry.node, "name") == Some(name)
                })
            })
            .cloned()
            .collect()
    }

    /// Sorted display names of every top-level unit or model entry.
    pub fn unit_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .top_level
            .iter()
            .filter_map(|id| {
                let entry = self.lookup_entry(id)?;
                let doc = self.document(entry.source);
                matches!(
                    entry_kind(doc, entry.node),
                    EntryKind::Unit | EntryKind::Model
                )
                .then(|| doc.attr(entry.node, "name").unwrap_or_default().to_string())
            })
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Number of indexed identifiers.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

/// Kind of an entry node: groups by element, everything else by its `type`
/// attribute.
pub fn entry_kind(doc: &Document, node: NodeId) -> EntryKind {
    if doc.local_name(node) == Some("selectionEntryGroup") {
        return EntryKind::CategoryGroup;
    }
    doc.attr(node, "type")
        .map(EntryKind::parse)
        .unwrap_or_else(|| EntryKind::Other(String::new()))
}

/// Imports declared by a catalogue's `catalogueLinks` block.
pub fn catalogue_imports(doc: &Document) -> Vec<CatalogueImport> {
    let mut imports = Vec::new();
    for container in doc.element_children(doc.root()) {
        if doc.local_name(container) != Some("catalogueLinks") {
            continue;
        }
        for node in doc.element_children(container) {
            if doc.local_name(node) == Some("catalogueLink")
                && let Some(target) = doc.attr(node, "targetId")
            {
                imports.push(CatalogueImport {
                    target_id: target.to_string(),
                    name: doc.attr(node, "name").unwrap_or_default().to_string(),
                });
            }
        }
    }
    imports
}
