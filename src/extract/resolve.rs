//! Link resolution and entry materialization.
//!
//! One [`Walk`] lives for the duration of a single extraction. It carries the
//! chain of entry identifiers on the current materialization path (the cycle
//! guard) and the set of schema identifiers used so far; nothing in the
//! source documents is ever marked or mutated.

use std::collections::BTreeSet;

use tracing::warn;

use crate::catalogue::{CatalogueIndex, EntryRef, LinkReference, entry_kind};
use crate::error::{Error, Result};
use crate::markup::{Document, NodeId};
use crate::model::{CategoryTag, Characteristic, CostRecord, Entry, Profile};
use crate::system::SchemaRegistry;

pub(super) struct Walk<'a> {
    index: &'a CatalogueIndex,
    registry: &'a SchemaRegistry,
    max_depth: usize,
    chain: Vec<String>,
    used: BTreeSet<String>,
}

impl<'a> Walk<'a> {
    pub(super) fn new(
        index: &'a CatalogueIndex,
        registry: &'a SchemaRegistry,
        max_depth: usize,
    ) -> Self {
        Walk {
            index,
            registry,
            max_depth,
            chain: Vec::new(),
            used: BTreeSet::new(),
        }
    }

    /// Schema identifiers referenced by any materialized profile.
    pub(super) fn into_used_schemas(self) -> BTreeSet<String> {
        self.used
    }

    /// Materialize an entry and its full subtree, resolving every link.
    ///
    /// `link` carries the reference this entry was reached through, whose
    /// local overrides apply on top of the entry's own attributes.
    pub(super) fn materialize(
        &mut self,
        entry: EntryRef,
        link: Option<&LinkReference>,
    ) -> Result<Entry> {
        if self.chain.len() >= self.max_depth {
            return Err(Error::DepthLimitExceeded(self.max_depth));
        }
        let doc = self.index.document(entry.source);
        let id = doc.attr(entry.node, "id").unwrap_or_default().to_string();

        self.chain.push(id.clone());
        let result = self.materialize_parts(doc, entry, id, link);
        self.chain.pop();
        result
    }

    fn materialize_parts(
        &mut self,
        doc: &'a Document,
        entry: EntryRef,
        id: String,
        link: Option<&LinkReference>,
    ) -> Result<Entry> {
        let node = entry.node;
        let own_name = doc.attr(node, "name").unwrap_or_default();
        let name = match link.and_then(|l| l.name.as_deref()) {
            Some(override_name) => override_name.to_string(),
            None => own_name.to_string(),
        };
        let count = link.and_then(|l| l.number).or_else(|| {
            doc.attr(node, "number").and_then(|v| v.parse().ok())
        });

        let mut profiles = Vec::new();
        let mut categories = Vec::new();
        let mut costs = Vec::new();
        let mut children = Vec::new();

        for container in doc.element_children(node) {
            match doc.local_name(container).unwrap_or("") {
                "profiles" => {
                    for el in doc.element_children(container) {
                        if doc.local_name(el) == Some("profile") {
                            profiles.push(self.profile(doc, el, None)?);
                        }
                    }
                }
                "infoLinks" => {
                    for el in doc.element_children(container) {
                        if doc.local_name(el) != Some("infoLink") {
                            continue;
                        }
                        match LinkReference::from_node(doc, el) {
                            Some(info) => profiles.extend(self.resolve_info_link(&info)?),
                            None => warn!("info link without a target ignored"),
                        }
                    }
                }
                "categoryLinks" => {
                    for el in doc.element_children(container) {
                        if doc.local_name(el) != Some("categoryLink") {
                            continue;
                        }
                        match LinkReference::from_node(doc, el) {
                            Some(cat) => categories.push(self.category_tag(doc, el, &cat)),
                            None => warn!("category link without a target ignored"),
                        }
                    }
                }
                "costs" => {
                    for el in doc.element_children(container) {
                        if doc.local_name(el) == Some("cost") {
                            costs.push(self.cost_record(doc, el));
                        }
                    }
                }
                "selectionEntries" | "selectionEntryGroups" => {
                    for el in doc.element_children(container) {
                        if matches!(
                            doc.local_name(el),
                            Some("selectionEntry") | Some("selectionEntryGroup")
                        ) {
                            let child = EntryRef {
                                source: entry.source,
                                node: el,
                            };
                            children.push(self.materialize(child, None)?);
                        }
                    }
                }
                "entryLinks" => {
                    for el in doc.element_children(container) {
                        if doc.local_name(el) != Some("entryLink") {
                            continue;
                        }
                        match LinkReference::from_node(doc, el) {
                            Some(entry_link) => {
                                children.push(self.resolve_entry_link(&entry_link)?);
                            }
                            None => warn!("entry link without a target ignored"),
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(Entry {
            id,
            name,
            kind: entry_kind(doc, node),
            linked_from: link.and_then(|l| l.name.clone()),
            count,
            categories,
            costs,
            profiles,
            children,
        })
    }

    /// Resolve an entry link to its target and substitute the full subtree
    /// at the link's position.
    fn resolve_entry_link(&mut self, link: &LinkReference) -> Result<Entry> {
        let target = self.lookup_target(&link.target)?;
        let doc = self.index.document(target.source);
        if !matches!(
            doc.local_name(target.node),
            Some("selectionEntry") | Some("selectionEntryGroup")
        ) {
            return Err(Error::UnresolvedLink {
                target: link.target.clone(),
                chain: self.chain.clone(),
            });
        }
        self.materialize(target, Some(link))
    }

    /// Resolve an info link to the target's profile content only; the
    /// target's children are never substituted.
    fn resolve_info_link(&mut self, link: &LinkReference) -> Result<Vec<Profile>> {
        let target = self.lookup_target(&link.target)?;
        let doc = self.index.document(target.source);
        match doc.local_name(target.node) {
            Some("profile") => Ok(vec![self.profile(doc, target.node, link.name.as_deref())?]),
            Some("selectionEntry") | Some("selectionEntryGroup") => {
                let mut profiles = Vec::new();
                for container in doc.element_children(target.node) {
                    if doc.local_name(container) != Some("profiles") {
                        continue;
                    }
                    for el in doc.element_children(container) {
                        if doc.local_name(el) == Some("profile") {
                            profiles.push(self.profile(doc, el, None)?);
                        }
                    }
                }
                Ok(profiles)
            }
            _ => Err(Error::UnresolvedLink {
                target: link.target.clone(),
                chain: self.chain.clone(),
            }),
        }
    }

    /// Look up a link target and guard the current chain against cycles.
    fn lookup_target(&self, target: &str) -> Result<EntryRef> {
        let Some(entry) = self.index.lookup_entry(target) else {
            return Err(Error::UnresolvedLink {
                target: target.to_string(),
                chain: self.chain.clone(),
            });
        };
        if self.chain.iter().any(|id| id == target) {
            let mut chain = self.chain.clone();
            chain.push(target.to_string());
            return Err(Error::CyclicLink { chain });
        }
        Ok(entry)
    }

    /// A category link resolves to a tag, not an entry. The display name
    /// falls back from the link itself to the target definition to the raw
    /// identifier.
    fn category_tag(&self, doc: &Document, node: NodeId, link: &LinkReference) -> CategoryTag {
        let name = link
            .name
            .clone()
            .or_else(|| {
                let target = self.index.lookup_entry(&link.target)?;
                let target_doc = self.index.document(target.source);
                if target_doc.local_name(target.node) == Some("categoryEntry") {
                    Some(
                        target_doc
                            .attr(target.node, "name")
                            .unwrap_or_default()
                            .to_string(),
                    )
                } else {
                    None
                }
            })
            .unwrap_or_else(|| link.target.clone());
        CategoryTag {
            id: link.target.clone(),
            name,
            primary: doc.attr(node, "primary") == Some("true"),
        }
    }

    /// Materialize a profile, ordering its values by the schema's
    /// characteristic order and recording the schema as used.
    fn profile(
        &mut self,
        doc: &Document,
        node: NodeId,
        name_override: Option<&str>,
    ) -> Result<Profile> {
        let type_id = doc.attr(node, "typeId").unwrap_or_default().to_string();
        let Some(schema) = self.registry.lookup_schema(&type_id) else {
            return Err(Error::SchemaNotFound(type_id));
        };
        self.used.insert(type_id.clone());

        let name = match name_override {
            Some(n) => n.to_string(),
            None => doc.attr(node, "name").unwrap_or_default().to_string(),
        };

        let mut values: Vec<(String, String)> = Vec::new();
        if let Some(chars) = doc.child_element(node, "characteristics") {
            for el in doc.element_children(chars) {
                if doc.local_name(el) == Some("characteristic")
                    && let Some(char_name) = doc.attr(el, "name")
                {
                    values.push((char_name.to_string(), doc.text_content(el)));
                }
            }
        }

        let mut characteristics = Vec::with_capacity(schema.characteristics.len());
        for char_name in &schema.characteristics {
            match values.iter().position(|(n, _)| n == char_name) {
                Some(i) => {
                    let (n, v) = values.remove(i);
                    characteristics.push(Characteristic { name: n, value: v });
                }
                None => {
                    return Err(Error::ProfileMismatch {
                        profile: name,
                        schema: schema.id.clone(),
                        detail: format!("missing characteristic '{char_name}'"),
                    });
                }
            }
        }
        if let Some((extra, _)) = values.first() {
            return Err(Error::ProfileMismatch {
                profile: name,
                schema: schema.id.clone(),
                detail: format!("characteristic '{extra}' is not defined by the schema"),
            });
        }

        Ok(Profile {
            name,
            type_id,
            type_name: doc
                .attr(node, "typeName")
                .unwrap_or(&schema.name)
                .to_string(),
            characteristics,
        })
    }

    /// Cost display names come from the record itself, then the registry,
    /// then the raw type identifier.
    fn cost_record(&self, doc: &Document, node: NodeId) -> CostRecord {
        let type_id = doc.attr(node, "typeId").unwrap_or_default().to_string();
        let name = doc
            .attr(node, "name")
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .or_else(|| self.registry.lookup_cost(&type_id).map(|c| c.name.clone()))
            .unwrap_or_else(|| type_id.clone());
        CostRecord {
            type_id,
            name,
            value: doc
                .attr(node, "value")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.0),
        }
    }
}
