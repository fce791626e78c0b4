//! Game-system schema registry.
//!
//! A system source declares the profile types (ordered characteristic names)
//! and cost types shared by every catalogue. The registry collects them once
//! per query and answers lookups by identifier; display names are not unique
//! and are never used as keys.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::markup::Document;

/// A named profile schema: the ordered characteristic names every profile of
/// this type must populate.
///
/// Characteristic order is semantically meaningful (it defines column order
/// for the type) and is preserved exactly as authored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDefinition {
    pub id: String,
    pub name: String,
    pub characteristics: Vec<String>,
}

/// A named cost type with its default value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostDefinition {
    pub id: String,
    pub name: String,
    pub default_value: f64,
}

/// Lookup table of schema and cost definitions from one or more system
/// sources.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaDefinition>,
    costs: HashMap<String, CostDefinition>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every profile-type and cost-type definition from a parsed
    /// system source.
    ///
    /// Duplicate identifiers within the same source overwrite earlier ones
    /// with a warning. A definition already loaded from an earlier (higher
    /// priority) source is never overridden by a later one.
    pub fn load_system(&mut self, doc: &Document) {
        let mut loaded_schemas: HashSet<String> = HashSet::new();
        let mut loaded_costs: HashSet<String> = HashSet::new();

        for node in doc.descendant_elements(doc.root()) {
            match doc.local_name(node) {
                Some("profileType") => {
                    let Some(id) = doc.attr(node, "id") else {
                        warn!("profile type without an id ignored");
                        continue;
                    };
                    let mut characteristics = Vec::new();
                    if let Some(types) = doc.child_element(node, "characteristicTypes") {
                        for char_type in doc.element_children(types) {
                            if doc.local_name(char_type) == Some("characteristicType")
                                && let Some(name) = doc.attr(char_type, "name")
                            {
                                characteristics.push(name.to_string());
                            }
                        }
                    }
                    let def = SchemaDefinition {
                        id: id.to_string(),
                        name: doc.attr(node, "name").unwrap_or_default().to_string(),
                        characteristics,
                    };
                    if loaded_schemas.contains(&def.id) {
                        warn!(id = %def.id, "duplicate profile type in source, keeping the later definition");
                        self.schemas.insert(def.id.clone(), def);
                    } else if !self.schemas.contains_key(&def.id) {
                        loaded_schemas.insert(def.id.clone());
                        self.schemas.insert(def.id.clone(), def);
                    }
                }
                Some("costType") => {
                    let Some(id) = doc.attr(node, "id") else {
                        warn!("cost type without an id ignored");
                        continue;
                    };
                    let def = CostDefinition {
                        id: id.to_string(),
                        name: doc.attr(node, "name").unwrap_or_default().to_string(),
                        default_value: doc
                            .attr(node, "defaultCostLimit")
                            .and_then(|v| v.parse().ok())
                            .unwrap_or(0.0),
                    };
                    if loaded_costs.contains(&def.id) {
                        warn!(id = %def.id, "duplicate cost type in source, keeping the later definition");
                        self.costs.insert(def.id.clone(), def);
                    } else if !self.costs.contains_key(&def.id) {
                        loaded_costs.insert(def.id.clone());
                        self.costs.insert(def.id.clone(), def);
                    }
                }
                _ => {}
            }
        }
    }

    /// Look up a profile schema by identifier.
    pub fn lookup_schema(&self, id: &str) -> Option<&SchemaDefinition> {
        self.schemas.get(id)
    }

    /// Look up a cost type by identifier.
    pub fn lookup_cost(&self, id: &str) -> Option<&CostDefinition> {
        self.costs.get(id)
    }

    /// Number of registered profile schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}
