//! Unit extraction and result assembly.
//!
//! The extractor locates a top-level entry by display name, materializes its
//! full subtree depth-first through the link resolver, and packages the
//! result together with every profile schema the materialized tree uses.

mod resolve;

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalogue::CatalogueIndex;
use crate::error::{Error, Result};
use crate::model::Entry;
use crate::system::{SchemaDefinition, SchemaRegistry};

/// Default bound on entry nesting, guarding against pathological but acyclic
/// deep trees.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The result of one extraction query: a fully materialized unit tree plus
/// exactly the schemas its profiles reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Extraction {
    pub unit: Entry,
    pub schemas: BTreeMap<String, SchemaDefinition>,
}

/// Extracts one named unit from loaded catalogue sources.
#[derive(Debug, Clone, Copy)]
pub struct UnitExtractor<'a> {
    index: &'a CatalogueIndex,
    registry: &'a SchemaRegistry,
    max_depth: usize,
}

impl<'a> UnitExtractor<'a> {
    pub fn new(index: &'a CatalogueIndex, registry: &'a SchemaRegistry) -> Self {
        UnitExtractor {
            index,
            registry,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replace the default nesting bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Extract the unit with the given display name.
    ///
    /// The name must match exactly one top-level entry: no match fails with
    /// [`Error::UnitNotFound`] listing the units the catalogue does contain,
    /// several matches fail with [`Error::AmbiguousUnit`] listing every
    /// matching identifier rather than silently picking one.
    pub fn extract(&self, unit_name: &str) -> Result<Extraction> {
        let matches = self.index.find_by_name(unit_name);
        if matches.is_empty() {
            return Err(Error::UnitNotFound {
                name: unit_name.to_string(),
                available: self.index.unit_names(),
            });
        }
        if matches.len() > 1 {
            return Err(Error::AmbiguousUnit {
                name: unit_name.to_string(),
                ids: matches,
            });
        }

        let entry = self
            .index
            .lookup_entry(&matches[0])
            .ok_or_else(|| Error::UnresolvedLink {
                target: matches[0].clone(),
                chain: Vec::new(),
            })?;

        let mut walk = resolve::Walk::new(self.index, self.registry, self.max_depth);
        let unit = walk.materialize(entry, None)?;
        let used = walk.into_used_schemas();
        assemble(unit, &used, self.registry)
    }
}

/// Package a materialized unit tree with the schema definitions it uses.
///
/// Every identifier in `used_schema_ids` must be registered; a usage
/// referencing an unregistered schema is a referential-integrity defect in
/// the source data and fails the whole query.
pub fn assemble(
    unit: Entry,
    used_schema_ids: &BTreeSet<String>,
    registry: &SchemaRegistry,
) -> Result<Extraction> {
    let mut schemas = BTreeMap::new();
    for id in used_schema_ids {
        let def = registry
            .lookup_schema(id)
            .ok_or_else(|| Error::SchemaNotFound(id.clone()))?;
        schemas.insert(id.clone(), def.clone());
    }
    Ok(Extraction { unit, schemas })
}
