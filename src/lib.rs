//! # codex
//!
//! A library for extracting self-contained unit datasheets from
//! BattleScribe-style catalogue data.
//!
//! A game system source defines the shared profile schemas (ordered
//! characteristic names) and cost types; catalogue sources define a tree of
//! selectable entries that attach profiles, category tags, and costs, and
//! link to entries defined elsewhere, including in imported library
//! catalogues. [`extract_unit`] resolves one named unit into a fully
//! materialized tree with every link substituted and every referenced schema
//! attached, or fails with a typed [`Error`] naming exactly which reference
//! broke.
//!
//! ## Quick Start
//!
//! ```
//! use codex::{Sources, extract_unit};
//!
//! let system = r#"<gameSystem id="sys" name="Demo">
//!   <profileTypes>
//!     <profileType id="unit-type" name="Unit">
//!       <characteristicTypes>
//!         <characteristicType id="c1" name="Move"/>
//!         <characteristicType id="c2" name="Toughness"/>
//!       </characteristicTypes>
//!     </profileType>
//!   </profileTypes>
//! </gameSystem>"#;
//!
//! let catalogue = r#"<catalogue id="demo" name="Demo Roster">
//!   <selectionEntries>
//!     <selectionEntry id="e1" name="Intercessor" type="unit">
//!       <profiles>
//!         <profile id="p1" name="Intercessor" typeId="unit-type">
//!           <characteristics>
//!             <characteristic name="Move">6"</characteristic>
//!             <characteristic name="Toughness">4</characteristic>
//!           </characteristics>
//!         </profile>
//!       </profiles>
//!     </selectionEntry>
//!   </selectionEntries>
//! </catalogue>"#;
//!
//! let result = extract_unit(&Sources::new(system, catalogue), "Intercessor").unwrap();
//! assert_eq!(result.unit.profiles[0].characteristics[0].value, "6\"");
//! assert!(result.schemas.contains_key("unit-type"));
//! ```
//!
//! For finer control (load order, depth limits, several queries against the
//! same parsed sources) use the pieces directly: [`markup::Document::parse`],
//! [`system::SchemaRegistry`], [`catalogue::CatalogueIndex`], and
//! [`extract::UnitExtractor`].

pub mod catalogue;
pub mod error;
pub mod extract;
pub mod markup;
pub mod model;
pub mod system;

pub use catalogue::{CatalogueIndex, CatalogueImport, LinkKind, LinkReference, SourcePriority};
pub use error::{Error, Result};
pub use extract::{DEFAULT_MAX_DEPTH, Extraction, UnitExtractor, assemble};
pub use markup::Document;
pub use model::{CategoryTag, Characteristic, CostRecord, Entry, EntryKind, Profile};
pub use system::{CostDefinition, SchemaDefinition, SchemaRegistry};

/// Raw source texts for one extraction query.
///
/// Library sources are catalogues the primary one imports; they are indexed
/// after it and never override its identifiers.
#[derive(Debug, Clone)]
pub struct Sources<'a> {
    pub system: &'a str,
    pub catalogue: &'a str,
    pub libraries: Vec<&'a str>,
}

impl<'a> Sources<'a> {
    pub fn new(system: &'a str, catalogue: &'a str) -> Self {
        Sources {
            system,
            catalogue,
            libraries: Vec::new(),
        }
    }

    /// Add an imported library catalogue.
    pub fn with_library(mut self, library: &'a str) -> Self {
        self.libraries.push(library);
        self
    }
}

/// Parse the given sources and extract one named unit.
///
/// This is the one-shot form of the query: every invocation re-parses from
/// scratch. Callers issuing several queries against the same sources should
/// build a [`CatalogueIndex`] and [`SchemaRegistry`] once and reuse a
/// [`UnitExtractor`].
pub fn extract_unit(sources: &Sources<'_>, unit_name: &str) -> Result<Extraction> {
    let system = Document::parse(sources.system)?;
    let mut registry = SchemaRegistry::new();
    registry.load_system(&system);

    let mut index = CatalogueIndex::new();
    index.load_catalogue(Document::parse(sources.catalogue)?, SourcePriority::Primary);
    for library in &sources.libraries {
        index.load_catalogue(Document::parse(library)?, SourcePriority::Library);
    }

    UnitExtractor::new(&index, &registry).extract(unit_name)
}
