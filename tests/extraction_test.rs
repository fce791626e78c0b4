//! End-to-end extraction tests against in-memory sources.
//!
//! The fixture models a small game system and a catalogue with one character
//! unit whose wargear is reached through entry links into shared entries.

use codex::{EntryKind, Sources, extract_unit};

const SYSTEM: &str = r#"<gameSystem id="sys-40k" name="Warhammer 40,000">
  <profileTypes>
    <profileType id="unit-type" name="Unit">
      <characteristicTypes>
        <characteristicType id="u1" name="Move"/>
        <characteristicType id="u2" name="Toughness"/>
        <characteristicType id="u3" name="Save"/>
        <characteristicType id="u4" name="Wounds"/>
        <characteristicType id="u5" name="Leadership"/>
        <characteristicType id="u6" name="Objective Control"/>
      </characteristicTypes>
    </profileType>
    <profileType id="ability-type" name="Abilities">
      <characteristicTypes>
        <characteristicType id="a1" name="Description"/>
      </characteristicTypes>
    </profileType>
    <profileType id="melee-type" name="Melee Weapons">
      <characteristicTypes>
        <characteristicType id="m1" name="Range"/>
        <characteristicType id="m2" name="A"/>
        <characteristicType id="m3" name="WS"/>
        <characteristicType id="m4" name="S"/>
        <characteristicType id="m5" name="AP"/>
        <characteristicType id="m6" name="D"/>
      </characteristicTypes>
    </profileType>
    <profileType id="ranged-type" name="Ranged Weapons">
      <characteristicTypes>
        <characteristicType id="r1" name="Range"/>
        <characteristicType id="r2" name="A"/>
        <characteristicType id="r3" name="BS"/>
        <characteristicType id="r4" name="S"/>
        <characteristicType id="r5" name="AP"/>
        <characteristicType id="r6" name="D"/>
      </characteristicTypes>
    </profileType>
    <profileType id="transport-type" name="Transport">
      <characteristicTypes>
        <characteristicType id="t1" name="Capacity"/>
      </characteristicTypes>
    </profileType>
  </profileTypes>
  <costTypes>
    <costType id="points" name="pts" defaultCostLimit="2000"/>
  </costTypes>
</gameSystem>"#;

const CATALOGUE: &str = r#"<catalogue id="cat-csm" name="Chaos Space Marines">
  <selectionEntries>
    <selectionEntry id="abaddon" name="Abaddon the Despoiler" type="unit">
      <profiles>
        <profile id="abaddon-unit" name="Abaddon the Despoiler" typeId="unit-type">
          <characteristics>
            <characteristic name="Move">6"</characteristic>
            <characteristic name="Toughness">6</characteristic>
            <characteristic name="Save">2+</characteristic>
            <characteristic name="Wounds">6</characteristic>
            <characteristic name="Leadership">6</characteristic>
            <characteristic name="Objective Control">2</characteristic>
          </characteristics>
        </profile>
        <profile id="abaddon-dtfe" name="Dark Destiny" typeId="ability-type">
          <characteristics>
            <characteristic name="Description">Halve the damage of attacks that target this model.</characteristic>
          </characteristics>
        </profile>
        <profile id="abaddon-mark" name="Mark of Chaos Ascendant" typeId="ability-type">
          <characteristics>
            <characteristic name="Description">While this model is leading a unit, add 1 to hit rolls.</characteristic>
          </characteristics>
        </profile>
        <profile id="abaddon-warmaster" name="Warmaster" typeId="ability-type">
          <characteristics>
            <characteristic name="Description">This model can be attached to any Legionaries unit.</characteristic>
          </characteristics>
        </profile>
      </profiles>
      <categoryLinks>
        <categoryLink id="abaddon-epic" targetId="cat-epic-hero" name="Epic Hero" primary="true"/>
        <categoryLink id="abaddon-char" targetId="cat-character" name="Character"/>
      </categoryLinks>
      <costs>
        <cost typeId="points" value="165"/>
      </costs>
      <entryLinks>
        <entryLink id="link-talon" targetId="talon-of-horus"/>
        <entryLink id="link-drachnyen" targetId="drachnyen"/>
      </entryLinks>
    </selectionEntry>
  </selectionEntries>
  <sharedSelectionEntries>
    <selectionEntry id="talon-of-horus" name="Talon of Horus" type="upgrade">
      <profiles>
        <profile id="talon-ranged" name="Talon of Horus" typeId="ranged-type">
          <characteristics>
            <characteristic name="Range">24"</characteristic>
            <characteristic name="A">3</characteristic>
            <characteristic name="BS">2+</characteristic>
            <characteristic name="S">5</characteristic>
            <characteristic name="AP">-1</characteristic>
            <characteristic name="D">2</characteristic>
          </characteristics>
        </profile>
      </profiles>
    </selectionEntry>
    <selectionEntry id="drachnyen" name="Drachnyen" type="upgrade">
      <profiles>
        <profile id="drachnyen-melee" name="Drachnyen" typeId="melee-type">
          <characteristics>
            <characteristic name="Range">Melee</characteristic>
            <characteristic name="A">7</characteristic>
            <characteristic name="WS">2+</characteristic>
            <characteristic name="S">14</characteristic>
            <characteristic name="AP">-4</characteristic>
            <characteristic name="D">4</characteristic>
          </characteristics>
        </profile>
      </profiles>
    </selectionEntry>
  </sharedSelectionEntries>
</catalogue>"#;

#[test]
fn test_extract_full_datasheet() {
    let result = extract_unit(&Sources::new(SYSTEM, CATALOGUE), "Abaddon the Despoiler").unwrap();
    let unit = &result.unit;

    assert_eq!(unit.id, "abaddon");
    assert_eq!(unit.kind, EntryKind::Unit);

    // Exactly one Unit profile, with its six values in schema order.
    let unit_profiles: Vec<_> = unit
        .profiles
        .iter()
        .filter(|p| p.type_id == "unit-type")
        .collect();
    assert_eq!(unit_profiles.len(), 1);
    let values: Vec<&str> = unit_profiles[0]
        .characteristics
        .iter()
        .map(|c| c.value.as_str())
        .collect();
    assert_eq!(values, ["6\"", "6", "2+", "6", "6", "2"]);
    let names: Vec<&str> = unit_profiles[0]
        .characteristics
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(
        names,
        ["Move", "Toughness", "Save", "Wounds", "Leadership", "Objective Control"]
    );

    // Three ability profiles inlined alongside it.
    let abilities: Vec<_> = unit
        .profiles
        .iter()
        .filter(|p| p.type_id == "ability-type")
        .collect();
    assert_eq!(abilities.len(), 3);
    assert_eq!(abilities[0].type_name, "Abilities");

    // Both weapon subtrees fully substituted at the link positions.
    assert_eq!(unit.children.len(), 2);
    assert_eq!(unit.children[0].name, "Talon of Horus");
    assert_eq!(unit.children[1].name, "Drachnyen");
    assert_eq!(unit.children[0].kind, EntryKind::Upgrade);
    assert_eq!(unit.children[1].profiles[0].type_name, "Melee Weapons");

    // Category tags and raw costs surface as authored.
    assert_eq!(unit.categories[0].name, "Epic Hero");
    assert!(unit.categories[0].primary);
    assert!(!unit.categories[1].primary);
    assert_eq!(unit.costs[0].name, "pts");
    assert_eq!(unit.costs[0].value, 165.0);
}

#[test]
fn test_schema_closure_is_exact() {
    let result = extract_unit(&Sources::new(SYSTEM, CATALOGUE), "Abaddon the Despoiler").unwrap();

    let keys: Vec<&str> = result.schemas.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        ["ability-type", "melee-type", "ranged-type", "unit-type"]
    );
    // The registry knows transport-type, but nothing in the tree uses it.
    assert!(!result.schemas.contains_key("transport-type"));

    let unit_schema = &result.schemas["unit-type"];
    assert_eq!(unit_schema.name, "Unit");
    assert_eq!(
        unit_schema.characteristics,
        ["Move", "Toughness", "Save", "Wounds", "Leadership", "Objective Control"]
    );
}

#[test]
fn test_extraction_is_idempotent() {
    let sources = Sources::new(SYSTEM, CATALOGUE);
    let first = extract_unit(&sources, "Abaddon the Despoiler").unwrap();
    let second = extract_unit(&sources, "Abaddon the Despoiler").unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unknown_unit_lists_available_names() {
    let err = extract_unit(&Sources::new(SYSTEM, CATALOGUE), "Roboute Guilliman").unwrap_err();
    match err {
        codex::Error::UnitNotFound { name, available } => {
            assert_eq!(name, "Roboute Guilliman");
            assert_eq!(available, ["Abaddon the Despoiler"]);
        }
        other => panic!("expected UnitNotFound, got {other}"),
    }
}

#[test]
fn test_lookup_is_case_sensitive() {
    let err = extract_unit(&Sources::new(SYSTEM, CATALOGUE), "abaddon the despoiler").unwrap_err();
    assert!(matches!(err, codex::Error::UnitNotFound { .. }));
}

#[test]
fn test_ambiguous_name_reports_both_ids() {
    let catalogue = r#"<catalogue id="cat" name="Test">
      <selectionEntries>
        <selectionEntry id="sgt-a" name="Marine Sergeant" type="unit"/>
        <selectionEntry id="sgt-b" name="Marine Sergeant" type="unit"/>
      </selectionEntries>
    </catalogue>"#;

    let err = extract_unit(&Sources::new(SYSTEM, catalogue), "Marine Sergeant").unwrap_err();
    match err {
        codex::Error::AmbiguousUnit { name, ids } => {
            assert_eq!(name, "Marine Sergeant");
            assert_eq!(ids, ["sgt-a", "sgt-b"]);
        }
        other => panic!("expected AmbiguousUnit, got {other}"),
    }
}
