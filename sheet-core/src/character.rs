//! Character records consumed by the combat engine.
//!
//! These are the explicit shapes the persistence layer hands over:
//! attributes, proficiencies, feats, active conditions and inventory.
//! Every optional field has a named default at the serde boundary so the
//! rules code never has to null-check.

use crate::error::RecordError;
use crate::item::{Item, ItemId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// The six attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ability {
    Strength,
    Dexterity,
    Constitution,
    Intelligence,
    Wisdom,
    Charisma,
}

impl Ability {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Ability::Strength => "STR",
            Ability::Dexterity => "DEX",
            Ability::Constitution => "CON",
            Ability::Intelligence => "INT",
            Ability::Wisdom => "WIS",
            Ability::Charisma => "CHA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Ability::Strength => "Strength",
            Ability::Dexterity => "Dexterity",
            Ability::Constitution => "Constitution",
            Ability::Intelligence => "Intelligence",
            Ability::Wisdom => "Wisdom",
            Ability::Charisma => "Charisma",
        }
    }

    pub fn all() -> [Ability; 6] {
        [
            Ability::Strength,
            Ability::Dexterity,
            Ability::Constitution,
            Ability::Intelligence,
            Ability::Wisdom,
            Ability::Charisma,
        ]
    }

    /// Parse a full name or abbreviation, ignoring case.
    pub fn parse(s: &str) -> Option<Ability> {
        let s = s.trim();
        Ability::all()
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s) || a.abbreviation().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Attribute modifiers (already modifiers, not raw scores).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeModifiers {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl AttributeModifiers {
    pub fn new(str: i32, dex: i32, con: i32, int: i32, wis: i32, cha: i32) -> Self {
        Self {
            strength: str,
            dexterity: dex,
            constitution: con,
            intelligence: int,
            wisdom: wis,
            charisma: cha,
        }
    }

    pub fn get(&self, ability: Ability) -> i32 {
        match ability {
            Ability::Strength => self.strength,
            Ability::Dexterity => self.dexterity,
            Ability::Constitution => self.constitution,
            Ability::Intelligence => self.intelligence,
            Ability::Wisdom => self.wisdom,
            Ability::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, ability: Ability, value: i32) {
        match ability {
            Ability::Strength => self.strength = value,
            Ability::Dexterity => self.dexterity = value,
            Ability::Constitution => self.constitution = value,
            Ability::Intelligence => self.intelligence = value,
            Ability::Wisdom => self.wisdom = value,
            Ability::Charisma => self.charisma = value,
        }
    }
}

// ============================================================================
// Proficiency
// ============================================================================

/// Proficiency rank, stored on the sheet as its numeric bonus (0/2/4/6/8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum ProficiencyRank {
    #[default]
    Untrained,
    Trained,
    Expert,
    Master,
    Legendary,
}

impl ProficiencyRank {
    pub fn bonus(&self) -> i32 {
        match self {
            ProficiencyRank::Untrained => 0,
            ProficiencyRank::Trained => 2,
            ProficiencyRank::Expert => 4,
            ProficiencyRank::Master => 6,
            ProficiencyRank::Legendary => 8,
        }
    }

    /// Map a stored proficiency value onto a rank. Values between the
    /// canonical steps round down.
    pub fn from_value(value: i32) -> Self {
        match value {
            v if v >= 8 => ProficiencyRank::Legendary,
            v if v >= 6 => ProficiencyRank::Master,
            v if v >= 4 => ProficiencyRank::Expert,
            v if v >= 2 => ProficiencyRank::Trained,
            _ => ProficiencyRank::Untrained,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProficiencyRank::Untrained => "Untrained",
            ProficiencyRank::Trained => "Trained",
            ProficiencyRank::Expert => "Expert",
            ProficiencyRank::Master => "Master",
            ProficiencyRank::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for ProficiencyRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ============================================================================
// Conditions
// ============================================================================

fn present() -> u32 {
    1
}

/// An active condition. Binary conditions leave `value` at 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionEntry {
    pub name: String,
    #[serde(default = "present", alias = "level")]
    pub value: u32,
}

impl ConditionEntry {
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A character's active conditions.
///
/// Names are case-insensitive keys. A magnitude of 0 means the condition
/// is absent, so zero entries are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<ConditionEntry>", into = "Vec<ConditionEntry>")]
pub struct Conditions(Vec<ConditionEntry>);

impl Conditions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a condition's magnitude. Setting 0 removes it.
    pub fn set(&mut self, name: &str, value: u32) {
        let existing = self
            .0
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name));

        match (existing, value) {
            (Some(index), 0) => {
                self.0.remove(index);
            }
            (Some(index), value) => self.0[index].value = value,
            (None, 0) => {}
            (None, value) => self.0.push(ConditionEntry::new(name, value)),
        }
    }

    pub fn remove(&mut self, name: &str) {
        self.set(name, 0);
    }

    /// Magnitude of a condition, 0 when absent.
    pub fn get(&self, name: &str) -> u32 {
        self.0
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.value)
            .unwrap_or(0)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name) > 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConditionEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<ConditionEntry>> for Conditions {
    fn from(entries: Vec<ConditionEntry>) -> Self {
        let mut conditions = Conditions::new();
        for entry in entries {
            // Duplicates keep the larger magnitude.
            let value = conditions.get(&entry.name).max(entry.value);
            conditions.set(&entry.name, value);
        }
        conditions
    }
}

impl From<Conditions> for Vec<ConditionEntry> {
    fn from(conditions: Conditions) -> Self {
        conditions.0
    }
}

// ============================================================================
// Feats
// ============================================================================

/// A known feat, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "FeatRepr")]
pub struct Feat {
    pub name: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FeatRepr {
    Name(String),
    Record { name: String },
}

impl From<FeatRepr> for Feat {
    fn from(repr: FeatRepr) -> Self {
        match repr {
            FeatRepr::Name(name) | FeatRepr::Record { name } => Feat { name },
        }
    }
}

/// Known feats, unique by case-insensitive name. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Feat>", into = "Vec<Feat>")]
pub struct FeatList(Vec<Feat>);

impl FeatList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a feat. Returns false if it was already known.
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has(&name) {
            return false;
        }
        self.0.push(Feat { name });
        true
    }

    pub fn has(&self, name: &str) -> bool {
        self.0.iter().any(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feat> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Feat>> for FeatList {
    fn from(feats: Vec<Feat>) -> Self {
        let mut list = FeatList::new();
        for feat in feats {
            list.add(feat.name);
        }
        list
    }
}

impl From<FeatList> for Vec<Feat> {
    fn from(list: FeatList) -> Self {
        list.0
    }
}

// ============================================================================
// Inventory
// ============================================================================

/// Character inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    pub fn find(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name))
    }

    /// Add an item to the inventory.
    /// Stackable items (runes, consumables) stack with an existing entry of
    /// the same name; everything else is added as its own entry.
    pub fn add_item(&mut self, item: Item) {
        if item.is_stackable() {
            if let Some(existing) = self
                .items
                .iter_mut()
                .find(|i| i.is_stackable() && i.name.eq_ignore_ascii_case(&item.name))
            {
                existing.quantity += item.quantity;
                return;
            }
        }
        self.items.push(item);
    }

    /// Commit a snapshot returned by the rune engine, replacing the item
    /// with the same id. Returns false if no such item is held.
    pub fn replace(&mut self, item: Item) -> bool {
        match self.items.iter_mut().find(|i| i.id == item.id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    /// Use up one unit of an item, removing the entry when none remain.
    pub fn consume(&mut self, id: ItemId) -> bool {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        if self.items[index].quantity > 1 {
            self.items[index].quantity -= 1;
        } else {
            self.items.remove(index);
        }
        true
    }
}

// ============================================================================
// Character
// ============================================================================

fn first_level() -> u32 {
    1
}

/// A player character as seen by the combat engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    #[serde(default)]
    pub id: CharacterId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "first_level")]
    pub level: u32,
    #[serde(default, alias = "abilities")]
    pub attributes: AttributeModifiers,
    /// Proficiency group (skill, save, weapon group or category) to value.
    #[serde(default)]
    pub proficiencies: HashMap<String, i32>,
    #[serde(default)]
    pub feats: FeatList,
    #[serde(default)]
    pub conditions: Conditions,
    #[serde(default)]
    pub inventory: Inventory,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            level: 1,
            attributes: AttributeModifiers::default(),
            proficiencies: HashMap::new(),
            feats: FeatList::new(),
            conditions: Conditions::new(),
            inventory: Inventory::default(),
        }
    }

    /// Load a character record from JSON.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = level;
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeModifiers) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_proficiency(mut self, key: impl Into<String>, value: i32) -> Self {
        self.proficiencies.insert(key.into(), value);
        self
    }

    pub fn with_feat(mut self, name: impl Into<String>) -> Self {
        self.feats.add(name);
        self
    }

    pub fn with_condition(mut self, name: &str, value: u32) -> Self {
        self.conditions.set(name, value);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.inventory.add_item(item);
        self
    }

    pub fn attribute(&self, ability: Ability) -> i32 {
        self.attributes.get(ability)
    }

    /// Proficiency value for a key, ignoring case. Unknown keys are 0.
    pub fn proficiency(&self, key: &str) -> i32 {
        let key = key.trim();
        if key.is_empty() {
            return 0;
        }
        self.proficiencies
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| *v)
            .unwrap_or(0)
    }
}

impl Default for Character {
    fn default() -> Self {
        Self::new("")
    }
}

/// A level 5 rogue wielding finesse weapons, for tests and examples.
pub fn create_sample_rogue(name: &str) -> Character {
    Character::new(name)
        .with_level(5)
        .with_attributes(AttributeModifiers::new(0, 4, 1, 2, 1, 1))
        .with_proficiency("simple", 4)
        .with_proficiency("martial", 2)
        .with_proficiency("Acrobatics", 4)
        .with_proficiency("Stealth", 4)
        .with_proficiency("Thievery", 4)
        .with_proficiency("Perception", 4)
        .with_proficiency("Reflex", 4)
        .with_proficiency("Fortitude", 2)
        .with_proficiency("Will", 4)
        .with_feat("Sneak Attack")
}

/// A level 7 fighter with expert martial weapons and Weapon Specialization.
pub fn create_sample_fighter(name: &str) -> Character {
    Character::new(name)
        .with_level(7)
        .with_attributes(AttributeModifiers::new(4, 2, 2, 0, 1, 0))
        .with_proficiency("simple", 4)
        .with_proficiency("martial", 4)
        .with_proficiency("sword", 6)
        .with_proficiency("Athletics", 4)
        .with_proficiency("Perception", 4)
        .with_proficiency("Fortitude", 4)
        .with_proficiency("Reflex", 4)
        .with_proficiency("Will", 2)
        .with_feat("Weapon Specialization")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_parse() {
        assert_eq!(Ability::parse("dex"), Some(Ability::Dexterity));
        assert_eq!(Ability::parse("Strength"), Some(Ability::Strength));
        assert_eq!(Ability::parse("luck"), None);
    }

    #[test]
    fn test_rank_from_value() {
        assert_eq!(ProficiencyRank::from_value(0), ProficiencyRank::Untrained);
        assert_eq!(ProficiencyRank::from_value(2), ProficiencyRank::Trained);
        assert_eq!(ProficiencyRank::from_value(5), ProficiencyRank::Expert);
        assert_eq!(ProficiencyRank::from_value(8), ProficiencyRank::Legendary);
        assert_eq!(ProficiencyRank::Master.label(), "Master");
    }

    #[test]
    fn test_conditions_never_store_zero() {
        let mut conditions = Conditions::new();
        conditions.set("Frightened", 2);
        assert_eq!(conditions.get("frightened"), 2);

        conditions.set("FRIGHTENED", 0);
        assert!(conditions.is_empty());

        conditions.set("Clumsy", 0);
        assert!(conditions.is_empty());
    }

    #[test]
    fn test_conditions_from_json_drop_zero_and_merge() {
        let json = r#"[
            {"name": "frightened", "value": 1},
            {"name": "Frightened", "level": 3},
            {"name": "clumsy", "value": 0},
            {"name": "off-guard"}
        ]"#;
        let conditions: Conditions = serde_json::from_str(json).unwrap();
        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions.get("frightened"), 3);
        assert!(!conditions.has("clumsy"));
        assert_eq!(conditions.get("Off-Guard"), 1);
    }

    #[test]
    fn test_feats_unique_by_name() {
        let json = r#"["Sneak Attack", {"name": "sneak attack"}, "Weapon Specialization"]"#;
        let feats: FeatList = serde_json::from_str(json).unwrap();
        assert_eq!(feats.len(), 2);
        assert!(feats.has("SNEAK ATTACK"));
    }

    #[test]
    fn test_proficiency_lookup() {
        let rogue = create_sample_rogue("Vex");
        assert_eq!(rogue.proficiency("Simple"), 4);
        assert_eq!(rogue.proficiency("firearm"), 0);
        assert_eq!(rogue.proficiency(""), 0);
    }

    #[test]
    fn test_character_from_json_defaults() {
        let character = Character::from_json(r#"{"name": "Ezren"}"#).unwrap();
        assert_eq!(character.level, 1);
        assert_eq!(character.attribute(Ability::Strength), 0);
        assert!(character.conditions.is_empty());
        assert!(character.inventory.items.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(matches!(
            Character::from_json("{\"level\": \"high\"}"),
            Err(RecordError::Json(_))
        ));
    }
}
