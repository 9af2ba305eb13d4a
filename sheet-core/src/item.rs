//! Item and weapon records.

use crate::dice::{BaseDamage, Dice, DieSize};
use crate::error::RecordError;
use crate::runes::RuneState;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Unique identifier for items. Rune snapshots keep the id of the item
/// they were derived from so callers can commit them in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Deserialize an explicit `null` as the field's default, the same as a
/// missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_single<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_else(single))
}

/// Item kind. Record values are matched without regard to case; anything
/// unrecognized is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum ItemType {
    Weapon,
    Armor,
    Shield,
    Rune,
    Consumable,
    #[default]
    Other,
}

impl From<String> for ItemType {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "weapon" => ItemType::Weapon,
            "armor" | "armour" => ItemType::Armor,
            "shield" => ItemType::Shield,
            "rune" => ItemType::Rune,
            "consumable" => ItemType::Consumable,
            _ => ItemType::Other,
        }
    }
}

impl ItemType {
    pub fn name(&self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Shield => "shield",
            ItemType::Rune => "rune",
            ItemType::Consumable => "consumable",
            ItemType::Other => "other",
        }
    }
}

/// Weapon groups that are always fired at range.
const RANGED_GROUPS: &[&str] = &["bow", "crossbow", "firearm", "sling"];

/// Trait tags, compared without regard to case.
///
/// Tags are normalized to lower case with parameters hyphenated, so
/// `"Deadly d8"`, `"deadly-d8"` and `"DEADLY-D8"` are the same trait.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TraitSet(BTreeSet<String>);

impl TraitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: &str) {
        let normalized = normalize_trait(tag);
        if !normalized.is_empty() {
            self.0.insert(normalized);
        }
    }

    /// True if the trait is present, with or without a parameter:
    /// `has("thrown")` matches both `thrown` and `thrown-20`.
    pub fn has(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// The parameter of a trait such as `deadly-d8` (`Some("d8")`).
    /// A bare trait yields an empty parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        let name = normalize_trait(name);
        self.0.iter().find_map(|tag| {
            if *tag == name {
                Some("")
            } else {
                tag.strip_prefix(name.as_str())
                    .and_then(|rest| rest.strip_prefix('-'))
            }
        })
    }

    /// Die-sized parameter of a trait, e.g. `fatal-d10` gives `D10`.
    pub fn die_param(&self, name: &str) -> Option<DieSize> {
        let param = self.param(name)?;
        let sides = param.trim_start_matches('d').parse().ok()?;
        DieSize::from_sides(sides)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn normalize_trait(tag: &str) -> String {
    tag.split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

impl From<Vec<String>> for TraitSet {
    fn from(tags: Vec<String>) -> Self {
        let mut set = TraitSet::new();
        for tag in &tags {
            set.insert(tag);
        }
        set
    }
}

impl From<TraitSet> for Vec<String> {
    fn from(set: TraitSet) -> Self {
        set.0.into_iter().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for TraitSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = TraitSet::new();
        for tag in iter {
            set.insert(tag.as_ref());
        }
        set
    }
}

fn one_die() -> u32 {
    1
}

/// Ongoing damage dealt at the end of each turn, e.g. `1d6` persistent acid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistentDamage {
    #[serde(default = "one_die")]
    pub dice: u32,
    pub die: DieSize,
    #[serde(rename = "type", alias = "damage_type")]
    pub damage_type: String,
}

impl PersistentDamage {
    pub fn new(dice: u32, die: DieSize, damage_type: impl Into<String>) -> Self {
        Self {
            dice,
            die,
            damage_type: damage_type.into(),
        }
    }

    pub fn as_dice(&self) -> Dice {
        Dice::new(self.dice, self.die)
    }
}

fn single() -> u32 {
    1
}

/// An inventory item. Weapons, armor and rune items share this record;
/// fields that do not apply to a kind of item stay at their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: ItemId,
    pub name: String,
    #[serde(default = "single", deserialize_with = "null_as_single")]
    pub quantity: u32,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub item_type: ItemType,
    /// Weapon category (`simple`, `martial`, ...), armor category, or the
    /// `weapon`/`armor` tag on a rune item.
    #[serde(default)]
    pub category: Option<String>,
    /// Weapon group (`sword`, `bow`, `firearm`, ...).
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traits: TraitSet,
    #[serde(default)]
    pub damage: Option<BaseDamage>,
    #[serde(default)]
    pub damage_type: Option<String>,
    /// Range increment in feet; melee weapons have none.
    #[serde(default)]
    pub range: Option<u32>,
    #[serde(default)]
    pub splash: Option<i32>,
    #[serde(default)]
    pub persistent: Option<PersistentDamage>,
    #[serde(default)]
    pub runes: Option<RuneState>,
    /// Legacy flat item bonus from records that predate rune tracking.
    #[serde(default, deserialize_with = "null_as_default")]
    pub bonus: i32,
}

impl Item {
    pub fn new(name: impl Into<String>, item_type: ItemType) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
            quantity: 1,
            item_type,
            category: None,
            group: None,
            traits: TraitSet::new(),
            damage: None,
            damage_type: None,
            range: None,
            splash: None,
            persistent: None,
            runes: None,
            bonus: 0,
        }
    }

    pub fn weapon(
        name: impl Into<String>,
        damage: impl Into<String>,
        damage_type: impl Into<String>,
    ) -> Self {
        let mut item = Item::new(name, ItemType::Weapon);
        item.damage = Some(crate::dice::parse_damage_formula(&damage.into()));
        item.damage_type = Some(damage_type.into());
        item
    }

    pub fn armor(name: impl Into<String>, category: impl Into<String>) -> Self {
        Item::new(name, ItemType::Armor).with_category(category)
    }

    /// A rune item; `category` tags it as a `weapon` or `armor` rune.
    pub fn rune(name: impl Into<String>, category: impl Into<String>) -> Self {
        Item::new(name, ItemType::Rune).with_category(category)
    }

    /// Load an item record from JSON.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    /// A copy of this item under a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: ItemId::new(),
            ..self.clone()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_traits<S: AsRef<str>>(mut self, traits: impl IntoIterator<Item = S>) -> Self {
        for tag in traits {
            self.traits.insert(tag.as_ref());
        }
        self
    }

    pub fn with_range(mut self, feet: u32) -> Self {
        self.range = Some(feet);
        self
    }

    pub fn with_splash(mut self, value: i32) -> Self {
        self.splash = Some(value);
        self
    }

    pub fn with_persistent(mut self, persistent: PersistentDamage) -> Self {
        self.persistent = Some(persistent);
        self
    }

    pub fn with_runes(mut self, runes: RuneState) -> Self {
        self.runes = Some(runes);
        self
    }

    pub fn with_bonus(mut self, bonus: i32) -> Self {
        self.bonus = bonus;
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn is_stackable(&self) -> bool {
        matches!(self.item_type, ItemType::Rune | ItemType::Consumable)
    }

    pub fn is_ranged(&self) -> bool {
        self.range.is_some()
            || self
                .group
                .as_deref()
                .is_some_and(|g| RANGED_GROUPS.iter().any(|r| g.eq_ignore_ascii_case(r)))
    }

    pub fn is_thrown(&self) -> bool {
        self.traits.has("thrown")
    }

    pub fn is_finesse(&self) -> bool {
        self.traits.has("finesse")
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(group))
    }
}
