//! Rune engine: reading an item's enchantment state and etching or
//! removing runes.
//!
//! Apply and remove are copy-on-write. They never touch the item they are
//! given; each returns a new snapshot that the caller may commit to the
//! inventory (see [`Inventory::replace`](crate::character::Inventory::replace)).
//! Validation failures come back as an error string alongside the
//! unchanged item.
//!
//! Items without a native rune record fall back to parsing the display
//! name ("+1 Striking Flaming Longsword"). That parsing lives in
//! [`rune_state_with`] and nowhere else.

use crate::dice::{Dice, DieSize};
use crate::engine::{default_config, EngineConfig};
use crate::error::RuneError;
use crate::item::{null_as_default, Item, ItemType};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

pub const MAX_RANK: u8 = 3;

// ============================================================================
// Rune state
// ============================================================================

/// Striking rune rank; controls the weapon's damage dice count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "StrikingRepr", into = "u8")]
pub enum StrikingRank {
    #[default]
    None,
    Striking,
    Greater,
    Major,
}

impl StrikingRank {
    pub fn rank(&self) -> u8 {
        match self {
            StrikingRank::None => 0,
            StrikingRank::Striking => 1,
            StrikingRank::Greater => 2,
            StrikingRank::Major => 3,
        }
    }

    /// Ranks above major clamp to major.
    pub fn from_rank(rank: u8) -> Self {
        match rank {
            0 => StrikingRank::None,
            1 => StrikingRank::Striking,
            2 => StrikingRank::Greater,
            _ => StrikingRank::Major,
        }
    }

    /// Minimum number of weapon damage dice at this rank.
    pub fn dice_multiplier(&self) -> u32 {
        1 + self.rank() as u32
    }

    pub fn label(&self) -> Option<&'static str> {
        match self {
            StrikingRank::None => None,
            StrikingRank::Striking => Some("Striking"),
            StrikingRank::Greater => Some("Greater Striking"),
            StrikingRank::Major => Some("Major Striking"),
        }
    }
}

impl From<StrikingRank> for u8 {
    fn from(rank: StrikingRank) -> u8 {
        rank.rank()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrikingRepr {
    Rank(u8),
    Name(String),
}

impl From<StrikingRepr> for StrikingRank {
    fn from(repr: StrikingRepr) -> Self {
        match repr {
            StrikingRepr::Rank(rank) => StrikingRank::from_rank(rank),
            StrikingRepr::Name(name) => {
                StrikingRank::from_rank(named_rank(&STRIKING_RE, &name).unwrap_or(0))
            }
        }
    }
}

/// An item's enchantment state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuneState {
    /// Fundamental potency rank, 0 to 3.
    #[serde(deserialize_with = "null_as_default")]
    pub potency: u8,
    #[serde(deserialize_with = "null_as_default")]
    pub striking: StrikingRank,
    /// Armor-only analog of potency for saving throws, 0 to 3.
    #[serde(deserialize_with = "null_as_default")]
    pub resilient: u8,
    /// Property rune names in the order they were etched.
    #[serde(deserialize_with = "null_as_default")]
    pub property: Vec<String>,
}

impl RuneState {
    pub fn has_property(&self, name: &str) -> bool {
        self.property.iter().any(|p| p.eq_ignore_ascii_case(name.trim()))
    }

    pub fn free_property_slots(&self) -> usize {
        (self.potency as usize).saturating_sub(self.property.len())
    }

    fn normalized(&self) -> Self {
        let mut property: Vec<String> = Vec::with_capacity(self.property.len());
        for name in &self.property {
            let name = name.trim();
            if !name.is_empty() && !property.iter().any(|p| p.eq_ignore_ascii_case(name)) {
                property.push(name.to_string());
            }
        }
        Self {
            potency: self.potency.min(MAX_RANK),
            striking: self.striking,
            resilient: self.resilient.min(MAX_RANK),
            property,
        }
    }
}

// ============================================================================
// Families, targets and the property rune table
// ============================================================================

/// What a rune can be etched onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuneTarget {
    Weapon,
    Armor,
}

impl RuneTarget {
    pub fn name(&self) -> &'static str {
        match self {
            RuneTarget::Weapon => "weapon",
            RuneTarget::Armor => "armor",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            RuneTarget::Weapon => "Weapon",
            RuneTarget::Armor => "Armor",
        }
    }
}

impl fmt::Display for RuneTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuneFamily {
    Potency,
    Striking,
    Resilient,
    Property,
}

impl RuneFamily {
    pub fn name(&self) -> &'static str {
        match self {
            RuneFamily::Potency => "potency",
            RuneFamily::Striking => "striking",
            RuneFamily::Resilient => "resilient",
            RuneFamily::Property => "property",
        }
    }
}

impl fmt::Display for RuneFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for RuneFamily {
    type Err = RuneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            RuneFamily::Potency,
            RuneFamily::Striking,
            RuneFamily::Resilient,
            RuneFamily::Property,
        ]
        .into_iter()
        .find(|f| f.name().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| RuneError::UnrecognizedRune {
            name: s.to_string(),
        })
    }
}

/// Damage a property rune adds to each hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuneDamage {
    pub dice: Dice,
    pub damage_type: String,
}

impl RuneDamage {
    fn new(count: u32, die: DieSize, damage_type: &str) -> Self {
        Self {
            dice: Dice::new(count, die),
            damage_type: damage_type.to_string(),
        }
    }
}

/// A property rune the engine knows about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRuneDef {
    pub name: String,
    pub target: RuneTarget,
    #[serde(default)]
    pub damage: Option<RuneDamage>,
    /// Persistent damage added only on a critical hit, outside the doubling.
    #[serde(default)]
    pub critical: Option<RuneDamage>,
}

impl PropertyRuneDef {
    pub fn new(name: impl Into<String>, target: RuneTarget) -> Self {
        Self {
            name: name.into(),
            target,
            damage: None,
            critical: None,
        }
    }

    pub fn with_damage(mut self, count: u32, die: DieSize, damage_type: &str) -> Self {
        self.damage = Some(RuneDamage::new(count, die, damage_type));
        self
    }

    pub fn with_critical(mut self, count: u32, die: DieSize, damage_type: &str) -> Self {
        self.critical = Some(RuneDamage::new(count, die, damage_type));
        self
    }
}

lazy_static! {
    /// Built-in property runes.
    pub static ref PROPERTY_RUNES: Vec<PropertyRuneDef> = vec![
        PropertyRuneDef::new("Flaming", RuneTarget::Weapon)
            .with_damage(1, DieSize::D6, "fire")
            .with_critical(1, DieSize::D10, "fire"),
        PropertyRuneDef::new("Frost", RuneTarget::Weapon).with_damage(1, DieSize::D6, "cold"),
        PropertyRuneDef::new("Shock", RuneTarget::Weapon).with_damage(1, DieSize::D6, "electricity"),
        PropertyRuneDef::new("Corrosive", RuneTarget::Weapon).with_damage(1, DieSize::D6, "acid"),
        PropertyRuneDef::new("Thundering", RuneTarget::Weapon).with_damage(1, DieSize::D6, "sonic"),
        PropertyRuneDef::new("Holy", RuneTarget::Weapon).with_damage(1, DieSize::D4, "spirit"),
        PropertyRuneDef::new("Unholy", RuneTarget::Weapon).with_damage(1, DieSize::D4, "spirit"),
        PropertyRuneDef::new("Ghost Touch", RuneTarget::Weapon),
        PropertyRuneDef::new("Returning", RuneTarget::Weapon),
        PropertyRuneDef::new("Shifting", RuneTarget::Weapon),
        PropertyRuneDef::new("Keen", RuneTarget::Weapon),
        PropertyRuneDef::new("Vorpal", RuneTarget::Weapon),
        PropertyRuneDef::new("Wounding", RuneTarget::Weapon),
        PropertyRuneDef::new("Fearsome", RuneTarget::Weapon),
        PropertyRuneDef::new("Disrupting", RuneTarget::Weapon),
        PropertyRuneDef::new("Energy-Resistant", RuneTarget::Armor),
        PropertyRuneDef::new("Fortification", RuneTarget::Armor),
        PropertyRuneDef::new("Glamered", RuneTarget::Armor),
        PropertyRuneDef::new("Slick", RuneTarget::Armor),
        PropertyRuneDef::new("Shadow", RuneTarget::Armor),
        PropertyRuneDef::new("Invisibility", RuneTarget::Armor),
    ];

    static ref POTENCY_RE: Regex = Regex::new(r"\+\s*(\d+)").unwrap();
    static ref STRIKING_RE: Regex = Regex::new(r"(?i)\b(?:(greater|major)\s+)?striking\b").unwrap();
    static ref RESILIENT_RE: Regex = Regex::new(r"(?i)\b(?:(greater|major)\s+)?resilient\b").unwrap();
    static ref RUNE_SUFFIX_RE: Regex = Regex::new(r"(?i)\s*\([^)]*\)|\brune\b").unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// Find a property rune definition by name among the built-ins and any
/// configured extras.
pub fn find_property_rune<'a>(
    name: &str,
    extras: &'a [PropertyRuneDef],
) -> Option<&'a PropertyRuneDef> {
    let name = name.trim();
    extras
        .iter()
        .chain(PROPERTY_RUNES.iter())
        .find(|def| def.name.eq_ignore_ascii_case(name))
}

/// Rank named by a striking/resilient pattern match: plain 1, greater 2,
/// major 3.
fn named_rank(pattern: &Regex, text: &str) -> Option<u8> {
    let captures = pattern.captures(text)?;
    Some(match captures.get(1).map(|m| m.as_str().to_lowercase()).as_deref() {
        Some("major") => 3,
        Some("greater") => 2,
        _ => 1,
    })
}

fn potency_in(text: &str) -> Option<u8> {
    POTENCY_RE
        .captures(text)
        .and_then(|c| c[1].parse::<u8>().ok())
        .map(|rank| rank.min(MAX_RANK))
}

/// True if `phrase` occurs in `text` as whole words, ignoring case.
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let text = text.to_lowercase();
    let phrase = phrase.to_lowercase();
    text.match_indices(&phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

// ============================================================================
// Parsing
// ============================================================================

/// Read an item's rune state using the default configuration.
pub fn parse_rune_state(item: &Item) -> RuneState {
    rune_state_with(item, default_config())
}

/// The single normalization point for rune state: the native record when
/// present, otherwise (if enabled) whatever the display name implies.
pub fn rune_state_with(item: &Item, config: &EngineConfig) -> RuneState {
    if let Some(runes) = &item.runes {
        return runes.normalized();
    }
    if !config.legacy_name_parsing {
        return RuneState::default();
    }

    let state = runes_from_name(&item.name, &config.extra_property_runes);
    trace!(item = %item.name, ?state, "parsed rune state from item name");
    state
}

fn runes_from_name(name: &str, extras: &[PropertyRuneDef]) -> RuneState {
    let property = extras
        .iter()
        .chain(PROPERTY_RUNES.iter())
        .filter(|def| contains_phrase(name, &def.name))
        .map(|def| def.name.clone())
        .collect();

    RuneState {
        potency: potency_in(name).unwrap_or(0),
        striking: StrikingRank::from_rank(named_rank(&STRIKING_RE, name).unwrap_or(0)),
        resilient: named_rank(&RESILIENT_RE, name).unwrap_or(0),
        property,
    }
    .normalized()
}

/// Whether an item takes weapon or armor runes, judged from its type and
/// category. `None` when neither fits.
pub fn classify_target(item: &Item) -> Option<RuneTarget> {
    match item.item_type {
        ItemType::Weapon => Some(RuneTarget::Weapon),
        ItemType::Armor => Some(RuneTarget::Armor),
        ItemType::Other => {
            let category = item.category.as_deref().unwrap_or_default().to_lowercase();
            if category.contains("armor") {
                Some(RuneTarget::Armor)
            } else if category.contains("weapon") || item.damage.is_some() {
                Some(RuneTarget::Weapon)
            } else {
                None
            }
        }
        ItemType::Shield | ItemType::Rune | ItemType::Consumable => None,
    }
}

/// What a rune item turns out to be.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RuneKind {
    Potency {
        target: Option<RuneTarget>,
        rank: u8,
    },
    Striking(StrikingRank),
    Resilient(u8),
    Property {
        name: String,
        target: Option<RuneTarget>,
    },
}

fn classify_rune(rune: &Item, extras: &[PropertyRuneDef]) -> Result<RuneKind, RuneError> {
    let name = rune.name.trim();
    let lower = name.to_lowercase();
    let category = rune.category.as_deref().unwrap_or_default().to_lowercase();

    let hint = if lower.contains("armor") || category.contains("armor") {
        Some(RuneTarget::Armor)
    } else if lower.contains("weapon") || category.contains("weapon") {
        Some(RuneTarget::Weapon)
    } else {
        None
    };

    if lower.contains("potency") {
        let rank = potency_in(name).unwrap_or(1).max(1);
        return Ok(RuneKind::Potency { target: hint, rank });
    }
    if let Some(rank) = named_rank(&STRIKING_RE, name) {
        return Ok(RuneKind::Striking(StrikingRank::from_rank(rank)));
    }
    if let Some(rank) = named_rank(&RESILIENT_RE, name) {
        return Ok(RuneKind::Resilient(rank));
    }

    let stripped = RUNE_SUFFIX_RE.replace_all(name, " ");
    let stripped = SPACE_RE.replace_all(stripped.trim(), " ").into_owned();
    if stripped.is_empty() {
        return Err(RuneError::UnrecognizedRune {
            name: rune.name.clone(),
        });
    }

    Ok(match find_property_rune(&stripped, extras) {
        Some(def) => RuneKind::Property {
            name: def.name.clone(),
            target: Some(def.target),
        },
        None => RuneKind::Property {
            name: stripped,
            target: hint,
        },
    })
}

// ============================================================================
// Applying
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Treat the item as this kind instead of inferring it.
    pub target: Option<RuneTarget>,
}

impl ApplyOptions {
    pub fn as_target(target: RuneTarget) -> Self {
        Self {
            target: Some(target),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyOutcome {
    pub new_item: Item,
    /// True when the rune item should be taken out of the inventory.
    pub consumed: bool,
    pub error: Option<String>,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        self.error.is_none()
    }
}

/// Etch a rune onto an item using the default configuration.
pub fn apply_rune(item: &Item, rune: &Item, options: ApplyOptions) -> ApplyOutcome {
    apply_rune_with(item, rune, options, default_config())
}

pub fn apply_rune_with(
    item: &Item,
    rune: &Item,
    options: ApplyOptions,
    config: &EngineConfig,
) -> ApplyOutcome {
    match try_apply_rune(item, rune, options, config) {
        Ok(new_item) => {
            debug!(item = %item.name, rune = %rune.name, result = %new_item.name, "rune applied");
            ApplyOutcome {
                new_item,
                consumed: true,
                error: None,
            }
        }
        Err(err) => {
            debug!(item = %item.name, rune = %rune.name, error = %err, "rune rejected");
            ApplyOutcome {
                new_item: item.clone(),
                consumed: false,
                error: Some(err.to_string()),
            }
        }
    }
}

fn try_apply_rune(
    item: &Item,
    rune: &Item,
    options: ApplyOptions,
    config: &EngineConfig,
) -> Result<Item, RuneError> {
    let target = options
        .target
        .or_else(|| classify_target(item))
        .ok_or_else(|| RuneError::UnknownTarget {
            item: item.name.clone(),
        })?;
    let kind = classify_rune(rune, &config.extra_property_runes)?;

    let rune_target = match &kind {
        RuneKind::Potency { target, .. } | RuneKind::Property { target, .. } => *target,
        RuneKind::Striking(_) => Some(RuneTarget::Weapon),
        RuneKind::Resilient(_) => Some(RuneTarget::Armor),
    };
    if let Some(rune_target) = rune_target {
        if rune_target != target {
            return Err(RuneError::IncompatibleTarget {
                rune: rune.name.clone(),
                rune_target,
                item: item.name.clone(),
                item_target: target,
            });
        }
    }

    let mut state = rune_state_with(item, config);
    let not_an_upgrade = |family, current, requested| RuneError::NotAnUpgrade {
        item: item.name.clone(),
        family,
        current,
        requested,
    };

    match kind {
        RuneKind::Potency { rank, .. } => {
            if rank <= state.potency {
                return Err(not_an_upgrade(RuneFamily::Potency, state.potency, rank));
            }
            state.potency = rank;
        }
        RuneKind::Striking(rank) => {
            if rank <= state.striking {
                return Err(not_an_upgrade(
                    RuneFamily::Striking,
                    state.striking.rank(),
                    rank.rank(),
                ));
            }
            state.striking = rank;
        }
        RuneKind::Resilient(rank) => {
            if rank <= state.resilient {
                return Err(not_an_upgrade(RuneFamily::Resilient, state.resilient, rank));
            }
            state.resilient = rank;
        }
        RuneKind::Property { name, .. } => {
            if state.property.len() >= state.potency as usize {
                return Err(RuneError::PropertySlotsFull {
                    item: item.name.clone(),
                    potency: state.potency,
                    count: state.property.len(),
                });
            }
            if state.has_property(&name) {
                return Err(RuneError::DuplicateProperty {
                    item: item.name.clone(),
                    name,
                });
            }
            state.property.push(name);
        }
    }

    let mut new_item = item.clone();
    new_item.name = rebuild_name(&item.name, &state);
    new_item.runes = Some(state);
    Ok(new_item)
}

// ============================================================================
// Removing
// ============================================================================

/// A rune taken off an item, described well enough to put back into the
/// inventory as a rune item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecoveredRune {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub category: RuneTarget,
}

impl RecoveredRune {
    fn new(name: impl Into<String>, category: RuneTarget) -> Self {
        Self {
            name: name.into(),
            item_type: ItemType::Rune,
            category,
        }
    }

    pub fn into_item(self) -> Item {
        Item::rune(self.name, self.category.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoveOutcome {
    pub new_item: Item,
    pub rune_recovered: Option<RecoveredRune>,
}

/// Remove a rune family (or one named property rune) using the default
/// configuration.
pub fn remove_rune(item: &Item, family: RuneFamily, property_name: Option<&str>) -> RemoveOutcome {
    remove_rune_with(item, family, property_name, default_config())
}

/// Removing a family the item does not carry is a no-op: the snapshot is
/// an unchanged copy and nothing is recovered.
///
/// Lowering potency below the number of etched property runes leaves those
/// runes in place; the slot limit is only checked when etching.
pub fn remove_rune_with(
    item: &Item,
    family: RuneFamily,
    property_name: Option<&str>,
    config: &EngineConfig,
) -> RemoveOutcome {
    let target = classify_target(item).unwrap_or(match family {
        RuneFamily::Resilient => RuneTarget::Armor,
        _ => RuneTarget::Weapon,
    });
    let mut state = rune_state_with(item, config);

    let recovered = match family {
        RuneFamily::Potency if state.potency > 0 => {
            let name = format!("+{} {} Potency", state.potency, target.title());
            state.potency = 0;
            Some(RecoveredRune::new(name, target))
        }
        RuneFamily::Striking => state.striking.label().map(|label| {
            state.striking = StrikingRank::None;
            RecoveredRune::new(label, RuneTarget::Weapon)
        }),
        RuneFamily::Resilient if state.resilient > 0 => {
            let name = resilient_label(state.resilient);
            state.resilient = 0;
            name.map(|name| RecoveredRune::new(name, RuneTarget::Armor))
        }
        RuneFamily::Property => property_name
            .and_then(|wanted| {
                state
                    .property
                    .iter()
                    .position(|p| p.eq_ignore_ascii_case(wanted.trim()))
            })
            .map(|index| {
                let name = state.property.remove(index);
                let category = find_property_rune(&name, &config.extra_property_runes)
                    .map(|def| def.target)
                    .unwrap_or(target);
                RecoveredRune::new(name, category)
            }),
        _ => None,
    };

    let Some(recovered) = recovered else {
        debug!(item = %item.name, %family, "nothing to remove");
        return RemoveOutcome {
            new_item: item.clone(),
            rune_recovered: None,
        };
    };

    debug!(item = %item.name, rune = %recovered.name, "rune removed");
    let mut new_item = item.clone();
    new_item.name = rebuild_name(&item.name, &state);
    new_item.runes = Some(state);
    RemoveOutcome {
        new_item,
        rune_recovered: Some(recovered),
    }
}

// ============================================================================
// Names
// ============================================================================

fn resilient_label(rank: u8) -> Option<&'static str> {
    match rank {
        0 => None,
        1 => Some("Resilient"),
        2 => Some("Greater Resilient"),
        _ => Some("Major Resilient"),
    }
}

/// Rebuild a display name from rune state: potency prefix, then the
/// striking and resilient labels, then the base name with any previously
/// rendered fundamental rune text stripped. Property runes are not shown.
pub fn rebuild_name(current: &str, state: &RuneState) -> String {
    let base = POTENCY_RE.replace_all(current, " ");
    let base = STRIKING_RE.replace_all(&base, " ");
    let base = RESILIENT_RE.replace_all(&base, " ");
    let base = SPACE_RE.replace_all(base.trim(), " ");

    let potency = (state.potency > 0).then(|| format!("+{}", state.potency));
    [
        potency.as_deref(),
        state.striking.label(),
        resilient_label(state.resilient),
        Some(base.as_ref()).filter(|b| !b.is_empty()),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn longsword() -> Item {
        Item::weapon("Longsword", "1d8", "slashing")
            .with_category("martial")
            .with_group("sword")
    }

    fn with_runes(item: Item, potency: u8, striking: StrikingRank, property: &[&str]) -> Item {
        item.with_runes(RuneState {
            potency,
            striking,
            resilient: 0,
            property: property.iter().map(|p| p.to_string()).collect(),
        })
    }

    #[test]
    fn test_parse_native_record() {
        let sword = with_runes(longsword(), 2, StrikingRank::Greater, &["Flaming", "flaming"]);
        let state = parse_rune_state(&sword);
        assert_eq!(state.potency, 2);
        assert_eq!(state.striking, StrikingRank::Greater);
        assert_eq!(state.property, vec!["Flaming".to_string()]);
    }

    #[test]
    fn test_parse_from_name() {
        let mut sword = longsword();
        sword.name = "+2 Greater Striking Ghost Touch Frost Longsword".to_string();
        let state = parse_rune_state(&sword);
        assert_eq!(state.potency, 2);
        assert_eq!(state.striking, StrikingRank::Greater);
        assert!(state.has_property("ghost touch"));
        assert!(state.has_property("Frost"));
        assert_eq!(state.property.len(), 2);
    }

    #[test]
    fn test_name_keywords_need_word_boundaries() {
        let mut item = longsword();
        item.name = "Frostbite Blade".to_string();
        assert!(parse_rune_state(&item).property.is_empty());
    }

    #[test]
    fn test_legacy_parsing_can_be_disabled() {
        let mut sword = longsword();
        sword.name = "+1 Striking Longsword".to_string();
        let config = EngineConfig::default().with_legacy_name_parsing(false);
        assert_eq!(rune_state_with(&sword, &config), RuneState::default());
    }

    #[test]
    fn test_striking_from_json() {
        let state: RuneState =
            serde_json::from_str(r#"{"potency": 1, "striking": "Greater Striking"}"#).unwrap();
        assert_eq!(state.striking, StrikingRank::Greater);
        let state: RuneState = serde_json::from_str(r#"{"striking": 3}"#).unwrap();
        assert_eq!(state.striking, StrikingRank::Major);
        assert!(state.property.is_empty());
    }

    #[test]
    fn test_apply_potency_upgrade() {
        let sword = with_runes(longsword(), 1, StrikingRank::None, &[]);
        let rune = Item::rune("+2 Weapon Potency", "weapon");
        let outcome = apply_rune(&sword, &rune, ApplyOptions::default());

        assert!(outcome.consumed);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.new_item.runes.as_ref().unwrap().potency, 2);
        assert_eq!(outcome.new_item.name, "+2 Longsword");
        assert_eq!(outcome.new_item.id, sword.id);
        // The original is untouched.
        assert_eq!(sword.runes.as_ref().unwrap().potency, 1);
    }

    #[test]
    fn test_apply_same_rank_is_rejected() {
        let sword = with_runes(longsword(), 2, StrikingRank::None, &[]);
        let rune = Item::rune("+2 Weapon Potency", "weapon");
        let outcome = apply_rune(&sword, &rune, ApplyOptions::default());

        assert!(!outcome.consumed);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.new_item, sword);
    }

    #[test]
    fn test_striking_downgrade_is_rejected() {
        let sword = with_runes(longsword(), 1, StrikingRank::Greater, &[]);
        let outcome = apply_rune(&sword, &Item::rune("Striking", "weapon"), ApplyOptions::default());
        assert!(!outcome.consumed);
        assert!(outcome.error.unwrap().contains("not an upgrade"));
    }

    #[test]
    fn test_weapon_rune_on_armor_is_rejected() {
        let armor = Item::armor("Leather Armor", "light");
        let outcome = apply_rune(&armor, &Item::rune("Striking", "weapon"), ApplyOptions::default());
        assert!(!outcome.consumed);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Striking can only be applied to weapon, not to Leather Armor (armor)")
        );
    }

    #[test]
    fn test_resilient_on_armor() {
        let armor = Item::armor("Leather Armor", "light");
        let outcome = apply_rune(&armor, &Item::rune("Resilient", "armor"), ApplyOptions::default());
        assert!(outcome.consumed);
        assert_eq!(outcome.new_item.name, "Resilient Leather Armor");

        let outcome = apply_rune(
            &outcome.new_item,
            &Item::rune("Greater Resilient", "armor"),
            ApplyOptions::default(),
        );
        assert_eq!(outcome.new_item.name, "Greater Resilient Leather Armor");
        assert_eq!(outcome.new_item.runes.unwrap().resilient, 2);
    }

    #[test]
    fn test_override_target() {
        let odd = Item::new("Spiked Gauntlet", ItemType::Shield);
        let rune = Item::rune("+1 Weapon Potency", "weapon");
        assert!(!apply_rune(&odd, &rune, ApplyOptions::default()).consumed);
        assert!(apply_rune(&odd, &rune, ApplyOptions::as_target(RuneTarget::Weapon)).consumed);
    }

    #[test]
    fn test_property_needs_potency() {
        let sword = longsword();
        let outcome = apply_rune(&sword, &Item::rune("Flaming", "weapon"), ApplyOptions::default());
        assert!(!outcome.consumed);
        assert!(outcome.error.unwrap().contains("no free property rune slot"));
    }

    #[test]
    fn test_property_limit_and_duplicates() {
        let sword = with_runes(longsword(), 2, StrikingRank::Striking, &["Flaming"]);

        let dup = apply_rune(&sword, &Item::rune("flaming rune", "weapon"), ApplyOptions::default());
        assert!(!dup.consumed);
        assert!(dup.error.unwrap().contains("already carries"));

        let frost = apply_rune(&sword, &Item::rune("Frost", "weapon"), ApplyOptions::default());
        assert!(frost.consumed);
        let state = frost.new_item.runes.clone().unwrap();
        assert_eq!(state.property, vec!["Flaming".to_string(), "Frost".to_string()]);
        // Property runes are not rendered in the name.
        assert_eq!(frost.new_item.name, "+2 Striking Longsword");

        let full = apply_rune(&frost.new_item, &Item::rune("Shock", "weapon"), ApplyOptions::default());
        assert!(!full.consumed);
    }

    #[test]
    fn test_armor_property_rune_on_weapon_is_rejected() {
        let sword = with_runes(longsword(), 1, StrikingRank::None, &[]);
        let outcome = apply_rune(&sword, &Item::rune("Slick", "rune"), ApplyOptions::default());
        assert!(!outcome.consumed);
    }

    #[test]
    fn test_unknown_target() {
        let rope = Item::new("Rope", ItemType::Other);
        let outcome = apply_rune(&rope, &Item::rune("Striking", "weapon"), ApplyOptions::default());
        assert_eq!(
            outcome.error.as_deref(),
            Some("Cannot tell whether Rope is a weapon or armor")
        );
    }

    #[test]
    fn test_remove_potency_recovers_rune() {
        let mut sword = with_runes(longsword(), 2, StrikingRank::Striking, &["Frost"]);
        sword.name = "+2 Striking Longsword".to_string();
        let outcome = remove_rune(&sword, RuneFamily::Potency, None);

        let recovered = outcome.rune_recovered.unwrap();
        assert_eq!(recovered.name, "+2 Weapon Potency");
        assert_eq!(recovered.category, RuneTarget::Weapon);
        assert_eq!(outcome.new_item.name, "Striking Longsword");
        // Property runes stay even though potency is now 0.
        assert_eq!(outcome.new_item.runes.unwrap().property.len(), 1);
    }

    #[test]
    fn test_remove_property_rune() {
        let sword = with_runes(longsword(), 2, StrikingRank::None, &["Flaming", "Frost"]);
        let outcome = remove_rune(&sword, RuneFamily::Property, Some("FLAMING"));
        assert_eq!(outcome.rune_recovered.unwrap().name, "Flaming");
        assert_eq!(outcome.new_item.runes.unwrap().property, vec!["Frost".to_string()]);
    }

    #[test]
    fn test_remove_absent_family_is_noop() {
        let sword = with_runes(longsword(), 1, StrikingRank::None, &[]);
        let outcome = remove_rune(&sword, RuneFamily::Striking, None);
        assert_eq!(outcome.new_item, sword);
        assert!(outcome.rune_recovered.is_none());

        let outcome = remove_rune(&sword, RuneFamily::Property, Some("Keen"));
        assert_eq!(outcome.new_item, sword);
        assert!(outcome.rune_recovered.is_none());
    }

    #[test]
    fn test_rebuild_name_is_canonical() {
        let state = RuneState {
            potency: 3,
            striking: StrikingRank::Major,
            resilient: 0,
            property: vec![],
        };
        assert_eq!(
            rebuild_name("Greater Striking +1 Rapier", &state),
            "+3 Major Striking Rapier"
        );
        assert_eq!(rebuild_name("+1 Dagger", &RuneState::default()), "Dagger");
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("Potency".parse::<RuneFamily>(), Ok(RuneFamily::Potency));
        assert!("reinforcing".parse::<RuneFamily>().is_err());
    }

    #[test]
    fn test_recovered_rune_into_item() {
        let item = RecoveredRune::new("Striking", RuneTarget::Weapon).into_item();
        assert_eq!(item.item_type, ItemType::Rune);
        assert_eq!(item.category.as_deref(), Some("weapon"));
    }
}
