//! Weapon attack bonus and the attribute a weapon adds to damage.

use crate::character::{Ability, Character, ProficiencyRank};
use crate::conditions::{resolve_condition_effects, ConditionEffects};
use crate::engine::{default_config, EngineConfig};
use crate::item::Item;
use crate::runes::rune_state_with;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::debug;

/// A character's proficiency with a particular weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeaponProficiency {
    pub score: i32,
    pub rank: ProficiencyRank,
}

/// The better of the character's proficiency in the weapon's group and in
/// its category.
pub fn weapon_proficiency(character: &Character, item: &Item) -> WeaponProficiency {
    let by_group = item
        .group
        .as_deref()
        .map(|g| character.proficiency(g))
        .unwrap_or(0);
    let by_category = item
        .category
        .as_deref()
        .map(|c| character.proficiency(c))
        .unwrap_or(0);
    let score = by_group.max(by_category).max(0);

    WeaponProficiency {
        score,
        rank: ProficiencyRank::from_value(score),
    }
}

/// Item bonus to attack rolls: potency, else the legacy flat bonus, else
/// whatever "+N" the name carries.
pub fn item_bonus(item: &Item, config: &EngineConfig) -> i32 {
    if let Some(runes) = &item.runes {
        if runes.potency > 0 {
            return runes.potency as i32;
        }
    }
    if item.bonus != 0 {
        return item.bonus;
    }
    rune_state_with(item, config).potency as i32
}

// ============================================================================
// Attribute selection
// ============================================================================

/// One attribute an attack roll could be made with, after condition
/// penalties.
#[derive(Debug, Clone)]
struct AttributeOption {
    ability: Ability,
    modifier: i32,
    penalty: ConditionEffects,
}

impl AttributeOption {
    fn evaluate(character: &Character, ability: Ability) -> Self {
        Self {
            ability,
            modifier: character.attribute(ability),
            penalty: resolve_condition_effects(character, "Attack", Some(ability)),
        }
    }

    fn total(&self) -> i32 {
        self.modifier.saturating_add(self.penalty.total)
    }
}

/// Higher total wins, then the higher raw modifier.
fn compare_options(a: &AttributeOption, b: &AttributeOption) -> Ordering {
    a.total()
        .cmp(&b.total())
        .then_with(|| a.modifier.cmp(&b.modifier))
}

fn attack_candidates(item: &Item) -> &'static [Ability] {
    if item.is_ranged() {
        &[Ability::Dexterity]
    } else if item.is_finesse() {
        &[Ability::Strength, Ability::Dexterity]
    } else {
        &[Ability::Strength]
    }
}

fn select_attribute(character: &Character, item: &Item) -> AttributeOption {
    let candidates = attack_candidates(item);
    let best = candidates
        .iter()
        .map(|&ability| AttributeOption::evaluate(character, ability))
        .max_by(compare_options)
        .unwrap_or_else(|| AttributeOption::evaluate(character, Ability::Strength));

    if candidates.len() > 1 {
        debug!(
            weapon = %item.name,
            attribute = %best.ability,
            total = best.total(),
            "finesse attribute chosen"
        );
    }
    best
}

// ============================================================================
// Attack bonus
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttackBreakdown {
    pub proficiency: i32,
    pub level: i32,
    pub attribute: i32,
    pub item: i32,
    pub conditions: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttackBonus {
    pub total: i32,
    pub breakdown: AttackBreakdown,
    /// Attribute the attack is rolled with.
    pub source: Ability,
    pub penalty: ConditionEffects,
    pub rank: ProficiencyRank,
}

/// Attack bonus for a strike with `item`.
pub fn calculate_weapon_attack_bonus(item: &Item, character: &Character) -> AttackBonus {
    attack_bonus_with(item, character, default_config())
}

pub fn attack_bonus_with(item: &Item, character: &Character, config: &EngineConfig) -> AttackBonus {
    let proficiency = weapon_proficiency(character, item);
    let level = if proficiency.score > 0 {
        character.level as i32
    } else {
        0
    };
    let item_bonus = item_bonus(item, config);
    let choice = select_attribute(character, item);

    AttackBonus {
        total: (proficiency.score + level + choice.modifier + item_bonus)
            .saturating_add(choice.penalty.total),
        breakdown: AttackBreakdown {
            proficiency: proficiency.score,
            level,
            attribute: choice.modifier,
            item: item_bonus,
            conditions: choice.penalty.total,
        },
        source: choice.ability,
        penalty: choice.penalty,
        rank: proficiency.rank,
    }
}

/// The attribute modifier a weapon adds to its damage.
///
/// Melee and thrown weapons add Strength. Propulsive weapons add half a
/// positive Strength, rounded up. Other bows add nothing unless Strength
/// is negative; remaining ranged weapons add nothing. A negative Strength
/// always applies in full where Strength applies at all.
pub fn damage_attribute(item: &Item, character: &Character) -> i32 {
    let strength = character.attribute(Ability::Strength);

    if !item.is_ranged() || item.is_thrown() {
        strength
    } else if item.traits.has("propulsive") {
        if strength > 0 {
            (strength + 1) / 2
        } else {
            strength
        }
    } else if item.in_group("bow") {
        strength.min(0)
    } else {
        0
    }
}
