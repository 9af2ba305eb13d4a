//! Extra damage granted by feats.
//!
//! Each supported feat has its own eligibility check and they are
//! evaluated independently; every feat that applies contributes.

use crate::character::{Character, ProficiencyRank};
use crate::damage::PartStyle;
use crate::dice::{Dice, DieSize};
use crate::item::Item;
use serde::Serialize;

/// One feat's contribution to a damage roll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeatModifier {
    Flat {
        value: i32,
        label: String,
    },
    Dice {
        dice: u32,
        die: DieSize,
        #[serde(rename = "type")]
        damage_type: Option<String>,
        label: String,
        style: Option<PartStyle>,
    },
}

impl FeatModifier {
    fn flat(value: i32, label: &str) -> Self {
        FeatModifier::Flat {
            value,
            label: label.to_string(),
        }
    }

    fn precision(dice: u32, die: DieSize, label: &str) -> Self {
        FeatModifier::Dice {
            dice,
            die,
            damage_type: Some("precision".to_string()),
            label: label.to_string(),
            style: Some(PartStyle::Precision),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FeatModifier::Flat { label, .. } | FeatModifier::Dice { label, .. } => label,
        }
    }

    pub fn flat_value(&self) -> Option<i32> {
        match self {
            FeatModifier::Flat { value, .. } => Some(*value),
            FeatModifier::Dice { .. } => None,
        }
    }

    pub fn as_dice(&self) -> Option<Dice> {
        match self {
            FeatModifier::Dice { dice, die, .. } => Some(Dice::new(*dice, *die)),
            FeatModifier::Flat { .. } => None,
        }
    }
}

pub const WEAPON_SPECIALIZATION: &str = "Weapon Specialization";
pub const GREATER_WEAPON_SPECIALIZATION: &str = "Greater Weapon Specialization";
pub const PRECISION_SHOT: &str = "Precision Shot";
pub const SNEAK_ATTACK: &str = "Sneak Attack";

struct FeatRule {
    feat: &'static str,
    grant: fn(&Character, &Item, ProficiencyRank) -> Option<FeatModifier>,
}

const FEAT_RULES: &[FeatRule] = &[
    FeatRule {
        feat: WEAPON_SPECIALIZATION,
        grant: weapon_specialization,
    },
    FeatRule {
        feat: GREATER_WEAPON_SPECIALIZATION,
        grant: greater_weapon_specialization,
    },
    FeatRule {
        feat: PRECISION_SHOT,
        grant: precision_shot,
    },
    FeatRule {
        feat: SNEAK_ATTACK,
        grant: sneak_attack,
    },
];

fn specialization_bonus(rank: ProficiencyRank) -> Option<i32> {
    match rank {
        ProficiencyRank::Expert => Some(2),
        ProficiencyRank::Master => Some(3),
        ProficiencyRank::Legendary => Some(4),
        ProficiencyRank::Untrained | ProficiencyRank::Trained => None,
    }
}

fn weapon_specialization(
    character: &Character,
    _: &Item,
    rank: ProficiencyRank,
) -> Option<FeatModifier> {
    // The greater feat replaces this one.
    if character.feats.has(GREATER_WEAPON_SPECIALIZATION) {
        return None;
    }
    specialization_bonus(rank).map(|bonus| FeatModifier::flat(bonus, WEAPON_SPECIALIZATION))
}

fn greater_weapon_specialization(
    _: &Character,
    _: &Item,
    rank: ProficiencyRank,
) -> Option<FeatModifier> {
    specialization_bonus(rank)
        .map(|bonus| FeatModifier::flat(bonus * 2, GREATER_WEAPON_SPECIALIZATION))
}

fn precision_shot(character: &Character, item: &Item, _: ProficiencyRank) -> Option<FeatModifier> {
    if !item.is_ranged() || item.traits.has("repeating") {
        return None;
    }
    let high_level = character.level >= 13;

    if item.in_group("crossbow") {
        Some(FeatModifier::flat(if high_level { 2 } else { 1 }, PRECISION_SHOT))
    } else if item.in_group("firearm") {
        let die = if high_level { DieSize::D6 } else { DieSize::D4 };
        Some(FeatModifier::precision(1, die, PRECISION_SHOT))
    } else {
        None
    }
}

fn sneak_attack_dice(level: u32) -> u32 {
    match level {
        17.. => 4,
        11.. => 3,
        5.. => 2,
        _ => 1,
    }
}

fn sneak_attack(character: &Character, item: &Item, _: ProficiencyRank) -> Option<FeatModifier> {
    let ranged_shot = item.is_ranged() && !item.is_thrown();
    let nimble = item.traits.has("agile") || item.is_finesse();
    if !ranged_shot && !nimble {
        return None;
    }
    Some(FeatModifier::precision(
        sneak_attack_dice(character.level),
        DieSize::D6,
        SNEAK_ATTACK,
    ))
}

/// Damage contributions from every feat the character knows that applies
/// to `item` at proficiency `rank`, in a fixed order.
pub fn compute_feat_damage_modifiers(
    character: &Character,
    item: &Item,
    rank: ProficiencyRank,
) -> Vec<FeatModifier> {
    FEAT_RULES
        .iter()
        .filter(|rule| character.feats.has(rule.feat))
        .filter_map(|rule| (rule.grant)(character, item, rank))
        .collect()
}
