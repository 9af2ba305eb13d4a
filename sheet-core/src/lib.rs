//! Combat resolution and item enchantment for a Pathfinder 2e character
//! sheet.
//!
//! This crate provides:
//! - Condition penalties with status/circumstance non-stacking
//! - Skill, save and Perception bonuses
//! - Weapon attack bonuses with finesse attribute selection
//! - Normal and critical damage expressions (striking, deadly, fatal,
//!   property runes, feats, splash and persistent damage)
//! - Copy-on-write rune etching and removal
//!
//! Nothing here rolls dice. Results are dice expressions for a display
//! layer to render.
//!
//! # Quick Start
//!
//! ```
//! use sheet_core::{apply_rune, calculate_weapon_damage, create_sample_fighter, get_rune, get_weapon, ApplyOptions};
//!
//! let mut fighter = create_sample_fighter("Brom");
//! let sword = get_weapon("Longsword").unwrap();
//!
//! let outcome = apply_rune(&sword, &get_rune("Striking").unwrap(), ApplyOptions::default());
//! assert!(outcome.consumed);
//! fighter.inventory.add_item(outcome.new_item.clone());
//!
//! let damage = calculate_weapon_damage(&outcome.new_item, &fighter).unwrap();
//! println!("{}", damage.normal.text);
//! println!("{}", damage.crit.text);
//! ```

pub mod attack;
pub mod catalog;
pub mod character;
pub mod conditions;
pub mod damage;
pub mod dice;
pub mod engine;
pub mod error;
pub mod feats;
pub mod item;
pub mod runes;
pub mod statistic;

// Primary public API
pub use attack::{calculate_weapon_attack_bonus, AttackBonus};
pub use catalog::{find_item, get_armor, get_rune, get_weapon};
pub use character::{
    create_sample_fighter, create_sample_rogue, Ability, AttributeModifiers, Character,
    ProficiencyRank,
};
pub use conditions::{resolve_condition_effects, ConditionEffects};
pub use damage::{calculate_weapon_damage, DamageProfile, DamageView, PartStyle};
pub use dice::{BaseDamage, Dice, DieSize};
pub use engine::{CombatEngine, EngineConfig};
pub use error::{RecordError, RuneError};
pub use feats::{compute_feat_damage_modifiers, FeatModifier};
pub use item::{Item, ItemId, ItemType};
pub use runes::{
    apply_rune, parse_rune_state, remove_rune, ApplyOptions, ApplyOutcome, RemoveOutcome,
    RuneFamily, RuneState, RuneTarget, StrikingRank,
};
pub use statistic::{calculate_statistic, StatisticResult};
