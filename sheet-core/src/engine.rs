//! Engine configuration and the `CombatEngine` facade.
//!
//! The free functions in each module run with the default configuration.
//! `CombatEngine` carries an explicit [`EngineConfig`] and threads it
//! through every operation.
//!
//! # Example
//!
//! ```
//! use sheet_core::{CombatEngine, EngineConfig, create_sample_fighter, get_weapon};
//!
//! let engine = CombatEngine::new(EngineConfig::default());
//! let fighter = create_sample_fighter("Brom");
//! let sword = get_weapon("Longsword");
//!
//! let attack = engine.calculate_weapon_attack_bonus(sword.as_ref(), Some(&fighter));
//! assert!(attack.is_some());
//! let damage = engine.calculate_weapon_damage(sword.as_ref(), Some(&fighter));
//! assert!(damage.is_some());
//! ```

use crate::attack::{attack_bonus_with, AttackBonus};
use crate::character::{Ability, Character, ProficiencyRank};
use crate::conditions::{resolve_condition_effects, ConditionEffects};
use crate::damage::{damage_profile_with, DamageProfile};
use crate::error::RecordError;
use crate::feats::{compute_feat_damage_modifiers, FeatModifier};
use crate::item::Item;
use crate::runes::{
    apply_rune_with, remove_rune_with, rune_state_with, ApplyOptions, ApplyOutcome,
    PropertyRuneDef, RemoveOutcome, RuneFamily, RuneState,
};
use crate::statistic::{calculate_statistic, StatisticResult};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Read rune state from item names when an item has no rune record.
    pub legacy_name_parsing: bool,
    /// Property runes beyond the built-in table.
    pub extra_property_runes: Vec<PropertyRuneDef>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            legacy_name_parsing: true,
            extra_property_runes: Vec::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_legacy_name_parsing(mut self, enabled: bool) -> Self {
        self.legacy_name_parsing = enabled;
        self
    }

    /// Register an additional property rune.
    pub fn with_property_rune(mut self, rune: PropertyRuneDef) -> Self {
        self.extra_property_runes.push(rune);
        self
    }
}

lazy_static! {
    static ref DEFAULT_CONFIG: EngineConfig = EngineConfig::default();
}

pub fn default_config() -> &'static EngineConfig {
    &DEFAULT_CONFIG
}

/// Combat and enchantment calculations under one configuration.
///
/// Every method is a pure function of its arguments and the config; the
/// engine holds no other state.
#[derive(Debug, Clone, Default)]
pub struct CombatEngine {
    config: EngineConfig,
}

impl CombatEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resolve_condition_effects(
        &self,
        character: &Character,
        statistic: &str,
        attribute: Option<Ability>,
    ) -> ConditionEffects {
        resolve_condition_effects(character, statistic, attribute)
    }

    pub fn calculate_statistic(
        &self,
        character: &Character,
        statistic: &str,
        proficiency: i32,
    ) -> StatisticResult {
        calculate_statistic(character, statistic, proficiency)
    }

    pub fn calculate_weapon_attack_bonus(
        &self,
        item: Option<&Item>,
        character: Option<&Character>,
    ) -> Option<AttackBonus> {
        Some(attack_bonus_with(item?, character?, &self.config))
    }

    /// `None` when either input is missing or the item deals no damage.
    pub fn calculate_weapon_damage(
        &self,
        item: Option<&Item>,
        character: Option<&Character>,
    ) -> Option<DamageProfile> {
        damage_profile_with(item?, character?, &self.config)
    }

    pub fn parse_rune_state(&self, item: &Item) -> RuneState {
        rune_state_with(item, &self.config)
    }

    pub fn apply_rune(&self, item: &Item, rune: &Item, options: ApplyOptions) -> ApplyOutcome {
        apply_rune_with(item, rune, options, &self.config)
    }

    pub fn remove_rune(
        &self,
        item: &Item,
        family: RuneFamily,
        property_name: Option<&str>,
    ) -> RemoveOutcome {
        remove_rune_with(item, family, property_name, &self.config)
    }

    pub fn compute_feat_damage_modifiers(
        &self,
        character: &Character,
        item: &Item,
        rank: ProficiencyRank,
    ) -> Vec<FeatModifier> {
        compute_feat_damage_modifiers(character, item, rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DieSize;
    use crate::runes::{RuneTarget, StrikingRank};

    #[test]
    fn test_config_from_json_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert!(config.legacy_name_parsing);
    }

    #[test]
    fn test_config_registers_property_runes() {
        let json = r#"{
            "legacy_name_parsing": false,
            "extra_property_runes": [
                {"name": "Venomous", "target": "weapon",
                 "damage": {"dice": {"count": 1, "die": 6}, "damage_type": "poison"}}
            ]
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert!(!config.legacy_name_parsing);
        assert_eq!(config.extra_property_runes[0].target, RuneTarget::Weapon);

        let engine = CombatEngine::new(config);
        let dagger = Item::weapon("Dagger", "1d4", "piercing").with_runes(RuneState {
            potency: 1,
            striking: StrikingRank::None,
            resilient: 0,
            property: vec![],
        });
        let outcome = engine.apply_rune(&dagger, &Item::rune("Venomous", "weapon"), ApplyOptions::default());
        assert!(outcome.consumed);

        let damage = engine
            .calculate_weapon_damage(Some(&outcome.new_item), Some(&Character::new("Ada")))
            .unwrap();
        assert_eq!(damage.normal.text, "1d4 piercing + 1d6 poison");
    }

    #[test]
    fn test_missing_inputs_yield_none() {
        let engine = CombatEngine::default();
        let sword = Item::weapon("Longsword", "1d8", "slashing");
        let fighter = Character::new("Brom");
        assert!(engine.calculate_weapon_damage(None, Some(&fighter)).is_none());
        assert!(engine.calculate_weapon_damage(Some(&sword), None).is_none());
        assert!(engine.calculate_weapon_attack_bonus(None, None).is_none());
        assert!(engine.calculate_weapon_attack_bonus(Some(&sword), Some(&fighter)).is_some());
    }

    #[test]
    fn test_builder_adds_rune() {
        let config = EngineConfig::default().with_property_rune(
            PropertyRuneDef::new("Brilliant", RuneTarget::Weapon).with_damage(1, DieSize::D4, "fire"),
        );
        assert_eq!(config.extra_property_runes.len(), 1);
    }
}
