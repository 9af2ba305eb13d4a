//! Proficiency-based statistics: skills, saving throws and Perception.

use crate::character::{Ability, Character, ProficiencyRank};
use crate::conditions::{resolve_condition_effects, ConditionEffects};
use serde::Serialize;

/// What kind of number a statistic name refers to. Condition penalties
/// are keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatisticKind {
    ArmorClass,
    Perception,
    Save,
    Skill,
    Attack,
    Other,
}

const SKILLS: &[(&str, Ability)] = &[
    ("Acrobatics", Ability::Dexterity),
    ("Arcana", Ability::Intelligence),
    ("Athletics", Ability::Strength),
    ("Crafting", Ability::Intelligence),
    ("Deception", Ability::Charisma),
    ("Diplomacy", Ability::Charisma),
    ("Intimidation", Ability::Charisma),
    ("Medicine", Ability::Wisdom),
    ("Nature", Ability::Wisdom),
    ("Occultism", Ability::Intelligence),
    ("Performance", Ability::Charisma),
    ("Religion", Ability::Wisdom),
    ("Society", Ability::Intelligence),
    ("Stealth", Ability::Dexterity),
    ("Survival", Ability::Wisdom),
    ("Thievery", Ability::Dexterity),
];

const SAVES: &[(&str, Ability)] = &[
    ("Fortitude", Ability::Constitution),
    ("Reflex", Ability::Dexterity),
    ("Will", Ability::Wisdom),
];

fn lookup(table: &[(&str, Ability)], name: &str) -> Option<Ability> {
    table
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, a)| *a)
}

/// `Warfare Lore`, `Lore: Underworld` and the like. "Lore" must be a
/// whole word.
fn is_lore(name: &str) -> bool {
    name.split(|c: char| !c.is_alphanumeric())
        .any(|word| word.eq_ignore_ascii_case("lore"))
}

fn is_armor_class(name: &str) -> bool {
    name.eq_ignore_ascii_case("ac") || name.eq_ignore_ascii_case("armor class")
}

pub fn classify_statistic(name: &str) -> StatisticKind {
    let name = name.trim();
    if is_armor_class(name) {
        StatisticKind::ArmorClass
    } else if name.eq_ignore_ascii_case("perception") {
        StatisticKind::Perception
    } else if lookup(SAVES, name).is_some() {
        StatisticKind::Save
    } else if lookup(SKILLS, name).is_some() || is_lore(name) {
        StatisticKind::Skill
    } else if name.eq_ignore_ascii_case("strike") || name.to_lowercase().contains("attack") {
        StatisticKind::Attack
    } else {
        StatisticKind::Other
    }
}

/// The attribute backing a statistic. Lore skills use Intelligence.
/// Attack rolls depend on the weapon and have no fixed attribute.
pub fn attribute_for(name: &str) -> Option<Ability> {
    let name = name.trim();
    if is_armor_class(name) {
        return Some(Ability::Dexterity);
    }
    if name.eq_ignore_ascii_case("perception") {
        return Some(Ability::Wisdom);
    }
    lookup(SAVES, name)
        .or_else(|| lookup(SKILLS, name))
        .or_else(|| is_lore(name).then_some(Ability::Intelligence))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatisticBreakdown {
    pub proficiency: i32,
    pub level: i32,
    pub attribute: i32,
    pub conditions: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatisticResult {
    pub total: i32,
    pub breakdown: StatisticBreakdown,
    /// Attribute the statistic was computed from, if it has one.
    pub source: Option<Ability>,
    pub rank: ProficiencyRank,
    pub penalty: ConditionEffects,
}

/// Compute a proficiency-based bonus.
///
/// Trained or better adds proficiency and level; untrained statistics
/// never add level.
pub fn calculate_statistic(
    character: &Character,
    statistic: &str,
    proficiency: i32,
) -> StatisticResult {
    let source = attribute_for(statistic);
    let attribute = source.map(|a| character.attribute(a)).unwrap_or(0);
    let penalty = resolve_condition_effects(character, statistic, source);

    let (proficiency, level) = if proficiency > 0 {
        (proficiency, character.level as i32)
    } else {
        (0, 0)
    };

    StatisticResult {
        total: (proficiency + level + attribute).saturating_add(penalty.total),
        breakdown: StatisticBreakdown {
            proficiency,
            level,
            attribute,
            conditions: penalty.total,
        },
        source,
        rank: ProficiencyRank::from_value(proficiency),
        penalty,
    }
}

/// Same as [`calculate_statistic`], reading the proficiency value from the
/// character's own proficiency map.
pub fn calculate_sheet_statistic(character: &Character, statistic: &str) -> StatisticResult {
    calculate_statistic(character, statistic, character.proficiency(statistic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{create_sample_rogue, AttributeModifiers};

    #[test]
    fn test_classify() {
        assert_eq!(classify_statistic("AC"), StatisticKind::ArmorClass);
        assert_eq!(classify_statistic("perception"), StatisticKind::Perception);
        assert_eq!(classify_statistic("Reflex"), StatisticKind::Save);
        assert_eq!(classify_statistic("Thievery"), StatisticKind::Skill);
        assert_eq!(classify_statistic("Warfare Lore"), StatisticKind::Skill);
        assert_eq!(classify_statistic("Attack"), StatisticKind::Attack);
        assert_eq!(classify_statistic("Hero Points"), StatisticKind::Other);
    }

    #[test]
    fn test_lore_needs_the_whole_word() {
        assert_eq!(classify_statistic("Lore: Underworld"), StatisticKind::Skill);
        assert_eq!(classify_statistic("Folklore Check"), StatisticKind::Other);
        assert_eq!(classify_statistic("Explorer"), StatisticKind::Other);
        assert_eq!(attribute_for("Folklore Check"), None);
    }

    #[test]
    fn test_attribute_table() {
        assert_eq!(attribute_for("Athletics"), Some(Ability::Strength));
        assert_eq!(attribute_for("will"), Some(Ability::Wisdom));
        assert_eq!(attribute_for("Lore: Underworld"), Some(Ability::Intelligence));
        assert_eq!(attribute_for("Attack"), None);
    }

    #[test]
    fn test_trained_statistic_adds_level() {
        let rogue = create_sample_rogue("Vex");
        let result = calculate_statistic(&rogue, "Stealth", 4);
        assert_eq!(result.total, 4 + 5 + 4);
        assert_eq!(result.rank, ProficiencyRank::Expert);
        assert_eq!(result.source, Some(Ability::Dexterity));
        assert_eq!(result.breakdown.level, 5);
    }

    #[test]
    fn test_untrained_never_adds_level() {
        let rogue = create_sample_rogue("Vex");
        let result = calculate_statistic(&rogue, "Arcana", 0);
        assert_eq!(result.total, 2);
        assert_eq!(result.breakdown.level, 0);
        assert_eq!(result.rank, ProficiencyRank::Untrained);
    }

    #[test]
    fn test_conditions_reduce_statistic() {
        let character = Character::new("Kyra")
            .with_level(3)
            .with_attributes(AttributeModifiers::new(1, 0, 1, 0, 3, 1))
            .with_condition("Frightened", 2);
        let result = calculate_statistic(&character, "Perception", 2);
        assert_eq!(result.total, 2 + 3 + 3 - 2);
        assert_eq!(result.penalty.total, -2);
        assert_eq!(result.breakdown.conditions, -2);
    }

    #[test]
    fn test_sheet_statistic_reads_proficiency_map() {
        let rogue = create_sample_rogue("Vex");
        assert_eq!(
            calculate_sheet_statistic(&rogue, "Reflex"),
            calculate_statistic(&rogue, "Reflex", 4)
        );
    }
}
