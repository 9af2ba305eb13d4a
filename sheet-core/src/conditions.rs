//! Condition penalties.
//!
//! Penalties fall into two categories, status and circumstance. Within a
//! category only the single worst applicable penalty counts; the two
//! category results are then summed. Conditions never raise a statistic.

use crate::character::{Ability, Character, Conditions};
use crate::statistic::{attribute_for, classify_statistic, StatisticKind};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyCategory {
    Status,
    Circumstance,
}

#[derive(Debug, Clone, Copy)]
enum Amount {
    /// Minus the condition's value.
    PerValue,
    Fixed(i32),
}

struct ConditionRule {
    condition: &'static str,
    category: PenaltyCategory,
    amount: Amount,
    applies: fn(StatisticKind, Option<Ability>) -> bool,
}

fn every_statistic(_: StatisticKind, _: Option<Ability>) -> bool {
    true
}

fn strength_based(_: StatisticKind, attribute: Option<Ability>) -> bool {
    attribute == Some(Ability::Strength)
}

fn dexterity_based(_: StatisticKind, attribute: Option<Ability>) -> bool {
    attribute == Some(Ability::Dexterity)
}

fn constitution_based(_: StatisticKind, attribute: Option<Ability>) -> bool {
    attribute == Some(Ability::Constitution)
}

fn mental(_: StatisticKind, attribute: Option<Ability>) -> bool {
    matches!(
        attribute,
        Some(Ability::Intelligence | Ability::Wisdom | Ability::Charisma)
    )
}

fn armor_class(kind: StatisticKind, _: Option<Ability>) -> bool {
    kind == StatisticKind::ArmorClass
}

fn armor_class_or_save(kind: StatisticKind, _: Option<Ability>) -> bool {
    matches!(kind, StatisticKind::ArmorClass | StatisticKind::Save)
}

fn attack_roll(kind: StatisticKind, _: Option<Ability>) -> bool {
    kind == StatisticKind::Attack
}

const fn valued(
    condition: &'static str,
    applies: fn(StatisticKind, Option<Ability>) -> bool,
) -> ConditionRule {
    ConditionRule {
        condition,
        category: PenaltyCategory::Status,
        amount: Amount::PerValue,
        applies,
    }
}

const fn off_guard(condition: &'static str) -> ConditionRule {
    ConditionRule {
        condition,
        category: PenaltyCategory::Circumstance,
        amount: Amount::Fixed(-2),
        applies: armor_class,
    }
}

const CONDITION_RULES: &[ConditionRule] = &[
    valued("frightened", every_statistic),
    valued("sickened", every_statistic),
    valued("clumsy", dexterity_based),
    valued("enfeebled", strength_based),
    valued("drained", constitution_based),
    valued("stupefied", mental),
    ConditionRule {
        condition: "fatigued",
        category: PenaltyCategory::Status,
        amount: Amount::Fixed(-1),
        applies: armor_class_or_save,
    },
    off_guard("off-guard"),
    off_guard("flat-footed"),
    off_guard("blinded"),
    off_guard("grabbed"),
    off_guard("paralyzed"),
    off_guard("prone"),
    off_guard("restrained"),
    off_guard("unconscious"),
    ConditionRule {
        condition: "prone",
        category: PenaltyCategory::Circumstance,
        amount: Amount::Fixed(-2),
        applies: attack_roll,
    },
];

/// Per-category penalty totals. A category with nothing applicable is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PenaltyBreakdown {
    pub status: Option<i32>,
    pub circumstance: Option<i32>,
}

/// Which conditions produced each category's penalty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltySources {
    pub status_source: Vec<String>,
    pub circ_source: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConditionEffects {
    pub total: i32,
    pub breakdown: PenaltyBreakdown,
    pub meta: PenaltySources,
}

impl ConditionEffects {
    pub fn none() -> Self {
        Self::default()
    }
}

#[derive(Default)]
struct Worst {
    value: Option<i32>,
    sources: Vec<String>,
}

impl Worst {
    fn offer(&mut self, penalty: i32, source: String) {
        match self.value {
            Some(current) if penalty > current => {}
            Some(current) if penalty == current => {
                if !self.sources.contains(&source) {
                    self.sources.push(source);
                }
            }
            _ => {
                self.value = Some(penalty);
                self.sources = vec![source];
            }
        }
    }
}

/// Penalties the character's conditions impose on a statistic.
///
/// `attribute` names the attribute behind the statistic; when omitted it
/// is looked up from the statistic name.
pub fn resolve_condition_effects(
    character: &Character,
    statistic: &str,
    attribute: Option<Ability>,
) -> ConditionEffects {
    resolve_conditions(&character.conditions, statistic, attribute)
}

pub fn resolve_conditions(
    conditions: &Conditions,
    statistic: &str,
    attribute: Option<Ability>,
) -> ConditionEffects {
    let kind = classify_statistic(statistic);
    let attribute = attribute.or_else(|| attribute_for(statistic));

    let mut status = Worst::default();
    let mut circumstance = Worst::default();

    for entry in conditions.iter() {
        let rules = CONDITION_RULES
            .iter()
            .filter(|rule| rule.condition.eq_ignore_ascii_case(entry.name.trim()));

        for rule in rules {
            if !(rule.applies)(kind, attribute) {
                continue;
            }
            let (penalty, source) = match rule.amount {
                Amount::PerValue => (
                    i32::try_from(entry.value).unwrap_or(i32::MAX).saturating_neg(),
                    format!("{} {}", entry.name, entry.value),
                ),
                Amount::Fixed(amount) => (amount, entry.name.clone()),
            };
            if penalty >= 0 {
                continue;
            }
            match rule.category {
                PenaltyCategory::Status => status.offer(penalty, source),
                PenaltyCategory::Circumstance => circumstance.offer(penalty, source),
            }
        }
    }

    ConditionEffects {
        total: status
            .value
            .unwrap_or(0)
            .saturating_add(circumstance.value.unwrap_or(0)),
        breakdown: PenaltyBreakdown {
            status: status.value,
            circumstance: circumstance.value,
        },
        meta: PenaltySources {
            status_source: status.sources,
            circ_source: circumstance.sources,
        },
    }
}
