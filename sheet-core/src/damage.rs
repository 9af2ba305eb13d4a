//! Normal and critical damage expressions for a weapon strike.
//!
//! A damage expression is built once for a normal hit, then the critical
//! view is derived from it:
//!
//! ```text
//! crit = 2 × (base + modifier + doubled extras + persistent)
//!        + crit-only extras (fatal, deadly, rune crit effects)
//!        + undoubled extras + splash
//! ```
//!
//! Everything here is a dice *expression*. Nothing is rolled; the
//! `average()` helpers give expected values.

use crate::attack::{damage_attribute, weapon_proficiency};
use crate::character::Character;
use crate::dice::{BaseDamage, Dice, DieSize};
use crate::engine::{default_config, EngineConfig};
use crate::feats::{compute_feat_damage_modifiers, FeatModifier};
use crate::item::Item;
use crate::runes::{find_property_rune, rune_state_with, StrikingRank};
use serde::Serialize;

// ============================================================================
// Expression types
// ============================================================================

/// Rendering hint for a fragment of damage text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PartStyle {
    Normal,
    Rune,
    Precision,
    Splash,
    Persistent,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamagePart {
    pub text: String,
    pub style: PartStyle,
}

impl DamagePart {
    fn new(text: impl Into<String>, style: PartStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Whether an extra contribution is inside the critical doubling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CritScaling {
    Doubled,
    Undoubled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtraDice {
    pub dice: Dice,
    pub damage_type: Option<String>,
    pub label: String,
    pub style: PartStyle,
    pub scaling: CritScaling,
}

impl ExtraDice {
    fn new(dice: Dice, damage_type: Option<String>, label: impl Into<String>, style: PartStyle) -> Self {
        Self {
            dice,
            damage_type,
            label: label.into(),
            style,
            scaling: CritScaling::Doubled,
        }
    }

    fn undoubled(mut self) -> Self {
        self.scaling = CritScaling::Undoubled;
        self
    }

    fn text(&self) -> String {
        let kind = self.damage_type.as_deref().unwrap_or(self.label.as_str());
        match self.style {
            PartStyle::Persistent => format!("{} Pers. {}", self.dice, kind),
            _ => format!("{} {}", self.dice, kind),
        }
    }
}

/// Damage outside the base roll with its own critical rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SpecialDamage {
    /// Never doubled.
    Splash {
        value: i32,
        damage_type: Option<String>,
    },
    /// Doubled on a critical hit.
    Persistent { dice: Dice, damage_type: String },
}

impl SpecialDamage {
    pub fn doubles_on_crit(&self) -> bool {
        matches!(self, SpecialDamage::Persistent { .. })
    }

    pub fn average(&self) -> f64 {
        match self {
            SpecialDamage::Splash { value, .. } => *value as f64,
            SpecialDamage::Persistent { dice, .. } => dice.average(),
        }
    }

    fn part(&self) -> DamagePart {
        match self {
            SpecialDamage::Splash { value, damage_type } => DamagePart::new(
                with_type(format!("{} Spl.", value), damage_type.as_deref()),
                PartStyle::Splash,
            ),
            SpecialDamage::Persistent { dice, damage_type } => DamagePart::new(
                format!("{} Pers. {}", dice, damage_type),
                PartStyle::Persistent,
            ),
        }
    }
}

/// A structured damage expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DamageExpression {
    /// Base damage after striking scaling.
    pub base: BaseDamage,
    /// Attribute modifier plus flat feat bonuses.
    pub modifier: i32,
    pub damage_type: Option<String>,
    pub extras: Vec<ExtraDice>,
    pub specials: Vec<SpecialDamage>,
}

impl DamageExpression {
    pub fn dice_count(&self) -> Option<u32> {
        self.base.dice().map(|d| d.count)
    }

    pub fn die_size(&self) -> Option<DieSize> {
        self.base.dice().map(|d| d.die)
    }

    /// Expected value of everything a critical hit doubles.
    pub fn doubled_average(&self) -> f64 {
        let base = self.base.average() + self.modifier as f64;
        let extras: f64 = self
            .extras
            .iter()
            .filter(|e| e.scaling == CritScaling::Doubled)
            .map(|e| e.dice.average())
            .sum();
        let specials: f64 = self
            .specials
            .iter()
            .filter(|s| s.doubles_on_crit())
            .map(SpecialDamage::average)
            .sum();
        base + extras + specials
    }

    /// Expected value of everything a critical hit leaves alone.
    pub fn undoubled_average(&self) -> f64 {
        let extras: f64 = self
            .extras
            .iter()
            .filter(|e| e.scaling == CritScaling::Undoubled)
            .map(|e| e.dice.average())
            .sum();
        let specials: f64 = self
            .specials
            .iter()
            .filter(|s| !s.doubles_on_crit())
            .map(SpecialDamage::average)
            .sum();
        extras + specials
    }

    fn base_part(&self) -> DamagePart {
        let mut text = self.base.to_string();
        match self.modifier {
            0 => {}
            m if m > 0 => text.push_str(&format!(" + {}", m)),
            m => text.push_str(&format!(" - {}", -m)),
        }
        DamagePart::new(with_type(text, self.damage_type.as_deref()), PartStyle::Normal)
    }
}

fn with_type(text: String, damage_type: Option<&str>) -> String {
    match damage_type {
        Some(t) if !t.is_empty() => format!("{} {}", text, t),
        _ => text,
    }
}

fn push_term(parts: &mut Vec<DamagePart>, part: DamagePart) {
    if !parts.is_empty() {
        parts.push(DamagePart::new(" + ", PartStyle::Normal));
    }
    parts.push(part);
}

/// One rendered side of a damage profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageView {
    pub expression: DamageExpression,
    /// 1 for a normal hit, 2 for a critical hit.
    pub multiplier: u32,
    /// Dice added only on a critical hit, never doubled.
    pub crit_extras: Vec<ExtraDice>,
    pub parts: Vec<DamagePart>,
    pub text: String,
}

impl DamageView {
    fn normal(expression: DamageExpression) -> Self {
        let mut parts = Vec::new();
        push_term(&mut parts, expression.base_part());
        for extra in &expression.extras {
            push_term(&mut parts, DamagePart::new(extra.text(), extra.style));
        }
        for special in &expression.specials {
            push_term(&mut parts, special.part());
        }
        Self::finish(expression, 1, Vec::new(), parts)
    }

    fn critical(expression: DamageExpression, crit_extras: Vec<ExtraDice>) -> Self {
        let mut inner = Vec::new();
        push_term(&mut inner, expression.base_part());
        for extra in expression.extras.iter().filter(|e| e.scaling == CritScaling::Doubled) {
            push_term(&mut inner, DamagePart::new(extra.text(), extra.style));
        }
        for special in expression.specials.iter().filter(|s| s.doubles_on_crit()) {
            push_term(&mut inner, special.part());
        }

        let mut parts = vec![DamagePart::new("2 × (", PartStyle::Critical)];
        parts.extend(inner);
        parts.push(DamagePart::new(")", PartStyle::Critical));

        let outside = crit_extras
            .iter()
            .chain(expression.extras.iter().filter(|e| e.scaling == CritScaling::Undoubled))
            .map(|e| DamagePart::new(e.text(), e.style))
            .chain(
                expression
                    .specials
                    .iter()
                    .filter(|s| !s.doubles_on_crit())
                    .map(SpecialDamage::part),
            )
            .collect::<Vec<_>>();
        for part in outside {
            push_term(&mut parts, part);
        }
        Self::finish(expression, 2, crit_extras, parts)
    }

    fn finish(
        expression: DamageExpression,
        multiplier: u32,
        crit_extras: Vec<ExtraDice>,
        parts: Vec<DamagePart>,
    ) -> Self {
        let text = parts.iter().map(|p| p.text.as_str()).collect();
        Self {
            expression,
            multiplier,
            crit_extras,
            parts,
            text,
        }
    }

    /// Expected damage of this view.
    pub fn average(&self) -> f64 {
        let crit_extras: f64 = self.crit_extras.iter().map(|e| e.dice.average()).sum();
        self.multiplier as f64 * self.expression.doubled_average()
            + crit_extras
            + self.expression.undoubled_average()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DamageProfile {
    pub normal: DamageView,
    pub crit: DamageView,
}

// ============================================================================
// Building
// ============================================================================

/// Extra deadly dice on a critical hit by striking rank.
pub fn deadly_dice_count(striking: StrikingRank) -> u32 {
    match striking {
        StrikingRank::None | StrikingRank::Striking => 1,
        StrikingRank::Greater => 2,
        StrikingRank::Major => 3,
    }
}

/// Raise a dice base to the striking multiplier. Flat and opaque damage
/// are returned untouched.
pub fn scale_base(base: &BaseDamage, striking: StrikingRank) -> BaseDamage {
    match base {
        BaseDamage::Dice(dice) => BaseDamage::Dice(Dice::new(
            dice.count.max(striking.dice_multiplier()),
            dice.die,
        )),
        other => other.clone(),
    }
}

/// Normal and critical damage for a strike with `item`. `None` if the item
/// has no damage.
pub fn calculate_weapon_damage(item: &Item, character: &Character) -> Option<DamageProfile> {
    damage_profile_with(item, character, default_config())
}

pub fn damage_profile_with(
    item: &Item,
    character: &Character,
    config: &EngineConfig,
) -> Option<DamageProfile> {
    let raw_base = item.damage.as_ref()?;
    let runes = rune_state_with(item, config);
    let rank = weapon_proficiency(character, item).rank;
    let feats = compute_feat_damage_modifiers(character, item, rank);
    let damage_type = item.damage_type.clone();

    let base = scale_base(raw_base, runes.striking);
    let modifier =
        damage_attribute(item, character) + feats.iter().filter_map(FeatModifier::flat_value).sum::<i32>();

    let mut extras = Vec::new();
    let mut rune_crits = Vec::new();
    for name in &runes.property {
        let Some(def) = find_property_rune(name, &config.extra_property_runes) else {
            continue;
        };
        if let Some(damage) = &def.damage {
            extras.push(ExtraDice::new(
                damage.dice,
                Some(damage.damage_type.clone()),
                def.name.clone(),
                PartStyle::Rune,
            ));
        }
        if let Some(critical) = &def.critical {
            rune_crits.push(
                ExtraDice::new(
                    critical.dice,
                    Some(critical.damage_type.clone()),
                    def.name.clone(),
                    PartStyle::Persistent,
                )
                .undoubled(),
            );
        }
    }
    for feat in &feats {
        if let FeatModifier::Dice {
            dice,
            die,
            damage_type,
            label,
            style,
        } = feat
        {
            extras.push(ExtraDice::new(
                Dice::new(*dice, *die),
                damage_type.clone(),
                label.clone(),
                style.unwrap_or(PartStyle::Normal),
            ));
        }
    }

    let mut specials = Vec::new();
    if let Some(value) = item.splash.filter(|v| *v != 0) {
        specials.push(SpecialDamage::Splash {
            value,
            damage_type: damage_type.clone(),
        });
    }
    if let Some(persistent) = &item.persistent {
        specials.push(SpecialDamage::Persistent {
            dice: persistent.as_dice(),
            damage_type: persistent.damage_type.clone(),
        });
    }

    let normal = DamageExpression {
        base,
        modifier,
        damage_type: damage_type.clone(),
        extras,
        specials,
    };

    let mut crit_expression = normal.clone();
    let mut crit_extras = Vec::new();
    if let (Some(fatal), BaseDamage::Dice(dice)) = (item.traits.die_param("fatal"), &normal.base) {
        crit_expression.base = BaseDamage::Dice(Dice::new(dice.count, fatal));
        crit_extras.push(
            ExtraDice::new(Dice::new(1, fatal), damage_type.clone(), "Fatal", PartStyle::Critical)
                .undoubled(),
        );
    }
    if let Some(deadly) = item.traits.die_param("deadly") {
        crit_extras.push(
            ExtraDice::new(
                Dice::new(deadly_dice_count(runes.striking), deadly),
                damage_type.clone(),
                "Deadly",
                PartStyle::Critical,
            )
            .undoubled(),
        );
    }
    crit_extras.extend(rune_crits);

    Some(DamageProfile {
        normal: DamageView::normal(normal),
        crit: DamageView::critical(crit_expression, crit_extras),
    })
}
