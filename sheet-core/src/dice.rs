//! Dice notation for damage expressions.
//!
//! Supports the `XdY` notation used by weapon and rune damage plus bare
//! flat values. The engine only ever builds expressions from these types;
//! nothing in this crate rolls dice.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for dice parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceError {
    #[error("Invalid dice notation: {0}")]
    InvalidNotation(String),
    #[error("Invalid die size: {0}")]
    InvalidDieSize(u32),
}

/// Die sizes found on weapons, runes and weapon traits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum DieSize {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
}

impl DieSize {
    pub fn sides(&self) -> u32 {
        match self {
            DieSize::D4 => 4,
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
            DieSize::D20 => 20,
        }
    }

    pub fn from_sides(sides: u32) -> Option<DieSize> {
        match sides {
            4 => Some(DieSize::D4),
            6 => Some(DieSize::D6),
            8 => Some(DieSize::D8),
            10 => Some(DieSize::D10),
            12 => Some(DieSize::D12),
            20 => Some(DieSize::D20),
            _ => None,
        }
    }

    /// Expected value of a single die.
    pub fn average(&self) -> f64 {
        (self.sides() as f64 + 1.0) / 2.0
    }
}

impl TryFrom<u32> for DieSize {
    type Error = DiceError;

    fn try_from(sides: u32) -> Result<Self, Self::Error> {
        DieSize::from_sides(sides).ok_or(DiceError::InvalidDieSize(sides))
    }
}

impl From<DieSize> for u32 {
    fn from(die: DieSize) -> u32 {
        die.sides()
    }
}

impl fmt::Display for DieSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

/// A pool of identical dice, e.g. `2d6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dice {
    pub count: u32,
    pub die: DieSize,
}

impl Dice {
    pub fn new(count: u32, die: DieSize) -> Self {
        Self { count, die }
    }

    /// Parse `XdY` notation. A missing count means one die.
    pub fn parse(notation: &str) -> Result<Self, DiceError> {
        let captures = DICE_RE
            .captures(notation.trim())
            .ok_or_else(|| DiceError::InvalidNotation(notation.to_string()))?;

        let count = match captures.get(1).map(|m| m.as_str()) {
            None | Some("") => 1,
            Some(digits) => digits
                .parse()
                .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?,
        };
        let sides: u32 = captures[2]
            .parse()
            .map_err(|_| DiceError::InvalidNotation(notation.to_string()))?;

        Ok(Dice {
            count,
            die: DieSize::try_from(sides)?,
        })
    }

    pub fn average(&self) -> f64 {
        self.count as f64 * self.die.average()
    }
}

impl FromStr for Dice {
    type Err = DiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dice::parse(s)
    }
}

impl fmt::Display for Dice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.count, self.die)
    }
}

lazy_static! {
    static ref DICE_RE: Regex = Regex::new(r"(?i)^(\d*)\s*d\s*(\d+)$").unwrap();
    static ref FLAT_RE: Regex = Regex::new(r"^[+-]?\d+$").unwrap();
    static ref NOTE_RE: Regex = Regex::new(r"\([^)]*\)|\[[^\]]*\]").unwrap();
    static ref SPACE_RE: Regex = Regex::new(r"\s+").unwrap();
}

/// A weapon's base damage descriptor.
///
/// Records may carry the damage as a formula string (`"1d6"`), a bare
/// number, or a `{ "dice": 1, "die": 6 }` object; all three land here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BaseDamageRepr", into = "String")]
pub enum BaseDamage {
    Dice(Dice),
    Flat(i32),
    /// Anything that is not a recognizable formula, kept as display text.
    Opaque(String),
}

impl BaseDamage {
    pub fn dice(&self) -> Option<Dice> {
        match self {
            BaseDamage::Dice(dice) => Some(*dice),
            _ => None,
        }
    }

    pub fn average(&self) -> f64 {
        match self {
            BaseDamage::Dice(dice) => dice.average(),
            BaseDamage::Flat(value) => *value as f64,
            BaseDamage::Opaque(_) => 0.0,
        }
    }
}

impl fmt::Display for BaseDamage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseDamage::Dice(dice) => write!(f, "{dice}"),
            BaseDamage::Flat(value) => write!(f, "{value}"),
            BaseDamage::Opaque(text) => write!(f, "{text}"),
        }
    }
}

impl From<BaseDamage> for String {
    fn from(damage: BaseDamage) -> String {
        damage.to_string()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BaseDamageRepr {
    Number(i64),
    Text(String),
    Structured { dice: u32, die: u32 },
}

impl From<BaseDamageRepr> for BaseDamage {
    fn from(repr: BaseDamageRepr) -> Self {
        match repr {
            BaseDamageRepr::Number(value) => {
                BaseDamage::Flat(value.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            }
            BaseDamageRepr::Text(text) => parse_damage_formula(&text),
            BaseDamageRepr::Structured { dice, die } => match DieSize::from_sides(die) {
                Some(die) => BaseDamage::Dice(Dice::new(dice, die)),
                None => BaseDamage::Opaque(format!("{dice}d{die}")),
            },
        }
    }
}

/// Parse a base damage formula.
///
/// `<count>d<size>` becomes dice, a bare integer becomes flat damage, and
/// anything else falls back to a stripped copy of the text so a bad
/// fragment never fails the whole damage computation.
pub fn parse_damage_formula(formula: &str) -> BaseDamage {
    let trimmed = formula.trim();

    if let Ok(dice) = Dice::parse(trimmed) {
        return BaseDamage::Dice(dice);
    }
    if FLAT_RE.is_match(trimmed) {
        if let Ok(value) = trimmed.parse::<i32>() {
            return BaseDamage::Flat(value);
        }
    }

    BaseDamage::Opaque(strip_formula_text(trimmed))
}

fn strip_formula_text(text: &str) -> String {
    let without_notes = NOTE_RE.replace_all(text, " ");
    SPACE_RE.replace_all(without_notes.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let dice = Dice::parse("1d8").unwrap();
        assert_eq!(dice.count, 1);
        assert_eq!(dice.die, DieSize::D8);

        let dice = Dice::parse("d6").unwrap();
        assert_eq!(dice.count, 1);
        assert_eq!(dice.die, DieSize::D6);
    }

    #[test]
    fn test_invalid_die_size() {
        assert_eq!(Dice::parse("1d7"), Err(DiceError::InvalidDieSize(7)));
        assert!(matches!(
            Dice::parse("fire"),
            Err(DiceError::InvalidNotation(_))
        ));
    }

    #[test]
    fn test_damage_formula_variants() {
        assert_eq!(
            parse_damage_formula("2d6"),
            BaseDamage::Dice(Dice::new(2, DieSize::D6))
        );
        assert_eq!(parse_damage_formula(" 1 "), BaseDamage::Flat(1));
        assert_eq!(
            parse_damage_formula("1d4 +  special (see text)"),
            BaseDamage::Opaque("1d4 + special".to_string())
        );
    }

    #[test]
    fn test_base_damage_from_json() {
        let text: BaseDamage = serde_json::from_str("\"1d12\"").unwrap();
        assert_eq!(text, BaseDamage::Dice(Dice::new(1, DieSize::D12)));

        let flat: BaseDamage = serde_json::from_str("1").unwrap();
        assert_eq!(flat, BaseDamage::Flat(1));

        let structured: BaseDamage = serde_json::from_str(r#"{"dice": 1, "die": 10}"#).unwrap();
        assert_eq!(structured, BaseDamage::Dice(Dice::new(1, DieSize::D10)));
    }

    #[test]
    fn test_averages() {
        assert_eq!(DieSize::D6.average(), 3.5);
        assert_eq!(Dice::new(2, DieSize::D8).average(), 9.0);
        assert_eq!(BaseDamage::Flat(3).average(), 3.0);
    }
}
