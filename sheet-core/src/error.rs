//! Error types for the engine.
//!
//! Rune validation failures are ordinary outcomes: the rune engine turns a
//! [`RuneError`] into the error string of its result and hands back the
//! untouched item. Nothing here is ever raised as a fault.

use crate::runes::{RuneFamily, RuneTarget};
use thiserror::Error;

/// Why a rune could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuneError {
    #[error("Cannot tell whether {item} is a weapon or armor")]
    UnknownTarget { item: String },

    #[error("{rune} can only be applied to {rune_target}, not to {item} ({item_target})")]
    IncompatibleTarget {
        rune: String,
        rune_target: RuneTarget,
        item: String,
        item_target: RuneTarget,
    },

    #[error("{item} already has {family} rank {current}; rank {requested} is not an upgrade")]
    NotAnUpgrade {
        item: String,
        family: RuneFamily,
        current: u8,
        requested: u8,
    },

    #[error("{item} has no free property rune slot ({count} etched, potency +{potency})")]
    PropertySlotsFull {
        item: String,
        potency: u8,
        count: usize,
    },

    #[error("{item} already carries a {name} rune")]
    DuplicateProperty { item: String, name: String },

    #[error("{name} is not a recognized rune")]
    UnrecognizedRune { name: String },
}

/// Errors loading records at the persistence boundary.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_problem() {
        let err = RuneError::NotAnUpgrade {
            item: "+2 Longsword".to_string(),
            family: RuneFamily::Potency,
            current: 2,
            requested: 2,
        };
        assert_eq!(
            err.to_string(),
            "+2 Longsword already has potency rank 2; rank 2 is not an upgrade"
        );

        let err = RuneError::IncompatibleTarget {
            rune: "Resilient".to_string(),
            rune_target: RuneTarget::Armor,
            item: "Longsword".to_string(),
            item_target: RuneTarget::Weapon,
        };
        assert_eq!(
            err.to_string(),
            "Resilient can only be applied to armor, not to Longsword (weapon)"
        );
    }
}
