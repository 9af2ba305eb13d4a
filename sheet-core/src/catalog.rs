//! Reference weapons, armor and rune items.
//!
//! Lookups are case-insensitive and hand out a copy under a fresh id, so
//! two daggers taken from the catalog are distinct inventory items.

use crate::dice::{BaseDamage, DieSize};
use crate::item::{Item, ItemType, PersistentDamage};
use crate::runes::{RuneTarget, PROPERTY_RUNES};

fn lookup(table: &[Item], name: &str) -> Option<Item> {
    let name = name.trim();
    table
        .iter()
        .find(|item| item.name.eq_ignore_ascii_case(name))
        .map(Item::duplicate)
}

/// Get a standard weapon by name.
pub fn get_weapon(name: &str) -> Option<Item> {
    lookup(&WEAPONS, name)
}

/// Get a standard armor by name.
pub fn get_armor(name: &str) -> Option<Item> {
    lookup(&ARMORS, name)
}

/// Get a rune item by name.
pub fn get_rune(name: &str) -> Option<Item> {
    lookup(&RUNES, name)
}

/// Try every table in turn.
pub fn find_item(name: &str) -> Option<Item> {
    get_weapon(name)
        .or_else(|| get_armor(name))
        .or_else(|| get_rune(name))
}

// ============================================================================
// Weapons
// ============================================================================

fn weapon(name: &str, damage: &str, damage_type: &str, category: &str, group: &str) -> Item {
    Item::weapon(name, damage, damage_type)
        .with_category(category)
        .with_group(group)
}

fn acid_flask() -> Item {
    let mut flask = Item::new("Acid Flask", ItemType::Consumable)
        .with_category("martial")
        .with_group("bomb")
        .with_traits(["acid", "alchemical", "bomb", "consumable", "splash", "thrown"])
        .with_range(20)
        .with_splash(1)
        .with_persistent(PersistentDamage::new(1, DieSize::D6, "acid"));
    flask.damage = Some(BaseDamage::Flat(1));
    flask.damage_type = Some("acid".to_string());
    flask
}

lazy_static::lazy_static! {
    pub static ref WEAPONS: Vec<Item> = vec![
        // Melee
        weapon("Dagger", "1d4", "piercing", "simple", "knife")
            .with_traits(["agile", "finesse", "thrown 10", "versatile s"]),
        weapon("Club", "1d6", "bludgeoning", "simple", "club")
            .with_traits(["thrown 10"]),
        weapon("Rapier", "1d6", "piercing", "martial", "sword")
            .with_traits(["deadly d8", "disarm", "finesse"]),
        weapon("Shortsword", "1d6", "piercing", "martial", "sword")
            .with_traits(["agile", "finesse", "versatile s"]),
        weapon("Longsword", "1d8", "slashing", "martial", "sword")
            .with_traits(["versatile p"]),
        weapon("Pick", "1d6", "piercing", "martial", "pick")
            .with_traits(["fatal d10"]),
        weapon("Greataxe", "1d12", "slashing", "martial", "axe")
            .with_traits(["sweep"]),

        // Thrown
        weapon("Javelin", "1d6", "piercing", "simple", "dart")
            .with_traits(["thrown 30"])
            .with_range(30),

        // Ranged
        weapon("Shortbow", "1d6", "piercing", "martial", "bow")
            .with_traits(["deadly d10"])
            .with_range(60),
        weapon("Composite Shortbow", "1d6", "piercing", "martial", "bow")
            .with_traits(["deadly d10", "propulsive"])
            .with_range(60),
        weapon("Longbow", "1d8", "piercing", "martial", "bow")
            .with_traits(["deadly d10", "volley 30"])
            .with_range(100),
        weapon("Hand Crossbow", "1d6", "piercing", "simple", "crossbow")
            .with_range(60),
        weapon("Heavy Crossbow", "1d10", "piercing", "simple", "crossbow")
            .with_range(120),
        weapon("Repeating Hand Crossbow", "1d8", "piercing", "martial", "crossbow")
            .with_traits(["repeating"])
            .with_range(60),
        weapon("Arquebus", "1d8", "piercing", "martial", "firearm")
            .with_traits(["concussive", "fatal d12", "kickback"])
            .with_range(150),

        acid_flask(),
    ];
}

// ============================================================================
// Armor
// ============================================================================

lazy_static::lazy_static! {
    pub static ref ARMORS: Vec<Item> = vec![
        Item::armor("Leather Armor", "light"),
        Item::armor("Studded Leather Armor", "light"),
        Item::armor("Chain Mail", "medium"),
        Item::armor("Full Plate", "heavy"),
    ];
}

// ============================================================================
// Runes
// ============================================================================

lazy_static::lazy_static! {
    /// Fundamental runes at every rank, then every built-in property rune.
    pub static ref RUNES: Vec<Item> = {
        let mut runes = Vec::new();
        for rank in 1..=3 {
            runes.push(Item::rune(format!("+{rank} Weapon Potency"), "weapon"));
            runes.push(Item::rune(format!("+{rank} Armor Potency"), "armor"));
        }
        for name in ["Striking", "Greater Striking", "Major Striking"] {
            runes.push(Item::rune(name, "weapon"));
        }
        for name in ["Resilient", "Greater Resilient", "Major Resilient"] {
            runes.push(Item::rune(name, "armor"));
        }
        for def in PROPERTY_RUNES.iter() {
            let category = match def.target {
                RuneTarget::Weapon => "weapon",
                RuneTarget::Armor => "armor",
            };
            runes.push(Item::rune(def.name.clone(), category));
        }
        runes
    };
}
