//! Property tests for the stacking, upgrade and doubling rules.

use proptest::prelude::*;
use sheet_core::character::{AttributeModifiers, Conditions};
use sheet_core::conditions::resolve_conditions;
use sheet_core::dice::{BaseDamage, Dice, DieSize};
use sheet_core::item::PersistentDamage;
use sheet_core::runes::{RuneState, StrikingRank, PROPERTY_RUNES};
use sheet_core::{
    apply_rune, calculate_weapon_damage, remove_rune, ApplyOptions, Character, Item, RuneFamily,
    RuneTarget,
};

const STATUS_CONDITIONS: &[&str] = &["frightened", "sickened", "clumsy", "enfeebled", "drained", "stupefied"];
const CIRCUMSTANCE_CONDITIONS: &[&str] = &["off-guard", "blinded", "grabbed", "paralyzed", "prone", "restrained", "unconscious"];
const STATISTICS: &[&str] = &["AC", "Perception", "Fortitude", "Reflex", "Will", "Athletics", "Stealth", "Arcana", "Diplomacy"];

fn die_size() -> impl Strategy<Value = DieSize> {
    prop_oneof![
        Just(DieSize::D4),
        Just(DieSize::D6),
        Just(DieSize::D8),
        Just(DieSize::D10),
        Just(DieSize::D12),
    ]
}

fn striking() -> impl Strategy<Value = StrikingRank> {
    (0u8..=3).prop_map(StrikingRank::from_rank)
}

fn weapon_property_rune() -> impl Strategy<Value = String> {
    let names: Vec<String> = PROPERTY_RUNES
        .iter()
        .filter(|def| def.target == RuneTarget::Weapon)
        .map(|def| def.name.clone())
        .collect();
    proptest::sample::select(names)
}

fn rune_state() -> impl Strategy<Value = RuneState> {
    (0u8..=3, striking(), proptest::collection::vec(weapon_property_rune(), 0..=3)).prop_map(
        |(potency, striking, mut property)| {
            property.sort();
            property.dedup();
            property.truncate(potency as usize);
            RuneState {
                potency,
                striking,
                resilient: 0,
                property,
            }
        },
    )
}

fn condition_set() -> impl Strategy<Value = Vec<(String, u32)>> {
    let name = prop_oneof![
        proptest::sample::select(STATUS_CONDITIONS.to_vec()),
        proptest::sample::select(CIRCUMSTANCE_CONDITIONS.to_vec()),
    ];
    proptest::collection::vec((name.prop_map(str::to_string), 0u32..=4), 0..6)
}

fn weapon() -> impl Strategy<Value = Item> {
    (
        1u32..=2,
        die_size(),
        rune_state(),
        proptest::option::of(die_size()),
        proptest::option::of(die_size()),
        proptest::option::of(1i32..=3),
        proptest::option::of((1u32..=2, die_size())),
    )
        .prop_map(|(count, die, runes, deadly, fatal, splash, persistent)| {
            let mut item = Item::weapon("Test Blade", format!("{count}{die}"), "slashing")
                .with_category("martial")
                .with_group("sword")
                .with_runes(runes);
            if let Some(deadly) = deadly {
                item = item.with_traits([format!("deadly {deadly}")]);
            }
            if let Some(fatal) = fatal {
                item = item.with_traits([format!("fatal {fatal}")]);
            }
            if let Some(splash) = splash {
                item = item.with_splash(splash);
            }
            if let Some((dice, die)) = persistent {
                item = item.with_persistent(PersistentDamage::new(dice, die, "bleed"));
            }
            item
        })
}

fn character() -> impl Strategy<Value = Character> {
    (1u32..=20, -1i32..=5, -1i32..=5, 0i32..=8).prop_map(|(level, str, dex, prof)| {
        Character::new("Prop")
            .with_level(level)
            .with_attributes(AttributeModifiers::new(str, dex, 0, 0, 0, 0))
            .with_proficiency("martial", prof)
            .with_feat("Weapon Specialization")
            .with_feat("Sneak Attack")
    })
}

fn fundamental_rune_name(family: u8, rank: u8) -> String {
    match (family, rank) {
        (0, rank) => format!("+{rank} Weapon Potency"),
        (1, 1) => "Striking".to_string(),
        (1, 2) => "Greater Striking".to_string(),
        (1, _) => "Major Striking".to_string(),
        (_, 1) => "Resilient".to_string(),
        (_, 2) => "Greater Resilient".to_string(),
        (_, _) => "Major Resilient".to_string(),
    }
}

proptest! {
    #[test]
    fn prop_penalties_never_stack_within_a_category(
        entries in condition_set(),
        statistic in proptest::sample::select(STATISTICS.to_vec()),
    ) {
        let conditions: Conditions = entries
            .iter()
            .map(|(name, value)| sheet_core::character::ConditionEntry::new(name.clone(), *value))
            .collect::<Vec<_>>()
            .into();
        let effects = resolve_conditions(&conditions, statistic, None);

        prop_assert!(effects.total <= 0);
        prop_assert!(effects.total >= -4 - 2);
        prop_assert_eq!(
            effects.total,
            effects.breakdown.status.unwrap_or(0) + effects.breakdown.circumstance.unwrap_or(0)
        );
        if let Some(circumstance) = effects.breakdown.circumstance {
            prop_assert_eq!(circumstance, -2);
        }
        // The status penalty is a single condition's value, never a sum.
        if let Some(status) = effects.breakdown.status {
            let worst = conditions.iter().map(|c| c.value as i32).max().unwrap_or(0);
            prop_assert!(-status <= worst);
        }
    }

    #[test]
    fn prop_same_or_lower_rank_is_rejected(
        family in 0u8..3,
        current in 1u8..=3,
        requested in 1u8..=3,
    ) {
        prop_assume!(requested <= current);
        let (item, rune) = if family == 2 {
            let armor = Item::armor("Chain Mail", "medium").with_runes(RuneState {
                resilient: current,
                ..RuneState::default()
            });
            (armor, Item::rune(fundamental_rune_name(family, requested), "armor"))
        } else {
            let state = if family == 0 {
                RuneState { potency: current, ..RuneState::default() }
            } else {
                RuneState { striking: StrikingRank::from_rank(current), ..RuneState::default() }
            };
            let sword = Item::weapon("Longsword", "1d8", "slashing").with_runes(state);
            (sword, Item::rune(fundamental_rune_name(family, requested), "weapon"))
        };

        let outcome = apply_rune(&item, &rune, ApplyOptions::default());
        prop_assert!(!outcome.consumed);
        prop_assert!(outcome.error.is_some());
        prop_assert_eq!(outcome.new_item, item);
    }

    #[test]
    fn prop_property_count_bounded_by_potency(
        start in rune_state(),
        steps in proptest::collection::vec((0u8..4, 1u8..=3, weapon_property_rune()), 1..12),
    ) {
        let mut item = Item::weapon("Longsword", "1d8", "slashing").with_runes(start);
        for (action, rank, property) in steps {
            item = match action {
                0 => apply_rune(&item, &Item::rune(fundamental_rune_name(0, rank), "weapon"), ApplyOptions::default()).new_item,
                1 => apply_rune(&item, &Item::rune(property, "weapon"), ApplyOptions::default()).new_item,
                2 => remove_rune(&item, RuneFamily::Property, Some(&property)).new_item,
                _ => apply_rune(&item, &Item::rune(fundamental_rune_name(1, rank), "weapon"), ApplyOptions::default()).new_item,
            };
            let state = item.runes.clone().unwrap_or_default();
            prop_assert!(state.property.len() <= state.potency as usize);
        }
    }

    #[test]
    fn prop_critical_identity(item in weapon(), character in character()) {
        let profile = calculate_weapon_damage(&item, &character).unwrap();
        let normal = &profile.normal;
        let crit = &profile.crit;

        if let Some(fatal) = item.traits.die_param("fatal") {
            // Fatal swaps the die size but keeps the striking dice count.
            prop_assert_eq!(crit.expression.dice_count(), normal.expression.dice_count());
            prop_assert_eq!(crit.expression.die_size(), Some(fatal));
            prop_assert_eq!(crit.expression.modifier, normal.expression.modifier);
            prop_assert_eq!(&crit.expression.extras, &normal.expression.extras);
        } else {
            // Without fatal the doubled part is exactly the normal hit's.
            prop_assert_eq!(&crit.expression, &normal.expression);
            let crit_only: f64 = crit.crit_extras.iter().map(|e| e.dice.average()).sum();
            let expected = 2.0 * normal.expression.doubled_average()
                + crit_only
                + normal.expression.undoubled_average();
            prop_assert!((crit.average() - expected).abs() < 1e-9);
        }
        // Splash is never inside the doubling.
        if let Some(splash) = item.splash {
            let text = format!("{splash} Spl. slashing");
            let outside = crit.text.rsplit(')').next().unwrap_or_default();
            prop_assert!(outside.contains(&text));
        }
    }

    #[test]
    fn prop_flat_damage_ignores_striking(flat in 1i32..=10, rank in striking(), character in character()) {
        let mut item = Item::weapon("Acid Flask", "1", "acid").with_runes(RuneState {
            striking: rank,
            ..RuneState::default()
        });
        item.damage = Some(BaseDamage::Flat(flat));
        let profile = calculate_weapon_damage(&item, &character).unwrap();
        prop_assert_eq!(&profile.normal.expression.base, &BaseDamage::Flat(flat));
        prop_assert_eq!(profile.normal.expression.dice_count(), None);
    }

    #[test]
    fn prop_striking_sets_minimum_dice(count in 1u32..=4, die in die_size(), rank in striking()) {
        let item = Item::weapon("Test Blade", Dice::new(count, die).to_string(), "slashing")
            .with_runes(RuneState { striking: rank, ..RuneState::default() });
        let profile = calculate_weapon_damage(&item, &Character::new("Prop")).unwrap();
        prop_assert_eq!(
            profile.normal.expression.dice_count(),
            Some(count.max(1 + rank.rank() as u32))
        );
    }
}
