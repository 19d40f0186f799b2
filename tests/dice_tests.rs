//! Tests for dice types, notation, sampling and reconciliation

use rollreveal::dice::{
    ability_modifier, parse_notation, reconcile, reconcile_outcome, roll_with_sampler,
    DiceStyle, DiceType, DieShape, ParseFailure, RollOutcome, ScriptedSource,
};

#[test]
fn test_dice_type_max_values() {
    assert_eq!(DiceType::D4.max_value(), 4);
    assert_eq!(DiceType::D6.max_value(), 6);
    assert_eq!(DiceType::D8.max_value(), 8);
    assert_eq!(DiceType::D10.max_value(), 10);
    assert_eq!(DiceType::D12.max_value(), 12);
    assert_eq!(DiceType::D20.max_value(), 20);
    assert_eq!(DiceType::D100.max_value(), 100);
}

#[test]
fn test_dice_type_parse() {
    assert_eq!(DiceType::parse("d20"), Some(DiceType::D20));
    assert_eq!(DiceType::parse("D100"), Some(DiceType::D100));
    assert_eq!(DiceType::parse("d3"), None);
    assert_eq!(DiceType::parse(""), None);
}

#[test]
fn test_non_canonical_faces_still_roll() {
    let descriptor = parse_notation("2d7").unwrap();
    assert_eq!(descriptor.die_type(), None);
    assert_eq!(DiceStyle::for_faces(7).shape, DieShape::Sphere);

    let mut source = ScriptedSource::from_faces(7, &[7, 1]);
    let outcome = roll_with_sampler(&descriptor, &mut source);
    assert_eq!(outcome.per_die(), &[7, 1]);
    assert!(!outcome.is_critical_failure());
}

#[test]
fn test_scenario_2d8_plus_2() {
    let descriptor = parse_notation("2d8+2").unwrap();
    assert_eq!(
        (descriptor.count(), descriptor.faces(), descriptor.modifier()),
        (2, 8, 2)
    );

    let mut source = ScriptedSource::from_faces(8, &[3, 5]);
    let outcome = roll_with_sampler(&descriptor, &mut source);
    assert_eq!(outcome.total(), 10);
    assert_eq!(outcome.per_die(), &[3, 5]);
}

#[test]
fn test_scenario_reconcile_3d6() {
    assert_eq!(reconcile(17, 2, 3, 6), vec![5, 5, 5]);
}

#[test]
fn test_scenario_reconcile_single_d20() {
    let outcome = reconcile_outcome(&parse_notation("1d20").unwrap(), 11);
    assert_eq!(outcome.per_die(), &[11]);
    assert!(!outcome.is_critical_success());
    assert!(!outcome.is_critical_failure());
}

#[test]
fn test_criticals_only_on_d20() {
    let d20 = parse_notation("3d20").unwrap();
    let both = RollOutcome::from_per_die(d20, vec![20, 1, 9]);
    assert!(both.is_critical_success());
    assert!(both.is_critical_failure());

    let d100 = parse_notation("1d100").unwrap();
    let outcome = RollOutcome::from_per_die(d100, vec![20]);
    assert!(!outcome.is_critical_success());
    let outcome = RollOutcome::from_per_die(d100, vec![1]);
    assert!(!outcome.is_critical_failure());
}

#[test]
fn test_unparsable_notation_is_distinguishable_from_zero_modifier() {
    assert_eq!(parse_notation("1d20+0").unwrap().modifier(), 0);
    assert_eq!(parse_notation(""), Err(ParseFailure::Empty));
    assert!(matches!(
        parse_notation("roll a d20"),
        Err(ParseFailure::Malformed { .. })
    ));
    assert_eq!(parse_notation("0d6"), Err(ParseFailure::ZeroCount));
}

#[test]
fn test_ability_modifier_floors() {
    assert_eq!(ability_modifier(10), 0);
    assert_eq!(ability_modifier(11), 0);
    assert_eq!(ability_modifier(18), 4);
    assert_eq!(ability_modifier(9), -1);
    assert_eq!(ability_modifier(1), -5);
}
