//! Property tests for notation parsing, sampling and reconciliation

use proptest::prelude::*;

use rollreveal::dice::{
    parse_notation, reconcile, reconcile_outcome, roll_with_physics, roll_with_sampler, simulate,
    AuthoritativeSource, SeededSource, ThrowParams,
};

fn notation(count: Option<u32>, faces: u32, modifier: i64) -> String {
    let count = count.map(|c| c.to_string()).unwrap_or_default();
    match modifier {
        0 => format!("{count}d{faces}"),
        m if m > 0 => format!("{count}d{faces}+{m}"),
        m => format!("{count}d{faces}-{}", -m),
    }
}

proptest! {
    #[test]
    fn parse_recovers_every_valid_notation(
        count in proptest::option::of(1u32..=1000),
        faces in 1u32..=1000,
        modifier in -500i64..=500,
        upper in any::<bool>(),
    ) {
        let mut text = notation(count, faces, modifier);
        if upper {
            text = text.replace('d', "D");
        }
        let descriptor = parse_notation(&text).unwrap();
        prop_assert_eq!(descriptor.count(), count.unwrap_or(1));
        prop_assert_eq!(descriptor.faces(), faces);
        prop_assert_eq!(descriptor.modifier(), modifier);
        prop_assert_eq!(descriptor.to_string().to_lowercase(), notation(Some(count.unwrap_or(1)), faces, modifier));
    }

    #[test]
    fn parse_rejects_text_without_dice(text in "[a-ce-zA-CE-Z0-9+ -]{0,12}") {
        prop_assert!(parse_notation(&text).is_err());
    }

    #[test]
    fn sampled_outcomes_sum_to_total(
        count in 1u32..=12,
        faces in 1u32..=100,
        modifier in -20i64..=20,
        seed in any::<u64>(),
    ) {
        let descriptor = parse_notation(&notation(Some(count), faces, modifier)).unwrap();
        let outcome = roll_with_sampler(&descriptor, &mut SeededSource::new(seed));
        prop_assert_eq!(outcome.per_die().len(), count as usize);
        prop_assert_eq!(outcome.per_die().iter().sum::<i64>() + modifier, outcome.total());
        prop_assert!(outcome.is_plausible());
    }

    #[test]
    fn reconciled_outcomes_sum_to_total(
        count in 1u32..=12,
        faces in 1u32..=100,
        modifier in -20i64..=20,
        total in -200i64..=1500,
    ) {
        let descriptor = parse_notation(&notation(Some(count), faces, modifier)).unwrap();
        let outcome = reconcile_outcome(&descriptor, total);
        prop_assert_eq!(outcome.total(), total);
        prop_assert_eq!(outcome.per_die().iter().sum::<i64>() + modifier, total);
    }

    #[test]
    fn reconciled_totals_never_overflow(
        count in 1u32..=12,
        modifier in -1000i64..=1000,
        total in any::<i64>(),
    ) {
        let descriptor = parse_notation(&notation(Some(count), 20, modifier)).unwrap();
        let outcome = reconcile_outcome(&descriptor, total);
        let sum: i128 = outcome.per_die().iter().map(|&v| i128::from(v)).sum();
        prop_assert_eq!(sum + i128::from(modifier), i128::from(outcome.total()));
        if total.checked_sub(modifier).is_some() {
            prop_assert_eq!(outcome.total(), total);
        }
    }

    #[test]
    fn reconcile_distributes_remainder_first(
        count in 1u32..=12,
        modifier in -20i64..=20,
        total in -200i64..=500,
    ) {
        let values = reconcile(total, modifier, count, 6);
        let dice_sum = total - modifier;
        let base = dice_sum.div_euclid(i64::from(count));
        let remainder = dice_sum.rem_euclid(i64::from(count)) as usize;
        for (i, v) in values.iter().enumerate() {
            let expected = if i < remainder { base + 1 } else { base };
            prop_assert_eq!(*v, expected);
        }
        prop_assert_eq!(values, reconcile(total, modifier, count, 6));
    }

    #[test]
    fn natural_totals_reconcile_onto_the_dice(count in 1u32..=8, faces in 1u32..=20, pick in 0.0f64..1.0) {
        let descriptor = parse_notation(&notation(Some(count), faces, 0)).unwrap();
        let span = (descriptor.max_total() - descriptor.min_total()) as f64;
        let total = descriptor.min_total() + (span * pick).floor() as i64;
        prop_assert!(reconcile_outcome(&descriptor, total).is_plausible());
    }

    #[test]
    fn simulation_never_exceeds_twenty_frames(
        velocity in 0.0f32..30.0,
        angle in 0.0f32..90.0,
        spin in 0.0f32..2000.0,
        faces in prop::sample::select(vec![4u32, 6, 8, 10, 12, 20, 100]),
        seed in any::<u64>(),
    ) {
        let params = ThrowParams { velocity, angle_degrees: angle, spin_degrees_per_second: spin };
        let sim = simulate(faces, params, &mut SeededSource::new(seed));
        prop_assert!(!sim.trajectory.is_empty() && sim.trajectory.len() <= 20);
        prop_assert!((1..=faces).contains(&sim.simulated_result));
        for frame in &sim.trajectory {
            prop_assert!(frame.position.y >= 0.0);
            for axis in frame.rotation.to_array() {
                prop_assert!((0.0..360.0).contains(&axis));
            }
        }
    }

    #[test]
    fn physics_never_overrides_the_external_total(total in -50i64..=150, seed in any::<u64>()) {
        let descriptor = parse_notation("3d20+1").unwrap();
        let roll = roll_with_physics(
            &descriptor,
            &[ThrowParams::default()],
            AuthoritativeSource::External(total),
            &mut SeededSource::new(seed),
        );
        prop_assert_eq!(roll.outcome.total(), total);
        prop_assert_eq!(roll.simulations.len(), 3);
    }
}
