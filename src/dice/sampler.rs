//! Authoritative roll sampling: one uniform draw per die plus the modifier.

use tracing::debug;

use crate::dice::notation::parse_notation;
use crate::dice::rng::{draw_face, UniformSource};
use crate::dice::types::{DiceDescriptor, RollOutcome};

/// Roll every die once and keep the real draws as the per-die breakdown.
pub fn roll_with_sampler<S: UniformSource + ?Sized>(
    descriptor: &DiceDescriptor,
    source: &mut S,
) -> RollOutcome {
    let per_die = draw_values(descriptor, source);
    let outcome = RollOutcome::from_per_die(*descriptor, per_die);
    debug!(
        notation = %descriptor,
        total = outcome.total(),
        per_die = ?outcome.per_die(),
        "sampled roll"
    );
    outcome
}

/// Independent draws for each die with no modifier applied.
///
/// Also used for the throwaway values shown while dice are still tumbling.
pub fn draw_values<S: UniformSource + ?Sized>(
    descriptor: &DiceDescriptor,
    source: &mut S,
) -> Vec<i64> {
    (0..descriptor.count())
        .map(|_| i64::from(draw_face(source, descriptor.faces())))
        .collect()
}

/// Quick total for a notation string; unparsable notation produces 0.
///
/// Only for display shortcuts. Anything that animates or records a roll must
/// go through [`parse_notation`] and refuse to continue on failure.
pub fn total_or_zero<S: UniformSource + ?Sized>(notation: &str, source: &mut S) -> i64 {
    match parse_notation(notation) {
        Ok(descriptor) => roll_with_sampler(&descriptor, source).total(),
        Err(err) => {
            debug!("not rolling '{notation}': {err}");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::rng::{ScriptedSource, SeededSource};

    #[test]
    fn test_scripted_draws_are_kept() {
        let descriptor = parse_notation("2d8+2").unwrap();
        let mut source = ScriptedSource::from_faces(8, &[3, 5]);
        let outcome = roll_with_sampler(&descriptor, &mut source);
        assert_eq!(outcome.total(), 10);
        assert_eq!(outcome.per_die(), &[3, 5]);
    }

    #[test]
    fn test_criticals_come_from_raw_draws() {
        let descriptor = parse_notation("1d20-5").unwrap();
        let mut source = ScriptedSource::from_faces(20, &[20]);
        let outcome = roll_with_sampler(&descriptor, &mut source);
        // total is 15, but the die itself is a natural 20
        assert_eq!(outcome.total(), 15);
        assert!(outcome.is_critical_success());
        assert!(!outcome.is_critical_failure());

        let descriptor = parse_notation("1d20+10").unwrap();
        let mut source = ScriptedSource::from_faces(20, &[1]);
        let outcome = roll_with_sampler(&descriptor, &mut source);
        assert_eq!(outcome.total(), 11);
        assert!(outcome.is_critical_failure());
    }

    #[test]
    fn test_values_stay_on_the_die() {
        let descriptor = parse_notation("50d7").unwrap();
        let mut source = SeededSource::new(7);
        for _ in 0..20 {
            let outcome = roll_with_sampler(&descriptor, &mut source);
            assert_eq!(outcome.per_die().len(), 50);
            assert!(outcome.is_plausible());
        }
    }

    #[test]
    fn test_total_or_zero() {
        let mut source = ScriptedSource::from_faces(6, &[4]);
        assert_eq!(total_or_zero("1d6+1", &mut source), 5);
        assert_eq!(total_or_zero("garbage", &mut source), 0);
        assert_eq!(total_or_zero("", &mut source), 0);
    }
}
