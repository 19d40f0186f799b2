//! Back-derive a per-die display breakdown from an authoritative total.
//!
//! The breakdown always sums exactly to `total - modifier`. It is spread as
//! evenly as possible, with the remainder going to the leading dice. Totals
//! outside the natural range of the dice yield values outside `[1, faces]`;
//! they are returned as-is, never clamped.
//!
//! The only adjustment is at the integer limits: a `total - modifier` that
//! does not fit in an `i64` saturates, so the outcome total lands on the
//! nearest representable value instead of overflowing.

use tracing::{debug, warn};

use crate::dice::types::dice::saturate_i64;
use crate::dice::types::{DiceDescriptor, RollOutcome};

/// `count` values of `floor((total - modifier) / count)`, the first
/// `(total - modifier) mod count` of them incremented by one.
pub fn reconcile(total: i64, modifier: i64, count: u32, faces: u32) -> Vec<i64> {
    let dice = i64::from(count.max(1));
    let dice_sum = saturate_i64(i128::from(total) - i128::from(modifier));
    if i128::from(dice_sum) + i128::from(modifier) != i128::from(total) {
        warn!(total, modifier, dice_sum, "authoritative total saturated at the i64 limit");
    }
    let base = dice_sum.div_euclid(dice);
    let remainder = dice_sum.rem_euclid(dice);

    let values: Vec<i64> = (0..dice)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect();

    let faces = i64::from(faces);
    if values.iter().any(|&v| v < 1 || v > faces) {
        debug!(
            total,
            modifier, count, faces, "authoritative total is outside the natural range of the dice"
        );
    }
    values
}

/// Reconciled outcome for `descriptor` whose total is exactly `total`.
pub fn reconcile_outcome(descriptor: &DiceDescriptor, total: i64) -> RollOutcome {
    let per_die = reconcile(
        total,
        descriptor.modifier(),
        descriptor.count(),
        descriptor.faces(),
    );
    RollOutcome::from_per_die(*descriptor, per_die)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::notation::parse_notation;

    #[test]
    fn test_even_split() {
        assert_eq!(reconcile(17, 2, 3, 6), vec![5, 5, 5]);
    }

    #[test]
    fn test_single_die() {
        let outcome = reconcile_outcome(&parse_notation("1d20").unwrap(), 11);
        assert_eq!(outcome.per_die(), &[11]);
        assert!(!outcome.is_critical_success());
        assert!(!outcome.is_critical_failure());
    }

    #[test]
    fn test_remainder_goes_first() {
        // 14 over 4 dice: base 3, remainder 2
        assert_eq!(reconcile(14, 0, 4, 6), vec![4, 4, 3, 3]);
        assert_eq!(reconcile(8, 1, 3, 8), vec![3, 2, 2]);
    }

    #[test]
    fn test_negative_dice_sum_floors() {
        // -7 over 3: floor is -3, remainder 2
        assert_eq!(reconcile(-7, 0, 3, 6), vec![-2, -2, -3]);
        assert_eq!(reconcile(-7, 0, 3, 6).iter().sum::<i64>(), -7);
    }

    #[test]
    fn test_out_of_range_totals_are_not_clamped() {
        let outcome = reconcile_outcome(&parse_notation("2d6").unwrap(), 30);
        assert_eq!(outcome.per_die(), &[15, 15]);
        assert_eq!(outcome.total(), 30);
        assert!(!outcome.is_plausible());

        let outcome = reconcile_outcome(&parse_notation("2d6+10").unwrap(), 10);
        assert_eq!(outcome.per_die(), &[0, 0]);
    }

    #[test]
    fn test_criticals_follow_reconciled_values() {
        let d20 = parse_notation("1d20+3").unwrap();
        assert!(reconcile_outcome(&d20, 23).is_critical_success());
        assert!(reconcile_outcome(&d20, 4).is_critical_failure());
        // 2d20 totalling 40 shows [20, 20]
        assert!(reconcile_outcome(&parse_notation("2d20").unwrap(), 40).is_critical_success());
    }

    #[test]
    fn test_totals_at_the_integer_limits() {
        let outcome = reconcile_outcome(&parse_notation("1d20-1").unwrap(), i64::MAX);
        assert_eq!(outcome.per_die(), &[i64::MAX]);
        assert_eq!(outcome.total(), i64::MAX - 1);

        let outcome = reconcile_outcome(&parse_notation("2d6+5").unwrap(), i64::MIN);
        assert_eq!(outcome.per_die(), &[i64::MIN / 2, i64::MIN / 2]);
        assert_eq!(outcome.total(), i64::MIN + 5);

        // representable extremes are kept exactly
        let outcome = reconcile_outcome(&parse_notation("3d6+2").unwrap(), i64::MAX);
        assert_eq!(outcome.total(), i64::MAX);
        let outcome = reconcile_outcome(&parse_notation("3d6-2").unwrap(), i64::MIN);
        assert_eq!(outcome.total(), i64::MIN);
    }

    #[test]
    fn test_deterministic() {
        let first = reconcile(23, -1, 5, 8);
        for _ in 0..10 {
            assert_eq!(reconcile(23, -1, 5, 8), first);
        }
    }
}
