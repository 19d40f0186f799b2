//! Dice-related types
//!
//! This module contains the value types shared by every stage of a roll:
//! DiceType, DiceDescriptor, RollOutcome, TrajectoryFrame and AnimationState.

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::dice::notation::ParseFailure;

/// Upper bound on dice per roll; larger counts are rejected at parse time.
pub const MAX_DICE_COUNT: u32 = 1000;

/// All canonical dice types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiceType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
}

impl DiceType {
    pub const ALL: [DiceType; 7] = [
        DiceType::D4,
        DiceType::D6,
        DiceType::D8,
        DiceType::D10,
        DiceType::D12,
        DiceType::D20,
        DiceType::D100,
    ];

    pub fn max_value(&self) -> u32 {
        match self {
            DiceType::D4 => 4,
            DiceType::D6 => 6,
            DiceType::D8 => 8,
            DiceType::D10 => 10,
            DiceType::D12 => 12,
            DiceType::D20 => 20,
            DiceType::D100 => 100,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DiceType::D4 => "D4",
            DiceType::D6 => "D6",
            DiceType::D8 => "D8",
            DiceType::D10 => "D10",
            DiceType::D12 => "D12",
            DiceType::D20 => "D20",
            DiceType::D100 => "D100",
        }
    }

    pub fn parse(s: &str) -> Option<DiceType> {
        match s.to_lowercase().as_str() {
            "d4" => Some(DiceType::D4),
            "d6" => Some(DiceType::D6),
            "d8" => Some(DiceType::D8),
            "d10" => Some(DiceType::D10),
            "d12" => Some(DiceType::D12),
            "d20" => Some(DiceType::D20),
            "d100" => Some(DiceType::D100),
            _ => None,
        }
    }

    /// Canonical die for a face count, `None` for anything outside the seven.
    pub fn from_faces(faces: u32) -> Option<DiceType> {
        DiceType::ALL.into_iter().find(|d| d.max_value() == faces)
    }
}

/// A parsed dice expression: `count` dice with `faces` sides plus `modifier`.
///
/// Constructed only through [`DiceDescriptor::new`] or the notation parser, so
/// `count >= 1` and `faces >= 1` always hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct DiceDescriptor {
    count: u32,
    faces: u32,
    modifier: i64,
}

impl DiceDescriptor {
    pub fn new(count: u32, faces: u32, modifier: i64) -> Result<Self, ParseFailure> {
        if count == 0 {
            return Err(ParseFailure::ZeroCount);
        }
        if count > MAX_DICE_COUNT {
            return Err(ParseFailure::TooManyDice {
                count,
                max: MAX_DICE_COUNT,
            });
        }
        if faces == 0 {
            return Err(ParseFailure::ZeroFaces);
        }
        Ok(Self {
            count,
            faces,
            modifier,
        })
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn faces(&self) -> u32 {
        self.faces
    }

    pub fn modifier(&self) -> i64 {
        self.modifier
    }

    pub fn die_type(&self) -> Option<DiceType> {
        DiceType::from_faces(self.faces)
    }

    /// Smallest total the dice can naturally produce.
    pub fn min_total(&self) -> i64 {
        i64::from(self.count).saturating_add(self.modifier)
    }

    /// Largest total the dice can naturally produce.
    pub fn max_total(&self) -> i64 {
        (i64::from(self.count) * i64::from(self.faces)).saturating_add(self.modifier)
    }
}

impl fmt::Display for DiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d{}", self.count, self.faces)?;
        match self.modifier {
            0 => Ok(()),
            m if m > 0 => write!(f, "+{m}"),
            m => write!(f, "{m}"),
        }
    }
}

pub(crate) fn saturate_i64(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Natural-20 / natural-1 flags for a set of per-die values.
///
/// Only 20-sided dice can be critical.
pub fn classify_criticals(faces: u32, per_die: &[i64]) -> (bool, bool) {
    if faces != 20 {
        return (false, false);
    }
    let success = per_die.iter().any(|&v| v == 20);
    let failure = per_die.iter().any(|&v| v == 1);
    (success, failure)
}

/// A finished roll: total, per-die breakdown and criticality.
///
/// Always satisfies `sum(per_die) + descriptor.modifier() == total`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RollOutcome {
    descriptor: DiceDescriptor,
    total: i64,
    per_die: Vec<i64>,
    is_critical_success: bool,
    is_critical_failure: bool,
}

impl RollOutcome {
    /// Build an outcome from per-die values; the total and criticals are derived.
    ///
    /// The total saturates at the `i64` limits.
    pub fn from_per_die(descriptor: DiceDescriptor, per_die: Vec<i64>) -> Self {
        let sum = per_die.iter().map(|&v| i128::from(v)).sum::<i128>()
            + i128::from(descriptor.modifier());
        let total = saturate_i64(sum);
        let (is_critical_success, is_critical_failure) =
            classify_criticals(descriptor.faces(), &per_die);
        Self {
            descriptor,
            total,
            per_die,
            is_critical_success,
            is_critical_failure,
        }
    }

    pub fn descriptor(&self) -> &DiceDescriptor {
        &self.descriptor
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn per_die(&self) -> &[i64] {
        &self.per_die
    }

    pub fn is_critical_success(&self) -> bool {
        self.is_critical_success
    }

    pub fn is_critical_failure(&self) -> bool {
        self.is_critical_failure
    }

    /// True when every per-die value is a face the die can actually show.
    pub fn is_plausible(&self) -> bool {
        let faces = i64::from(self.descriptor.faces());
        self.per_die.iter().all(|&v| (1..=faces).contains(&v))
    }
}

/// One integration step of the cosmetic physics throw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryFrame {
    pub position: Vec2,
    /// Degrees, each axis in `[0, 360)`.
    pub rotation: Vec3,
    pub velocity: Vec2,
    pub bounce_count: u32,
}

/// Visual phase of a single animated reveal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationState {
    #[default]
    Idle,
    Rolling,
    Slowing,
    Revealed,
}

impl AnimationState {
    pub fn label(&self) -> &'static str {
        match self {
            AnimationState::Idle => "idle",
            AnimationState::Rolling => "rolling",
            AnimationState::Slowing => "slowing",
            AnimationState::Revealed => "revealed",
        }
    }
}

/// D&D ability modifier: `floor((score - 10) / 2)`.
///
/// Modifier derivation belongs to callers; the engine only receives the result.
pub fn ability_modifier(score: i32) -> i32 {
    (score - 10).div_euclid(2)
}
