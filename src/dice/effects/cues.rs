//! Effect tiers, sound cues, haptic patterns and the output seams the
//! dispatcher plays them through.

use thiserror::Error;

use crate::dice::types::RollOutcome;

pub const CRIT_SUCCESS_VIBRATION_MS: [u32; 3] = [100, 50, 100];
pub const CRIT_FAILURE_VIBRATION_MS: [u32; 1] = [200];

/// Criticality tier of a revealed roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectTier {
    Normal,
    CriticalSuccess,
    CriticalFailure,
}

impl EffectTier {
    /// A roll showing both a natural 20 and a natural 1 counts as a success.
    pub fn classify(outcome: &RollOutcome) -> EffectTier {
        if outcome.is_critical_success() {
            EffectTier::CriticalSuccess
        } else if outcome.is_critical_failure() {
            EffectTier::CriticalFailure
        } else {
            EffectTier::Normal
        }
    }

    pub fn sound(&self) -> SoundCue {
        match self {
            EffectTier::Normal => SoundCue::Normal,
            EffectTier::CriticalSuccess => SoundCue::CriticalSuccess,
            EffectTier::CriticalFailure => SoundCue::CriticalFailure,
        }
    }

    /// Vibration on/off durations in milliseconds; normal rolls do not vibrate.
    pub fn vibration_pattern(&self) -> Option<&'static [u32]> {
        match self {
            EffectTier::Normal => None,
            EffectTier::CriticalSuccess => Some(&CRIT_SUCCESS_VIBRATION_MS),
            EffectTier::CriticalFailure => Some(&CRIT_FAILURE_VIBRATION_MS),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EffectTier::Normal => "normal",
            EffectTier::CriticalSuccess => "critical success",
            EffectTier::CriticalFailure => "critical failure",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Played when the dice start rolling.
    Shake,
    Normal,
    CriticalSuccess,
    CriticalFailure,
}

impl SoundCue {
    pub fn label(&self) -> &'static str {
        match self {
            SoundCue::Shake => "shake",
            SoundCue::Normal => "roll",
            SoundCue::CriticalSuccess => "critical success",
            SoundCue::CriticalFailure => "critical failure",
        }
    }
}

/// Audio or haptic output could not play. Never propagated past the dispatcher.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EffectPlaybackFailure {
    #[error("playback is not supported on this device")]
    Unsupported,
    #[error("playback permission was denied")]
    PermissionDenied,
    #[error("output device error: {0}")]
    Device(String),
}

pub trait AudioOutput {
    /// Play `cue` at `volume` in `[0, 1]`.
    fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), EffectPlaybackFailure>;
}

pub trait HapticOutput {
    /// Alternating vibrate/pause durations in milliseconds.
    fn vibrate(&mut self, pattern_ms: &[u32]) -> Result<(), EffectPlaybackFailure>;
}

/// For hosts without an audio device.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAudio;

impl AudioOutput for NoAudio {
    fn play(&mut self, _cue: SoundCue, _volume: f32) -> Result<(), EffectPlaybackFailure> {
        Err(EffectPlaybackFailure::Unsupported)
    }
}

/// For hosts without a vibration motor.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoHaptics;

impl HapticOutput for NoHaptics {
    fn vibrate(&mut self, _pattern_ms: &[u32]) -> Result<(), EffectPlaybackFailure> {
        Err(EffectPlaybackFailure::Unsupported)
    }
}
