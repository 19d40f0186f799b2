//! Fires the reveal side effects: one sound cue, a vibration pattern for
//! criticals and a particle burst, each gated by its settings flag.
//!
//! Every side effect is best-effort. Playback failures are logged and
//! counted, never returned. A volume of zero mutes sound entirely.

use glam::Vec2;
use tracing::{debug, warn};

use crate::dice::rng::UniformSource;
use crate::dice::types::{EffectSettings, RollOutcome};

use super::cues::{AudioOutput, EffectPlaybackFailure, EffectTier, HapticOutput, SoundCue};
use super::particles::ParticleBurst;

/// What a `trigger_effects` call actually did.
#[derive(Clone, Debug)]
pub struct EffectReport {
    pub tier: EffectTier,
    /// Cue that played successfully.
    pub sound: Option<SoundCue>,
    /// Pattern that was sent to the vibration motor successfully.
    pub vibration: Option<&'static [u32]>,
    /// Burst to animate, when particles are enabled.
    pub burst: Option<ParticleBurst>,
    /// Playback failures swallowed during this call.
    pub swallowed_failures: usize,
}

pub struct EffectDispatcher<A, H> {
    audio: A,
    haptics: H,
    origin: Vec2,
}

impl<A: AudioOutput, H: HapticOutput> EffectDispatcher<A, H> {
    pub fn new(audio: A, haptics: H) -> Self {
        Self {
            audio,
            haptics,
            origin: Vec2::ZERO,
        }
    }

    /// Where particle bursts spawn.
    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn haptics(&self) -> &H {
        &self.haptics
    }

    pub fn trigger_effects<S: UniformSource + ?Sized>(
        &mut self,
        outcome: &RollOutcome,
        settings: &EffectSettings,
        source: &mut S,
    ) -> EffectReport {
        let settings = settings.sanitized();
        let tier = EffectTier::classify(outcome);
        let mut report = EffectReport {
            tier,
            sound: None,
            vibration: None,
            burst: None,
            swallowed_failures: 0,
        };

        if settings.sound_enabled && settings.volume > 0.0 {
            let cue = tier.sound();
            match self.audio.play(cue, settings.volume) {
                Ok(()) => report.sound = Some(cue),
                Err(err) => {
                    log_failure("sound", &err);
                    report.swallowed_failures += 1;
                }
            }
        }

        if settings.vibration_enabled {
            if let Some(pattern) = tier.vibration_pattern() {
                match self.haptics.vibrate(pattern) {
                    Ok(()) => report.vibration = Some(pattern),
                    Err(err) => {
                        log_failure("vibration", &err);
                        report.swallowed_failures += 1;
                    }
                }
            }
        }

        if settings.particles_enabled {
            report.burst = Some(ParticleBurst::spawn(tier, self.origin, source));
        }

        debug!(
            tier = tier.label(),
            sound = ?report.sound,
            particles = report.burst.as_ref().map_or(0, |b| b.particles().len()),
            failures = report.swallowed_failures,
            "effects triggered"
        );
        report
    }

    /// The roll-start shake cue. Returns whether it played.
    pub fn play_shake_cue(&mut self, settings: &EffectSettings) -> bool {
        let settings = settings.sanitized();
        if !settings.sound_enabled || !settings.shake_on_roll || settings.volume <= 0.0 {
            return false;
        }
        match self.audio.play(SoundCue::Shake, settings.volume) {
            Ok(()) => true,
            Err(err) => {
                log_failure("shake cue", &err);
                false
            }
        }
    }
}

/// Missing hardware is expected on many hosts; anything else is worth a warning.
fn log_failure(channel: &str, err: &EffectPlaybackFailure) {
    match err {
        EffectPlaybackFailure::Unsupported => debug!("{channel} skipped: {err}"),
        _ => warn!("{channel} playback failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::notation::parse_notation;
    use crate::dice::rng::SeededSource;

    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<(SoundCue, f32)>,
        deny: bool,
    }

    impl AudioOutput for RecordingAudio {
        fn play(&mut self, cue: SoundCue, volume: f32) -> Result<(), EffectPlaybackFailure> {
            if self.deny {
                return Err(EffectPlaybackFailure::PermissionDenied);
            }
            self.played.push((cue, volume));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingHaptics {
        patterns: Vec<Vec<u32>>,
    }

    impl HapticOutput for RecordingHaptics {
        fn vibrate(&mut self, pattern_ms: &[u32]) -> Result<(), EffectPlaybackFailure> {
            self.patterns.push(pattern_ms.to_vec());
            Ok(())
        }
    }

    fn nat(value: i64) -> RollOutcome {
        RollOutcome::from_per_die(parse_notation("1d20").unwrap(), vec![value])
    }

    #[test]
    fn test_critical_success_fires_everything() {
        let mut dispatcher =
            EffectDispatcher::new(RecordingAudio::default(), RecordingHaptics::default());
        let settings = EffectSettings {
            volume: 0.5,
            ..EffectSettings::default()
        };
        let report = dispatcher.trigger_effects(&nat(20), &settings, &mut SeededSource::new(1));

        assert_eq!(report.tier, EffectTier::CriticalSuccess);
        assert_eq!(dispatcher.audio().played, vec![(SoundCue::CriticalSuccess, 0.5)]);
        assert_eq!(dispatcher.haptics().patterns, vec![vec![100, 50, 100]]);
        assert_eq!(report.burst.map(|b| b.particles().len()), Some(120));
    }

    #[test]
    fn test_normal_roll_does_not_vibrate() {
        let mut dispatcher =
            EffectDispatcher::new(RecordingAudio::default(), RecordingHaptics::default())
                .with_origin(Vec2::new(3.0, 4.0));
        let report =
            dispatcher.trigger_effects(&nat(9), &EffectSettings::default(), &mut SeededSource::new(1));
        assert_eq!(report.sound, Some(SoundCue::Normal));
        assert_eq!(report.vibration, None);
        assert!(dispatcher.haptics().patterns.is_empty());

        let burst = report.burst.unwrap();
        assert_eq!(burst.particles().len(), 30);
        assert!(burst.particles().iter().all(|p| p.position == Vec2::new(3.0, 4.0)));
    }

    #[test]
    fn test_disabled_channels_are_skipped() {
        let mut dispatcher =
            EffectDispatcher::new(RecordingAudio::default(), RecordingHaptics::default());
        let settings = EffectSettings {
            sound_enabled: false,
            vibration_enabled: false,
            particles_enabled: false,
            ..EffectSettings::default()
        };
        let report = dispatcher.trigger_effects(&nat(1), &settings, &mut SeededSource::new(1));
        assert_eq!(report.tier, EffectTier::CriticalFailure);
        assert!(report.sound.is_none() && report.vibration.is_none() && report.burst.is_none());
        assert!(dispatcher.audio().played.is_empty());
    }

    #[test]
    fn test_zero_volume_mutes_sound() {
        let mut dispatcher =
            EffectDispatcher::new(RecordingAudio::default(), RecordingHaptics::default());
        let muted = EffectSettings {
            volume: 0.0,
            ..EffectSettings::default()
        };
        let report = dispatcher.trigger_effects(&nat(20), &muted, &mut SeededSource::new(1));
        assert_eq!(report.sound, None);
        assert_eq!(report.swallowed_failures, 0);
        assert!(!dispatcher.play_shake_cue(&muted));
        assert!(dispatcher.audio().played.is_empty());
        assert_eq!(dispatcher.haptics().patterns.len(), 1);
    }

    #[test]
    fn test_unsupported_audio_is_not_reported_as_played() {
        let mut dispatcher =
            EffectDispatcher::new(crate::dice::effects::NoAudio, RecordingHaptics::default());
        let report =
            dispatcher.trigger_effects(&nat(9), &EffectSettings::default(), &mut SeededSource::new(1));
        assert_eq!(report.sound, None);
        assert_eq!(report.swallowed_failures, 1);
        assert!(!dispatcher.play_shake_cue(&EffectSettings::default()));
    }

    #[test]
    fn test_playback_failures_are_swallowed() {
        let audio = RecordingAudio {
            deny: true,
            ..RecordingAudio::default()
        };
        let mut dispatcher = EffectDispatcher::new(audio, crate::dice::effects::NoHaptics);
        let report =
            dispatcher.trigger_effects(&nat(1), &EffectSettings::default(), &mut SeededSource::new(1));
        assert_eq!(report.swallowed_failures, 2);
        assert!(report.sound.is_none());
        assert_eq!(report.burst.map(|b| b.particles().len()), Some(60));
    }

    #[test]
    fn test_shake_cue_respects_settings() {
        let mut dispatcher =
            EffectDispatcher::new(RecordingAudio::default(), RecordingHaptics::default());
        assert!(dispatcher.play_shake_cue(&EffectSettings::default()));
        let quiet = EffectSettings {
            shake_on_roll: false,
            ..EffectSettings::default()
        };
        assert!(!dispatcher.play_shake_cue(&quiet));
        assert_eq!(dispatcher.audio().played.len(), 1);
    }
}
