//! Reveal side effects: sound, vibration and particles.

pub mod cues;
pub mod dispatcher;
pub mod particles;

pub use cues::{
    AudioOutput, EffectPlaybackFailure, EffectTier, HapticOutput, NoAudio, NoHaptics, SoundCue,
};
pub use dispatcher::{EffectDispatcher, EffectReport};
pub use particles::{
    animate_particle_burst, BurstHandle, Particle, ParticleBurst, ParticleBurstConfig,
    ParticleShape,
};
