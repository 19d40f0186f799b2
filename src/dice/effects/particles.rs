//! Reveal particle burst
//!
//! A small fixed-step simulation: every frame each particle moves by its
//! velocity, gravity pulls its velocity down and its alpha fades with age.
//! The burst is over once every particle has outlived its own lifetime.

use std::time::Duration;

use glam::Vec2;
use serde::Serialize;

use crate::dice::reveal::timeline::scale_duration;
use crate::dice::rng::UniformSource;
use crate::dice::task::{spawn_cancelable, TaskHandle, TaskStatus};

use super::cues::EffectTier;

/// Simulated time per frame, in seconds.
pub const PARTICLE_STEP_SECS: f32 = 1.0 / 60.0;

/// Wall-clock frame interval at animation speed 1.
pub const PARTICLE_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

const GOLD: [f32; 4] = [1.0, 0.84, 0.0, 1.0];
const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const GREEN: [f32; 4] = [0.2, 0.9, 0.3, 1.0];
const RED: [f32; 4] = [0.9, 0.1, 0.1, 1.0];
const DARK_RED: [f32; 4] = [0.5, 0.0, 0.0, 1.0];
const GREY: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ParticleShape {
    Circle,
    Star,
    Square,
}

/// Burst parameters for one criticality tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBurstConfig {
    pub count: usize,
    pub palette: &'static [[f32; 4]],
    pub shapes: &'static [ParticleShape],
    /// Full width of the emission cone, centered straight up.
    pub spread_degrees: f32,
    /// Downward velocity gained per frame.
    pub gravity: f32,
    /// Nominal lifetime; each particle lives `lifetime * (0.5 + u)`.
    pub lifetime_secs: f32,
    /// Initial speed range per frame.
    pub min_speed: f32,
    pub max_speed: f32,
}

impl ParticleBurstConfig {
    pub fn for_tier(tier: EffectTier) -> Self {
        match tier {
            EffectTier::Normal => Self {
                count: 30,
                palette: &[GOLD, WHITE],
                shapes: &[ParticleShape::Circle],
                spread_degrees: 90.0,
                gravity: 0.25,
                lifetime_secs: 1.0,
                min_speed: 2.0,
                max_speed: 6.0,
            },
            EffectTier::CriticalSuccess => Self {
                count: 120,
                palette: &[GOLD, GREEN, WHITE],
                shapes: &[ParticleShape::Star, ParticleShape::Circle],
                spread_degrees: 360.0,
                gravity: 0.15,
                lifetime_secs: 2.0,
                min_speed: 3.0,
                max_speed: 9.0,
            },
            EffectTier::CriticalFailure => Self {
                count: 60,
                palette: &[RED, DARK_RED, GREY],
                shapes: &[ParticleShape::Square, ParticleShape::Circle],
                spread_degrees: 120.0,
                gravity: 0.6,
                lifetime_secs: 1.5,
                min_speed: 2.0,
                max_speed: 7.0,
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub color: [f32; 4],
    pub shape: ParticleShape,
    pub size: f32,
    pub age: f32,
    pub lifetime: f32,
}

impl Particle {
    pub fn is_alive(&self) -> bool {
        self.age < self.lifetime
    }

    /// Fades linearly from 1 at spawn to 0 at end of life.
    pub fn alpha(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0)
    }
}

fn pick<T: Copy, S: UniformSource + ?Sized>(items: &[T], source: &mut S) -> Option<T> {
    if items.is_empty() {
        return None;
    }
    let index = (source.next_uniform().clamp(0.0, 1.0) * items.len() as f64) as usize;
    items.get(index.min(items.len() - 1)).copied()
}

#[derive(Clone, Debug)]
pub struct ParticleBurst {
    tier: EffectTier,
    particles: Vec<Particle>,
    frames: u32,
}

impl ParticleBurst {
    pub fn spawn<S: UniformSource + ?Sized>(
        tier: EffectTier,
        origin: Vec2,
        source: &mut S,
    ) -> Self {
        let config = ParticleBurstConfig::for_tier(tier);
        let particles = (0..config.count)
            .map(|_| {
                let angle = 90.0 + config.spread_degrees * (source.next_uniform() as f32 - 0.5);
                let speed = config.min_speed
                    + (config.max_speed - config.min_speed) * source.next_uniform() as f32;
                let lifetime = config.lifetime_secs * (0.5 + source.next_uniform() as f32);
                Particle {
                    position: origin,
                    velocity: Vec2::from_angle(angle.to_radians()) * speed,
                    color: pick(config.palette, source).unwrap_or(WHITE),
                    shape: pick(config.shapes, source).unwrap_or(ParticleShape::Circle),
                    size: 2.0 + 3.0 * source.next_uniform() as f32,
                    age: 0.0,
                    lifetime,
                }
            })
            .collect();

        Self {
            tier,
            particles,
            frames: 0,
        }
    }

    pub fn tier(&self) -> EffectTier {
        self.tier
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn live_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_alive()).count()
    }

    pub fn is_finished(&self) -> bool {
        self.particles.iter().all(|p| !p.is_alive())
    }

    /// Advance one frame. Returns `true` while any particle is still alive.
    pub fn step(&mut self) -> bool {
        let gravity = ParticleBurstConfig::for_tier(self.tier).gravity;
        for particle in self.particles.iter_mut().filter(|p| p.is_alive()) {
            particle.position += particle.velocity;
            particle.velocity.y -= gravity;
            particle.age += PARTICLE_STEP_SECS;
        }
        self.frames += 1;
        !self.is_finished()
    }
}

/// Cancellation handle for an animated burst.
#[derive(Debug)]
pub struct BurstHandle {
    task: TaskHandle,
}

impl BurstHandle {
    /// Stop the frame loop. A no-op once the burst has finished.
    pub fn cancel(&self) -> bool {
        self.task.cancel()
    }

    pub fn is_finished(&self) -> bool {
        self.task.status() != TaskStatus::Running
    }
}

/// Step `burst` once per frame, `PARTICLE_FRAME_INTERVAL / speed` apart, and
/// hand every frame to `on_frame` until the burst is over.
///
/// Must be called from within a tokio `LocalSet`.
pub fn animate_particle_burst<F>(mut burst: ParticleBurst, speed: f32, mut on_frame: F) -> BurstHandle
where
    F: FnMut(&ParticleBurst) + 'static,
{
    let speed = crate::dice::types::clamp_animation_speed(speed);
    let period = scale_duration(PARTICLE_FRAME_INTERVAL, speed);

    let task = spawn_cancelable(move |token| async move {
        let mut ticker = tokio::time::interval(period);
        // the first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if token.is_cancelled() {
                return;
            }
            let alive = burst.step();
            on_frame(&burst);
            if !alive {
                return;
            }
        }
    });

    BurstHandle { task }
}
