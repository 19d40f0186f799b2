//! Cosmetic throw simulation
//!
//! A 2D projectile with ground bounces and three independent spin axes. The
//! face it lands on is only ever used to make the animation look plausible;
//! the authoritative total always comes from the sampler or an external
//! source and is reconciled separately (see `roll_with_physics`).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dice::reconcile::reconcile_outcome;
use crate::dice::rng::UniformSource;
use crate::dice::sampler::roll_with_sampler;
use crate::dice::types::{DiceDescriptor, RollOutcome, TrajectoryFrame};

/// Integration constants for the throw.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    pub steps: usize,
    pub time_step: f32,
    pub gravity: f32,
    /// Fraction of vertical speed kept on a bounce.
    pub restitution: f32,
    /// Fraction of horizontal speed kept on a bounce.
    pub friction: f32,
    /// Rotation multiplier applied on every bounce.
    pub spin_damping: f32,
    /// Settling needs strictly more bounces than this.
    pub settle_bounces: u32,
    pub settle_speed: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            time_step: 1.0 / 20.0,
            gravity: 9.8,
            restitution: 0.6,
            friction: 0.8,
            spin_damping: 0.9,
            settle_bounces: 2,
            settle_speed: 0.1,
        }
    }
}

/// How a single die leaves the hand.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThrowParams {
    pub velocity: f32,
    pub angle_degrees: f32,
    pub spin_degrees_per_second: f32,
}

impl Default for ThrowParams {
    fn default() -> Self {
        Self {
            velocity: 5.0,
            angle_degrees: 45.0,
            spin_degrees_per_second: 720.0,
        }
    }
}

/// One finished simulation run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Simulation {
    pub trajectory: Vec<TrajectoryFrame>,
    pub final_position: Vec2,
    pub final_rotation: Vec3,
    /// Cosmetic face in `[1, faces]`; never used as a roll result.
    pub simulated_result: u32,
}

impl Simulation {
    pub fn bounce_count(&self) -> u32 {
        self.trajectory.last().map_or(0, |f| f.bounce_count)
    }

    pub fn settled_early(&self, config: &PhysicsConfig) -> bool {
        self.trajectory.len() < config.steps
    }
}

/// Simulate one die with the default constants.
pub fn simulate<S: UniformSource + ?Sized>(
    faces: u32,
    params: ThrowParams,
    source: &mut S,
) -> Simulation {
    simulate_with(&PhysicsConfig::default(), faces, params, source)
}

/// Simulate one die. Stateless: every call starts from the origin with fresh spin rates.
pub fn simulate_with<S: UniformSource + ?Sized>(
    config: &PhysicsConfig,
    faces: u32,
    params: ThrowParams,
    source: &mut S,
) -> Simulation {
    let angle = params.angle_degrees.to_radians();
    let mut position = Vec2::ZERO;
    let mut velocity = Vec2::new(angle.cos(), angle.sin()) * params.velocity;
    let mut rotation = Vec3::ZERO;
    let mut spin_rate = || params.spin_degrees_per_second * (source.next_uniform() as f32 - 0.5);
    let angular_velocity = Vec3::new(spin_rate(), spin_rate(), spin_rate());
    let mut bounce_count = 0u32;

    let mut trajectory = Vec::with_capacity(config.steps);
    for _ in 0..config.steps {
        velocity.y -= config.gravity * config.time_step;
        position += velocity * config.time_step;
        rotation = wrap_degrees(rotation + angular_velocity * config.time_step);

        if position.y < 0.0 {
            position.y = 0.0;
            velocity.y = -velocity.y * config.restitution;
            velocity.x *= config.friction;
            rotation *= config.spin_damping;
            bounce_count += 1;
        }

        trajectory.push(TrajectoryFrame {
            position,
            rotation,
            velocity,
            bounce_count,
        });

        if bounce_count > config.settle_bounces
            && velocity.x.abs() < config.settle_speed
            && velocity.y.abs() < config.settle_speed
        {
            break;
        }
    }

    let simulated_result = face_from_rotation(rotation, faces);
    Simulation {
        trajectory,
        final_position: position,
        final_rotation: rotation,
        simulated_result,
    }
}

/// Map the final orientation onto a face: the rotation sum modulo 360,
/// proportionally into `[1, faces]`.
pub fn face_from_rotation(rotation: Vec3, faces: u32) -> u32 {
    let faces = faces.max(1);
    let sum = wrap_angle(rotation.x + rotation.y + rotation.z);
    let face = (sum / 360.0 * faces as f32).floor() as u32 + 1;
    face.min(faces)
}

fn wrap_degrees(rotation: Vec3) -> Vec3 {
    Vec3::new(
        wrap_angle(rotation.x),
        wrap_angle(rotation.y),
        wrap_angle(rotation.z),
    )
}

fn wrap_angle(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 || !wrapped.is_finite() {
        0.0
    } else {
        wrapped
    }
}

/// Where the binding total of a physics roll comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthoritativeSource {
    /// Draw the total with the sampler.
    Sampler,
    /// Use a total decided elsewhere (e.g. by a game server).
    External(i64),
}

/// A physics roll: the binding outcome and the per-die cosmetic runs, kept apart.
#[derive(Clone, Debug, PartialEq)]
pub struct PhysicsRoll {
    pub outcome: RollOutcome,
    pub simulations: Vec<Simulation>,
}

/// Simulate every die for the animation, then reconcile the authoritative
/// total into a per-die display breakdown.
///
/// Die `i` uses `params[i]`; when fewer params than dice are given the last
/// one is reused, and an empty slice means [`ThrowParams::default`].
pub fn roll_with_physics<S: UniformSource + ?Sized>(
    descriptor: &DiceDescriptor,
    params: &[ThrowParams],
    authority: AuthoritativeSource,
    source: &mut S,
) -> PhysicsRoll {
    let simulations: Vec<Simulation> = (0..descriptor.count() as usize)
        .map(|i| {
            let throw = params
                .get(i)
                .or(params.last())
                .copied()
                .unwrap_or_default();
            simulate(descriptor.faces(), throw, source)
        })
        .collect();

    let total = match authority {
        AuthoritativeSource::Sampler => roll_with_sampler(descriptor, source).total(),
        AuthoritativeSource::External(total) => total,
    };
    let outcome = reconcile_outcome(descriptor, total);

    debug!(
        notation = %descriptor,
        total,
        cosmetic = ?simulations.iter().map(|s| s.simulated_result).collect::<Vec<_>>(),
        "physics roll"
    );

    PhysicsRoll {
        outcome,
        simulations,
    }
}
