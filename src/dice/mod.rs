pub mod effects;
pub mod history;
pub mod notation;
pub mod physics;
pub mod reconcile;
pub mod reveal;
pub mod rng;
pub mod sampler;
pub mod session;
pub mod task;
pub mod types;

pub use effects::{EffectDispatcher, EffectPlaybackFailure, EffectReport, EffectTier};
pub use history::{HistoryEntry, RollHistory, HISTORY_CAPACITY};
pub use notation::{parse_notation, ParseFailure};
pub use physics::{roll_with_physics, simulate, AuthoritativeSource, PhysicsRoll, ThrowParams};
pub use reconcile::{reconcile, reconcile_outcome};
pub use reveal::{start_animated_reveal, RevealHandle, RevealRequest, RevealTimings};
pub use rng::{ScriptedSource, SeededSource, ThreadSource, UniformSource};
pub use sampler::roll_with_sampler;
pub use session::{RollObserver, RollRequest, RollSession};
pub use types::*;
