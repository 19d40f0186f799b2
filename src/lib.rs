//! Dice roll simulation and animated reveal engine.
//!
//! Parses dice notation, decides an authoritative total (sampled or supplied
//! from outside), runs an optional cosmetic physics throw, reconciles a
//! per-die breakdown that always sums to the total and sequences a cancelable
//! Rolling -> Slowing -> Revealed animation with sound, vibration and particle
//! effects. Finished rolls land in a bounded history.
//!
//! The timer-driven parts run on a single-threaded tokio `LocalSet`.

pub mod dice;
