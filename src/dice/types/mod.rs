//! Type definitions for the dice roll engine
//!
//! This module is organized into submodules:
//! - `dice` - Dice types, descriptors, outcomes, trajectory frames and animation state
//! - `style` - Shape and color lookup per face count
//! - `settings` - Effect settings and persistence

pub mod dice;
pub mod settings;
pub mod style;

// Re-export all public types for convenient access
pub use dice::*;
pub use settings::*;
pub use style::*;
