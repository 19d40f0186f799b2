//! Animated reveal of a roll
//!
//! `state` holds the pure transition table, `timeline` interprets it against
//! an elapsed-time clock and `driver` runs a timeline on tokio timers.

pub mod driver;
pub mod state;
pub mod timeline;

pub use driver::{start_animated_reveal, RevealHandle};
pub use state::{transition, RevealCommand, RevealEvent, RevealState, RevealTimer};
pub use timeline::{
    RevealAuthority, RevealFrame, RevealNotice, RevealRequest, RevealTimeline, RevealTimings,
};
