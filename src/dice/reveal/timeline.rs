//! Reveal timeline
//!
//! Owns one reveal instance: its state, armed timers, display values and the
//! final outcome. Time is supplied by the caller as "elapsed since roll start",
//! so the same timeline runs under a tokio clock or a per-frame tick.

use std::time::Duration;

use tracing::{debug, trace};

use crate::dice::reconcile::reconcile_outcome;
use crate::dice::rng::{ThreadSource, UniformSource};
use crate::dice::sampler::draw_values;
use crate::dice::types::{clamp_animation_speed, AnimationState, DiceDescriptor, RollOutcome};

use super::state::{transition, RevealCommand, RevealEvent, RevealState, RevealTimer};

/// Phase timings, all relative to roll start except `complete_after`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealTimings {
    /// When Rolling gives way to Slowing.
    pub slowdown_at: Duration,
    /// When the final values are revealed.
    pub reveal_at: Duration,
    /// Delay between the reveal and the completion callback.
    pub complete_after: Duration,
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            slowdown_at: Duration::from_millis(400),
            reveal_at: Duration::from_millis(1000),
            complete_after: Duration::from_millis(500),
        }
    }
}

impl RevealTimings {
    /// Divide every timing by an animation speed in `[0.5, 2]`.
    pub fn scaled(self, speed: f32) -> Self {
        let speed = clamp_animation_speed(speed);
        Self {
            slowdown_at: scale_duration(self.slowdown_at, speed),
            reveal_at: scale_duration(self.reveal_at, speed),
            complete_after: scale_duration(self.complete_after, speed),
        }
    }
}

/// `duration / speed`, rounded to the nearest nanosecond.
pub(crate) fn scale_duration(duration: Duration, speed: f32) -> Duration {
    let nanos = duration.as_nanos() as f64 / f64::from(speed);
    Duration::from_nanos(nanos.round() as u64)
}

/// What the reveal settles on.
#[derive(Clone, Debug, PartialEq)]
pub enum RevealAuthority {
    /// An outcome with a real per-die breakdown (sampler or already reconciled).
    Outcome(RollOutcome),
    /// Only the total is known; the breakdown is reconciled at reveal time.
    Total {
        descriptor: DiceDescriptor,
        total: i64,
    },
}

impl RevealAuthority {
    pub fn descriptor(&self) -> &DiceDescriptor {
        match self {
            RevealAuthority::Outcome(outcome) => outcome.descriptor(),
            RevealAuthority::Total { descriptor, .. } => descriptor,
        }
    }

    /// Final outcome shown at the reveal.
    pub fn settle(&self) -> RollOutcome {
        match self {
            RevealAuthority::Outcome(outcome) => outcome.clone(),
            RevealAuthority::Total { descriptor, total } => reconcile_outcome(descriptor, *total),
        }
    }
}

/// Everything needed to run one reveal.
pub struct RevealRequest {
    pub authority: RevealAuthority,
    pub timings: RevealTimings,
    /// Flag the Rolling frame as a shake.
    pub shake: bool,
    /// Source for the throwaway mid-roll values.
    pub source: Box<dyn UniformSource>,
}

impl RevealRequest {
    pub fn new(outcome: RollOutcome) -> Self {
        Self::with_authority(RevealAuthority::Outcome(outcome))
    }

    pub fn from_total(descriptor: DiceDescriptor, total: i64) -> Self {
        Self::with_authority(RevealAuthority::Total { descriptor, total })
    }

    fn with_authority(authority: RevealAuthority) -> Self {
        Self {
            authority,
            timings: RevealTimings::default(),
            shake: false,
            source: Box::new(ThreadSource),
        }
    }

    pub fn with_timings(mut self, timings: RevealTimings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_shake(mut self, shake: bool) -> Self {
        self.shake = shake;
        self
    }

    pub fn with_source<S: UniformSource + 'static>(mut self, source: S) -> Self {
        self.source = Box::new(source);
        self
    }
}

/// Snapshot handed to the phase-change observer.
#[derive(Clone, Debug, PartialEq)]
pub struct RevealFrame {
    pub state: AnimationState,
    /// Per-die values to render: random churn before the reveal, final after.
    pub values: Vec<i64>,
    pub shake: bool,
    /// Present from the Revealed frame on.
    pub outcome: Option<RollOutcome>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RevealNotice {
    Phase(RevealFrame),
    Completed(RollOutcome),
}

#[derive(Clone, Copy, Debug)]
struct ArmedTimer {
    at: Duration,
    timer: RevealTimer,
}

pub struct RevealTimeline {
    request: RevealRequest,
    state: RevealState,
    timers: Vec<ArmedTimer>,
    now: Duration,
    display: Vec<i64>,
    final_outcome: Option<RollOutcome>,
}

impl RevealTimeline {
    pub fn new(request: RevealRequest) -> Self {
        Self {
            request,
            state: RevealState::default(),
            timers: Vec::new(),
            now: Duration::ZERO,
            display: Vec::new(),
            final_outcome: None,
        }
    }

    pub fn state(&self) -> RevealState {
        self.state
    }

    /// Final outcome, fixed once the reveal has happened.
    pub fn final_outcome(&self) -> Option<&RollOutcome> {
        self.final_outcome.as_ref()
    }

    /// Idle -> Rolling. Arms the slowdown and reveal timers together.
    pub fn start(&mut self) -> Vec<RevealNotice> {
        self.dispatch(RevealEvent::Start)
    }

    /// Earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.at).min()
    }

    /// Fire every timer due at or before `elapsed`, in deadline order.
    pub fn advance_to(&mut self, elapsed: Duration) -> Vec<RevealNotice> {
        let mut notices = Vec::new();
        while let Some(index) = self.next_due(elapsed) {
            let due = self.timers.remove(index);
            self.now = due.at;
            notices.extend(self.dispatch(RevealEvent::TimerFired(due.timer)));
        }
        self.now = self.now.max(elapsed);
        notices
    }

    /// Invalidate all pending timers. Returns false when already terminal.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.dispatch(RevealEvent::Cancel);
        debug!("reveal cancelled");
        true
    }

    fn next_due(&self, elapsed: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.at <= elapsed)
            .min_by_key(|(_, t)| t.at)
            .map(|(i, _)| i)
    }

    fn dispatch(&mut self, event: RevealEvent) -> Vec<RevealNotice> {
        let (next, commands) = transition(self.state, event);
        if next != self.state {
            trace!(from = ?self.state, to = ?next, ?event, "reveal transition");
        }
        self.state = next;

        let mut notices = Vec::new();
        for command in commands {
            self.apply(command, &mut notices);
        }
        notices
    }

    fn apply(&mut self, command: RevealCommand, notices: &mut Vec<RevealNotice>) {
        match command {
            RevealCommand::ArmTimer(timer) => {
                let timings = self.request.timings;
                let at = match timer {
                    RevealTimer::Slowdown => timings.slowdown_at,
                    RevealTimer::Reveal => timings.reveal_at,
                    RevealTimer::Completion => self.now + timings.complete_after,
                };
                self.timers.push(ArmedTimer { at, timer });
            }
            RevealCommand::DisarmTimers => self.timers.clear(),
            RevealCommand::ShowInterim => {
                let descriptor = *self.request.authority.descriptor();
                let mut values = draw_values(&descriptor, &mut self.request.source);
                if values == self.display {
                    nudge(&mut values, descriptor.faces());
                }
                self.display = values;
            }
            RevealCommand::Reconcile => {
                let outcome = self.request.authority.settle();
                self.display = outcome.per_die().to_vec();
                self.final_outcome = Some(outcome);
            }
            RevealCommand::EnterPhase(state) => {
                debug!(phase = state.label(), values = ?self.display, "reveal phase");
                notices.push(RevealNotice::Phase(RevealFrame {
                    state,
                    values: self.display.clone(),
                    shake: self.request.shake && state == AnimationState::Rolling,
                    outcome: self.final_outcome.clone(),
                }));
            }
            RevealCommand::Complete => {
                if let Some(outcome) = &self.final_outcome {
                    notices.push(RevealNotice::Completed(outcome.clone()));
                }
            }
        }
    }
}

/// Make a second churn set visibly differ from the first.
fn nudge(values: &mut [i64], faces: u32) {
    if faces < 2 {
        return;
    }
    if let Some(first) = values.first_mut() {
        *first = *first % i64::from(faces) + 1;
    }
}
