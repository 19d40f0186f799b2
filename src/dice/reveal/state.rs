//! Reveal state machine
//!
//! A pure `(state, event) -> (state, commands)` transition table. Nothing here
//! touches timers, randomness or callbacks; the timeline interprets the
//! commands.

use crate::dice::types::AnimationState;

/// Lifecycle of one reveal instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealState {
    /// Still sequencing; the inner value is the visible phase.
    Active(AnimationState),
    /// Completion callback has fired.
    Completed,
    /// Torn down before completing. Terminal.
    Cancelled,
}

impl RevealState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RevealState::Completed | RevealState::Cancelled)
    }

    /// Visible phase; a completed reveal stays on `Revealed`.
    pub fn animation_state(&self) -> Option<AnimationState> {
        match self {
            RevealState::Active(phase) => Some(*phase),
            RevealState::Completed => Some(AnimationState::Revealed),
            RevealState::Cancelled => None,
        }
    }
}

impl Default for RevealState {
    fn default() -> Self {
        RevealState::Active(AnimationState::Idle)
    }
}

/// Timers a reveal can arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RevealTimer {
    /// Rolling -> Slowing, measured from roll start.
    Slowdown,
    /// Slowing -> Revealed, measured from roll start.
    Reveal,
    /// Completion callback, measured from the reveal.
    Completion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealEvent {
    Start,
    TimerFired(RevealTimer),
    Cancel,
}

/// Side effects requested by a transition, applied in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealCommand {
    ArmTimer(RevealTimer),
    DisarmTimers,
    /// Draw a fresh set of throwaway per-die values.
    ShowInterim,
    /// Compute the final breakdown and criticals.
    Reconcile,
    /// Announce a phase to the observer.
    EnterPhase(AnimationState),
    /// Fire the completion callback.
    Complete,
}

/// The transition table.
///
/// Phases only move forward one step at a time. Terminal states absorb every
/// event, which makes a repeated cancel a no-op.
pub fn transition(state: RevealState, event: RevealEvent) -> (RevealState, Vec<RevealCommand>) {
    use AnimationState::*;
    use RevealCommand::*;

    match (state, event) {
        (RevealState::Completed | RevealState::Cancelled, _) => (state, Vec::new()),

        (RevealState::Active(_), RevealEvent::Cancel) => {
            (RevealState::Cancelled, vec![DisarmTimers])
        }

        (RevealState::Active(Idle), RevealEvent::Start) => (
            RevealState::Active(Rolling),
            vec![
                ArmTimer(RevealTimer::Slowdown),
                ArmTimer(RevealTimer::Reveal),
                ShowInterim,
                EnterPhase(Rolling),
            ],
        ),

        (RevealState::Active(Rolling), RevealEvent::TimerFired(RevealTimer::Slowdown)) => (
            RevealState::Active(Slowing),
            vec![ShowInterim, EnterPhase(Slowing)],
        ),

        (RevealState::Active(Slowing), RevealEvent::TimerFired(RevealTimer::Reveal)) => (
            RevealState::Active(Revealed),
            vec![
                Reconcile,
                EnterPhase(Revealed),
                ArmTimer(RevealTimer::Completion),
            ],
        ),

        // The reveal deadline can never be reached without passing through
        // Slowing first.
        (RevealState::Active(Rolling), RevealEvent::TimerFired(RevealTimer::Reveal)) => (
            RevealState::Active(Revealed),
            vec![
                ShowInterim,
                EnterPhase(Slowing),
                Reconcile,
                EnterPhase(Revealed),
                ArmTimer(RevealTimer::Completion),
            ],
        ),

        (RevealState::Active(Revealed), RevealEvent::TimerFired(RevealTimer::Completion)) => {
            (RevealState::Completed, vec![Complete])
        }

        // Stale timers and duplicate starts.
        (RevealState::Active(_), _) => (state, Vec::new()),
    }
}
