//! Timer driver for a reveal timeline on the tokio clock.

use std::cell::Cell;
use std::rc::Rc;

use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::dice::task::{spawn_cancelable, TaskHandle};
use crate::dice::types::{AnimationState, RollOutcome};

use super::state::RevealState;
use super::timeline::{RevealFrame, RevealNotice, RevealRequest, RevealTimeline};

/// Cancellation handle for one animated reveal.
///
/// Dropping the handle does not stop the reveal; call [`RevealHandle::cancel`].
#[derive(Debug)]
pub struct RevealHandle {
    state: Rc<Cell<RevealState>>,
    task: TaskHandle,
}

impl RevealHandle {
    /// Invalidate every pending timer of this reveal.
    ///
    /// Returns `false` when the reveal had already completed or been cancelled.
    pub fn cancel(&self) -> bool {
        if self.state.get().is_terminal() {
            return false;
        }
        self.state.set(RevealState::Cancelled);
        self.task.cancel();
        debug!("reveal cancelled");
        true
    }

    pub fn state(&self) -> RevealState {
        self.state.get()
    }

    pub fn phase(&self) -> Option<AnimationState> {
        self.state.get().animation_state()
    }

    /// True once the reveal is completed or cancelled.
    pub fn is_finished(&self) -> bool {
        self.state.get().is_terminal()
    }
}

/// Start the Idle -> Rolling -> Slowing -> Revealed sequence for `request`.
///
/// The Rolling frame is delivered before this returns; later phases and the
/// completion callback run from a task on the current `LocalSet`. After
/// [`RevealHandle::cancel`] neither callback is invoked again.
pub fn start_animated_reveal<P, C>(
    request: RevealRequest,
    mut on_phase_change: P,
    on_complete: C,
) -> RevealHandle
where
    P: FnMut(&RevealFrame) + 'static,
    C: FnOnce(&RollOutcome) + 'static,
{
    let mut timeline = RevealTimeline::new(request);
    let started = Instant::now();
    let opening = timeline.start();

    let state = Rc::new(Cell::new(timeline.state()));
    for notice in &opening {
        if let RevealNotice::Phase(frame) = notice {
            on_phase_change(frame);
        }
    }

    let shared = state.clone();
    let task = spawn_cancelable(move |token| async move {
        let mut on_complete = Some(on_complete);

        while let Some(deadline) = timeline.next_deadline() {
            sleep_until(started + deadline).await;
            if token.is_cancelled() {
                return;
            }

            let notices = timeline.advance_to(deadline);
            shared.set(timeline.state());

            for notice in notices {
                // a callback may cancel its own reveal
                if token.is_cancelled() {
                    return;
                }
                match notice {
                    RevealNotice::Phase(frame) => on_phase_change(&frame),
                    RevealNotice::Completed(outcome) => {
                        if let Some(callback) = on_complete.take() {
                            callback(&outcome);
                        }
                    }
                }
            }
        }
    });

    RevealHandle { state, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    use tokio::task::LocalSet;
    use tokio::time::sleep;

    use crate::dice::notation::parse_notation;
    use crate::dice::reveal::RevealTimings;
    use crate::dice::rng::ScriptedSource;
    use crate::dice::types::AnimationState::*;

    fn request() -> RevealRequest {
        let descriptor = parse_notation("1d20+5").unwrap();
        RevealRequest::new(RollOutcome::from_per_die(descriptor, vec![20]))
            .with_source(ScriptedSource::new(vec![0.3, 0.7]))
    }

    type Log = Rc<RefCell<Vec<AnimationState>>>;

    fn recorder() -> (Log, Rc<Cell<Option<i64>>>) {
        (Rc::new(RefCell::new(Vec::new())), Rc::new(Cell::new(None)))
    }

    fn start(
        request: RevealRequest,
        phases: &Log,
        completed: &Rc<Cell<Option<i64>>>,
    ) -> RevealHandle {
        let phases = phases.clone();
        let completed = completed.clone();
        start_animated_reveal(
            request,
            move |frame| phases.borrow_mut().push(frame.state),
            move |outcome| completed.set(Some(outcome.total())),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_reveal_runs_to_completion() {
        LocalSet::new()
            .run_until(async {
                let (phases, completed) = recorder();
                let handle = start(request(), &phases, &completed);
                assert_eq!(*phases.borrow(), vec![Rolling]);

                sleep(Duration::from_millis(1100)).await;
                assert_eq!(*phases.borrow(), vec![Rolling, Slowing, Revealed]);
                assert_eq!(completed.get(), None);

                sleep(Duration::from_millis(500)).await;
                assert_eq!(completed.get(), Some(25));
                assert_eq!(handle.state(), RevealState::Completed);
                assert!(!handle.cancel());
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_reveal_suppresses_completion() {
        LocalSet::new()
            .run_until(async {
                let (phases, completed) = recorder();
                let handle = start(request(), &phases, &completed);

                sleep(Duration::from_millis(500)).await;
                assert!(handle.cancel());
                assert!(!handle.cancel());

                sleep(Duration::from_secs(5)).await;
                assert_eq!(*phases.borrow(), vec![Rolling, Slowing]);
                assert_eq!(completed.get(), None);
                assert_eq!(handle.state(), RevealState::Cancelled);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_between_reveal_and_completion() {
        LocalSet::new()
            .run_until(async {
                let (phases, completed) = recorder();
                let handle = start(request(), &phases, &completed);

                sleep(Duration::from_millis(1200)).await;
                assert_eq!(handle.phase(), Some(Revealed));
                assert!(handle.cancel());

                sleep(Duration::from_secs(2)).await;
                assert_eq!(completed.get(), None);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_faster_speed_shortens_the_reveal() {
        LocalSet::new()
            .run_until(async {
                let (phases, completed) = recorder();
                let timings = RevealTimings::default().scaled(2.0);
                let _handle = start(request().with_timings(timings), &phases, &completed);

                sleep(Duration::from_millis(760)).await;
                assert_eq!(completed.get(), Some(25));
            })
            .await;
    }
}
