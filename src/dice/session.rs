//! Roll site
//!
//! `RollSession` composes the engine for one view: it owns the history
//! buffer, the effect settings and dispatcher, and at most one live reveal.
//! Starting a roll cancels the previous reveal if it has not been revealed
//! yet, and always cancels its particle bursts. A roll that was already
//! revealed is left to complete and still lands in history. `teardown` (or
//! dropping the session) cancels everything.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use tracing::{debug, info};

use crate::dice::effects::{
    animate_particle_burst, AudioOutput, BurstHandle, EffectDispatcher, EffectReport,
    HapticOutput, ParticleBurst,
};
use crate::dice::history::{HistoryEntry, RollHistory};
use crate::dice::notation::{parse_notation, ParseFailure};
use crate::dice::physics::{roll_with_physics, AuthoritativeSource, Simulation, ThrowParams};
use crate::dice::reconcile::reconcile_outcome;
use crate::dice::reveal::{
    start_animated_reveal, RevealFrame, RevealHandle, RevealRequest, RevealState, RevealTimings,
};
use crate::dice::rng::{SharedSource, ThreadSource, UniformSource};
use crate::dice::sampler::roll_with_sampler;
use crate::dice::types::{AnimationState, DiceDescriptor, EffectSettings, RollOutcome};

/// One roll as requested by the caller.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RollRequest {
    pub notation: String,
    pub label: String,
    /// Throws for a cosmetic physics run per die; `None` skips physics.
    pub physics: Option<Vec<ThrowParams>>,
    /// Total decided elsewhere; `None` samples one.
    pub authoritative_total: Option<i64>,
}

impl RollRequest {
    pub fn new(notation: impl Into<String>) -> Self {
        Self {
            notation: notation.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_physics(mut self, throws: Vec<ThrowParams>) -> Self {
        self.physics = Some(throws);
        self
    }

    pub fn with_total(mut self, total: i64) -> Self {
        self.authoritative_total = Some(total);
        self
    }
}

/// Receives everything a view renders for a roll. All methods default to no-ops.
pub trait RollObserver {
    /// Cosmetic physics runs, one per die, before the reveal starts.
    fn on_trajectories(&mut self, _simulations: &[Simulation]) {}
    fn on_phase_change(&mut self, _frame: &RevealFrame) {}
    /// Fired once, at the reveal.
    fn on_effects(&mut self, _report: &EffectReport) {}
    fn on_particles(&mut self, _burst: &ParticleBurst) {}
    /// The roll has been recorded in history.
    fn on_complete(&mut self, _entry: &HistoryEntry) {}
}

impl RollObserver for () {}

pub struct RollSession<A, H> {
    history: Rc<RefCell<RollHistory>>,
    settings: EffectSettings,
    dispatcher: Rc<RefCell<EffectDispatcher<A, H>>>,
    source: SharedSource,
    active: Option<RevealHandle>,
    /// Revealed rolls superseded by a newer one, waiting on completion.
    settling: Vec<RevealHandle>,
    bursts: Rc<RefCell<Vec<BurstHandle>>>,
}

impl<A, H> RollSession<A, H>
where
    A: AudioOutput + 'static,
    H: HapticOutput + 'static,
{
    pub fn new(dispatcher: EffectDispatcher<A, H>, settings: EffectSettings) -> Self {
        Self {
            history: Rc::new(RefCell::new(RollHistory::new())),
            settings: settings.sanitized(),
            dispatcher: Rc::new(RefCell::new(dispatcher)),
            source: SharedSource::new(ThreadSource),
            active: None,
            settling: Vec::new(),
            bursts: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Replace the random source used for sampling, churn and particles.
    pub fn with_source<S: UniformSource + 'static>(mut self, source: S) -> Self {
        self.source = SharedSource::new(source);
        self
    }

    pub fn settings(&self) -> &EffectSettings {
        &self.settings
    }

    /// Applies to rolls started after this call.
    pub fn set_settings(&mut self, settings: EffectSettings) {
        self.settings = settings.sanitized();
    }

    pub fn history(&self) -> Ref<'_, RollHistory> {
        self.history.borrow()
    }

    pub fn clear_history(&self) {
        self.history.borrow_mut().clear();
    }

    pub fn dispatcher(&self) -> Ref<'_, EffectDispatcher<A, H>> {
        self.dispatcher.borrow()
    }

    /// Phase of the live reveal, if one is running.
    pub fn active_phase(&self) -> Option<AnimationState> {
        self.active
            .as_ref()
            .filter(|handle| !handle.is_finished())
            .and_then(|handle| handle.phase())
    }

    pub fn is_revealing(&self) -> bool {
        self.active_phase().is_some()
    }

    /// Roll and record immediately, without any animation or effects.
    pub fn roll_instant(&mut self, request: &RollRequest) -> Result<HistoryEntry, ParseFailure> {
        let descriptor = parse_notation(&request.notation)?;
        let outcome = self.decide(&descriptor, request, &mut ()).authority.settle();
        let entry = HistoryEntry::now(request.notation.clone(), outcome, request.label.clone());
        self.history.borrow_mut().record(entry.clone());
        Ok(entry)
    }

    /// Start an animated roll. A previous reveal that has not reached
    /// `Revealed` is cancelled first.
    ///
    /// Returns the authoritative outcome the reveal will settle on. Malformed
    /// notation is refused before anything is cancelled or animated.
    ///
    /// Must be called from within a tokio `LocalSet`.
    pub fn roll<O>(
        &mut self,
        request: &RollRequest,
        observer: Rc<RefCell<O>>,
    ) -> Result<RollOutcome, ParseFailure>
    where
        O: RollObserver + 'static,
    {
        let descriptor = parse_notation(&request.notation)?;
        self.supersede_active();

        let reveal = {
            let mut observer = observer.borrow_mut();
            self.decide(&descriptor, request, &mut *observer)
        };
        let outcome = reveal.authority.settle();

        let settings = self.settings.clone();
        if settings.shake_on_roll {
            self.dispatcher.borrow_mut().play_shake_cue(&settings);
        }

        let reveal = reveal
            .with_timings(RevealTimings::default().scaled(settings.animation_speed))
            .with_shake(settings.shake_on_roll)
            .with_source(self.source.clone());

        info!(notation = %descriptor, label = %request.label, "roll started");

        let on_phase_change = {
            let observer = observer.clone();
            let dispatcher = self.dispatcher.clone();
            let bursts = self.bursts.clone();
            let mut source = self.source.clone();
            let settings = settings.clone();
            move |frame: &RevealFrame| {
                observer.borrow_mut().on_phase_change(frame);
                if frame.state != AnimationState::Revealed {
                    return;
                }
                let Some(outcome) = &frame.outcome else {
                    return;
                };

                let mut report =
                    dispatcher.borrow_mut().trigger_effects(outcome, &settings, &mut source);
                observer.borrow_mut().on_effects(&report);

                if let Some(burst) = report.burst.take() {
                    let observer = observer.clone();
                    let handle = animate_particle_burst(burst, settings.animation_speed, move |b| {
                        observer.borrow_mut().on_particles(b)
                    });
                    let mut bursts = bursts.borrow_mut();
                    bursts.retain(|b| !b.is_finished());
                    bursts.push(handle);
                }
            }
        };

        let on_complete = {
            let history = self.history.clone();
            let notation = request.notation.clone();
            let label = request.label.clone();
            move |outcome: &RollOutcome| {
                let entry = HistoryEntry::now(notation, outcome.clone(), label);
                history.borrow_mut().record(entry.clone());
                debug!(notation = %entry.notation, total = entry.outcome.total(), "roll recorded");
                observer.borrow_mut().on_complete(&entry);
            }
        };

        self.active = Some(start_animated_reveal(reveal, on_phase_change, on_complete));
        Ok(outcome)
    }

    /// Decide the authoritative result; physics runs go to `observer`.
    fn decide<O: RollObserver + ?Sized>(
        &mut self,
        descriptor: &DiceDescriptor,
        request: &RollRequest,
        observer: &mut O,
    ) -> RevealRequest {
        let mut source = self.source.clone();
        match (&request.physics, request.authoritative_total) {
            (Some(throws), total) => {
                let authority =
                    total.map_or(AuthoritativeSource::Sampler, AuthoritativeSource::External);
                let roll = roll_with_physics(descriptor, throws, authority, &mut source);
                observer.on_trajectories(&roll.simulations);
                RevealRequest::new(roll.outcome)
            }
            (None, Some(total)) => RevealRequest::from_total(*descriptor, total),
            (None, None) => RevealRequest::new(roll_with_sampler(descriptor, &mut source)),
        }
    }
}

impl<A, H> RollSession<A, H> {
    /// Cancel every reveal, including revealed ones still waiting to
    /// complete, and every particle burst (view teardown).
    pub fn teardown(&mut self) {
        for handle in self.active.take().into_iter().chain(self.settling.drain(..)) {
            if handle.cancel() {
                debug!("roll cancelled on teardown");
            }
        }
        self.cancel_bursts();
    }

    /// Make way for a new roll.
    fn supersede_active(&mut self) {
        self.settling.retain(|handle| !handle.is_finished());
        if let Some(handle) = self.active.take() {
            if handle.state() == RevealState::Active(AnimationState::Revealed) {
                debug!("previous roll already revealed, letting it complete");
                self.settling.push(handle);
            } else if handle.cancel() {
                debug!("previous roll cancelled");
            }
        }
        self.cancel_bursts();
    }

    fn cancel_bursts(&mut self) {
        for burst in self.bursts.borrow_mut().drain(..) {
            burst.cancel();
        }
    }
}

impl<A, H> Drop for RollSession<A, H> {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Reconciled outcome for an externally decided total, without a session.
pub fn outcome_for_total(notation: &str, total: i64) -> Result<RollOutcome, ParseFailure> {
    let descriptor = parse_notation(notation)?;
    Ok(reconcile_outcome(&descriptor, total))
}
