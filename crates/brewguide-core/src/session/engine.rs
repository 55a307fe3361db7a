//! Guided session engine.
//!
//! Owns the session state and decides every transition. Intents,
//! app-activity changes and timer events all arrive through one serialized
//! context (the caller's loop), so nothing in here locks.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::new(plan, TokioCountdown::default());
//! loop {
//!     let ev = session.next_timer_event().await;
//!     session.handle(SessionInput::Timer(ev));
//! }
//! ```
//!
//! Every command returns `Some(Event)` when it changed something and `None`
//! when it was a no-op for the current phase.

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use uuid::Uuid;

use super::intent::{Intent, SessionInput};
use super::state::{LiveTimer, Phase, Progress, SessionView, Stage, StepView};
use crate::error::OutcomeError;
use crate::events::Event;
use crate::outcome::{OutcomeDraft, OutcomeStore, SessionOutcome};
use crate::plan::{BrewPlan, ScaledStep};
use crate::timer::{
    Countdown, CountdownHandle, Generation, TimerEvent, TimerEventKind, TimerSink,
};

/// One guided brew, from the first step to the saved outcome.
pub struct Session<C: Countdown> {
    id: Uuid,
    plan: BrewPlan,
    countdown: C,
    progress: Progress<C::Handle>,
    generation: Generation,
    timer_tx: TimerSink,
    timer_rx: UnboundedReceiver<TimerEvent>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    pending_outcome: Option<OutcomeDraft>,
    saved_outcome: Option<SessionOutcome>,
}

impl<C: Countdown> Session<C> {
    /// Create a session on step 0 and auto-start it.
    ///
    /// # Panics
    /// Panics if `plan` has no steps.
    pub fn new(plan: BrewPlan, countdown: C) -> Self {
        assert!(!plan.is_empty(), "a brew session needs at least one step");
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let mut session = Self {
            id: Uuid::new_v4(),
            plan,
            countdown,
            // Replaced by `enter_step(0)` below.
            progress: Progress::Step {
                index: 0,
                stage: Stage::Ready { remaining: None },
            },
            generation: Generation::ZERO,
            timer_tx,
            timer_rx,
            started_at: Utc::now(),
            completed_at: None,
            pending_outcome: None,
            saved_outcome: None,
        };
        tracing::info!(
            session_id = %session.id,
            steps = session.plan.len(),
            recipe = %session.plan.inputs.recipe_name,
            "brew session created"
        );
        session.enter_step(0);
        session
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn plan(&self) -> &BrewPlan {
        &self.plan
    }

    pub fn phase(&self) -> Phase {
        self.progress.phase()
    }

    /// `None` once completed.
    pub fn current_step_index(&self) -> Option<usize> {
        match &self.progress {
            Progress::Step { index, .. } => Some(*index),
            Progress::Completed => None,
        }
    }

    pub fn current_step(&self) -> Option<&ScaledStep> {
        self.current_step_index().and_then(|i| self.plan.step(i))
    }

    pub fn remaining(&self) -> Option<Duration> {
        match &self.progress {
            Progress::Step { stage, .. } => stage.remaining(),
            Progress::Completed => None,
        }
    }

    pub fn remaining_seconds(&self) -> Option<f64> {
        self.remaining().map(|r| r.as_secs_f64())
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.progress, Progress::Completed)
    }

    /// Whether a `NextStep` intent would be honored right now.
    pub fn next_enabled(&self) -> bool {
        self.phase() == Phase::ReadyToAdvance
    }

    /// Whether a countdown is currently live for this session.
    pub fn has_live_timer(&self) -> bool {
        matches!(
            self.progress,
            Progress::Step {
                stage: Stage::Active { .. },
                ..
            }
        )
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// The draft of the last save attempt that has not succeeded yet.
    pub fn pending_outcome(&self) -> Option<&OutcomeDraft> {
        self.pending_outcome.as_ref()
    }

    pub fn saved_outcome(&self) -> Option<&SessionOutcome> {
        self.saved_outcome.as_ref()
    }

    /// 0.0 .. 1.0 progress within the current step's countdown.
    pub fn step_progress(&self) -> f64 {
        let total = self.current_step().and_then(ScaledStep::duration);
        match (total, self.remaining()) {
            (Some(total), Some(remaining)) => {
                1.0 - remaining.as_secs_f64() / total.as_secs_f64()
            }
            _ if self.phase() == Phase::ReadyToAdvance => 1.0,
            _ => 0.0,
        }
    }

    /// 0.0 .. 100.0 progress across the plan, weighted by countdown time.
    /// Plans without any timed step are weighted by step count.
    pub fn plan_progress_pct(&self) -> f64 {
        let Some(index) = self.current_step_index() else {
            return 100.0;
        };
        let total = self.plan.total_duration().as_secs_f64();
        let pct = if total == 0.0 {
            let done = index as f64 + self.step_progress();
            done / self.plan.len() as f64 * 100.0
        } else {
            let done = self.plan.cumulative_duration(index).as_secs_f64();
            let current = self
                .current_step()
                .and_then(ScaledStep::duration)
                .map(|d| d.as_secs_f64() * self.step_progress())
                .unwrap_or(0.0);
            (done + current) / total * 100.0
        };
        pct.clamp(0.0, 100.0)
    }

    /// Build the read-only projection the UI renders from.
    pub fn view(&self) -> SessionView {
        let step = self.current_step_index().and_then(|index| {
            self.plan.step(index).map(|s| StepView {
                index,
                instruction: s.instruction_text.clone(),
                water_amount_grams: s.water_amount_grams,
                is_cumulative_target: s.is_cumulative_target,
                duration_seconds: s.duration().map(|d| d.as_secs_f64()),
            })
        });
        SessionView {
            session_id: self.id,
            phase: self.phase(),
            step_count: self.plan.len(),
            step,
            remaining_seconds: self.remaining_seconds(),
            next_enabled: self.next_enabled(),
            is_complete: self.is_complete(),
            step_progress: self.step_progress(),
            plan_progress_pct: self.plan_progress_pct(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Single entry point for everything the session reacts to.
    pub fn handle(&mut self, input: SessionInput) -> Option<Event> {
        match input {
            SessionInput::Intent(intent) => self.apply(intent),
            SessionInput::AppActivityChanged { is_active } => {
                self.app_activity_changed(is_active)
            }
            SessionInput::Timer(event) => self.on_timer_event(event),
        }
    }

    pub fn apply(&mut self, intent: Intent) -> Option<Event> {
        let event = match intent {
            // Steps start themselves when entered.
            Intent::Start => None,
            Intent::Pause => self.pause(),
            Intent::Resume => self.resume(),
            Intent::NextStep => self.next_step(),
            Intent::Restart => Some(self.restart()),
        };
        if event.is_none() {
            tracing::debug!(session_id = %self.id, ?intent, phase = %self.phase(), "intent ignored");
        }
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        self.pause_with(false)
    }

    pub fn resume(&mut self) -> Option<Event> {
        let (index, remaining) = match &self.progress {
            Progress::Step {
                index,
                stage: Stage::Paused { remaining },
            } => (*index, *remaining),
            _ => return None,
        };
        let stage = match self.start_countdown(remaining) {
            Some(timer) => Stage::Active { timer, remaining },
            None => Stage::Ready {
                remaining: Some(Duration::ZERO),
            },
        };
        self.progress = Progress::Step { index, stage };
        tracing::debug!(session_id = %self.id, step_index = index, ?remaining, "timer resumed");
        Some(Event::TimerResumed {
            step_index: index,
            remaining_secs: remaining.as_secs_f64(),
            at: Utc::now(),
        })
    }

    /// Advance past a ready step. Ignored in every other phase, so a timed
    /// step can only be left once its countdown reached zero.
    pub fn next_step(&mut self) -> Option<Event> {
        let settled = self.settle();
        let from = match &self.progress {
            Progress::Step {
                index,
                stage: Stage::Ready { .. },
            } => *index,
            _ => return settled,
        };
        self.cancel_timer();
        let to = from + 1;
        if to < self.plan.len() {
            let phase = self.enter_step(to);
            Some(Event::StepAdvanced {
                from_step: from,
                to_step: to,
                phase,
                at: Utc::now(),
            })
        } else {
            let now = Utc::now();
            self.progress = Progress::Completed;
            self.completed_at = Some(now);
            tracing::info!(session_id = %self.id, "brew session completed");
            Some(Event::SessionCompleted {
                session_id: self.id,
                step_count: self.plan.len(),
                at: now,
            })
        }
    }

    /// Back to step 0 from any phase, completed included.
    pub fn restart(&mut self) -> Event {
        self.cancel_timer();
        self.completed_at = None;
        self.pending_outcome = None;
        self.saved_outcome = None;
        self.started_at = Utc::now();
        tracing::info!(session_id = %self.id, "brew session restarted");
        let phase = self.enter_step(0);
        Event::SessionRestarted {
            session_id: self.id,
            phase,
            at: Utc::now(),
        }
    }

    /// Leaving the foreground pauses a running countdown. Coming back does
    /// not resume it.
    pub fn app_activity_changed(&mut self, is_active: bool) -> Option<Event> {
        if is_active {
            return None;
        }
        self.pause_with(true)
    }

    /// Apply one countdown event. Events from a countdown that is no longer
    /// live are dropped.
    pub fn on_timer_event(&mut self, event: TimerEvent) -> Option<Event> {
        let session_id = self.id;
        let Progress::Step { index, stage } = &mut self.progress else {
            tracing::trace!(%session_id, generation = %event.generation, "dropping timer event, session completed");
            return None;
        };
        let Stage::Active { timer, remaining } = &mut *stage else {
            tracing::trace!(%session_id, generation = %event.generation, "dropping timer event, no live countdown");
            return None;
        };
        if timer.generation != event.generation {
            tracing::trace!(
                %session_id,
                generation = %event.generation,
                live = %timer.generation,
                "dropping stale timer event"
            );
            return None;
        }
        match event.kind {
            TimerEventKind::Tick { remaining: reported } => {
                *remaining = reported.min(*remaining);
                None
            }
            TimerEventKind::Finished => {
                timer.handle.cancel();
                let index = *index;
                *stage = Stage::Ready {
                    remaining: Some(Duration::ZERO),
                };
                tracing::debug!(%session_id, step_index = index, "step countdown finished");
                Some(Event::StepReady {
                    step_index: index,
                    at: Utc::now(),
                })
            }
        }
    }

    /// Apply every timer event already queued, in arrival order.
    pub fn pump(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(timer_event) = self.timer_rx.try_recv() {
            events.extend(self.on_timer_event(timer_event));
        }
        events
    }

    /// Wait for the next queued timer event.
    ///
    /// Never resolves to `None` while the session is alive, since the
    /// session keeps a sender of its own.
    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        self.timer_rx.recv().await
    }

    /// End the session without saving anything.
    ///
    /// Also valid after completion, to discard a brew instead of rating it.
    pub fn exit(mut self) -> Event {
        self.cancel_timer();
        let step_index = self.current_step_index();
        tracing::info!(session_id = %self.id, ?step_index, "brew session exited");
        Event::SessionExited {
            session_id: self.id,
            step_index,
            at: Utc::now(),
        }
    }

    // ── Outcome handoff ──────────────────────────────────────────────

    /// Hand the finished session's outcome to `store`.
    ///
    /// On failure the session stays completed and keeps `draft` as the
    /// pending outcome, so [`Self::retry_save_outcome`] can resend it.
    /// Borrowing `self` mutably for the whole call keeps the state machine
    /// out of reach while the save is in flight.
    ///
    /// # Errors
    /// Returns the store's error unchanged.
    ///
    /// # Panics
    /// Panics if the session has not completed, or its outcome was already
    /// saved.
    pub async fn save_outcome<S>(
        &mut self,
        store: &S,
        draft: OutcomeDraft,
    ) -> Result<Event, OutcomeError>
    where
        S: OutcomeStore + ?Sized,
    {
        assert!(
            self.is_complete(),
            "outcome can only be saved once the session completed (phase: {})",
            self.phase()
        );
        assert!(
            self.saved_outcome.is_none(),
            "outcome for session {} was already saved",
            self.id
        );
        self.pending_outcome = Some(draft.clone());
        let outcome = self.build_outcome(draft);
        match store.save(&outcome).await {
            Ok(()) => {
                tracing::info!(
                    session_id = %self.id,
                    store = store.name(),
                    rating = outcome.rating.value(),
                    "brew outcome saved"
                );
                let event = Event::OutcomeSaved {
                    session_id: self.id,
                    rating: outcome.rating.value(),
                    tag: outcome.tag,
                    at: Utc::now(),
                };
                self.pending_outcome = None;
                self.saved_outcome = Some(outcome);
                Ok(event)
            }
            Err(err) => {
                tracing::warn!(
                    session_id = %self.id,
                    store = store.name(),
                    error = %err,
                    "brew outcome save failed"
                );
                Err(err)
            }
        }
    }

    /// Resend the draft of the last failed save.
    ///
    /// # Errors
    /// Returns the store's error unchanged.
    ///
    /// # Panics
    /// Panics if there is no failed save to retry.
    pub async fn retry_save_outcome<S>(&mut self, store: &S) -> Result<Event, OutcomeError>
    where
        S: OutcomeStore + ?Sized,
    {
        let draft = self
            .pending_outcome
            .clone()
            .unwrap_or_else(|| panic!("session {} has no pending outcome to retry", self.id));
        self.save_outcome(store, draft).await
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Enter `index` and run the auto-start rule: timed steps go straight
    /// to `Active`, untimed ones to `ReadyToAdvance`.
    fn enter_step(&mut self, index: usize) -> Phase {
        self.cancel_timer();
        let duration = self.plan.steps[index].duration();
        let stage = match duration {
            Some(total) => match self.start_countdown(total) {
                Some(timer) => Stage::Active {
                    timer,
                    remaining: total,
                },
                None => Stage::Ready { remaining: None },
            },
            None => Stage::Ready { remaining: None },
        };
        let phase = stage.phase();
        self.progress = Progress::Step { index, stage };
        tracing::debug!(session_id = %self.id, step_index = index, %phase, "step started");
        phase
    }

    fn start_countdown(&mut self, duration: Duration) -> Option<LiveTimer<C::Handle>> {
        self.generation = self.generation.next();
        let generation = self.generation;
        let handle = self
            .countdown
            .start(duration, generation, self.timer_tx.clone())?;
        Some(LiveTimer { generation, handle })
    }

    fn cancel_timer(&mut self) {
        if let Progress::Step {
            stage: Stage::Active { timer, .. },
            ..
        } = &mut self.progress
        {
            timer.handle.cancel();
        }
    }

    /// Apply timer events that arrived before the caller's current input.
    /// Returns the last transition they caused, if any.
    fn settle(&mut self) -> Option<Event> {
        self.pump().pop()
    }

    fn pause_with(&mut self, forced: bool) -> Option<Event> {
        let settled = self.settle();
        let (index, remaining) = match &mut self.progress {
            Progress::Step {
                index,
                stage: Stage::Active { timer, remaining },
            } => {
                timer.handle.cancel();
                (*index, *remaining)
            }
            _ => return settled,
        };
        self.progress = Progress::Step {
            index,
            stage: Stage::Paused { remaining },
        };
        tracing::debug!(session_id = %self.id, step_index = index, ?remaining, forced, "timer paused");
        Some(Event::TimerPaused {
            step_index: index,
            remaining_secs: remaining.as_secs_f64(),
            forced,
            at: Utc::now(),
        })
    }

    fn build_outcome(&self, draft: OutcomeDraft) -> SessionOutcome {
        SessionOutcome {
            session_id: self.id,
            rating: draft.rating,
            tag: draft.tag,
            note: draft.note,
            inputs: self.plan.inputs.clone(),
            step_count: self.plan.len(),
            started_at: self.started_at,
            completed_at: self.completed_at.unwrap_or_else(Utc::now),
        }
    }
}

impl<C: Countdown> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("phase", &self.phase())
            .field("step_index", &self.current_step_index())
            .field("remaining", &self.remaining())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}
