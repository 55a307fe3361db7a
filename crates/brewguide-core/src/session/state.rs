use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

use crate::timer::Generation;

/// Where the session is in the per-step state machine.
///
/// `NotStarted` is transient: entering a step runs the auto-start rule at
/// once, so a session is never observed resting there.
///
/// ```text
/// NotStarted -> Active -> (Paused <-> Active) -> ReadyToAdvance -> NotStarted(next) | Completed
/// NotStarted -> ReadyToAdvance                  (untimed step)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    Active,
    Paused,
    ReadyToAdvance,
    Completed,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::NotStarted => "not_started",
            Phase::Active => "active",
            Phase::Paused => "paused",
            Phase::ReadyToAdvance => "ready_to_advance",
            Phase::Completed => "completed",
        }
    }

    pub fn is_final(self) -> bool {
        matches!(self, Phase::Completed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A countdown the session currently listens to.
#[derive(Debug)]
pub(crate) struct LiveTimer<H> {
    pub(crate) generation: Generation,
    pub(crate) handle: H,
}

/// Per-step state. Only `Active` can hold a timer, so "active without a
/// timer" and "paused with a timer" cannot be built.
#[derive(Debug)]
pub(crate) enum Stage<H> {
    Active {
        timer: LiveTimer<H>,
        remaining: Duration,
    },
    Paused {
        remaining: Duration,
    },
    /// `remaining` is `Some(0)` for a timed step that ran out, `None` for an
    /// untimed one.
    Ready {
        remaining: Option<Duration>,
    },
}

impl<H> Stage<H> {
    pub(crate) fn phase(&self) -> Phase {
        match self {
            Stage::Active { .. } => Phase::Active,
            Stage::Paused { .. } => Phase::Paused,
            Stage::Ready { .. } => Phase::ReadyToAdvance,
        }
    }

    pub(crate) fn remaining(&self) -> Option<Duration> {
        match self {
            Stage::Active { remaining, .. } | Stage::Paused { remaining } => Some(*remaining),
            Stage::Ready { remaining } => *remaining,
        }
    }
}

#[derive(Debug)]
pub(crate) enum Progress<H> {
    Step { index: usize, stage: Stage<H> },
    Completed,
}

impl<H> Progress<H> {
    pub(crate) fn phase(&self) -> Phase {
        match self {
            Progress::Step { stage, .. } => stage.phase(),
            Progress::Completed => Phase::Completed,
        }
    }
}

/// The step a view is showing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepView {
    pub index: usize,
    pub instruction: String,
    pub water_amount_grams: Option<f64>,
    pub is_cumulative_target: bool,
    pub duration_seconds: Option<f64>,
}

/// Read-only projection of a session, enough to render one screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub phase: Phase,
    pub step_count: usize,
    /// `None` once the session has completed.
    pub step: Option<StepView>,
    pub remaining_seconds: Option<f64>,
    pub next_enabled: bool,
    pub is_complete: bool,
    /// 0.0 .. 1.0 within the current step.
    pub step_progress: f64,
    /// 0.0 .. 100.0 across the whole plan.
    pub plan_progress_pct: f64,
}
