use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::outcome::TasteTag;
use crate::session::Phase;

/// Every state change a session makes produces an Event.
/// The CLI prints them; a GUI would render from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// The countdown of a timed step reached zero.
    StepReady {
        step_index: usize,
        at: DateTime<Utc>,
    },
    TimerPaused {
        step_index: usize,
        remaining_secs: f64,
        /// Set when the pause came from the app leaving the foreground.
        forced: bool,
        at: DateTime<Utc>,
    },
    TimerResumed {
        step_index: usize,
        remaining_secs: f64,
        at: DateTime<Utc>,
    },
    StepAdvanced {
        from_step: usize,
        to_step: usize,
        phase: Phase,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: Uuid,
        step_count: usize,
        at: DateTime<Utc>,
    },
    SessionRestarted {
        session_id: Uuid,
        phase: Phase,
        at: DateTime<Utc>,
    },
    SessionExited {
        session_id: Uuid,
        /// `None` when the session had already completed.
        step_index: Option<usize>,
        at: DateTime<Utc>,
    },
    OutcomeSaved {
        session_id: Uuid,
        rating: u8,
        tag: Option<TasteTag>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable snake_case name, used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            Event::StepReady { .. } => "step_ready",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerResumed { .. } => "timer_resumed",
            Event::StepAdvanced { .. } => "step_advanced",
            Event::SessionCompleted { .. } => "session_completed",
            Event::SessionRestarted { .. } => "session_restarted",
            Event::SessionExited { .. } => "session_exited",
            Event::OutcomeSaved { .. } => "outcome_saved",
        }
    }
}
