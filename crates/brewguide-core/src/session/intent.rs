use serde::{Deserialize, Serialize};

use crate::timer::TimerEvent;

/// Something the user asked for.
///
/// Exiting is not an intent: it ends the session, see
/// [`super::Session::exit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Start,
    Pause,
    Resume,
    NextStep,
    Restart,
}

/// Everything a session reacts to, in the order it arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionInput {
    Intent(Intent),
    AppActivityChanged { is_active: bool },
    Timer(TimerEvent),
}

impl From<Intent> for SessionInput {
    fn from(intent: Intent) -> Self {
        SessionInput::Intent(intent)
    }
}

impl From<TimerEvent> for SessionInput {
    fn from(event: TimerEvent) -> Self {
        SessionInput::Timer(event)
    }
}
