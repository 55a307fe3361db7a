//! Countdown abstraction shared by the production and virtual timers.
//!
//! A countdown never talks to the session directly. It pushes
//! [`TimerEvent`]s into the session's queue, each tagged with the
//! [`Generation`] it was started under, and the session drops any event whose
//! generation is no longer live. That makes `cancel` synchronous from the
//! session's point of view even if a tick is already in flight.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Default period between ticks.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Tag identifying one started countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEventKind {
    /// Periodic report; `remaining` is always > 0.
    Tick { remaining: Duration },
    /// Sent exactly once, when remaining time reaches zero.
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub generation: Generation,
    pub kind: TimerEventKind,
}

impl TimerEvent {
    pub fn tick(generation: Generation, remaining: Duration) -> Self {
        Self {
            generation,
            kind: TimerEventKind::Tick { remaining },
        }
    }

    pub fn finished(generation: Generation) -> Self {
        Self {
            generation,
            kind: TimerEventKind::Finished,
        }
    }
}

/// Where a running countdown delivers its events.
pub type TimerSink = UnboundedSender<TimerEvent>;

/// Something that can run countdowns for a session.
///
/// Injected at session creation so the engine can be driven by a real
/// scheduler in production and by [`super::VirtualClock`] in tests.
pub trait Countdown {
    type Handle: CountdownHandle;

    /// Start counting down `duration`.
    ///
    /// Returns `None` without starting anything when `duration` is zero.
    fn start(
        &mut self,
        duration: Duration,
        generation: Generation,
        sink: TimerSink,
    ) -> Option<Self::Handle>;
}

/// Handle to one running countdown.
///
/// Implementations also cancel on drop, so a handle never outlives the step
/// that owns it.
pub trait CountdownHandle {
    /// Stop delivering events. Calling it again is a no-op.
    fn cancel(&mut self);
}
