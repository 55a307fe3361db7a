//! Production countdown backed by a tokio task.
//!
//! Each countdown is one spawned task that sleeps to the next tick boundary
//! or the deadline, whichever comes first. Must be started from within a
//! tokio runtime.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::countdown::{
    Countdown, CountdownHandle, Generation, TimerEvent, TimerSink, DEFAULT_TICK_INTERVAL,
};

const MIN_TICK_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
pub struct TokioCountdown {
    tick_interval: Duration,
}

impl TokioCountdown {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval: tick_interval.max(MIN_TICK_INTERVAL),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }
}

impl Default for TokioCountdown {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Countdown for TokioCountdown {
    type Handle = TokioCountdownHandle;

    fn start(
        &mut self,
        duration: Duration,
        generation: Generation,
        sink: TimerSink,
    ) -> Option<Self::Handle> {
        if duration.is_zero() {
            return None;
        }
        let tick = self.tick_interval;
        let started = Instant::now();
        let Some(deadline) = started.checked_add(duration) else {
            tracing::warn!(%generation, ?duration, "countdown deadline out of range, not started");
            return None;
        };
        let task = tokio::spawn(async move {
            let mut next_tick = started.checked_add(tick).unwrap_or(deadline);
            loop {
                let wake = next_tick.min(deadline);
                tokio::time::sleep_until(wake).await;
                if wake >= deadline {
                    let _ = sink.send(TimerEvent::finished(generation));
                    break;
                }
                // Receiver gone means the session was dropped.
                if sink.send(TimerEvent::tick(generation, deadline - wake)).is_err() {
                    break;
                }
                next_tick = next_tick.checked_add(tick).unwrap_or(deadline);
            }
        });
        tracing::trace!(%generation, ?duration, "countdown task spawned");
        Some(TokioCountdownHandle { task: Some(task) })
    }
}

#[derive(Debug)]
pub struct TokioCountdownHandle {
    task: Option<JoinHandle<()>>,
}

impl CountdownHandle for TokioCountdownHandle {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioCountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
