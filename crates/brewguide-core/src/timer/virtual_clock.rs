//! Manually advanced clock for deterministic tests.
//!
//! ```
//! use brewguide_core::timer::VirtualClock;
//! use std::time::Duration;
//!
//! let clock = VirtualClock::default();
//! clock.advance(Duration::from_secs(3));
//! assert_eq!(clock.now(), Duration::from_secs(3));
//! ```
//!
//! Clones share the same timeline, so a test keeps one clone and hands the
//! other to the session. Not `Send`: everything runs on the test's thread.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use super::countdown::{
    Countdown, CountdownHandle, Generation, TimerEvent, TimerSink, DEFAULT_TICK_INTERVAL,
};

#[derive(Debug)]
struct PendingCountdown {
    id: u64,
    generation: Generation,
    deadline: Duration,
    next_tick: Duration,
    sink: TimerSink,
}

impl PendingCountdown {
    fn next_fire(&self) -> Duration {
        self.next_tick.min(self.deadline)
    }
}

#[derive(Debug)]
struct ClockInner {
    now: Duration,
    tick_interval: Duration,
    next_id: u64,
    pending: Vec<PendingCountdown>,
    started: usize,
}

#[derive(Debug, Clone)]
pub struct VirtualClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl VirtualClock {
    /// # Panics
    /// Panics if `tick_interval` is zero.
    pub fn new(tick_interval: Duration) -> Self {
        assert!(!tick_interval.is_zero(), "tick interval must be non-zero");
        Self {
            inner: Rc::new(RefCell::new(ClockInner {
                now: Duration::ZERO,
                tick_interval,
                next_id: 0,
                pending: Vec::new(),
                started: 0,
            })),
        }
    }

    /// Time elapsed on this clock since it was created.
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Countdowns started and not yet finished or cancelled.
    pub fn active_countdowns(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Total countdowns ever started on this clock.
    pub fn started_countdowns(&self) -> usize {
        self.inner.borrow().started
    }

    /// Move time forward, firing every tick and finish due inside the window
    /// in time order.
    pub fn advance(&self, by: Duration) {
        let mut inner = self.inner.borrow_mut();
        let target = inner.now.saturating_add(by);
        let tick = inner.tick_interval;
        loop {
            let Some(at) = inner.pending.iter().map(PendingCountdown::next_fire).min() else {
                break;
            };
            if at > target {
                break;
            }
            inner.now = at;
            let mut finished = Vec::new();
            for countdown in inner.pending.iter_mut().filter(|c| c.next_fire() == at) {
                if at >= countdown.deadline {
                    let _ = countdown.sink.send(TimerEvent::finished(countdown.generation));
                    finished.push(countdown.id);
                } else {
                    let remaining = countdown.deadline - at;
                    let _ = countdown
                        .sink
                        .send(TimerEvent::tick(countdown.generation, remaining));
                    countdown.next_tick = countdown
                        .next_tick
                        .checked_add(tick)
                        .unwrap_or(countdown.deadline);
                }
            }
            inner.pending.retain(|c| !finished.contains(&c.id));
        }
        inner.now = target;
    }
}

impl Default for VirtualClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL)
    }
}

impl Countdown for VirtualClock {
    type Handle = VirtualCountdownHandle;

    fn start(
        &mut self,
        duration: Duration,
        generation: Generation,
        sink: TimerSink,
    ) -> Option<Self::Handle> {
        if duration.is_zero() {
            return None;
        }
        let mut inner = self.inner.borrow_mut();
        let deadline = inner.now.checked_add(duration)?;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.started += 1;
        let now = inner.now;
        let tick = inner.tick_interval;
        inner.pending.push(PendingCountdown {
            id,
            generation,
            deadline,
            next_tick: now.checked_add(tick).unwrap_or(deadline),
            sink,
        });
        Some(VirtualCountdownHandle {
            id,
            clock: Rc::clone(&self.inner),
            cancelled: false,
        })
    }
}

#[derive(Debug)]
pub struct VirtualCountdownHandle {
    id: u64,
    clock: Rc<RefCell<ClockInner>>,
    cancelled: bool,
}

impl CountdownHandle for VirtualCountdownHandle {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        let id = self.id;
        self.clock.borrow_mut().pending.retain(|c| c.id != id);
    }
}

impl Drop for VirtualCountdownHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
