//! Shared fixtures for session integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use brewguide_core::{
    BrewInputs, BrewPlan, Event, MemoryOutcomeStore, OutcomeError, OutcomeStore, ScaledStep,
    Session, SessionOutcome, VirtualClock,
};

pub fn inputs() -> BrewInputs {
    BrewInputs {
        recipe_id: Some("v60-classic".into()),
        recipe_name: "V60 Classic".into(),
        method: "pour_over".into(),
        coffee_grams: 15.0,
        water_grams: 250.0,
        servings: 1,
    }
}

pub fn plan(steps: Vec<ScaledStep>) -> BrewPlan {
    BrewPlan::new(inputs(), steps).expect("valid test plan")
}

pub fn start(steps: Vec<ScaledStep>) -> (VirtualClock, Session<VirtualClock>) {
    let clock = VirtualClock::default();
    let session = Session::new(plan(steps), clock.clone());
    (clock, session)
}

/// Advance the clock and apply every timer event it produced.
pub fn advance(clock: &VirtualClock, session: &mut Session<VirtualClock>, by: Duration) -> Vec<Event> {
    clock.advance(by);
    session.pump()
}

pub fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

/// Fails the first `failures` saves, then behaves like a memory store.
#[derive(Debug, Default)]
pub struct FlakyStore {
    failures: AtomicUsize,
    pub inner: MemoryOutcomeStore,
    pub attempts: AtomicUsize,
}

impl FlakyStore {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures: AtomicUsize::new(failures),
            ..Default::default()
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutcomeStore for FlakyStore {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn save(&self, outcome: &SessionOutcome) -> Result<(), OutcomeError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let left = self.failures.load(Ordering::SeqCst);
        if left > 0 {
            self.failures.store(left - 1, Ordering::SeqCst);
            return Err(OutcomeError::SaveFailed {
                reason: "store offline".into(),
            });
        }
        self.inner.save(outcome).await
    }
}
