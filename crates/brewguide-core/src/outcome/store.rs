use async_trait::async_trait;
use std::sync::Mutex;

use super::record::SessionOutcome;
use crate::error::OutcomeError;

/// Persists finished-session records.
///
/// Implementations own their I/O. The engine only awaits `save` and reports
/// the result; it never retries on its own.
#[async_trait]
pub trait OutcomeStore: Send + Sync {
    /// Unique identifier (e.g. "memory", "stdout").
    fn name(&self) -> &str;

    async fn save(&self, outcome: &SessionOutcome) -> Result<(), OutcomeError>;
}

/// Keeps saved outcomes in memory.
#[derive(Debug, Default)]
pub struct MemoryOutcomeStore {
    saved: Mutex<Vec<SessionOutcome>>,
}

impl MemoryOutcomeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Vec<SessionOutcome> {
        self.saved
            .lock()
            .map(|saved| saved.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.saved.lock().map(|saved| saved.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl OutcomeStore for MemoryOutcomeStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn save(&self, outcome: &SessionOutcome) -> Result<(), OutcomeError> {
        let mut saved = self.saved.lock().map_err(|_| OutcomeError::SaveFailed {
            reason: "memory store lock poisoned".into(),
        })?;
        saved.push(outcome.clone());
        Ok(())
    }
}
