use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One instruction of a brew plan, already scaled to the user's dose.
///
/// Produced by the recipe/scaling side and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledStep {
    /// Zero-based position within the plan.
    pub order_index: usize,
    pub instruction_text: String,
    /// Countdown length. Absent means the step is untimed.
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub water_amount_grams: Option<f64>,
    /// Whether `water_amount_grams` is a running total rather than a pour.
    #[serde(default)]
    pub is_cumulative_target: bool,
}

impl ScaledStep {
    /// Timed step.
    pub fn timed(order_index: usize, instruction: impl Into<String>, seconds: f64) -> Self {
        Self {
            order_index,
            instruction_text: instruction.into(),
            duration_seconds: Some(seconds),
            water_amount_grams: None,
            is_cumulative_target: false,
        }
    }

    /// Untimed step, ready to advance as soon as it is shown.
    pub fn untimed(order_index: usize, instruction: impl Into<String>) -> Self {
        Self {
            order_index,
            instruction_text: instruction.into(),
            duration_seconds: None,
            water_amount_grams: None,
            is_cumulative_target: false,
        }
    }

    pub fn with_water(mut self, grams: f64, cumulative: bool) -> Self {
        self.water_amount_grams = Some(grams);
        self.is_cumulative_target = cumulative;
        self
    }

    /// Countdown length, if this step runs a timer.
    ///
    /// Zero, negative and non-finite durations count as untimed, and so do
    /// values too large for a `Duration`.
    pub fn duration(&self) -> Option<Duration> {
        self.duration_seconds
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    pub fn is_timed(&self) -> bool {
        self.duration().is_some()
    }
}
