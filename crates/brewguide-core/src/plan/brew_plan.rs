use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::step::ScaledStep;
use crate::error::ValidationError;

/// Snapshot of the brew parameters a plan was scaled from.
///
/// The engine never reads these; they travel unchanged into the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrewInputs {
    #[serde(default)]
    pub recipe_id: Option<String>,
    pub recipe_name: String,
    #[serde(default)]
    pub method: String,
    pub coffee_grams: f64,
    pub water_grams: f64,
    #[serde(default = "default_servings")]
    pub servings: u32,
}

fn default_servings() -> u32 {
    1
}

/// Ordered steps for one guided session plus the inputs they came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrewPlan {
    pub inputs: BrewInputs,
    pub steps: Vec<ScaledStep>,
}

impl BrewPlan {
    /// Create a validated plan.
    ///
    /// # Errors
    /// Returns an error if `steps` is empty or not ordered `0..len`.
    pub fn new(inputs: BrewInputs, steps: Vec<ScaledStep>) -> Result<Self, ValidationError> {
        let plan = Self { inputs, steps };
        plan.validate()?;
        Ok(plan)
    }

    /// Check the producer-side contract.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.steps.is_empty() {
            return Err(ValidationError::EmptyCollection("plan steps".into()));
        }
        for (position, step) in self.steps.iter().enumerate() {
            if step.order_index != position {
                return Err(ValidationError::NonContiguousOrder {
                    position,
                    found: step.order_index,
                });
            }
            if let Some(secs) = step.duration_seconds {
                if !secs.is_finite() || secs < 0.0 {
                    return Err(ValidationError::InvalidValue {
                        field: format!("steps[{position}].duration_seconds"),
                        message: format!("must be a finite value >= 0, got {secs}"),
                    });
                }
                if Duration::try_from_secs_f64(secs).is_err() {
                    return Err(ValidationError::InvalidValue {
                        field: format!("steps[{position}].duration_seconds"),
                        message: format!("{secs} seconds is out of range"),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, index: usize) -> Option<&ScaledStep> {
        self.steps.get(index)
    }

    /// Sum of all step countdowns, saturating at `Duration::MAX`.
    pub fn total_duration(&self) -> Duration {
        self.steps
            .iter()
            .filter_map(ScaledStep::duration)
            .fold(Duration::ZERO, Duration::saturating_add)
    }

    pub fn timed_step_count(&self) -> usize {
        self.steps.iter().filter(|s| s.is_timed()).count()
    }

    /// Countdown time of all steps before `step_index`.
    pub fn cumulative_duration(&self, step_index: usize) -> Duration {
        self.steps
            .iter()
            .take(step_index)
            .filter_map(ScaledStep::duration)
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}
