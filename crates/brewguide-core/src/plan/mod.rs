mod brew_plan;
mod step;

pub use brew_plan::{BrewInputs, BrewPlan};
pub use step::ScaledStep;
