mod engine;
mod intent;
mod state;

pub use engine::Session;
pub use intent::{Intent, SessionInput};
pub use state::{Phase, SessionView, StepView};
