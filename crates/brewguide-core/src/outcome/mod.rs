//! Outcome handoff: what the user reports once a session completes, and the
//! store seam it is saved through.

mod record;
mod store;

pub use record::{OutcomeDraft, Rating, SessionOutcome, TasteTag};
pub use store::{MemoryOutcomeStore, OutcomeStore};
