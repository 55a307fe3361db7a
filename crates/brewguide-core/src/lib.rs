//! # Brewguide Core Library
//!
//! This library provides the guided brew session engine behind Brewguide.
//! A brew plan is walked one step at a time; timed steps run a countdown and
//! only let the user move on once it reaches zero.
//!
//! ## Architecture
//!
//! - **Session Engine**: a state machine that owns the session state and
//!   reacts to user intents, app-activity changes and countdown events, all
//!   delivered through one serialized loop
//! - **Countdown**: an injectable timer abstraction with a tokio-backed
//!   implementation and a manually advanced virtual clock for tests
//! - **Outcome Handoff**: the rating recorded after a brew, saved through an
//!   external store; failed saves keep the session completed for retry
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Session`]: Core session state machine
//! - [`Countdown`]: Trait for countdown implementations
//! - [`OutcomeStore`]: Trait for outcome persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod outcome;
pub mod plan;
pub mod session;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, OutcomeError, ValidationError};
pub use events::Event;
pub use outcome::{MemoryOutcomeStore, OutcomeDraft, OutcomeStore, Rating, SessionOutcome, TasteTag};
pub use plan::{BrewInputs, BrewPlan, ScaledStep};
pub use session::{Intent, Phase, Session, SessionInput, SessionView, StepView};
pub use storage::Config;
pub use timer::{Countdown, CountdownHandle, TokioCountdown, VirtualClock};
