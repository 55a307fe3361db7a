use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::plan::BrewInputs;

/// Star rating, 1 to 5 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    /// # Errors
    /// Returns an error if `value` is outside 1..=5.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValidationError::RatingOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// How the cup tasted, from a fixed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TasteTag {
    Balanced,
    Sour,
    Bitter,
    Weak,
    Strong,
}

impl TasteTag {
    pub const ALL: [TasteTag; 5] = [
        TasteTag::Balanced,
        TasteTag::Sour,
        TasteTag::Bitter,
        TasteTag::Weak,
        TasteTag::Strong,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TasteTag::Balanced => "balanced",
            TasteTag::Sour => "sour",
            TasteTag::Bitter => "bitter",
            TasteTag::Weak => "weak",
            TasteTag::Strong => "strong",
        }
    }
}

impl fmt::Display for TasteTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TasteTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TasteTag::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "tag".into(),
                message: format!("unknown taste tag '{s}'"),
            })
    }
}

/// What the user entered on the completion screen.
///
/// Kept by the session across failed saves so nothing has to be re-entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeDraft {
    pub rating: Rating,
    #[serde(default)]
    pub tag: Option<TasteTag>,
    #[serde(default)]
    pub note: Option<String>,
}

impl OutcomeDraft {
    pub fn new(rating: Rating) -> Self {
        Self {
            rating,
            tag: None,
            note: None,
        }
    }

    pub fn with_tag(mut self, tag: TasteTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Blank notes are dropped.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = if note.trim().is_empty() {
            None
        } else {
            Some(note)
        };
        self
    }
}

/// Final record of one finished session, handed to an [`super::OutcomeStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub rating: Rating,
    pub tag: Option<TasteTag>,
    pub note: Option<String>,
    pub inputs: BrewInputs,
    pub step_count: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}
