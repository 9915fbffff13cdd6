//! Engine configuration
//!
//! Options change game rules where the default behavior is debatable:
//! whether right answers leak while a question is still open, whether a
//! correct answer can be scored more than once, how many players fit in a
//! game, and when idle games are dropped.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Options for an [`crate::engine::Engine`]
#[serde_with::serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Hide right answer ids from game state messages while a question is open
    #[garde(skip)]
    pub withhold_answers_while_open: bool,
    /// Award at most one point per player per question
    #[garde(skip)]
    pub award_once_per_question: bool,
    /// Maximum number of players in a single game
    #[garde(range(min = 1, max = crate::constants::game::MAX_PLAYER_COUNT))]
    pub max_players: usize,
    /// Games without activity for this long are removed by
    /// [`crate::engine::Engine::expire_idle_games`]
    #[garde(skip)]
    #[serde_as(as = "Option<serde_with::DurationSeconds<u64>>")]
    pub idle_timeout: Option<Duration>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            withhold_answers_while_open: false,
            award_once_per_question: false,
            max_players: crate::constants::game::MAX_PLAYER_COUNT,
            idle_timeout: None,
        }
    }
}

/// Errors that can occur while loading options
#[derive(Error, Debug)]
pub enum Error {
    /// The input is not valid JSON for [`Options`]
    #[error("malformed options: {0}")]
    Json(#[from] serde_json::Error),
    /// The options parsed but are out of bounds
    #[error("invalid options: {0}")]
    Invalid(garde::Report),
}

impl Options {
    /// Parses and validates options from JSON
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the input cannot be parsed, or
    /// [`Error::Invalid`] if a value is out of bounds.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let options: Self = serde_json::from_str(json)?;
        options.validate().map_err(Error::Invalid)?;
        Ok(options)
    }
}
