//! Configuration constants for the quiz game system
//!
//! This module contains the limits and constraints used throughout the
//! crate to keep quiz definitions, player names, and game sizes within
//! sensible bounds.

/// Quiz definition limits
pub mod quiz {
    /// Maximum length of a quiz title in characters
    pub const MAX_TITLE_LENGTH: usize = 200;
    /// Maximum number of questions in a single quiz
    pub const MAX_QUESTION_COUNT: usize = 100;
}

/// Question limits
pub mod question {
    /// Maximum length of a question's text in characters
    pub const MAX_TEXT_LENGTH: usize = 200;
    /// Minimum number of answers a question offers
    pub const MIN_ANSWER_COUNT: usize = 1;
    /// Maximum number of answers a question offers
    pub const MAX_ANSWER_COUNT: usize = 8;
}

/// Answer text configuration constants
pub mod answer_text {
    /// Maximum length of answer text in characters
    pub const MAX_LENGTH: usize = 200;
}

/// Running game limits
pub mod game {
    /// Maximum number of players allowed in a single game
    pub const MAX_PLAYER_COUNT: usize = 1000;
    /// Number of random bytes in a generated game id (two hex digits each)
    pub const ID_BYTES: usize = 8;
}

/// Player display name limits
pub mod names {
    /// Maximum length of a display name in characters
    pub const MAX_LENGTH: usize = 30;
    /// Number of words in a generated pet name
    pub const GENERATED_WORDS: u8 = 2;
}
