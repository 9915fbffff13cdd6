//! Identifier types
//!
//! Every identifier that crosses the wire is an opaque string. Each kind
//! gets its own newtype so a question id can never be passed where a
//! player id is expected. Game ids are generated here as random hex
//! tokens; quiz ids are generated by the quiz store.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an existing identifier string
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

string_id!(
    /// Identifies a running game
    GameId
);
string_id!(
    /// Identifies a connected player (and the host, who is a player too)
    PlayerId
);
string_id!(
    /// Identifies a quiz in the quiz store
    QuizId
);
string_id!(
    /// Identifies a question within a quiz
    QuestionId
);
string_id!(
    /// Identifies an answer within a question
    AnswerId
);

impl GameId {
    /// Creates a new random game ID
    ///
    /// The id is a lowercase hex token of [`crate::constants::game::ID_BYTES`]
    /// random bytes. Collisions are not checked.
    pub fn generate() -> Self {
        let token = std::iter::repeat_with(|| fastrand::u8(..))
            .take(crate::constants::game::ID_BYTES)
            .fold(
                String::with_capacity(crate::constants::game::ID_BYTES * 2),
                |mut token, byte| {
                    let _ = write!(token, "{byte:02x}");
                    token
                },
            );
        Self(token)
    }
}

impl QuizId {
    /// Creates a new random quiz ID backed by a UUID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}
