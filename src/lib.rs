//! # Quizroom
//!
//! This library provides the core game logic for a small multiplayer quiz
//! backend. Players join a game built from a quiz, answer its questions,
//! and collect points, while the engine decides which state changes to
//! push to which connected player.

#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
use derive_where::derive_where;
use itertools::Itertools;
use serde::Serialize;

pub mod config;
pub mod constants;
pub mod engine;
pub mod game;
pub mod ids;
pub mod leaderboard;
pub mod names;
pub mod quiz;
pub mod session;
pub mod store;

/// Messages pushed to connected players
///
/// Each variant wraps one kind of notification. The serialized form is
/// externally tagged, e.g. `{"PlayerJoined":{"player_id":"..","name":".."}}`.
#[derive(Debug, Serialize, Clone, derive_more::From)]
pub enum UpdateMessage {
    /// The state of a game as seen by the recipient
    GameState(game::GameStateMessage),
    /// Someone joined the recipient's hosted game
    PlayerJoined(game::PlayerJoinedMessage),
    /// A command the recipient issued failed
    Error(engine::Error),
}

impl UpdateMessage {
    /// Converts the update message to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

/// The top of a ranking plus the size of the whole ranking
///
/// A leaderboard shows only its first few entries, yet clients still want
/// to know how many players were ranked in total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    exact_count: usize,
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Keeps the first `limit` entries of an already ordered ranking
    ///
    /// `exact_count` is the number of entries before the cut.
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Converts every kept entry, leaving the total untouched
    pub fn map<F, U>(self, f: F) -> TruncatedVec<U>
    where
        F: Fn(T) -> U,
    {
        TruncatedVec {
            exact_count: self.exact_count,
            items: self.items.into_iter().map(f).collect_vec(),
        }
    }

    /// How many entries were ranked before the cut
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// The kept entries, best first
    pub fn items(&self) -> &[T] {
        &self.items
    }
}
