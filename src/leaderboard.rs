//! High score projections
//!
//! Scores live on the player records; this module ranks them on demand.
//! Nothing here is stored.

use std::cmp::Reverse;

use itertools::Itertools;
use serde::Serialize;

use super::{TruncatedVec, game::Player};

/// A player's name and score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerScore {
    /// Display name
    pub name: String,
    /// Points earned
    pub score: u64,
}

/// A ranked, size-limited snapshot of player scores for a game
pub type HighScore = TruncatedVec<PlayerScore>;

/// Ranks players by score, highest first, keeping at most `limit`
///
/// Players with equal scores keep the order they were given in. The exact
/// count records how many players were ranked before truncation.
pub fn high_score<'a, I>(players: I, limit: usize) -> HighScore
where
    I: IntoIterator<Item = &'a Player>,
{
    let ranked = players
        .into_iter()
        .sorted_by_key(|player| Reverse(player.score()))
        .collect_vec();
    let exact_count = ranked.len();

    TruncatedVec::new(ranked.into_iter(), limit, exact_count).map(|player| PlayerScore {
        name: player.name().to_owned(),
        score: player.score(),
    })
}
