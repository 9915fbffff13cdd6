//! The engine's registries
//!
//! Two containers: games by id and players by id. A player refers to its
//! game by id only, and a game lists its players by id only, so every
//! cross reference is resolved here at use time.

use std::{collections::HashMap, time::Duration};

use web_time::Instant;

use crate::{
    game::{Game, Player},
    ids::{GameId, PlayerId},
};

/// Games and players known to one engine
#[derive(Debug, Default)]
pub struct Registry {
    games: HashMap<GameId, Game>,
    players: HashMap<PlayerId, Player>,
}

impl Registry {
    /// Registers a game, replacing any game with the same id
    pub fn insert_game(&mut self, game: Game) {
        self.games.insert(game.id().clone(), game);
    }

    /// Looks up a game
    pub fn game(&self, game_id: &GameId) -> Option<&Game> {
        self.games.get(game_id)
    }

    /// Looks up a game for mutation
    pub fn game_mut(&mut self, game_id: &GameId) -> Option<&mut Game> {
        self.games.get_mut(game_id)
    }

    /// Registers a player and adds them to their game's members
    ///
    /// A previous record under the same id is replaced, and if it belonged
    /// to a different game the id is dropped from that game's members.
    /// Returns the replaced record.
    pub fn insert_player(&mut self, player: Player) -> Option<Player> {
        let previous = self.players.insert(player.id().clone(), player.clone());

        if let Some(previous) = &previous {
            if previous.game_id() != player.game_id() {
                if let Some(game) = self.games.get_mut(previous.game_id()) {
                    game.remove_player(previous.id());
                }
            }
        }

        if let Some(game) = self.games.get_mut(player.game_id()) {
            game.add_player(player.id().clone());
        }

        previous
    }

    /// Removes a player from the registry and from their game's members
    ///
    /// Returns `None` if the player was not registered.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> Option<Player> {
        let player = self.players.remove(player_id)?;
        if let Some(game) = self.games.get_mut(player.game_id()) {
            game.remove_player(player_id);
        }
        Some(player)
    }

    /// Splits a player and their game into simultaneously usable borrows
    pub fn player_with_game(
        &mut self,
        player_id: &PlayerId,
    ) -> Option<(&mut Player, Option<&mut Game>)> {
        let player = self.players.get_mut(player_id)?;
        let game = self.games.get_mut(player.game_id());
        Some((player, game))
    }

    /// The registered members of a game, in join order
    ///
    /// Member ids without a player record are skipped.
    pub fn members<'a>(&'a self, game: &'a Game) -> impl Iterator<Item = &'a Player> + 'a {
        game.player_ids()
            .iter()
            .filter_map(|player_id| self.players.get(player_id))
    }

    /// Removes games idle for longer than `timeout`, with their players
    ///
    /// Returns the ids of the removed games.
    pub fn expire(&mut self, now: Instant, timeout: Duration) -> Vec<GameId> {
        let expired: Vec<GameId> = self
            .games
            .values()
            .filter(|game| now.saturating_duration_since(game.last_activity()) > timeout)
            .map(|game| game.id().clone())
            .collect();

        for game_id in &expired {
            if let Some(game) = self.games.remove(game_id) {
                for player_id in game.player_ids() {
                    if self
                        .players
                        .get(player_id)
                        .is_some_and(|player| player.game_id() == game_id)
                    {
                        self.players.remove(player_id);
                    }
                }
            }
        }

        expired
    }

    /// Number of registered games
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Number of registered players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        ids::QuizId,
        quiz::{
            Quiz,
            tests::{answer, question},
        },
    };

    fn game(id: &str) -> Game {
        Game::new(
            GameId::from(id),
            Arc::new(Quiz {
                id: QuizId::from("quiz"),
                title: "Quiz".to_string(),
                questions: vec![question("q1", vec![answer("a1", true)])],
            }),
            None,
        )
        .unwrap()
    }

    fn player(id: &str, game_id: &str) -> Player {
        Player::new(PlayerId::from(id), id.to_string(), GameId::from(game_id))
    }

    #[test]
    fn test_insert_player_joins_game() {
        let mut registry = Registry::default();
        registry.insert_game(game("g"));
        registry.insert_player(player("p", "g"));

        let game = registry.game(&GameId::from("g")).unwrap();
        assert_eq!(game.player_ids(), &[PlayerId::from("p")]);
        assert_eq!(registry.members(game).count(), 1);
    }

    #[test]
    fn test_insert_player_moves_between_games() {
        let mut registry = Registry::default();
        registry.insert_game(game("g1"));
        registry.insert_game(game("g2"));
        registry.insert_player(player("p", "g1"));
        let previous = registry.insert_player(player("p", "g2"));

        assert_eq!(previous.unwrap().game_id(), &GameId::from("g1"));
        assert!(registry.game(&GameId::from("g1")).unwrap().player_ids().is_empty());
        assert_eq!(
            registry.game(&GameId::from("g2")).unwrap().player_ids(),
            &[PlayerId::from("p")]
        );
        assert_eq!(registry.player_count(), 1);
    }

    #[test]
    fn test_remove_player() {
        let mut registry = Registry::default();
        registry.insert_game(game("g"));
        registry.insert_player(player("p", "g"));

        assert!(registry.remove_player(&PlayerId::from("p")).is_some());
        assert!(registry.remove_player(&PlayerId::from("p")).is_none());
        assert!(registry.game(&GameId::from("g")).unwrap().player_ids().is_empty());
    }

    #[test]
    fn test_player_with_game() {
        let mut registry = Registry::default();
        registry.insert_game(game("g"));
        registry.insert_player(player("p", "g"));
        registry.insert_player(player("orphan", "missing"));

        let (player, game) = registry.player_with_game(&PlayerId::from("p")).unwrap();
        assert_eq!(player.id(), &PlayerId::from("p"));
        assert!(game.is_some());

        let (_, game) = registry.player_with_game(&PlayerId::from("orphan")).unwrap();
        assert!(game.is_none());

        assert!(registry.player_with_game(&PlayerId::from("nobody")).is_none());
    }

    #[test]
    fn test_expire_removes_idle_games_and_players() {
        let mut registry = Registry::default();
        registry.insert_game(game("g"));
        registry.insert_player(player("p", "g"));

        let later = Instant::now() + Duration::from_secs(120);
        assert!(registry.expire(Instant::now(), Duration::from_secs(60)).is_empty());

        let expired = registry.expire(later, Duration::from_secs(60));
        assert_eq!(expired, vec![GameId::from("g")]);
        assert_eq!(registry.game_count(), 0);
        assert_eq!(registry.player_count(), 0);
    }
}
