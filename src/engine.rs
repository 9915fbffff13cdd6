//! The game engine
//!
//! The engine owns every running game and every joined player. It exposes
//! the lifecycle operations (start, update, join, pick, leave, rank) and a
//! dispatcher for commands arriving from connected clients. After each
//! mutation it pushes the resulting notifications through a [`Notifier`].
//!
//! All registry access goes through one lock, so at most one mutation is in
//! flight per engine. Quizzes are fetched before the lock is taken, and
//! notifications are delivered after it is released.

use std::{
    fmt::Debug,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use web_time::Instant;

use crate::{
    UpdateMessage,
    config::Options,
    game::{Game, GameState, Player, PlayerJoinedMessage},
    ids::{AnswerId, GameId, PlayerId, QuestionId, QuizId},
    leaderboard::{self, HighScore},
    names,
    quiz::{self, QuizStore},
    session::{Notifier, Outbox},
    store::Registry,
};

/// Errors reported by engine operations
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No game is registered under the id
    #[error("game {0} not found")]
    GameNotFound(GameId),
    /// The quiz store has no quiz under the id
    #[error("quiz {0} not found")]
    QuizNotFound(QuizId),
    /// The quiz store rejected a quiz
    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),
    /// The quiz has no question to start on
    #[error("quiz {0} has no questions")]
    EmptyQuiz(QuizId),
    /// The question does not belong to the game's quiz
    #[error("question {question_id} does not belong to game {game_id}")]
    GameUpdate {
        /// The game that was to be updated
        game_id: GameId,
        /// The foreign question
        question_id: QuestionId,
    },
    /// No player is registered under the id
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    /// The game already holds the maximum number of players
    #[error("game {0} is full")]
    GameFull(GameId),
    /// The requested display name was rejected
    #[error(transparent)]
    Name(#[from] names::Error),
}

impl From<quiz::Error> for Error {
    fn from(error: quiz::Error) -> Self {
        match error {
            quiz::Error::NotFound(quiz_id) => Self::QuizNotFound(quiz_id),
            quiz::Error::Invalid(reason) => Self::InvalidQuiz(reason),
        }
    }
}

/// Commands sent by connected clients
///
/// The issuing player's id travels alongside the command, not inside it.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub enum IncomingMessage {
    /// Join a game under a display name
    Join {
        /// The game to join
        game_id: GameId,
        /// Requested display name (blank for a generated one)
        name: String,
    },
    /// Answer a question of the player's game
    PickAnswer {
        /// The question being answered
        question_id: QuestionId,
        /// The chosen answer
        answer_id: AnswerId,
    },
    /// Leave the player's game
    LeaveGame,
    /// Start a game from a quiz, hosted by the issuing player
    CreateGame {
        /// The quiz to play
        quiz_id: QuizId,
    },
    /// Move a game to a question and state
    ChangeGameState {
        /// The game to update
        game_id: GameId,
        /// The question to show
        question_id: QuestionId,
        /// Whether the question is open or revealed
        state: GameState,
    },
}

/// Owns all games and players and reacts to commands
pub struct Engine<Q, N> {
    quizzes: Q,
    notifier: N,
    options: Options,
    registry: Mutex<Registry>,
}

impl<Q, N> Debug for Engine<Q, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<Q: QuizStore, N: Notifier> Engine<Q, N> {
    /// Creates an engine with empty registries
    pub fn new(quizzes: Q, notifier: N, options: Options) -> Self {
        Self {
            quizzes,
            notifier,
            options,
            registry: Mutex::new(Registry::default()),
        }
    }

    /// The quiz store games are started from
    pub fn quizzes(&self) -> &Q {
        &self.quizzes
    }

    /// The options this engine was created with
    pub fn options(&self) -> &Options {
        &self.options
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a game on the quiz's first question
    ///
    /// If a host is given, it receives the game state without any player
    /// context.
    ///
    /// # Errors
    ///
    /// * `Error::QuizNotFound` - The quiz store has no such quiz
    /// * `Error::EmptyQuiz` - The quiz has no questions
    #[instrument(skip(self))]
    pub fn start_game(&self, quiz_id: &QuizId, host_id: Option<PlayerId>) -> Result<Game, Error> {
        let quiz = Arc::new(self.quizzes.get(quiz_id)?);
        let game = Game::new(GameId::generate(), quiz, host_id)
            .ok_or_else(|| Error::EmptyQuiz(quiz_id.clone()))?;

        let mut outbox = Outbox::default();
        if let Some(host_id) = game.host_id() {
            outbox.push(
                host_id.clone(),
                game.state_message(None, self.options.withhold_answers_while_open),
            );
        }

        self.registry().insert_game(game.clone());
        tracing::info!(game_id = %game.id(), "game started");

        outbox.deliver(&self.notifier);
        Ok(game)
    }

    /// Returns a snapshot of a game
    ///
    /// # Errors
    ///
    /// Returns `Error::GameNotFound` if the id is not registered.
    pub fn game(&self, game_id: &GameId) -> Result<Game, Error> {
        self.registry()
            .game(game_id)
            .cloned()
            .ok_or_else(|| Error::GameNotFound(game_id.clone()))
    }

    /// Moves a game to a question and state, then tells every member
    ///
    /// Each registered member receives a game state message carrying their
    /// own last answer. Member ids without a player record are skipped.
    ///
    /// # Errors
    ///
    /// * `Error::GameNotFound` - The game does not exist
    /// * `Error::GameUpdate` - The question is not part of the game's quiz;
    ///   the game is left unchanged
    #[instrument(skip(self))]
    pub fn update_game(
        &self,
        game_id: &GameId,
        question_id: QuestionId,
        state: GameState,
    ) -> Result<Game, Error> {
        let mut outbox = Outbox::default();

        let game = {
            let mut registry = self.registry();
            let game = registry
                .game_mut(game_id)
                .ok_or_else(|| Error::GameNotFound(game_id.clone()))?;

            if !game.advance(question_id.clone(), state) {
                return Err(Error::GameUpdate {
                    game_id: game_id.clone(),
                    question_id,
                });
            }
            let game = game.clone();

            for player in registry.members(&game) {
                outbox.push(
                    player.id().clone(),
                    game.state_message(Some(player), self.options.withhold_answers_while_open),
                );
            }
            game
        };

        tracing::debug!("game updated");
        outbox.deliver(&self.notifier);
        Ok(game)
    }

    /// Ranks a game's registered members by score, keeping at most `limit`
    ///
    /// # Errors
    ///
    /// Returns `Error::GameNotFound` if the id is not registered.
    pub fn high_score(&self, game_id: &GameId, limit: usize) -> Result<HighScore, Error> {
        let registry = self.registry();
        let game = registry
            .game(game_id)
            .ok_or_else(|| Error::GameNotFound(game_id.clone()))?;

        let high_score = leaderboard::high_score(registry.members(game), limit);
        Ok(high_score)
    }

    /// Adds a player to a game
    ///
    /// The player starts with no score and no answer. A repeat join replaces
    /// the previous record, and a player still listed in another game is
    /// moved out of it. The joiner receives their game state, and the host,
    /// if any, is told who joined.
    ///
    /// # Errors
    ///
    /// * `Error::GameNotFound` - The game does not exist
    /// * `Error::Name` - The display name was rejected
    /// * `Error::GameFull` - The game already holds `max_players` players
    #[instrument(skip(self))]
    pub fn join_game(
        &self,
        game_id: &GameId,
        player_id: PlayerId,
        name: &str,
    ) -> Result<Player, Error> {
        let mut outbox = Outbox::default();

        let player = {
            let mut registry = self.registry();
            let game = registry
                .game(game_id)
                .ok_or_else(|| Error::GameNotFound(game_id.clone()))?;

            let name = names::resolve(name)?;
            if !game.has_player(&player_id) && game.player_ids().len() >= self.options.max_players
            {
                return Err(Error::GameFull(game_id.clone()));
            }

            let player = Player::new(player_id, name, game_id.clone());
            registry.insert_player(player.clone());

            if let Some(game) = registry.game(game_id) {
                outbox.push(
                    player.id().clone(),
                    game.state_message(Some(&player), self.options.withhold_answers_while_open),
                );
                if let Some(host_id) = game.host_id() {
                    outbox.push(
                        host_id.clone(),
                        PlayerJoinedMessage {
                            player_id: player.id().clone(),
                            name: player.name().to_owned(),
                        },
                    );
                }
            }
            player
        };

        tracing::debug!(name = player.name(), "player joined");
        outbox.deliver(&self.notifier);
        Ok(player)
    }

    /// Records a player's answer and scores it
    ///
    /// The answer is always remembered. A point is awarded only if the
    /// question is the game's current one and the answer is flagged right.
    /// Returns the updated player.
    ///
    /// # Errors
    ///
    /// Returns `Error::PlayerNotFound` if the player never joined.
    #[instrument(skip(self))]
    pub fn pick_answer(
        &self,
        player_id: &PlayerId,
        question_id: QuestionId,
        answer_id: AnswerId,
    ) -> Result<Player, Error> {
        let mut registry = self.registry();
        let (player, game) = registry
            .player_with_game(player_id)
            .ok_or_else(|| Error::PlayerNotFound(player_id.clone()))?;

        let awarded = player.pick(
            game.as_deref(),
            question_id,
            answer_id,
            self.options.award_once_per_question,
        );
        if let Some(game) = game {
            game.touch();
        }

        tracing::debug!(awarded, score = player.score(), "answer picked");
        Ok(player.clone())
    }

    /// Removes a player from the registry and from their game
    ///
    /// Nobody is notified. Leaving twice is not an error; the second call
    /// returns `None`.
    #[instrument(skip(self))]
    pub fn leave_game(&self, player_id: &PlayerId) -> Option<Player> {
        let player = self.registry().remove_player(player_id);
        match &player {
            Some(player) => tracing::debug!(game_id = %player.game_id(), "player left"),
            None => tracing::trace!("leave from unregistered player"),
        }
        player
    }

    /// Removes games idle for longer than the configured timeout
    ///
    /// Players of removed games are removed too. Returns the number of
    /// removed games; without an `idle_timeout` nothing is removed.
    pub fn expire_idle_games(&self) -> usize {
        let Some(timeout) = self.options.idle_timeout else {
            return 0;
        };

        let mut registry = self.registry();
        let expired = registry.expire(Instant::now(), timeout);
        for game_id in &expired {
            tracing::info!(%game_id, "game expired");
        }
        if !expired.is_empty() {
            tracing::debug!(
                games = registry.game_count(),
                players = registry.player_count(),
                "remaining after expiry"
            );
        }
        expired.len()
    }

    /// Dispatches a client command to the matching operation
    ///
    /// Notifications are the only observable effect of a successful command.
    ///
    /// # Errors
    ///
    /// Propagates the error of the operation the command maps to.
    pub fn receive_message(
        &self,
        player_id: &PlayerId,
        message: IncomingMessage,
    ) -> Result<(), Error> {
        match message {
            IncomingMessage::Join { game_id, name } => {
                self.join_game(&game_id, player_id.clone(), &name)?;
            }
            IncomingMessage::PickAnswer {
                question_id,
                answer_id,
            } => {
                self.pick_answer(player_id, question_id, answer_id)?;
            }
            IncomingMessage::LeaveGame => {
                self.leave_game(player_id);
            }
            IncomingMessage::CreateGame { quiz_id } => {
                self.start_game(&quiz_id, Some(player_id.clone()))?;
            }
            IncomingMessage::ChangeGameState {
                game_id,
                question_id,
                state,
            } => {
                self.update_game(&game_id, question_id, state)?;
            }
        }
        Ok(())
    }

    /// Dispatches a client command, reporting failure back to the issuer
    ///
    /// A failed command is logged and answered with an
    /// [`UpdateMessage::Error`] sent to the issuing player.
    pub fn handle_message(&self, player_id: &PlayerId, message: IncomingMessage) {
        if let Err(error) = self.receive_message(player_id, message) {
            tracing::warn!(%player_id, %error, "command failed");
            self.notifier.send(player_id, &UpdateMessage::Error(error));
        }
    }
}
