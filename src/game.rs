//! Game and player records
//!
//! This module contains the in-memory records the engine mutates: a
//! [`Game`] built from a quiz with its progression state and membership,
//! and the [`Player`] records that hang off it. It also assembles the
//! messages that describe a game to one of its participants.

use std::{collections::HashSet, fmt::Debug, sync::Arc};

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::{
    ids::{AnswerId, GameId, PlayerId, QuestionId},
    quiz::{Answer, Question, Quiz},
};

/// Whether the current question is open or its right answer is being revealed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameState {
    /// The question is open for answers
    #[default]
    Question,
    /// The right answer is being revealed
    Answer,
}

/// One running instance of a quiz
///
/// The game holds only the ids of its players; the player records
/// themselves live in the engine's registry.
#[derive(Clone)]
pub struct Game {
    id: GameId,
    quiz: Arc<Quiz>,
    current_question_id: QuestionId,
    state: GameState,
    host_id: Option<PlayerId>,
    player_ids: Vec<PlayerId>,
    last_activity: Instant,
}

impl Debug for Game {
    /// Custom debug implementation that avoids printing the whole quiz
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("quiz", &self.quiz.id)
            .field("current_question_id", &self.current_question_id)
            .field("state", &self.state)
            .field("host_id", &self.host_id)
            .field("player_ids", &self.player_ids)
            .finish_non_exhaustive()
    }
}

impl Game {
    /// Creates a game on the quiz's first question, open for answers
    ///
    /// Returns `None` if the quiz has no questions.
    pub fn new(id: GameId, quiz: Arc<Quiz>, host_id: Option<PlayerId>) -> Option<Self> {
        let current_question_id = quiz.first_question()?.id.clone();
        Some(Self {
            id,
            quiz,
            current_question_id,
            state: GameState::Question,
            host_id,
            player_ids: Vec::new(),
            last_activity: Instant::now(),
        })
    }

    /// The game's identifier
    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// The quiz this game plays
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    /// The id of the question currently in play
    pub fn current_question_id(&self) -> &QuestionId {
        &self.current_question_id
    }

    /// The question currently in play, if its id still resolves
    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.question(&self.current_question_id)
    }

    /// Whether the current question is open or being revealed
    pub fn state(&self) -> GameState {
        self.state
    }

    /// The player receiving join notifications, if any
    pub fn host_id(&self) -> Option<&PlayerId> {
        self.host_id.as_ref()
    }

    /// Ids of the joined players, in join order
    pub fn player_ids(&self) -> &[PlayerId] {
        &self.player_ids
    }

    /// Whether the player is a member of this game
    pub fn has_player(&self, player_id: &PlayerId) -> bool {
        self.player_ids.contains(player_id)
    }

    /// Moves the game to another question of its quiz
    ///
    /// Returns `false` and leaves the game untouched if the question does
    /// not belong to the quiz.
    pub fn advance(&mut self, question_id: QuestionId, state: GameState) -> bool {
        if !self.quiz.contains_question(&question_id) {
            return false;
        }
        self.current_question_id = question_id;
        self.state = state;
        self.touch();
        true
    }

    /// Adds a member, ignoring repeats
    pub(crate) fn add_player(&mut self, player_id: PlayerId) {
        if !self.has_player(&player_id) {
            self.player_ids.push(player_id);
        }
        self.touch();
    }

    /// Removes a member if present
    pub(crate) fn remove_player(&mut self, player_id: &PlayerId) {
        self.player_ids.retain(|id| id != player_id);
    }

    /// Records activity for idle expiry
    pub(crate) fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Time of the last join, pick, or state change
    pub fn last_activity(&self) -> Instant {
        self.last_activity
    }

    /// Builds the game state message for a participant
    ///
    /// Without a player the message carries no last answer, which is what
    /// the host receives. Right answer ids are `None` when the current
    /// question does not resolve, or while the question is open if
    /// `withhold_while_open` is set.
    pub fn state_message(
        &self,
        player: Option<&Player>,
        withhold_while_open: bool,
    ) -> GameStateMessage {
        let current_question = self.current_question();

        let right_answer_ids = match self.state {
            GameState::Question if withhold_while_open => None,
            GameState::Question | GameState::Answer => {
                current_question.map(Question::right_answer_ids)
            }
        };

        GameStateMessage {
            game_id: self.id.clone(),
            state: self.state,
            quiz_title: self.quiz.title.clone(),
            current_question: current_question.map(QuestionView::from),
            right_answer_ids,
            last_answer_id: player.and_then(|p| p.last_answer_id.clone()),
        }
    }
}

/// A participant of exactly one game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    id: PlayerId,
    name: String,
    game_id: GameId,
    score: u64,
    last_question_id: Option<QuestionId>,
    last_answer_id: Option<AnswerId>,
    scored_questions: HashSet<QuestionId>,
}

impl Player {
    /// A fresh player with no score and no answer yet
    pub fn new(id: PlayerId, name: String, game_id: GameId) -> Self {
        Self {
            id,
            name,
            game_id,
            score: 0,
            last_question_id: None,
            last_answer_id: None,
            scored_questions: HashSet::new(),
        }
    }

    /// The player's identifier
    pub fn id(&self) -> &PlayerId {
        &self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The game this player belongs to
    pub fn game_id(&self) -> &GameId {
        &self.game_id
    }

    /// Points earned so far
    pub fn score(&self) -> u64 {
        self.score
    }

    /// The question of the most recent pick
    pub fn last_question_id(&self) -> Option<&QuestionId> {
        self.last_question_id.as_ref()
    }

    /// The answer of the most recent pick
    pub fn last_answer_id(&self) -> Option<&AnswerId> {
        self.last_answer_id.as_ref()
    }

    /// Records a pick and scores it
    ///
    /// The pick is always remembered. A point is awarded only when the pick
    /// targets the game's current question and the answer is flagged right.
    /// With `award_once` set, a question that already scored for this player
    /// does not score again. Returns whether a point was awarded.
    pub fn pick(
        &mut self,
        game: Option<&Game>,
        question_id: QuestionId,
        answer_id: AnswerId,
        award_once: bool,
    ) -> bool {
        let awarded = game.is_some_and(|game| {
            game.current_question_id() == &question_id
                && game
                    .current_question()
                    .is_some_and(|question| question.is_right(&answer_id))
        }) && !(award_once && self.scored_questions.contains(&question_id));

        if awarded {
            self.score += 1;
            self.scored_questions.insert(question_id.clone());
        }

        self.last_question_id = Some(question_id);
        self.last_answer_id = Some(answer_id);

        awarded
    }
}

/// The state of a game as seen by one participant
///
/// Nullable fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStateMessage {
    /// The game being described
    pub game_id: GameId,
    /// Whether the question is open or revealed
    pub state: GameState,
    /// Title of the quiz being played
    pub quiz_title: String,
    /// The current question with all its answers, right flags stripped
    pub current_question: Option<QuestionView>,
    /// Ids of the answers flagged right
    pub right_answer_ids: Option<Vec<AnswerId>>,
    /// The recipient's own most recent answer
    pub last_answer_id: Option<AnswerId>,
}

/// A question as players see it
///
/// Answers carry no right flag; right answers travel only in
/// [`GameStateMessage::right_answer_ids`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    /// Identifier, unique within its quiz
    pub id: QuestionId,
    /// The question text
    pub text: String,
    /// Answer options in display order
    pub answers: Vec<AnswerView>,
}

/// An answer option as players see it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnswerView {
    /// Identifier, unique within its question
    pub id: AnswerId,
    /// Text shown to players
    pub text: String,
}

impl From<&Question> for QuestionView {
    fn from(question: &Question) -> Self {
        Self {
            id: question.id.clone(),
            text: question.text.clone(),
            answers: question.answers.iter().map(AnswerView::from).collect(),
        }
    }
}

impl From<&Answer> for AnswerView {
    fn from(answer: &Answer) -> Self {
        Self {
            id: answer.id.clone(),
            text: answer.text.clone(),
        }
    }
}

/// Tells the host that someone joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerJoinedMessage {
    /// Who joined
    pub player_id: PlayerId,
    /// Their display name
    pub name: String,
}
