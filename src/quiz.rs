//! Quiz definitions and the quiz store
//!
//! A quiz is authored independently of any running game: a title and an
//! ordered list of questions, each with its answers. The engine only ever
//! reads quizzes, through the [`QuizStore`] trait.

use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use garde::Validate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{AnswerId, QuestionId, QuizId};

/// A single answer option of a question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Answer {
    /// Identifier, unique within its question
    #[garde(skip)]
    pub id: AnswerId,
    /// Text shown to players
    #[garde(length(max = crate::constants::answer_text::MAX_LENGTH))]
    pub text: String,
    /// Whether picking this answer scores
    #[garde(skip)]
    pub is_right: bool,
}

/// A question and its answer options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Identifier, unique within its quiz
    #[garde(skip)]
    pub id: QuestionId,
    /// The question text
    #[garde(length(max = crate::constants::question::MAX_TEXT_LENGTH))]
    pub text: String,
    /// Answer options in display order
    #[garde(
        length(
            min = crate::constants::question::MIN_ANSWER_COUNT,
            max = crate::constants::question::MAX_ANSWER_COUNT
        ),
        dive
    )]
    pub answers: Vec<Answer>,
}

impl Question {
    /// Ids of every answer flagged right, in display order
    ///
    /// Nothing enforces exactly one right answer, so this may be empty or
    /// hold several ids.
    pub fn right_answer_ids(&self) -> Vec<AnswerId> {
        self.answers
            .iter()
            .filter(|answer| answer.is_right)
            .map(|answer| answer.id.clone())
            .collect()
    }

    /// Whether `answer_id` names an answer of this question flagged right
    pub fn is_right(&self, answer_id: &AnswerId) -> bool {
        self.answers
            .iter()
            .any(|answer| answer.is_right && &answer.id == answer_id)
    }
}

/// A complete quiz
///
/// Question order is stable and defines how a game progresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Quiz {
    /// Identifier assigned by the store
    #[garde(skip)]
    pub id: QuizId,
    /// The title of the quiz
    #[garde(length(max = crate::constants::quiz::MAX_TITLE_LENGTH))]
    pub title: String,
    /// Questions in play order
    #[garde(length(min = 1, max = crate::constants::quiz::MAX_QUESTION_COUNT), dive)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// The question a new game starts on
    pub fn first_question(&self) -> Option<&Question> {
        self.questions.first()
    }

    /// Looks up a question by id
    pub fn question(&self, question_id: &QuestionId) -> Option<&Question> {
        self.questions
            .iter()
            .find(|question| &question.id == question_id)
    }

    /// Whether `question_id` belongs to this quiz
    pub fn contains_question(&self, question_id: &QuestionId) -> bool {
        self.question(question_id).is_some()
    }
}

/// A quiz that has not been stored yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDraft {
    /// The title of the quiz
    pub title: String,
    /// Questions in play order
    pub questions: Vec<Question>,
}

impl QuizDraft {
    fn into_quiz(self, id: QuizId) -> Quiz {
        Quiz {
            id,
            title: self.title,
            questions: self.questions,
        }
    }
}

/// Errors reported by a quiz store
#[derive(Error, Serialize, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No quiz is stored under the id
    #[error("quiz {0} not found")]
    NotFound(QuizId),
    /// The quiz failed validation
    #[error("invalid quiz: {0}")]
    Invalid(String),
}

/// Read and write access to quiz definitions
pub trait QuizStore {
    /// Fetches a quiz by id
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no quiz has the id.
    fn get(&self, quiz_id: &QuizId) -> Result<Quiz, Error>;

    /// Stores a new quiz under a freshly generated id
    ///
    /// # Errors
    ///
    /// Returns [`Error::Invalid`] if the quiz fails validation.
    fn create(&self, draft: QuizDraft) -> Result<Quiz, Error>;

    /// Replaces an existing quiz
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the quiz was never stored, or
    /// [`Error::Invalid`] if it fails validation.
    fn edit(&self, quiz: Quiz) -> Result<Quiz, Error>;
}

impl<S: QuizStore + ?Sized> QuizStore for std::sync::Arc<S> {
    fn get(&self, quiz_id: &QuizId) -> Result<Quiz, Error> {
        (**self).get(quiz_id)
    }

    fn create(&self, draft: QuizDraft) -> Result<Quiz, Error> {
        (**self).create(draft)
    }

    fn edit(&self, quiz: Quiz) -> Result<Quiz, Error> {
        (**self).edit(quiz)
    }
}

/// A process-lifetime quiz store
#[derive(Debug, Default)]
pub struct InMemoryQuizStore {
    quizzes: RwLock<HashMap<QuizId, Quiz>>,
}

impl InMemoryQuizStore {
    fn validate(quiz: &Quiz) -> Result<(), Error> {
        quiz.validate().map_err(|e| Error::Invalid(e.to_string()))
    }
}

impl QuizStore for InMemoryQuizStore {
    fn get(&self, quiz_id: &QuizId) -> Result<Quiz, Error> {
        self.quizzes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(quiz_id.clone()))
    }

    fn create(&self, draft: QuizDraft) -> Result<Quiz, Error> {
        let quiz = draft.into_quiz(QuizId::generate());
        Self::validate(&quiz)?;

        self.quizzes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(quiz.id.clone(), quiz.clone());

        tracing::debug!(quiz_id = %quiz.id, "quiz created");
        Ok(quiz)
    }

    fn edit(&self, quiz: Quiz) -> Result<Quiz, Error> {
        Self::validate(&quiz)?;

        let mut quizzes = self.quizzes.write().unwrap_or_else(PoisonError::into_inner);
        let Some(stored) = quizzes.get_mut(&quiz.id) else {
            return Err(Error::NotFound(quiz.id));
        };
        *stored = quiz.clone();

        tracing::debug!(quiz_id = %quiz.id, "quiz edited");
        Ok(quiz)
    }
}
