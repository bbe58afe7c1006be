use std::{collections::BTreeSet, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordinal identifier of a [`Question`]. Higher ids come later in playback.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub u32);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("a quiz needs at least one question")]
    Empty,

    #[error("question {0} appears more than once")]
    DuplicateId(QuestionId),

    #[error("question {id} has an invalid timestamp ({timestamp})")]
    InvalidTimestamp { id: QuestionId, timestamp: f64 },

    #[error("question {id} does not come after the previous question in playback order")]
    OutOfOrder { id: QuestionId },

    #[error("question {0} has no choices")]
    NoChoices(QuestionId),

    #[error("question {id} marks choice {index} as correct but only has {len} choices")]
    CorrectChoiceOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },
}

/// A multiple-choice question shown once playback reaches `timestamp` seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub timestamp: f64,
    pub prompt: String,
    pub choices: Vec<String>,
    pub correct_choice: usize,
}

impl Question {
    pub fn new(
        id: u32,
        timestamp: f64,
        prompt: impl Into<String>,
        choices: impl IntoIterator<Item = impl Into<String>>,
        correct_choice: usize,
    ) -> Self {
        Self {
            id: QuestionId(id),
            timestamp,
            prompt: prompt.into(),
            choices: choices.into_iter().map(Into::into).collect(),
            correct_choice,
        }
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_choice
    }
}

/// A validated question set, ordered by id.
///
/// Ids strictly increase with timestamp (questions sharing a timestamp are
/// asked in id order), so walking the questions in id order
/// is the same as walking them in playback order.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    questions: Vec<Question>,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns a [`QuizError`] describing the first question that breaks the
    /// ordering or choice rules.
    pub fn new(mut questions: Vec<Question>) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }

        let mut seen = BTreeSet::new();
        for question in &questions {
            if !seen.insert(question.id) {
                return Err(QuizError::DuplicateId(question.id));
            }
            if !question.timestamp.is_finite() || question.timestamp < 0.0 {
                return Err(QuizError::InvalidTimestamp {
                    id: question.id,
                    timestamp: question.timestamp,
                });
            }
            if question.choices.is_empty() {
                return Err(QuizError::NoChoices(question.id));
            }
            if question.correct_choice >= question.choices.len() {
                return Err(QuizError::CorrectChoiceOutOfRange {
                    id: question.id,
                    index: question.correct_choice,
                    len: question.choices.len(),
                });
            }
        }

        questions.sort_by(|a, b| {
            a.timestamp
                .total_cmp(&b.timestamp)
                .then_with(|| a.id.cmp(&b.id))
        });
        for pair in questions.windows(2) {
            if pair[1].id <= pair[0].id {
                return Err(QuizError::OutOfOrder { id: pair[1].id });
            }
        }

        Ok(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions
            .binary_search_by_key(&id, |question| question.id)
            .ok()
            .map(|index| &self.questions[index])
    }

    /// Where a question's marker sits on a timeline of `duration`, from 0.0 to 1.0
    pub fn marker_fraction(question: &Question, duration: Duration) -> f32 {
        if duration.is_zero() {
            return 0.0;
        }
        (question.timestamp / duration.as_secs_f64()).clamp(0.0, 1.0) as f32
    }
}

impl Default for Quiz {
    fn default() -> Self {
        Self {
            questions: default_questions(),
        }
    }
}

/// The authored question set for the lionesses hunting video
pub fn default_questions() -> Vec<Question> {
    vec![
        Question::new(
            1,
            42.0,
            "¿Qué estrategia están usando las leonas para cazar?",
            ["Caza en solitario", "Caza en grupo coordinado"],
            1,
        ),
        Question::new(
            2,
            120.0,
            "¿Qué hace la leona principal durante la persecución?",
            [
                "Corre directamente hacia la presa",
                "Conduce a la presa hacia sus compañeras",
            ],
            1,
        ),
        Question::new(
            3,
            180.0,
            "¿Cuál es el papel de las leonas que esperan?",
            ["Descansar mientras las otras cazan", "Preparar una emboscada"],
            1,
        ),
        Question::new(
            4,
            300.0,
            "¿Por qué es efectiva esta técnica de caza?",
            [
                "Porque las leonas son muy rápidas",
                "Porque combina persecución y emboscada",
            ],
            1,
        ),
    ]
}
