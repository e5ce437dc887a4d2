//! Quiz navigation and grading state machine.
//!
//! `QuizState` is pure: it never renders or speaks. Callers turn the values it
//! returns (`Grading`, `Navigation`, `SessionSummary`) into display and speech
//! effects, and own the timer behind scheduled auto-advances.

use chrono::{DateTime, Utc};
use rand::Rng;
use thiserror::Error;

use crate::model::{FinishReason, Question, SessionSummary, SessionSummaryError};
use crate::shuffle::shuffled;
use crate::spoken::{SpokenAnswer, interpret_spoken_answer};

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("No questions to display.")]
    EmptyPool,

    #[error("no quiz is in progress")]
    NotActive,

    #[error("option {} does not exist; the question has {options} options", .selected + 1)]
    InvalidOption { selected: usize, options: usize },

    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
}

//
// ─── VALUES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Result of the most recent grading on the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

/// Handle for an auto-advance scheduled after a correct answer.
///
/// Only honoured while the session is still on `index` and nothing else has
/// happened since (`generation` unchanged).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceTicket {
    index: usize,
    generation: u64,
}

impl AdvanceTicket {
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grading {
    Correct {
        selected: usize,
        ticket: AdvanceTicket,
    },
    Incorrect {
        selected: usize,
        correct_index: usize,
        correct_option: String,
        explanation: Option<String>,
    },
}

impl Grading {
    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self, Grading::Correct { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Now showing the question at `index`.
    Moved { index: usize },
    /// Nothing changed (first question going back, or a stale ticket).
    Unchanged,
    /// Moved past the last question.
    Finished(SessionSummary),
}

//
// ─── STATE ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct ActiveQuiz {
    questions: Vec<Question>,
    current: usize,
    correct: u32,
    attempted: u32,
    history: Vec<usize>,
    last_outcome: Option<Outcome>,
    started_at: DateTime<Utc>,
}

/// Runtime state of one quiz attempt, or idle between attempts.
#[derive(Debug, Clone, Default)]
pub struct QuizState {
    active: Option<ActiveQuiz>,
    // Bumped on every transition; never reset, so tickets from an earlier
    // attempt stay stale.
    generation: u64,
}

impl QuizState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a quiz over a shuffled copy of `pool`.
    ///
    /// Replaces any quiz already in progress.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyPool` if `pool` is empty; state is left untouched.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        pool: &[Question],
        rng: &mut R,
        started_at: DateTime<Utc>,
    ) -> Result<(), QuizError> {
        if pool.is_empty() {
            return Err(QuizError::EmptyPool);
        }

        self.active = Some(ActiveQuiz {
            questions: shuffled(pool, rng),
            current: 0,
            correct: 0,
            attempted: 0,
            history: vec![0],
            last_outcome: None,
            started_at,
        });
        self.bump();
        Ok(())
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        self.active
            .as_ref()
            .map(|quiz| quiz.questions.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions().is_empty()
    }

    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.active.as_ref().map(|quiz| quiz.current)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.active
            .as_ref()
            .and_then(|quiz| quiz.questions.get(quiz.current))
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.active.as_ref().map_or(0, |quiz| quiz.correct)
    }

    #[must_use]
    pub fn attempted_count(&self) -> u32 {
        self.active.as_ref().map_or(0, |quiz| quiz.attempted)
    }

    /// Indices reached by moving forward, starting with `0`. Going back does
    /// not remove entries.
    #[must_use]
    pub fn history(&self) -> &[usize] {
        self.active
            .as_ref()
            .map(|quiz| quiz.history.as_slice())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.active.as_ref().and_then(|quiz| quiz.last_outcome)
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current_index().is_some_and(|index| index > 0)
    }

    /// Grade `selected` against the current question.
    ///
    /// Every call counts as an attempt, including repeated answers to the
    /// same question. A correct answer returns a ticket for the auto-advance;
    /// any submission invalidates tickets handed out earlier.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` when idle and `QuizError::InvalidOption`
    /// when `selected` is past the last option (nothing is counted).
    pub fn submit_answer(&mut self, selected: usize) -> Result<Grading, QuizError> {
        let quiz = self.active.as_mut().ok_or(QuizError::NotActive)?;
        let question = &quiz.questions[quiz.current];
        if selected >= question.options().len() {
            return Err(QuizError::InvalidOption {
                selected,
                options: question.options().len(),
            });
        }

        quiz.attempted = quiz.attempted.saturating_add(1);
        let grading = if selected == question.correct_index() {
            quiz.correct = quiz.correct.saturating_add(1);
            quiz.last_outcome = Some(Outcome::Correct);
            Grading::Correct {
                selected,
                ticket: AdvanceTicket {
                    index: quiz.current,
                    generation: self.generation.wrapping_add(1),
                },
            }
        } else {
            quiz.last_outcome = Some(Outcome::Incorrect);
            Grading::Incorrect {
                selected,
                correct_index: question.correct_index(),
                correct_option: question.correct_option().to_owned(),
                explanation: question.explanation().map(str::to_owned),
            }
        };

        self.bump();
        Ok(grading)
    }

    /// Move one question forward or back.
    ///
    /// `Next` on the last question finishes the quiz as completed.
    /// `Previous` on the first question is a no-op. History only grows on `Next`.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` when idle.
    pub fn advance(
        &mut self,
        direction: Direction,
        now: DateTime<Utc>,
    ) -> Result<Navigation, QuizError> {
        let quiz = self.active.as_mut().ok_or(QuizError::NotActive)?;

        match direction {
            Direction::Next if quiz.current + 1 < quiz.questions.len() => {
                quiz.current += 1;
                quiz.history.push(quiz.current);
                quiz.last_outcome = None;
                let index = quiz.current;
                self.bump();
                Ok(Navigation::Moved { index })
            }
            Direction::Next => match self.finish(FinishReason::Completed, now)? {
                Some(summary) => Ok(Navigation::Finished(summary)),
                None => Err(QuizError::NotActive),
            },
            Direction::Previous if quiz.current > 0 => {
                quiz.current -= 1;
                quiz.last_outcome = None;
                let index = quiz.current;
                self.bump();
                Ok(Navigation::Moved { index })
            }
            Direction::Previous => Ok(Navigation::Unchanged),
        }
    }

    /// Whether `ticket` would still advance the quiz if fired now.
    #[must_use]
    pub fn is_ticket_current(&self, ticket: AdvanceTicket) -> bool {
        ticket.generation == self.generation && self.current_index() == Some(ticket.index)
    }

    /// Perform a scheduled auto-advance, or do nothing if the ticket is stale.
    ///
    /// # Errors
    ///
    /// Propagates `QuizError::Summary` if the quiz finishes with inconsistent times.
    pub fn fire_scheduled_advance(
        &mut self,
        ticket: AdvanceTicket,
        now: DateTime<Utc>,
    ) -> Result<Navigation, QuizError> {
        if !self.is_ticket_current(ticket) {
            return Ok(Navigation::Unchanged);
        }
        self.advance(Direction::Next, now)
    }

    /// End the quiz and reset to idle.
    ///
    /// Returns `Ok(None)` without touching anything when no quiz is running.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Summary` if the summary cannot be built.
    pub fn finish(
        &mut self,
        reason: FinishReason,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionSummary>, QuizError> {
        let Some(quiz) = self.active.take() else {
            return Ok(None);
        };
        self.bump();

        let total = u32::try_from(quiz.questions.len()).unwrap_or(u32::MAX);
        let finished_at = now.max(quiz.started_at);
        let summary = SessionSummary::new(
            quiz.correct,
            quiz.attempted,
            total,
            reason,
            quiz.started_at,
            finished_at,
        )?;
        Ok(Some(summary))
    }

    /// Resolve a speech transcript against the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotActive` when idle.
    pub fn interpret_spoken(
        &self,
        transcript: &str,
        accept_letter_d: bool,
    ) -> Result<SpokenAnswer, QuizError> {
        let question = self.current_question().ok_or(QuizError::NotActive)?;
        Ok(interpret_spoken_answer(question, transcript, accept_letter_d))
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}
