//! Rendering surface the quiz controller drives.

use quiz_core::model::Question;

/// Top-level screen shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    /// Class, subject and chapter pickers.
    Selection,
    /// Active quiz with question, options and score.
    Quiz,
}

/// Semantic colour of a feedback line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTone {
    Correct,
    Incorrect,
    Unrecognized,
}

impl FeedbackTone {
    #[must_use]
    pub fn color(self) -> &'static str {
        match self {
            FeedbackTone::Correct => "green",
            FeedbackTone::Incorrect => "red",
            FeedbackTone::Unrecognized => "orange",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub tone: FeedbackTone,
}

impl Feedback {
    #[must_use]
    pub fn new(text: impl Into<String>, tone: FeedbackTone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }
}

/// Everything needed to render one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub text: String,
    /// Options already prefixed with `A. `, `B. `, ...
    pub options: Vec<String>,
    pub spoken: String,
}

impl QuestionView {
    #[must_use]
    pub fn new(question: &Question, index: usize, total: usize) -> Self {
        Self {
            index,
            total,
            text: question.text().to_owned(),
            options: question.lettered_options(),
            spoken: question.spoken_prompt(),
        }
    }
}

/// Display collaborator. Implementations must not call back into the controller.
pub trait QuizDisplay: Send + Sync {
    fn show_panel(&self, panel: Panel);
    fn show_question(&self, question: &QuestionView);
    fn show_feedback(&self, feedback: &Feedback);
    fn clear_feedback(&self);
    /// Echo of the last recognized transcript; `None` clears it.
    fn show_heard(&self, heard: Option<&str>);
    fn show_score(&self, score: &str);
    fn set_next_visible(&self, visible: bool);
    fn set_previous_visible(&self, visible: bool);
    fn set_voice_input_visible(&self, visible: bool);
    /// Blocking notice such as an empty selection or the final score.
    fn alert(&self, message: &str);
}
