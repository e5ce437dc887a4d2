//! User-facing text shown and spoken by the quiz.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::model::{FinishReason, Question, ScoreDisplayStyle};

pub const CORRECT: &str = "Correct!";
pub const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that. Try again.";
pub const EMPTY_POOL: &str = "No questions to display.";
pub const CATALOG_FALLBACK: &str = "Failed to load data. Using fallback data.";

pub const ENCOURAGEMENTS: [&str; 6] = [
    "Great job!",
    "Well done!",
    "Excellent!",
    "You got it!",
    "Fantastic work!",
    "Keep it up!",
];

/// Uniformly pick one of `ENCOURAGEMENTS`.
pub fn encouragement<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    ENCOURAGEMENTS.choose(rng).copied().unwrap_or(CORRECT)
}

/// Feedback for a wrong answer, naming the right option and its explanation.
#[must_use]
pub fn wrong_answer(question: &Question) -> String {
    match question.explanation() {
        Some(explanation) => format!(
            "Wrong! Correct answer: {}. Explanation: {explanation}",
            question.correct_option()
        ),
        None => format!("Wrong! Correct answer: {}.", question.correct_option()),
    }
}

#[must_use]
pub fn heard(transcript: &str) -> String {
    format!("Heard: \"{transcript}\"")
}

#[must_use]
pub fn recognition_error(code: &str) -> String {
    format!("Recognition error: {code}")
}

#[must_use]
pub fn summary(reason: FinishReason, correct: u32, attempted: u32) -> String {
    let prefix = match reason {
        FinishReason::Completed => "Quiz finished!",
        FinishReason::Exited => "Quiz exited!",
    };
    format!("{prefix} Your score: {correct} out of {attempted}")
}

/// Running score readout in the configured style.
#[must_use]
pub fn score(style: ScoreDisplayStyle, correct: u32, attempted: u32) -> String {
    match style {
        ScoreDisplayStyle::Fraction => format!("{correct} out of {attempted}"),
        ScoreDisplayStyle::Stars => {
            let missed = attempted.saturating_sub(correct);
            let mut stars = String::new();
            stars.extend(std::iter::repeat_n('★', correct as usize));
            stars.extend(std::iter::repeat_n('☆', missed as usize));
            stars
        }
        ScoreDisplayStyle::Percent => {
            if attempted == 0 {
                "0%".to_owned()
            } else {
                let percent = (f64::from(correct) * 100.0 / f64::from(attempted)).round();
                format!("{percent}%")
            }
        }
    }
}
