//! Mapping of speech-recognition transcripts onto answer ordinals.

use crate::model::Question;

/// Command phrase that moves on after a wrong answer.
pub const NEXT_QUESTION_COMMAND: &str = "next question";

/// What a transcript resolved to for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpokenAnswer {
    /// An option ordinal to grade.
    Option(usize),
    /// The "next question" command. Handled by navigation, not grading.
    NextCommand,
    NotUnderstood,
}

/// Normalize a raw transcript the way the recognizer output is compared.
#[must_use]
pub fn normalize_transcript(transcript: &str) -> String {
    transcript.trim().to_lowercase()
}

/// Resolve a transcript against `question`. First match wins:
/// a bare letter, then the next-question command, then an option's full text.
///
/// A letter only counts when the question has that many options; `d` also
/// needs `accept_letter_d`. Otherwise the letter falls through to text matching.
#[must_use]
pub fn interpret_spoken_answer(
    question: &Question,
    transcript: &str,
    accept_letter_d: bool,
) -> SpokenAnswer {
    let spoken = normalize_transcript(transcript);

    let letter = match spoken.as_str() {
        "a" => Some(0),
        "b" => Some(1),
        "c" => Some(2),
        "d" if accept_letter_d => Some(3),
        NEXT_QUESTION_COMMAND => return SpokenAnswer::NextCommand,
        _ => None,
    };
    if let Some(ordinal) = letter.filter(|ordinal| *ordinal < question.options().len()) {
        return SpokenAnswer::Option(ordinal);
    }

    question
        .options()
        .iter()
        .position(|option| option.trim().to_lowercase() == spoken)
        .map_or(SpokenAnswer::NotUnderstood, SpokenAnswer::Option)
}
