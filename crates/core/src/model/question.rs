use std::fmt;
use std::str::FromStr;

use thiserror::Error;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("a question needs between {min} and {max} options, got {len}")]
    OptionCount { len: usize, min: usize, max: usize },

    #[error("option {index} cannot be empty")]
    EmptyOption { index: usize },

    #[error("invalid answer letter: {0:?}")]
    InvalidAnswerLetter(String),

    #[error("answer {letter} points past the last of {options} options")]
    AnswerOutOfRange { letter: char, options: usize },
}

//
// ─── ANSWER KEY ───────────────────────────────────────────────────────────────
//

/// Ordinal of the correct option, parsed from a letter code `A`..`D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnswerKey(u8);

impl AnswerKey {
    pub const MAX_OPTIONS: usize = 4;

    /// Build a key from a zero-based option ordinal.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::InvalidAnswerLetter` if the ordinal is past `D`.
    pub fn from_ordinal(ordinal: usize) -> Result<Self, QuestionError> {
        u8::try_from(ordinal)
            .ok()
            .filter(|value| usize::from(*value) < Self::MAX_OPTIONS)
            .map(Self)
            .ok_or_else(|| QuestionError::InvalidAnswerLetter(ordinal.to_string()))
    }

    #[must_use]
    pub fn ordinal(self) -> usize {
        usize::from(self.0)
    }

    #[must_use]
    pub fn letter(self) -> char {
        option_letter(self.ordinal())
    }
}

impl FromStr for AnswerKey {
    type Err = QuestionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => {
                let upper = letter.to_ascii_uppercase();
                if ('A'..='D').contains(&upper) {
                    Ok(Self(upper as u8 - b'A'))
                } else {
                    Err(QuestionError::InvalidAnswerLetter(raw.to_owned()))
                }
            }
            _ => Err(QuestionError::InvalidAnswerLetter(raw.to_owned())),
        }
    }
}

impl fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Letter shown in front of the option at `ordinal` (`0 -> 'A'`).
#[must_use]
pub fn option_letter(ordinal: usize) -> char {
    u8::try_from(ordinal)
        .ok()
        .and_then(|offset| b'A'.checked_add(offset))
        .map_or('?', char::from)
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// A multiple-choice question. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    options: Vec<String>,
    answer: AnswerKey,
    explanation: Option<String>,
}

impl Question {
    pub const MIN_OPTIONS: usize = 2;
    pub const MAX_OPTIONS: usize = AnswerKey::MAX_OPTIONS;

    /// Validate and build a question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text or an option is blank, the option
    /// count is outside 2..=4, or the answer points past the last option.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        answer: AnswerKey,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        if !(Self::MIN_OPTIONS..=Self::MAX_OPTIONS).contains(&options.len()) {
            return Err(QuestionError::OptionCount {
                len: options.len(),
                min: Self::MIN_OPTIONS,
                max: Self::MAX_OPTIONS,
            });
        }

        let options: Vec<String> = options
            .into_iter()
            .map(|option| option.trim().to_owned())
            .collect();
        if let Some(index) = options.iter().position(String::is_empty) {
            return Err(QuestionError::EmptyOption { index });
        }

        if answer.ordinal() >= options.len() {
            return Err(QuestionError::AnswerOutOfRange {
                letter: answer.letter(),
                options: options.len(),
            });
        }

        let explanation = explanation
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            text,
            options,
            answer,
            explanation,
        })
    }

    /// Convenience constructor taking the answer as a letter code.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` for an unknown letter or any `Question::new` failure.
    pub fn with_letter(
        text: impl Into<String>,
        options: Vec<String>,
        letter: &str,
        explanation: Option<String>,
    ) -> Result<Self, QuestionError> {
        let answer = letter.parse::<AnswerKey>()?;
        Self::new(text, options, answer, explanation)
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn answer(&self) -> AnswerKey {
        self.answer
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.answer.ordinal()
    }

    #[must_use]
    pub fn correct_option(&self) -> &str {
        &self.options[self.answer.ordinal()]
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    /// Options prefixed with their letter, e.g. `"A. 2"`.
    #[must_use]
    pub fn lettered_options(&self) -> Vec<String> {
        self.options
            .iter()
            .enumerate()
            .map(|(index, option)| format!("{}. {option}", option_letter(index)))
            .collect()
    }

    /// Text read aloud when the question is presented.
    #[must_use]
    pub fn spoken_prompt(&self) -> String {
        format!("{} {}", self.text, self.lettered_options().join(", "))
    }
}
