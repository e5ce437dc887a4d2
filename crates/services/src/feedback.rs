use std::sync::{Mutex, PoisonError};

use quiz_core::messages;
use quiz_core::model::FeedbackStyle;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Chooses the phrase said after a correct answer.
pub struct FeedbackPicker {
    style: FeedbackStyle,
    rng: Mutex<StdRng>,
}

impl FeedbackPicker {
    #[must_use]
    pub fn new(style: FeedbackStyle) -> Self {
        Self {
            style,
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Deterministic picker for tests.
    #[must_use]
    pub fn with_seed(style: FeedbackStyle, seed: u64) -> Self {
        Self {
            style,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    #[must_use]
    pub fn correct_phrase(&self) -> &'static str {
        match self.style {
            FeedbackStyle::Plain => messages::CORRECT,
            FeedbackStyle::Encouraging => {
                let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
                messages::encouragement(&mut *rng)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_style_always_says_correct() {
        let picker = FeedbackPicker::with_seed(FeedbackStyle::Plain, 1);
        for _ in 0..5 {
            assert_eq!(picker.correct_phrase(), "Correct!");
        }
    }

    #[test]
    fn encouraging_style_uses_the_phrase_list() {
        let picker = FeedbackPicker::with_seed(FeedbackStyle::Encouraging, 1);
        for _ in 0..10 {
            assert!(messages::ENCOURAGEMENTS.contains(&picker.correct_phrase()));
        }
    }
}
