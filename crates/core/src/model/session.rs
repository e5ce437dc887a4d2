use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("finished_at is before started_at")]
    InvalidTimeRange,

    #[error("correct answers ({correct}) exceed attempted answers ({attempted})")]
    CountMismatch { correct: u32, attempted: u32 },
}

/// Why a quiz session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    /// The user moved past the last question.
    Completed,
    /// The user left before the end.
    Exited,
}

/// Final score of a quiz session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    correct_count: u32,
    attempted_count: u32,
    total_questions: u32,
    reason: FinishReason,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl SessionSummary {
    /// Build a summary from the session counters.
    ///
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `finished_at` is before `started_at`.
    /// Returns `SessionSummaryError::CountMismatch` if `correct_count > attempted_count`.
    pub fn new(
        correct_count: u32,
        attempted_count: u32,
        total_questions: u32,
        reason: FinishReason,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Result<Self, SessionSummaryError> {
        if finished_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if correct_count > attempted_count {
            return Err(SessionSummaryError::CountMismatch {
                correct: correct_count,
                attempted: attempted_count,
            });
        }

        Ok(Self {
            correct_count,
            attempted_count,
            total_questions,
            reason,
            started_at,
            finished_at,
        })
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    #[must_use]
    pub fn attempted_count(&self) -> u32 {
        self.attempted_count
    }

    #[must_use]
    pub fn wrong_count(&self) -> u32 {
        self.attempted_count - self.correct_count
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn reason(&self) -> FinishReason {
        self.reason
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn summary_rejects_inconsistent_counts() {
        let now = fixed_now();
        let err = SessionSummary::new(3, 2, 3, FinishReason::Completed, now, now).unwrap_err();
        assert_eq!(
            err,
            SessionSummaryError::CountMismatch {
                correct: 3,
                attempted: 2
            }
        );
    }

    #[test]
    fn summary_rejects_reversed_times() {
        let now = fixed_now();
        let earlier = now - chrono::Duration::seconds(1);
        let err = SessionSummary::new(0, 0, 1, FinishReason::Exited, now, earlier).unwrap_err();
        assert_eq!(err, SessionSummaryError::InvalidTimeRange);
    }

    #[test]
    fn summary_counts_misses() {
        let now = fixed_now();
        let summary = SessionSummary::new(2, 3, 3, FinishReason::Completed, now, now).unwrap();
        assert_eq!(summary.wrong_count(), 1);
        assert_eq!(summary.reason(), FinishReason::Completed);
    }
}
