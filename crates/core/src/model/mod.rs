mod catalog;
mod question;
mod session;
mod settings;

pub use catalog::{
    Catalog, CatalogClass, CatalogError, CatalogPath, Chapter, Subject, ELIDED_CHAPTER_NAME,
    ELIDED_CLASS_NAME, ELIDED_SUBJECT_NAME,
};
pub use question::{AnswerKey, Question, QuestionError, option_letter};
pub use session::{FinishReason, SessionSummary, SessionSummaryError};
pub use settings::{
    CatalogLocation, FeedbackStyle, QuizSettings, QuizSettingsDraft, ScoreDisplayStyle,
    SettingsError, Theme,
};
