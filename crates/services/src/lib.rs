#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod feedback;
pub mod preferences_service;
pub mod presenter;
pub mod quiz_service;
pub mod speech;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogLoad, CatalogService};
pub use error::{AppServicesError, CatalogServiceError, PreferencesError, SessionError};
pub use feedback::FeedbackPicker;
pub use preferences_service::PreferencesService;
pub use presenter::{Feedback, FeedbackTone, Panel, QuestionView, QuizDisplay};
pub use quiz_service::{QuizController, TranscriptOutcome};
pub use speech::{RecognitionError, SilentSpeech, SpeechInput, SpeechOutput, Utterance, Voice};
