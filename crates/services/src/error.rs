//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::CatalogError;
use quiz_core::quiz::QuizError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

use crate::speech::RecognitionError;

/// Errors emitted by `QuizController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("voice input is not available")]
    VoiceUnavailable,
    #[error("already listening for an answer")]
    AlreadyListening,
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("catalog contains no classes")]
    Empty,
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
