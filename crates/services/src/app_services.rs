use std::sync::Arc;

use quiz_core::model::{CatalogLocation, QuizSettings};
use storage::catalog_source::source_for;
use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::presenter::QuizDisplay;
use crate::preferences_service::PreferencesService;
use crate::quiz_service::QuizController;
use crate::speech::SpeechOutput;

/// Assembles app-facing services from configured storage and catalog locations.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    catalog: Arc<CatalogService>,
    preferences: Arc<PreferencesService>,
}

impl AppServices {
    /// Build services backed by `SQLite` preference storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// catalog source cannot be created.
    pub async fn new_sqlite(
        db_url: &str,
        catalog_location: &CatalogLocation,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, catalog_location, clock)
    }

    /// Build services over an already-open `Storage`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog source cannot be created.
    pub fn from_storage(
        storage: Storage,
        catalog_location: &CatalogLocation,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let catalog = Arc::new(CatalogService::new(source_for(catalog_location)?));
        let preferences = Arc::new(PreferencesService::new(Arc::clone(&storage.preferences)));
        Ok(Self {
            clock,
            catalog,
            preferences,
        })
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn preferences(&self) -> Arc<PreferencesService> {
        Arc::clone(&self.preferences)
    }

    /// Create a quiz controller driving the given display and speech engine.
    #[must_use]
    pub fn quiz_controller(
        &self,
        settings: QuizSettings,
        display: Arc<dyn QuizDisplay>,
        speech: Arc<dyn SpeechOutput>,
    ) -> QuizController {
        QuizController::new(settings, display, speech, self.clock)
    }
}
