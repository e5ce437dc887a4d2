use std::sync::Arc;

use quiz_core::model::Theme;
use storage::repository::PreferenceRepository;
use tracing::warn;

use crate::error::PreferencesError;

#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferenceRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferenceRepository>) -> Self {
        Self { repo }
    }

    /// Load the persisted theme (or the default if missing or unreadable).
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` on storage failures.
    pub async fn theme(&self) -> Result<Theme, PreferencesError> {
        let Some(raw) = self.repo.get_preference(Theme::PREFERENCE_KEY).await? else {
            return Ok(Theme::default());
        };
        Ok(raw.parse().unwrap_or_else(|err| {
            warn!(error = %err, "ignoring stored theme");
            Theme::default()
        }))
    }

    /// Persist the theme.
    ///
    /// # Errors
    ///
    /// Returns `PreferencesError` if persistence fails.
    pub async fn set_theme(&self, theme: Theme) -> Result<(), PreferencesError> {
        self.repo
            .set_preference(Theme::PREFERENCE_KEY, theme.as_str())
            .await?;
        Ok(())
    }
}
