use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("request failed with status {0}")]
    Status(u16),

    #[error("io error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Source of the raw catalog document.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the catalog JSON text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` for transport failures or non-success responses.
    async fn fetch_catalog(&self) -> Result<String, StorageError>;

    /// Human-readable origin, used in logs.
    fn describe(&self) -> String;
}

/// Key/value store for user preferences such as the theme.
#[async_trait]
pub trait PreferenceRepository: Send + Sync {
    /// Read a preference, `None` when it was never written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get_preference(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or overwrite a preference.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set_preference(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Simple in-memory preference store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    preferences: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            preferences: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl PreferenceRepository for InMemoryRepository {
    async fn get_preference(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set_preference(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .preferences
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// Catalog source serving a fixed document, or failing with a fixed error.
#[derive(Clone, Debug)]
pub struct InMemoryCatalogSource {
    document: Option<String>,
}

impl InMemoryCatalogSource {
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: Some(document.into()),
        }
    }

    /// A source whose fetch always fails, as an unreachable server would.
    #[must_use]
    pub fn unavailable() -> Self {
        Self { document: None }
    }
}

#[async_trait]
impl CatalogSource for InMemoryCatalogSource {
    async fn fetch_catalog(&self) -> Result<String, StorageError> {
        self.document
            .clone()
            .ok_or_else(|| StorageError::Connection("catalog source unavailable".into()))
    }

    fn describe(&self) -> String {
        "in-memory catalog".to_owned()
    }
}

/// Aggregates the preference repository behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub preferences: Arc<dyn PreferenceRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let preferences: Arc<dyn PreferenceRepository> = Arc::new(InMemoryRepository::new());
        Self { preferences }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preferences_round_trip_and_overwrite() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_preference("theme").await.unwrap(), None);

        repo.set_preference("theme", "dark").await.unwrap();
        repo.set_preference("theme", "light").await.unwrap();

        assert_eq!(
            repo.get_preference("theme").await.unwrap().as_deref(),
            Some("light")
        );
    }

    #[tokio::test]
    async fn unavailable_source_fails() {
        let source = InMemoryCatalogSource::unavailable();
        let err = source.fetch_catalog().await.unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));

        let source = InMemoryCatalogSource::new("{}");
        assert_eq!(source.fetch_catalog().await.unwrap(), "{}");
    }
}
