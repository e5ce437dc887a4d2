use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use quiz_core::model::CatalogLocation;
use tracing::debug;

use crate::repository::{CatalogSource, StorageError};

/// Fetches the catalog over HTTP(S), bypassing caches.
#[derive(Clone, Debug)]
pub struct HttpCatalogSource {
    client: reqwest::Client,
    url: reqwest::Url,
}

impl HttpCatalogSource {
    const TIMEOUT: Duration = Duration::from_secs(10);

    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the HTTP client cannot be built.
    pub fn new(url: reqwest::Url) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Self::TIMEOUT)
            .build()
            .map_err(|err| StorageError::Connection(err.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn fetch_catalog(&self) -> Result<String, StorageError> {
        debug!(url = %self.url, "fetching catalog");
        let response = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Reads the catalog from a local file.
#[derive(Clone, Debug)]
pub struct FileCatalogSource {
    path: PathBuf,
}

impl FileCatalogSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CatalogSource for FileCatalogSource {
    async fn fetch_catalog(&self) -> Result<String, StorageError> {
        debug!(path = %self.path.display(), "reading catalog");
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|err| match err.kind() {
                std::io::ErrorKind::NotFound => StorageError::NotFound,
                _ => StorageError::Io(err.to_string()),
            })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Pick the source matching a configured location.
///
/// # Errors
///
/// Returns `StorageError::Connection` if an HTTP client cannot be built.
pub fn source_for(location: &CatalogLocation) -> Result<Arc<dyn CatalogSource>, StorageError> {
    Ok(match location {
        CatalogLocation::Remote(url) => Arc::new(HttpCatalogSource::new(url.clone())?),
        CatalogLocation::File(path) => Arc::new(FileCatalogSource::new(path.clone())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_source_reads_and_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        tokio::fs::write(&path, r#"{ "questions": [] }"#).await.unwrap();

        let source = FileCatalogSource::new(&path);
        assert_eq!(source.fetch_catalog().await.unwrap(), r#"{ "questions": [] }"#);

        let missing = FileCatalogSource::new(dir.path().join("missing.json"));
        assert!(matches!(
            missing.fetch_catalog().await.unwrap_err(),
            StorageError::NotFound
        ));
    }

    #[test]
    fn location_selects_source_kind() {
        let remote: CatalogLocation = "https://example.com/data.json".parse().unwrap();
        assert_eq!(
            source_for(&remote).unwrap().describe(),
            "https://example.com/data.json"
        );

        let file: CatalogLocation = "data.json".parse().unwrap();
        assert_eq!(source_for(&file).unwrap().describe(), "data.json");
    }
}
