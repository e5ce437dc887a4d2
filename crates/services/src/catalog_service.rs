use std::sync::Arc;

use quiz_core::model::Catalog;
use storage::repository::CatalogSource;
use tracing::{info, warn};

use crate::error::CatalogServiceError;

/// Outcome of loading the catalog at startup.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    /// `true` when the built-in fallback replaced the real catalog.
    pub fallback: bool,
    /// Why the fallback was used.
    pub error: Option<String>,
}

/// Loads the question bank and answers selection-chain queries.
#[derive(Clone)]
pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
}

impl CatalogService {
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source }
    }

    /// Fetch and parse the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogServiceError` for transport, parse, or empty-catalog failures.
    pub async fn try_load(&self) -> Result<Catalog, CatalogServiceError> {
        let raw = self.source.fetch_catalog().await?;
        let catalog = Catalog::from_json_str(&raw)?;
        if catalog.is_empty() {
            return Err(CatalogServiceError::Empty);
        }
        Ok(catalog)
    }

    /// Fetch the catalog, substituting the one-question fallback on any failure.
    pub async fn load(&self) -> CatalogLoad {
        match self.try_load().await {
            Ok(catalog) => {
                info!(
                    source = %self.source.describe(),
                    classes = catalog.classes().len(),
                    questions = catalog.question_count(),
                    "catalog loaded"
                );
                CatalogLoad {
                    catalog,
                    fallback: false,
                    error: None,
                }
            }
            Err(err) => {
                warn!(source = %self.source.describe(), error = %err, "catalog unavailable, using fallback");
                CatalogLoad {
                    catalog: Catalog::fallback(),
                    fallback: true,
                    error: Some(err.to_string()),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::CatalogPath;
    use storage::repository::InMemoryCatalogSource;

    const CATALOG: &str = r#"{ "classes": { "Class 6": { "categories": [
        { "name": "Maths", "subcategories": [
            { "name": "Sums", "questions": [
                { "question": "What is 2 + 2?", "options": ["3", "4"], "answer": "B" }
            ] }
        ] }
    ] } } }"#;

    #[tokio::test]
    async fn loads_real_catalog() {
        let service = CatalogService::new(Arc::new(InMemoryCatalogSource::new(CATALOG)));
        let load = service.load().await;
        assert!(!load.fallback);
        assert_eq!(load.catalog.class_names(), vec!["Class 6"]);
        assert_eq!(
            load.catalog.questions(CatalogPath::new(0, 0, 0)).unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn unreachable_source_falls_back() {
        let service = CatalogService::new(Arc::new(InMemoryCatalogSource::unavailable()));
        let load = service.load().await;
        assert!(load.fallback);
        assert!(load.error.is_some());
        assert_eq!(load.catalog, Catalog::fallback());
    }

    #[tokio::test]
    async fn malformed_or_empty_documents_fall_back() {
        for raw in ["{ not json", r#"{ "classes": {} }"#, r#"{ "decks": [] }"#] {
            let service = CatalogService::new(Arc::new(InMemoryCatalogSource::new(raw)));
            let load = service.load().await;
            assert!(load.fallback, "expected fallback for {raw}");
        }
    }
}
