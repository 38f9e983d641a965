//! Capability interfaces for the managed backends.
//!
//! The pipeline never talks to a network client directly; it is handed
//! implementations of these traits. Production wiring lives in
//! `milkdoc-cortex`, tests use in-memory stubs.

use async_trait::async_trait;
use milkdoc_core::types::{SearchRequest, ALL_CATEGORIES};
use milkdoc_core::Result;

/// Ranked search over the document corpus.
#[async_trait]
pub trait SearchPort: Send + Sync {
    /// Run a search and return the raw response document.
    ///
    /// The response is expected to carry a `results` array of records with at
    /// least the requested columns; shape validation is left to the caller.
    async fn search(&self, request: &SearchRequest) -> Result<serde_json::Value>;
}

/// Hosted language-model completion.
#[async_trait]
pub trait CompletionPort: Send + Sync {
    /// Complete `prompt` with the model named `model`.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Lookup of the category labels present in the corpus.
#[async_trait]
pub trait CategoryCatalog: Send + Sync {
    async fn categories(&self) -> Result<Vec<String>>;
}

/// Category choices for the filter selector: `"ALL"` followed by the distinct
/// labels of the corpus in sorted order.
pub async fn category_choices(catalog: &dyn CategoryCatalog) -> Result<Vec<String>> {
    let mut labels = catalog.categories().await?;
    labels.retain(|l| !l.is_empty() && l != ALL_CATEGORIES);
    labels.sort();
    labels.dedup();

    let mut choices = Vec::with_capacity(labels.len() + 1);
    choices.push(ALL_CATEGORIES.to_string());
    choices.extend(labels);
    Ok(choices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use milkdoc_core::MilkdocError;

    struct FixedCatalog(Vec<&'static str>);

    #[async_trait]
    impl CategoryCatalog for FixedCatalog {
        async fn categories(&self) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct BrokenCatalog;

    #[async_trait]
    impl CategoryCatalog for BrokenCatalog {
        async fn categories(&self) -> Result<Vec<String>> {
            Err(MilkdocError::Http("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_category_choices_prefixes_all() {
        let catalog = FixedCatalog(vec!["Antibiotics", "Analgesics"]);
        let choices = category_choices(&catalog).await.unwrap();
        assert_eq!(choices, vec!["ALL", "Analgesics", "Antibiotics"]);
    }

    #[tokio::test]
    async fn test_category_choices_dedups_and_drops_blank() {
        let catalog = FixedCatalog(vec!["Analgesics", "", "Analgesics", "ALL"]);
        let choices = category_choices(&catalog).await.unwrap();
        assert_eq!(choices, vec!["ALL", "Analgesics"]);
    }

    #[tokio::test]
    async fn test_category_choices_empty_corpus() {
        let catalog = FixedCatalog(vec![]);
        let choices = category_choices(&catalog).await.unwrap();
        assert_eq!(choices, vec!["ALL"]);
    }

    #[tokio::test]
    async fn test_category_choices_propagates_error() {
        let result = category_choices(&BrokenCatalog).await;
        assert!(matches!(result, Err(MilkdocError::Http(_))));
    }
}
