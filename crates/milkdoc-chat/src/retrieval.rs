//! Retrieval adapter over the search port.

use std::sync::Arc;

use milkdoc_core::config::RetrievalConfig;
use milkdoc_core::safety::strip_single_quotes;
use milkdoc_core::types::{CategoryFilter, SearchFilter, SearchRequest};

use crate::error::ChatError;
use crate::ports::SearchPort;

/// Field the category filter applies to.
pub const CATEGORY_FIELD: &str = "category";

/// A search response together with the request that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievalResponse {
    pub request: SearchRequest,
    /// Response document exactly as returned by the backend.
    pub raw: serde_json::Value,
}

/// Issues category-aware searches with a fixed projection and limit.
pub struct Retriever {
    search: Arc<dyn SearchPort>,
    columns: Vec<String>,
    limit: usize,
}

impl Retriever {
    pub fn new(search: Arc<dyn SearchPort>, config: &RetrievalConfig) -> Self {
        Self {
            search,
            columns: config.columns.clone(),
            limit: config.num_chunks,
        }
    }

    /// Build the search request for `query` under `category`.
    ///
    /// The filtered and unfiltered forms differ only in `filter`.
    pub fn build_request(&self, query: &str, category: &CategoryFilter) -> SearchRequest {
        let filter = match category {
            CategoryFilter::All => None,
            CategoryFilter::Category(label) => {
                Some(SearchFilter::eq(CATEGORY_FIELD, strip_single_quotes(label)))
            }
        };
        SearchRequest {
            query: strip_single_quotes(query),
            columns: self.columns.clone(),
            filter,
            limit: self.limit,
        }
    }

    /// Search the corpus. Backend failures surface as [`ChatError::Retrieval`].
    pub async fn retrieve(
        &self,
        query: &str,
        category: &CategoryFilter,
    ) -> Result<RetrievalResponse, ChatError> {
        let request = self.build_request(query, category);
        tracing::debug!(
            query = %request.query,
            category = %category,
            limit = request.limit,
            "Searching corpus"
        );

        let raw = self
            .search
            .search(&request)
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;

        Ok(RetrievalResponse { request, raw })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use milkdoc_core::{MilkdocError, Result};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSearch {
        fail: bool,
        requests: Mutex<Vec<SearchRequest>>,
    }

    #[async_trait]
    impl SearchPort for RecordingSearch {
        async fn search(&self, request: &SearchRequest) -> Result<serde_json::Value> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                return Err(MilkdocError::Backend("invalid filter".to_string()));
            }
            Ok(json!({"results": []}))
        }
    }

    fn retriever(search: Arc<RecordingSearch>) -> Retriever {
        Retriever::new(search, &RetrievalConfig::default())
    }

    #[tokio::test]
    async fn test_all_issues_unfiltered_search() {
        let search = Arc::new(RecordingSearch::default());
        let response = retriever(search.clone())
            .retrieve("ibuprofen", &CategoryFilter::All)
            .await
            .unwrap();

        assert!(response.request.filter.is_none());
        assert_eq!(response.raw, json!({"results": []}));
        let requests = search.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].limit, 3);
    }

    #[tokio::test]
    async fn test_category_issues_equality_filter() {
        let search = Arc::new(RecordingSearch::default());
        let filter = CategoryFilter::Category("Analgesics".to_string());
        retriever(search.clone())
            .retrieve("ibuprofen", &filter)
            .await
            .unwrap();

        let requests = search.requests.lock().unwrap();
        assert_eq!(
            requests[0].filter,
            Some(SearchFilter::eq("category", "Analgesics"))
        );
    }

    #[test]
    fn test_filtered_and_unfiltered_share_projection_and_limit() {
        let r = retriever(Arc::new(RecordingSearch::default()));
        let all = r.build_request("q", &CategoryFilter::All);
        let one = r.build_request("q", &CategoryFilter::Category("Antibiotics".into()));
        assert_eq!(all.columns, one.columns);
        assert_eq!(all.limit, one.limit);
        assert_eq!(
            all.columns,
            vec!["chunk", "relative_path", "linked_url", "category"]
        );
    }

    #[test]
    fn test_request_never_carries_single_quotes() {
        let r = retriever(Arc::new(RecordingSearch::default()));
        let request = r.build_request(
            "it's x' OR '1'='1",
            &CategoryFilter::Category("A' OR 'B".into()),
        );
        assert!(!request.query.contains('\''));
        let filter = serde_json::to_string(&request.filter).unwrap();
        assert!(!filter.contains('\''));
    }

    #[tokio::test]
    async fn test_backend_failure_is_retrieval_error() {
        let search = Arc::new(RecordingSearch {
            fail: true,
            ..RecordingSearch::default()
        });
        let err = retriever(search)
            .retrieve("ibuprofen", &CategoryFilter::All)
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Retrieval(ref m) if m.contains("invalid filter")));
    }
}
