use async_trait::async_trait;
use milkdoc_chat::SearchPort;
use milkdoc_core::config::CortexConfig;
use milkdoc_core::types::SearchRequest;
use milkdoc_core::Result;

use crate::client::CortexClient;

/// Cortex Search service query endpoint.
pub struct CortexSearch {
    client: CortexClient,
    path: String,
}

impl CortexSearch {
    pub fn new(client: CortexClient, config: &CortexConfig) -> Self {
        let path = format!(
            "/api/v2/databases/{}/schemas/{}/cortex-search-services/{}:query",
            config.database, config.schema, config.search_service
        );
        Self { client, path }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[async_trait]
impl SearchPort for CortexSearch {
    async fn search(&self, request: &SearchRequest) -> Result<serde_json::Value> {
        let (_, body) = self.client.post_json(&self.path, request).await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milkdoc_core::types::SearchFilter;
    use milkdoc_core::MilkdocError;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUERY_PATH: &str =
        "/api/v2/databases/BFN_PROJECT/schemas/DATA/cortex-search-services/CC_SEARCH_SERVICE_CS:query";

    fn search(server: &MockServer) -> CortexSearch {
        let client = CortexClient::new(server.uri(), "t", "PROGRAMMATIC_ACCESS_TOKEN", None).unwrap();
        CortexSearch::new(client, &CortexConfig::default())
    }

    fn request(filter: Option<SearchFilter>) -> SearchRequest {
        SearchRequest {
            query: "ibuprofen".to_string(),
            columns: vec!["chunk".to_string(), "linked_url".to_string()],
            filter,
            limit: 3,
        }
    }

    #[test]
    fn test_path_from_config() {
        let client = CortexClient::new("https://acct.example.com", "t", "X", None).unwrap();
        let s = CortexSearch::new(client, &CortexConfig::default());
        assert_eq!(s.path(), QUERY_PATH);
    }

    #[tokio::test]
    async fn test_unfiltered_query_body() {
        let server = MockServer::start().await;
        let results = json!({"results": [{"chunk": "c", "linked_url": "u"}]});
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_json(json!({
                "query": "ibuprofen",
                "columns": ["chunk", "linked_url"],
                "limit": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(results.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let body = search(&server).search(&request(None)).await.unwrap();
        assert_eq!(body, results);
    }

    #[tokio::test]
    async fn test_filtered_query_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(body_json(json!({
                "query": "ibuprofen",
                "columns": ["chunk", "linked_url"],
                "filter": {"@eq": {"category": "Analgesics"}},
                "limit": 3
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .expect(1)
            .mount(&server)
            .await;

        let filter = SearchFilter::eq("category", "Analgesics");
        search(&server).search(&request(Some(filter))).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_filter_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"message": "invalid filter"})),
            )
            .mount(&server)
            .await;

        let err = search(&server).search(&request(None)).await.unwrap_err();
        assert!(matches!(err, MilkdocError::Http(ref m) if m.contains("invalid filter")));
    }
}
