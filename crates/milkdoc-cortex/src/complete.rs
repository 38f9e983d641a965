use async_trait::async_trait;
use milkdoc_chat::CompletionPort;
use milkdoc_core::{MilkdocError, Result};
use serde_json::json;

use crate::client::CortexClient;

const COMPLETE_PATH: &str = "/api/v2/cortex/inference:complete";

/// Cortex inference complete endpoint, non-streaming.
pub struct CortexComplete {
    client: CortexClient,
}

impl CortexComplete {
    pub fn new(client: CortexClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CompletionPort for CortexComplete {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String> {
        let body = json!({
            "model": model,
            "messages": [{"role": "user", "content": prompt}],
            "stream": false,
        });
        let (_, resp) = self.client.post_json(COMPLETE_PATH, &body).await?;
        let text = parse_completion(&resp)?;
        tracing::debug!(model, chars = text.len(), "Completion received");
        Ok(text)
    }
}

/// Extract the generated text from a completion response.
///
/// Reads `choices[0].message.content`, falling back to the older
/// `choices[0].messages` string.
pub fn parse_completion(resp: &serde_json::Value) -> Result<String> {
    let choice = resp
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| MilkdocError::UnexpectedResponse("completion has no choices".to_string()))?;

    choice
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .or_else(|| choice.get("messages").and_then(|m| m.as_str()))
        .map(str::to_string)
        .ok_or_else(|| {
            MilkdocError::UnexpectedResponse(format!("completion choice has no text: {}", choice))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    // ---- parse_completion ----

    #[test]
    fn test_parse_message_content() {
        let resp = json!({"choices": [{"message": {"content": "Yes."}}]});
        assert_eq!(parse_completion(&resp).unwrap(), "Yes.");
    }

    #[test]
    fn test_parse_messages_fallback() {
        let resp = json!({"choices": [{"messages": "Yes."}]});
        assert_eq!(parse_completion(&resp).unwrap(), "Yes.");
    }

    #[test]
    fn test_parse_empty_choices() {
        let err = parse_completion(&json!({"choices": []})).unwrap_err();
        assert!(matches!(err, MilkdocError::UnexpectedResponse(_)));
    }

    #[test]
    fn test_parse_choice_without_text() {
        let err = parse_completion(&json!({"choices": [{"finish_reason": "stop"}]})).unwrap_err();
        assert!(matches!(err, MilkdocError::UnexpectedResponse(_)));
    }

    // ---- HTTP ----

    #[tokio::test]
    async fn test_complete_sends_single_user_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETE_PATH))
            .and(body_json(json!({
                "model": "mistral-large",
                "messages": [{"role": "user", "content": "the prompt"}],
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "the answer"}}],
                "usage": {"total_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CortexClient::new(server.uri(), "t", "X", None).unwrap();
        let text = CortexComplete::new(client)
            .complete("mistral-large", "the prompt")
            .await
            .unwrap();
        assert_eq!(text, "the answer");
    }

    #[tokio::test]
    async fn test_unknown_model_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(COMPLETE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_string("unknown model"))
            .expect(1)
            .mount(&server)
            .await;

        let client = CortexClient::new(server.uri(), "t", "X", None).unwrap();
        let err = CortexComplete::new(client)
            .complete("gpt-9", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, MilkdocError::Http(_)));
    }
}
