use std::time::Duration;

use milkdoc_core::config::CortexConfig;
use milkdoc_core::{MilkdocError, Result};
use serde::Serialize;

/// Header naming the kind of bearer token presented.
pub const TOKEN_TYPE_HEADER: &str = "X-Snowflake-Authorization-Token-Type";

/// Authenticated JSON-over-HTTP client for one Cortex account.
#[derive(Clone)]
pub struct CortexClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    token_type: String,
}

impl std::fmt::Debug for CortexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CortexClient")
            .field("base_url", &self.base_url)
            .field("token_type", &self.token_type)
            .finish_non_exhaustive()
    }
}

impl CortexClient {
    /// Create a client with an explicit token.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        token_type: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| MilkdocError::Http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            token_type: token_type.into(),
        })
    }

    /// Create a client from configuration, reading the token from the
    /// environment variable named by `token_env`.
    pub fn from_config(config: &CortexConfig) -> Result<Self> {
        if config.account_url.trim().is_empty() {
            return Err(MilkdocError::Config(
                "cortex.account_url is not set".to_string(),
            ));
        }
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| MilkdocError::MissingCredential(config.token_env.clone()))?;

        Self::new(
            &config.account_url,
            token,
            &config.token_type,
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST `body` as JSON to `path` and decode the JSON response.
    ///
    /// Any non-success status is an [`MilkdocError::Http`] carrying the status
    /// and the response body.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(reqwest::StatusCode, serde_json::Value)> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");

        let resp = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header(TOKEN_TYPE_HEADER, &self.token_type)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| MilkdocError::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| MilkdocError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(MilkdocError::Http(format!("{} from {}: {}", status, path, text)));
        }

        let value = serde_json::from_str(&text).map_err(|e| {
            MilkdocError::UnexpectedResponse(format!("{} returned invalid JSON: {}", path, e))
        })?;
        Ok((status, value))
    }
}
