use async_trait::async_trait;
use milkdoc_chat::CategoryCatalog;
use milkdoc_core::config::CortexConfig;
use milkdoc_core::{MilkdocError, Result};
use reqwest::StatusCode;
use serde::Serialize;

use crate::client::CortexClient;

const STATEMENTS_PATH: &str = "/api/v2/statements";

#[derive(Debug, Serialize)]
struct StatementRequest<'a> {
    statement: &'a str,
    database: &'a str,
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warehouse: Option<&'a str>,
}

/// Category labels read with a `SELECT DISTINCT` over the chunks table.
pub struct CortexCategories {
    client: CortexClient,
    statement: String,
    database: String,
    schema: String,
    warehouse: Option<String>,
}

impl CortexCategories {
    /// Fails when the configured table or column is not a plain identifier.
    pub fn new(client: CortexClient, config: &CortexConfig) -> Result<Self> {
        let column = identifier(&config.category_column)?;
        let table = identifier(&config.chunks_table)?;
        Ok(Self {
            client,
            statement: format!("SELECT DISTINCT {} FROM {}", column, table),
            database: config.database.clone(),
            schema: config.schema.clone(),
            warehouse: config.warehouse.clone(),
        })
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }
}

#[async_trait]
impl CategoryCatalog for CortexCategories {
    async fn categories(&self) -> Result<Vec<String>> {
        let body = StatementRequest {
            statement: &self.statement,
            database: &self.database,
            schema: &self.schema,
            warehouse: self.warehouse.as_deref(),
        };
        let (status, resp) = self.client.post_json(STATEMENTS_PATH, &body).await?;
        if status == StatusCode::ACCEPTED {
            return Err(MilkdocError::Backend(
                "category statement did not finish synchronously".to_string(),
            ));
        }
        parse_rows(&resp)
    }
}

/// First column of every row in a statement result; nulls are skipped.
pub fn parse_rows(resp: &serde_json::Value) -> Result<Vec<String>> {
    let rows = resp
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| MilkdocError::UnexpectedResponse("statement result has no data".to_string()))?;

    Ok(rows
        .iter()
        .filter_map(|row| row.get(0).and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect())
}

fn identifier(name: &str) -> Result<&str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(name)
    } else {
        Err(MilkdocError::Config(format!("invalid SQL identifier: {:?}", name)))
    }
}
