use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MilkdocError, Result};

/// Model identifiers offered by the completion service out of the box.
pub const DEFAULT_MODELS: &[&str] = &[
    "reka-flash",
    "mixtral-8x7b",
    "snowflake-arctic",
    "mistral-large",
    "llama3-8b",
    "llama3-70b",
    "mistral-7b",
    "llama2-70b-chat",
    "gemma-7b",
];

/// Top-level configuration for milkdoc.
///
/// Loaded from `~/.milkdoc/config.toml` by default. Every section and field
/// has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MilkdocConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub cortex: CortexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl MilkdocConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MilkdocConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.num_chunks == 0 {
            return Err(MilkdocError::Config(
                "retrieval.num_chunks must be at least 1".to_string(),
            ));
        }
        for required in ["chunk", "linked_url"] {
            if !self.retrieval.columns.iter().any(|c| c == required) {
                return Err(MilkdocError::Config(format!(
                    "retrieval.columns must include \"{}\"",
                    required
                )));
            }
        }
        if self.chat.available_models.is_empty() {
            return Err(MilkdocError::Config(
                "chat.available_models must not be empty".to_string(),
            ));
        }
        if !self
            .chat
            .available_models
            .iter()
            .any(|m| m == &self.chat.default_model)
        {
            return Err(MilkdocError::Config(format!(
                "chat.default_model \"{}\" is not listed in chat.available_models",
                self.chat.default_model
            )));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Connection settings for the managed search and completion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CortexConfig {
    /// Account base URL, e.g. `https://myorg-myaccount.snowflakecomputing.com`.
    pub account_url: String,
    pub database: String,
    pub schema: String,
    /// Name of the search service holding the document chunks.
    pub search_service: String,
    /// Table the category labels are enumerated from.
    pub chunks_table: String,
    pub category_column: String,
    /// Warehouse used for SQL statements; the account default when unset.
    pub warehouse: Option<String>,
    /// Environment variable holding the bearer token.
    pub token_env: String,
    /// Value of the token-type header sent with every request.
    pub token_type: String,
    /// Per-request timeout. Unset means requests wait indefinitely.
    pub timeout_secs: Option<u64>,
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            account_url: String::new(),
            database: "BFN_PROJECT".to_string(),
            schema: "DATA".to_string(),
            search_service: "CC_SEARCH_SERVICE_CS".to_string(),
            chunks_table: "docs_chunks_table".to_string(),
            category_column: "category".to_string(),
            warehouse: None,
            token_env: "MILKDOC_CORTEX_TOKEN".to_string(),
            token_type: "PROGRAMMATIC_ACCESS_TOKEN".to_string(),
            timeout_secs: None,
        }
    }
}

/// Retrieval call settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum number of chunks requested per search.
    pub num_chunks: usize,
    /// Column projection requested from the search service.
    pub columns: Vec<String>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            num_chunks: 3,
            columns: vec![
                "chunk".to_string(),
                "relative_path".to_string(),
                "linked_url".to_string(),
                "category".to_string(),
            ],
        }
    }
}

/// Conversation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of prior turns considered as history.
    pub slide_window: usize,
    /// Model selected when a session starts.
    pub default_model: String,
    /// Models the user may choose from.
    pub available_models: Vec<String>,
    /// Fold prior turns into retrieval and the prompt.
    pub use_chat_history: bool,
    /// Emit reformulated queries and raw retrieval JSON.
    pub debug: bool,
    /// Maximum question length in characters.
    pub max_question_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            slide_window: 5,
            default_model: "mistral-large".to_string(),
            available_models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            use_chat_history: true,
            debug: false,
            max_question_length: 2000,
        }
    }
}
