//! Session state owned by the caller and lent to the pipeline per turn.

use chrono::{DateTime, Utc};
use milkdoc_core::config::ChatConfig;
use milkdoc_core::types::{CategoryFilter, ChatTurn};
use uuid::Uuid;

use crate::error::ChatError;

// =============================================================================
// Transcript
// =============================================================================

/// Ordered record of the turns of one session.
///
/// Append-only while the session lives; [`Transcript::clear`] empties it on
/// reset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.turns.push(ChatTurn::assistant(content));
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

impl From<Vec<ChatTurn>> for Transcript {
    fn from(turns: Vec<ChatTurn>) -> Self {
        Self { turns }
    }
}

// =============================================================================
// SessionConfig
// =============================================================================

/// User selections that every pipeline call reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Completion model identifier.
    pub model: String,
    /// Category restriction for retrieval.
    pub category: CategoryFilter,
    /// Fold prior turns into retrieval and the prompt.
    pub use_chat_history: bool,
    /// Keep debug artifacts visible to the presentation layer.
    pub debug: bool,
    available_models: Vec<String>,
}

impl SessionConfig {
    /// Initial selections taken from the chat configuration.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self {
            model: config.default_model.clone(),
            category: CategoryFilter::All,
            use_chat_history: config.use_chat_history,
            debug: config.debug,
            available_models: config.available_models.clone(),
        }
    }

    pub fn available_models(&self) -> &[String] {
        &self.available_models
    }

    /// Switch to another configured model.
    pub fn select_model(&mut self, model: &str) -> Result<(), ChatError> {
        if !self.available_models.iter().any(|m| m == model) {
            return Err(ChatError::UnknownModel(model.to_string()));
        }
        self.model = model.to_string();
        Ok(())
    }

    /// Select a category label; `"ALL"` clears the filter.
    pub fn select_category(&mut self, label: &str) {
        self.category = CategoryFilter::from_label(label);
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_config(&ChatConfig::default())
    }
}

// =============================================================================
// ChatSession
// =============================================================================

/// One interactive session: transcript plus the current selections.
#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub transcript: Transcript,
    pub config: SessionConfig,
}

impl ChatSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            transcript: Transcript::new(),
            config,
        }
    }

    /// Start over: drop the transcript, keep the model and category choices.
    pub fn reset(&mut self) {
        tracing::info!(session_id = %self.id, turns = self.transcript.len(), "Session reset");
        self.transcript.clear();
        self.started_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use milkdoc_core::types::Role;

    // ---- Transcript ----

    #[test]
    fn test_transcript_preserves_order() {
        let mut t = Transcript::new();
        t.push_user("q1");
        t.push_assistant("a1");
        t.push_user("q2");
        assert_eq!(t.len(), 3);
        assert_eq!(t.turns()[0].role, Role::User);
        assert_eq!(t.turns()[1].content, "a1");
        assert_eq!(t.turns()[2].content, "q2");
    }

    #[test]
    fn test_transcript_clear() {
        let mut t = Transcript::from(vec![ChatTurn::user("q"), ChatTurn::assistant("a")]);
        assert!(!t.is_empty());
        t.clear();
        assert!(t.is_empty());
    }

    // ---- SessionConfig ----

    #[test]
    fn test_session_config_defaults_from_chat_config() {
        let config = SessionConfig::default();
        assert_eq!(config.model, "mistral-large");
        assert!(config.category.is_all());
        assert!(config.use_chat_history);
        assert!(!config.debug);
        assert_eq!(config.available_models().len(), 9);
    }

    #[test]
    fn test_select_known_model() {
        let mut config = SessionConfig::default();
        config.select_model("llama3-70b").unwrap();
        assert_eq!(config.model, "llama3-70b");
    }

    #[test]
    fn test_select_unknown_model_keeps_previous() {
        let mut config = SessionConfig::default();
        let err = config.select_model("gpt-unknown").unwrap_err();
        assert!(matches!(err, ChatError::UnknownModel(ref m) if m == "gpt-unknown"));
        assert_eq!(config.model, "mistral-large");
    }

    #[test]
    fn test_select_category() {
        let mut config = SessionConfig::default();
        config.select_category("Antibiotics");
        assert_eq!(
            config.category,
            CategoryFilter::Category("Antibiotics".to_string())
        );
        config.select_category("ALL");
        assert!(config.category.is_all());
    }

    // ---- ChatSession ----

    #[test]
    fn test_new_session_is_empty() {
        let session = ChatSession::new(SessionConfig::default());
        assert!(session.transcript.is_empty());
        assert_ne!(session.id, Uuid::nil());
    }

    #[test]
    fn test_reset_clears_transcript_keeps_selection() {
        let mut session = ChatSession::new(SessionConfig::default());
        session.config.select_model("gemma-7b").unwrap();
        session.config.select_category("Antihistamines");
        session.transcript.push_user("q");
        session.transcript.push_assistant("a");

        session.reset();

        assert!(session.transcript.is_empty());
        assert_eq!(session.config.model, "gemma-7b");
        assert_eq!(session.config.category.to_string(), "Antihistamines");
    }
}
