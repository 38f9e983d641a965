//! Follow-up question reformulation.
//!
//! A follow-up such as "what about high doses?" retrieves poorly on its own.
//! The reformulator asks the completion backend to fold the recent history
//! into a standalone query that is then used for retrieval only; the prompt
//! still carries the user's original question.

use std::sync::Arc;

use milkdoc_core::safety::{neutralize_delimiters, strip_single_quotes};
use milkdoc_core::types::ChatTurn;

use crate::error::{ChatError, CompletionStage};
use crate::ports::CompletionPort;
use crate::prompt::render_history;

/// Rewrites follow-up questions into self-contained retrieval queries.
pub struct QueryReformulator {
    completion: Arc<dyn CompletionPort>,
}

impl QueryReformulator {
    pub fn new(completion: Arc<dyn CompletionPort>) -> Self {
        Self { completion }
    }

    /// Build the instruction sent to the completion backend.
    pub fn build_prompt(history: &[ChatTurn], question: &str) -> String {
        format!(
            "Based on the chat history below and the question, generate a query that extends \
             the question with the chat history provided. The query should be in natural language.\n\
             Answer with only the query. Do not add any explanation.\n\
             \n\
             <chat_history>\n{}\n</chat_history>\n\
             <question>\n{}\n</question>\n",
            render_history(history),
            neutralize_delimiters(question),
        )
    }

    /// Produce a standalone query for `question` given `history`.
    ///
    /// With an empty history the question is returned as is and the backend
    /// is not called. The backend's answer is trimmed and stripped of single
    /// quotes; a blank answer is a completion failure.
    pub async fn reformulate(
        &self,
        model: &str,
        history: &[ChatTurn],
        question: &str,
    ) -> Result<String, ChatError> {
        if history.is_empty() {
            return Ok(strip_single_quotes(question));
        }

        let prompt = Self::build_prompt(history, question);
        let raw = self
            .completion
            .complete(model, &prompt)
            .await
            .map_err(|e| ChatError::completion(CompletionStage::Reformulation, e))?;

        let query = strip_single_quotes(raw.trim());
        if query.trim().is_empty() {
            return Err(ChatError::completion(
                CompletionStage::Reformulation,
                "backend returned an empty query",
            ));
        }

        tracing::debug!(model, history_turns = history.len(), query = %query, "Question reformulated");
        Ok(query)
    }
}
