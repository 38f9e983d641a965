//! Answering orchestrator: sequences one question-answering turn.
//!
//! windowing -> [reformulation] -> retrieval -> prompt assembly -> completion.
//! Each step depends on the previous one; the first failure ends the turn and
//! is returned unchanged. There are no retries and no fallbacks.

use std::collections::BTreeSet;
use std::sync::Arc;

use milkdoc_core::config::MilkdocConfig;
use milkdoc_core::safety::{contains_delimiter, strip_single_quotes};
use milkdoc_core::types::ChatTurn;

use crate::error::{ChatError, CompletionStage, TurnFailure};
use crate::ports::{CompletionPort, SearchPort};
use crate::prompt::PromptAssembler;
use crate::reformulate::QueryReformulator;
use crate::retrieval::Retriever;
use crate::session::{ChatSession, SessionConfig};
use crate::state::{TurnStage, TurnState};
use crate::window::history_window;

/// Result of a successful turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    pub answer: String,
    /// Links of every document searched for this turn, whether or not the
    /// answer uses them.
    pub citations: BTreeSet<String>,
    /// Standalone query used for retrieval when history was folded in.
    pub reformulated_query: Option<String>,
    /// Search response the prompt was built from.
    pub raw_retrieval: serde_json::Value,
    pub stages: Vec<TurnStage>,
}

impl TurnOutcome {
    /// Markdown link list, `Docs: [url](url) ...`, or `None` without citations.
    pub fn docs_line(&self) -> Option<String> {
        if self.citations.is_empty() {
            return None;
        }
        let links = self
            .citations
            .iter()
            .map(|url| format!("[{}]({})", url, url))
            .collect::<Vec<_>>()
            .join(" ");
        Some(format!("Docs: {}", links))
    }
}

/// Central coordinator wiring windowing, reformulation, retrieval, prompt
/// assembly and completion.
pub struct AnsweringOrchestrator {
    reformulator: QueryReformulator,
    retriever: Retriever,
    assembler: PromptAssembler,
    completion: Arc<dyn CompletionPort>,
    slide_window: usize,
    max_question_length: usize,
}

impl AnsweringOrchestrator {
    /// Create an orchestrator over the given backends.
    pub fn new(
        search: Arc<dyn SearchPort>,
        completion: Arc<dyn CompletionPort>,
        config: &MilkdocConfig,
    ) -> Self {
        Self {
            reformulator: QueryReformulator::new(Arc::clone(&completion)),
            retriever: Retriever::new(search, &config.retrieval),
            assembler: PromptAssembler::new(),
            completion,
            slide_window: config.chat.slide_window,
            max_question_length: config.chat.max_question_length,
        }
    }

    /// Answer `question` within `session`.
    ///
    /// The question is recorded in the transcript before the pipeline runs;
    /// the answer is recorded only if the turn succeeds, so a failed turn
    /// leaves the user message in place and the session usable.
    pub async fn answer(
        &self,
        session: &mut ChatSession,
        question: &str,
    ) -> Result<TurnOutcome, ChatError> {
        self.validate(question)?;

        session.transcript.push_user(question);
        let outcome = self
            .run_turn(session.transcript.turns(), &session.config, question)
            .await?;
        session.transcript.push_assistant(outcome.answer.clone());

        tracing::info!(
            session_id = %session.id,
            model = %session.config.model,
            citations = outcome.citations.len(),
            reformulated = outcome.reformulated_query.is_some(),
            "Turn answered"
        );
        Ok(outcome)
    }

    /// Run the pipeline without touching any session.
    ///
    /// `transcript` must already end with the in-flight question. Given
    /// deterministic backends, identical inputs yield identical outcomes.
    /// On failure the visited stages are returned with the error.
    pub async fn run_turn(
        &self,
        transcript: &[ChatTurn],
        config: &SessionConfig,
        question: &str,
    ) -> Result<TurnOutcome, TurnFailure> {
        let mut state = TurnState::new();
        match self.drive(&mut state, transcript, config, question).await {
            Ok(mut outcome) => {
                outcome.stages = state.into_visited();
                Ok(outcome)
            }
            Err(error) => {
                let failed_at = state.current();
                state.fail();
                let stages = state.into_visited();
                tracing::error!(stage = ?failed_at, stages = ?stages, error = %error, "Turn failed");
                Err(TurnFailure { error, stages })
            }
        }
    }

    fn validate(&self, question: &str) -> Result<(), ChatError> {
        if question.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if question.chars().count() > self.max_question_length {
            return Err(ChatError::MessageTooLong(self.max_question_length));
        }
        Ok(())
    }

    async fn drive(
        &self,
        state: &mut TurnState,
        transcript: &[ChatTurn],
        config: &SessionConfig,
        question: &str,
    ) -> Result<TurnOutcome, ChatError> {
        state.advance(TurnStage::Windowing)?;
        if contains_delimiter(question) {
            tracing::warn!("Question contains reserved prompt delimiters, neutralizing");
        }
        let question = strip_single_quotes(question);
        let history: &[ChatTurn] = if config.use_chat_history {
            history_window(transcript, self.slide_window)
        } else {
            &[]
        };

        let reformulated_query = if history.is_empty() {
            None
        } else {
            state.advance(TurnStage::Reformulating)?;
            Some(
                self.reformulator
                    .reformulate(&config.model, history, &question)
                    .await?,
            )
        };
        let query = reformulated_query.as_deref().unwrap_or(&question);

        state.advance(TurnStage::Retrieving)?;
        let retrieval = self.retriever.retrieve(query, &config.category).await?;

        state.advance(TurnStage::Assembling)?;
        let assembled = self.assembler.assemble(history, &retrieval, &question)?;

        state.advance(TurnStage::Completing)?;
        let answer = self
            .completion
            .complete(&config.model, &assembled.prompt)
            .await
            .map_err(|e| ChatError::completion(CompletionStage::Answer, e))?;

        state.advance(TurnStage::Done)?;
        Ok(TurnOutcome {
            answer: answer.trim().to_string(),
            citations: assembled.citations,
            reformulated_query,
            raw_retrieval: retrieval.raw,
            stages: Vec::new(),
        })
    }
}
