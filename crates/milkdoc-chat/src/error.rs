//! Error types for the answering pipeline.

use std::fmt;

use crate::state::TurnStage;

/// Which of the two completion calls of a turn failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStage {
    Reformulation,
    Answer,
}

impl fmt::Display for CompletionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompletionStage::Reformulation => f.write_str("reformulation"),
            CompletionStage::Answer => f.write_str("answer"),
        }
    }
}

/// Errors from the answering pipeline.
///
/// Every variant terminates the current turn. Nothing is retried.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("unknown model: {0}")]
    UnknownModel(String),
    #[error("retrieval error: {0}")]
    Retrieval(String),
    #[error("completion error during {stage}: {message}")]
    Completion {
        stage: CompletionStage,
        message: String,
    },
    #[error("malformed retrieval context: {0}")]
    MalformedContext(String),
    #[error("invalid turn transition: {0:?} -> {1:?}")]
    InvalidTransition(TurnStage, TurnStage),
}

/// A failed turn together with the stages it passed through.
///
/// `stages` ends in [`TurnStage::Failed`] whenever the failing stage may
/// transition there; input and windowing errors stop short of it.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct TurnFailure {
    pub error: ChatError,
    pub stages: Vec<TurnStage>,
}

impl From<TurnFailure> for ChatError {
    fn from(failure: TurnFailure) -> Self {
        failure.error
    }
}

impl ChatError {
    pub(crate) fn completion(stage: CompletionStage, err: impl fmt::Display) -> Self {
        ChatError::Completion {
            stage,
            message: err.to_string(),
        }
    }
}
