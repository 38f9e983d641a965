//! Conversational question answering over the reference-sheet corpus.
//!
//! Windows recent chat history, optionally rewrites follow-up questions into
//! standalone queries, retrieves matching fragments, assembles a
//! context-constrained prompt and returns the model's answer together with
//! links to the documents that were searched.

pub mod error;
pub mod orchestrator;
pub mod ports;
pub mod prompt;
pub mod reformulate;
pub mod retrieval;
pub mod session;
pub mod state;
pub mod window;

pub use error::{ChatError, CompletionStage, TurnFailure};
pub use orchestrator::{AnsweringOrchestrator, TurnOutcome};
pub use ports::{category_choices, CategoryCatalog, CompletionPort, SearchPort};
pub use prompt::{AssembledPrompt, PromptAssembler};
pub use reformulate::QueryReformulator;
pub use retrieval::{RetrievalResponse, Retriever};
pub use session::{ChatSession, SessionConfig, Transcript};
pub use state::TurnStage;
pub use window::history_window;
