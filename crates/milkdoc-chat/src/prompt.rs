//! Prompt assembly and citation extraction.
//!
//! The prompt has three delimited sections in a fixed order: chat history,
//! retrieved context, question. Every piece of embedded text passes through
//! [`neutralize_delimiters`] so that no input can open or close a section.
//! Citations are computed from the same retrieval response the context was
//! rendered from.

use std::collections::BTreeSet;

use milkdoc_core::safety::neutralize_delimiters;
use milkdoc_core::types::{ChatTurn, RetrievalResult};

use crate::error::ChatError;
use crate::retrieval::RetrievalResponse;

const INSTRUCTIONS: &str = "\
You are an expert chat assistant that extracts information from the CONTEXT section below.
You offer a chat experience considering the information included in the CHAT HISTORY section.
When answering the QUESTION section, be concise and do not hallucinate.
If you don't have the information, just say so.

Do not mention the CONTEXT used in your answer.
Do not mention the CHAT HISTORY used in your answer.

Only answer the question if you can extract it from the CONTEXT provided.";

/// A rendered prompt and the links of the documents behind its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub prompt: String,
    /// Distinct `linked_url` values of the retrieved fragments.
    pub citations: BTreeSet<String>,
    /// Fragments rendered into the context section, in ranked order.
    pub results: Vec<RetrievalResult>,
}

/// Builds answering prompts from history, retrieval output and question.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptAssembler;

impl PromptAssembler {
    pub fn new() -> Self {
        Self
    }

    /// Render the prompt for `question`.
    ///
    /// Fails with [`ChatError::MalformedContext`] when the response lacks a
    /// `results` array or any entry lacks `chunk` or `linked_url`; no partial
    /// citation set is produced in that case.
    pub fn assemble(
        &self,
        history: &[ChatTurn],
        retrieval: &RetrievalResponse,
        question: &str,
    ) -> Result<AssembledPrompt, ChatError> {
        let results = parse_results(&retrieval.raw)?;
        let citations = extract_citations(&results);

        let prompt = format!(
            "{}\n\n<chat_history>\n{}\n</chat_history>\n<context>\n{}\n</context>\n<question>\n{}\n</question>\nAnswer:\n",
            INSTRUCTIONS,
            render_history(history),
            render_context(&results),
            neutralize_delimiters(question),
        );

        Ok(AssembledPrompt {
            prompt,
            citations,
            results,
        })
    }
}

/// Decode the `results` array of a search response.
pub fn parse_results(raw: &serde_json::Value) -> Result<Vec<RetrievalResult>, ChatError> {
    let entries = raw
        .get("results")
        .ok_or_else(|| ChatError::MalformedContext("response has no `results` key".to_string()))?
        .as_array()
        .ok_or_else(|| ChatError::MalformedContext("`results` is not an array".to_string()))?;

    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            serde_json::from_value::<RetrievalResult>(entry.clone())
                .map_err(|e| ChatError::MalformedContext(format!("result {}: {}", i, e)))
        })
        .collect()
}

/// Distinct document links exactly as returned, sorted. Blank links are
/// skipped.
pub fn extract_citations(results: &[RetrievalResult]) -> BTreeSet<String> {
    results
        .iter()
        .filter(|r| !r.linked_url.trim().is_empty())
        .map(|r| r.linked_url.clone())
        .collect()
}

/// One `role: content` line per turn.
pub(crate) fn render_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role, neutralize_delimiters(&turn.content)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_context(results: &[RetrievalResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let mut header = format!("[{}]", i + 1);
            if !r.relative_path.is_empty() {
                header.push_str(&format!(" source: {}", neutralize_delimiters(&r.relative_path)));
            }
            if !r.category.is_empty() {
                header.push_str(&format!(" ({})", neutralize_delimiters(&r.category)));
            }
            format!("{}\n{}", header, neutralize_delimiters(&r.chunk))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
