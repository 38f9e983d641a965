//! Per-turn state machine with validated transitions.
//!
//! Idle -> Windowing -> [Reformulating] -> Retrieving -> Assembling
//! -> Completing -> Done, with Failed reachable from every stage that
//! calls a backend or parses a backend response.

use serde::Serialize;

use crate::error::ChatError;

/// Stage of a single question-answering turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnStage {
    Idle,
    Windowing,
    Reformulating,
    Retrieving,
    Assembling,
    Completing,
    Done,
    Failed,
}

/// Validate that a stage transition is allowed.
///
/// Valid transitions:
/// - Idle -> Windowing
/// - Windowing -> Reformulating (history present)
/// - Windowing -> Retrieving (no history)
/// - Reformulating -> Retrieving
/// - Retrieving -> Assembling
/// - Assembling -> Completing
/// - Completing -> Done
/// - Reformulating / Retrieving / Assembling / Completing -> Failed
pub fn validate_transition(from: TurnStage, to: TurnStage) -> Result<(), ChatError> {
    use TurnStage::*;

    let valid = matches!(
        (from, to),
        (Idle, Windowing)
            | (Windowing, Reformulating)
            | (Windowing, Retrieving)
            | (Reformulating, Retrieving)
            | (Retrieving, Assembling)
            | (Assembling, Completing)
            | (Completing, Done)
            | (Reformulating, Failed)
            | (Retrieving, Failed)
            | (Assembling, Failed)
            | (Completing, Failed)
    );

    if valid {
        Ok(())
    } else {
        Err(ChatError::InvalidTransition(from, to))
    }
}

/// Tracks the stages a turn has passed through.
#[derive(Debug, Clone)]
pub struct TurnState {
    current: TurnStage,
    visited: Vec<TurnStage>,
}

impl TurnState {
    pub fn new() -> Self {
        Self {
            current: TurnStage::Idle,
            visited: vec![TurnStage::Idle],
        }
    }

    pub fn current(&self) -> TurnStage {
        self.current
    }

    /// Stages in the order they were entered, starting with `Idle`.
    pub fn visited(&self) -> &[TurnStage] {
        &self.visited
    }

    /// Move to `to`, rejecting transitions the pipeline never makes.
    pub fn advance(&mut self, to: TurnStage) -> Result<(), ChatError> {
        validate_transition(self.current, to)?;
        tracing::debug!(from = ?self.current, to = ?to, "Turn stage transition");
        self.current = to;
        self.visited.push(to);
        Ok(())
    }

    /// Mark the turn failed if the current stage allows it.
    pub fn fail(&mut self) {
        if validate_transition(self.current, TurnStage::Failed).is_ok() {
            self.current = TurnStage::Failed;
            self.visited.push(TurnStage::Failed);
        }
    }

    pub fn into_visited(self) -> Vec<TurnStage> {
        self.visited
    }
}

impl Default for TurnState {
    fn default() -> Self {
        Self::new()
    }
}
