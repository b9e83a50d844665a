use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::knowledge::KnowledgeError;
use crate::session::SessionStoreError;

// ---------------------------------------------------------------------------
// RankedCandidate
// ---------------------------------------------------------------------------

/// One candidate condition with its evidence score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub name: String,
    pub score: i32,
}

// ---------------------------------------------------------------------------
// Conclusion
// ---------------------------------------------------------------------------

/// Outcome of the confidence gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conclusion {
    /// Top candidate cleared the confidence floor. Advice is carried
    /// verbatim from the knowledge base.
    Diagnosis { condition: String, advice: String },
    /// No candidate could be reported with confidence.
    Inconclusive { reason: InconclusiveReason },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InconclusiveReason {
    /// The candidate set was empty when the gate fired.
    NoCandidates,
    /// A top candidate exists but its score is below the floor.
    BelowConfidenceFloor,
}

// ---------------------------------------------------------------------------
// TurnReply
// ---------------------------------------------------------------------------

/// What `handle_turn` hands back to the transport: the reply text to
/// deliver verbatim, and whether the session has concluded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnReply {
    pub reply: String,
    pub done: bool,
}

// ---------------------------------------------------------------------------
// Strategy traits
// ---------------------------------------------------------------------------

/// Failure of an injected strategy call. Always recoverable: the engine
/// falls back to deterministic templates and the turn still produces a
/// reply.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("Strategy call failed: {0}")]
    Failed(String),
    #[error("Strategy call timed out")]
    Timeout,
}

/// Optional natural-language phrasing of questions and summaries.
/// When absent (or failing), `ReplyTemplates` supplies the wording.
pub trait Phrasing: Send + Sync {
    fn render_question(&self, symptom: &str) -> Result<String, StrategyError>;
    fn render_summary(&self, condition: &str, advice: &str) -> Result<String, StrategyError>;
}

/// Optional single-shot diagnosis strategy (e.g. a trained classifier).
/// Used by `predict_once` in place of the iterative question loop.
pub trait Predictor: Send + Sync {
    fn predict(&self, confirmed: &HashSet<String>) -> Result<String, StrategyError>;
}

// ---------------------------------------------------------------------------
// EngineError
// ---------------------------------------------------------------------------

/// Errors from engine construction and turn handling. Note the short list:
/// every conversational irregularity (unrecognized answer, no extractable
/// symptoms, empty candidates) resolves to a textual reply, not an error.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid engine config: {0}")]
    Config(#[from] ConfigError),
    #[error("Knowledge base error: {0}")]
    Knowledge(#[from] KnowledgeError),
    #[error("Session store error: {0}")]
    Store(#[from] SessionStoreError),
    #[error("Symptom pattern failed to compile for '{symptom}': {source}")]
    Pattern {
        symptom: String,
        source: regex::Error,
    },
}
