use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Triage";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is unset.
pub fn default_log_filter() -> &'static str {
    "triage=info"
}

/// Tunable parameters of the diagnosis engine.
///
/// All fields have working defaults; embedders can deserialize overrides
/// from their own settings format. `validate()` is called by
/// `TriageEngine::new`, so a hand-built config with nonsense weights is
/// rejected before any session exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Score contribution of a confirmed symptom. Must be positive.
    pub yes_weight: i32,
    /// Score contribution of a denied symptom. Must be negative.
    pub no_weight: i32,
    /// Maximum follow-up questions per session.
    pub max_questions: u32,
    /// How many top-ranked candidates the question selector considers.
    pub top_k: usize,
    /// Confidence floor is `floor_multiplier * |initially confirmed symptoms|`.
    pub floor_multiplier: i32,
    /// Whether the extractor attempts edit-distance recovery of misspellings.
    pub fuzzy_matching: bool,
    /// Words shorter than this are never fuzzy-corrected.
    pub fuzzy_min_len: usize,
    /// Maximum edit distance accepted by fuzzy recovery.
    pub fuzzy_max_distance: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            yes_weight: 2,
            no_weight: -1,
            max_questions: 5,
            top_k: 3,
            floor_multiplier: 2,
            fuzzy_matching: true,
            fuzzy_min_len: 5,
            fuzzy_max_distance: 2,
        }
    }
}

impl EngineConfig {
    /// Check the config for values the engine cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.yes_weight <= 0 {
            return Err(ConfigError::YesWeight(self.yes_weight));
        }
        if self.no_weight >= 0 {
            return Err(ConfigError::NoWeight(self.no_weight));
        }
        if self.max_questions == 0 {
            return Err(ConfigError::MaxQuestions);
        }
        if self.top_k == 0 {
            return Err(ConfigError::TopK);
        }
        Ok(())
    }
}

/// Errors from engine config validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("yes_weight must be positive, got {0}")]
    YesWeight(i32),
    #[error("no_weight must be negative, got {0}")]
    NoWeight(i32),
    #[error("max_questions must be at least 1")]
    MaxQuestions,
    #[error("top_k must be at least 1")]
    TopK,
}
