//! Conversational symptom triage over a static condition catalog.
//!
//! A [`TriageEngine`] holds the knowledge base and serves any number of
//! concurrent sessions: free text in, one reply out per turn, until the
//! conversation concludes with a diagnosis or an honest "not sure".
//!
//! ```no_run
//! use std::sync::Arc;
//! use triage::{Condition, EngineConfig, KnowledgeBase, TriageEngine};
//!
//! # fn main() -> Result<(), triage::EngineError> {
//! let kb = KnowledgeBase::from_conditions(vec![
//!     Condition::new("Flu", ["fever", "cough", "headache"], "Rest and fluids."),
//!     Condition::new("Measles", ["fever", "rash"], "See a doctor promptly."),
//! ])?;
//! let engine = TriageEngine::new(Arc::new(kb), EngineConfig::default())?;
//!
//! let reply = engine.handle_turn("user-1", "I have a fever and a cough")?;
//! println!("{}", reply.reply);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine; // Extraction, ranking, question selection, confidence gate
pub mod knowledge;
pub mod messages;
pub mod session;

pub use config::{ConfigError, EngineConfig};
pub use engine::types::{
    Conclusion, EngineError, InconclusiveReason, Phrasing, Predictor, RankedCandidate,
    StrategyError, TurnReply,
};
pub use engine::TriageEngine;
pub use knowledge::{Condition, KnowledgeBase, KnowledgeError, SynonymTable};
pub use session::{Session, SessionStore, SessionStoreError, Stage};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for binaries embedding the engine. Honors
/// `RUST_LOG`, defaulting to the crate's own info-level filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{} tracing initialized", config::APP_NAME, config::APP_VERSION);
}
