//! The conversation state machine.
//!
//! `TriageEngine` owns the read-only knowledge base, the session store and
//! the compiled extractor, and sequences the pure parts (seeding, ranking,
//! selection, gating) into the multi-turn protocol:
//!
//! `Gathering` (awaiting a symptom description) → `Asking` (a yes/no
//! question is pending) → loops until the confidence gate fires →
//! `Concluded` (terminal, restartable).
//!
//! Every inbound message terminates in a textual reply. Strategy failures
//! degrade to deterministic templates; inconsistent session state resets
//! the session rather than propagating forward.

pub mod candidates;
pub mod extract;
pub mod gate;
pub mod ranking;
pub mod selector;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::knowledge::{KnowledgeBase, SynonymTable};
use crate::messages::ReplyTemplates;
use crate::session::{Session, SessionStore, SessionStoreError, Stage};

use extract::SymptomExtractor;
use types::{
    Conclusion, EngineError, InconclusiveReason, Phrasing, Predictor, RankedCandidate, TurnReply,
};

/// Utterances that restart a conversation from any stage.
const RESET_KEYWORDS: &[&str] = &["hi", "hello", "start", "menu", "restart"];
/// Recognized yes/no vocabulary; anything else is "neither" and re-asks.
const AFFIRMATIVE: &[&str] = &["yes", "y", "yeah", "yep"];
const NEGATIVE: &[&str] = &["no", "n", "nope", "nah"];

/// How many vocabulary entries the clarification hint quotes.
const CLARIFICATION_SAMPLES: usize = 3;

/// The diagnosis engine. One instance serves many concurrent sessions;
/// everything shared is read-only except the session store, which
/// serializes per-id access internally.
pub struct TriageEngine {
    kb: Arc<KnowledgeBase>,
    config: EngineConfig,
    store: SessionStore,
    extractor: SymptomExtractor,
    vocab_samples: Vec<String>,
    phrasing: Option<Box<dyn Phrasing>>,
    predictor: Option<Box<dyn Predictor>>,
}

impl TriageEngine {
    pub fn new(kb: Arc<KnowledgeBase>, config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_synonyms(kb, SynonymTable::new(), config)
    }

    /// Build an engine with a lay-phrase synonym table. The table is
    /// validated against the vocabulary before any session exists.
    pub fn with_synonyms(
        kb: Arc<KnowledgeBase>,
        synonyms: SynonymTable,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        synonyms.validate(&kb)?;
        let extractor = SymptomExtractor::new(&kb, &synonyms, &config)?;

        let mut vocab_samples: Vec<String> = kb.vocabulary().iter().cloned().collect();
        vocab_samples.sort();
        vocab_samples.truncate(CLARIFICATION_SAMPLES);

        Ok(Self {
            kb,
            config,
            store: SessionStore::new(),
            extractor,
            vocab_samples,
            phrasing: None,
            predictor: None,
        })
    }

    /// Attach an optional question/summary phrasing strategy.
    pub fn with_phrasing(mut self, phrasing: Box<dyn Phrasing>) -> Self {
        self.phrasing = Some(phrasing);
        self
    }

    /// Attach an optional single-shot prediction strategy.
    pub fn with_predictor(mut self, predictor: Box<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// The session store, exposed so the transport can drop concluded
    /// sessions or run its own expiry sweep.
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.kb
    }

    // ── Turn protocol ────────────────────────────────────────

    /// Process one inbound message for `session_id` and produce the reply
    /// to deliver verbatim. `done` reports whether the session concluded
    /// this turn.
    pub fn handle_turn(&self, session_id: &str, raw_text: &str) -> Result<TurnReply, EngineError> {
        let text = raw_text.trim();
        let handle = self.store.get_or_create(session_id)?;
        let mut session = handle.lock().map_err(|_| SessionStoreError::LockPoisoned)?;
        session.touch();

        if is_reset_keyword(text) {
            session.reset();
            tracing::info!(session_id, "Session reset by keyword");
            return Ok(TurnReply {
                reply: ReplyTemplates::greeting(),
                done: false,
            });
        }

        // A concluded session is restartable: the next message opens a
        // fresh gathering turn.
        if session.stage == Stage::Concluded {
            session.reset();
        }

        if self.is_malformed(&session) {
            tracing::warn!(session_id, "Inconsistent session state, resetting");
            session.reset();
            return Ok(TurnReply {
                reply: ReplyTemplates::restart(),
                done: false,
            });
        }

        let reply = match session.stage {
            Stage::Gathering | Stage::Concluded => self.gather(&mut session, text),
            Stage::Asking => self.answer(&mut session, text),
        };

        tracing::info!(
            session_id,
            stage = ?session.stage,
            questions = session.questions_asked,
            done = reply.done,
            "Turn handled"
        );
        Ok(reply)
    }

    /// First-turn handling: extract symptoms, seed candidates, evaluate.
    fn gather(&self, session: &mut Session, text: &str) -> TurnReply {
        let found = self.extractor.extract(text);
        if found.is_empty() {
            // No evidence, no candidate set; ask for a better description.
            return TurnReply {
                reply: ReplyTemplates::clarification(&self.vocab_samples),
                done: false,
            };
        }

        session.confirmed.extend(found);
        session.candidates = candidates::seed(&self.kb, &session.confirmed);
        session.initial_confirmed = session.confirmed.len();
        self.evaluate(session)
    }

    /// Yes/no handling for the pending question.
    fn answer(&self, session: &mut Session, text: &str) -> TurnReply {
        let Some(pending) = session.pending_question.clone() else {
            session.reset();
            return TurnReply {
                reply: ReplyTemplates::restart(),
                done: false,
            };
        };

        match parse_answer(text) {
            Some(true) => {
                session.pending_question = None;
                session.confirmed.insert(pending);
                self.evaluate(session)
            }
            Some(false) => {
                session.pending_question = None;
                session.denied.insert(pending);
                self.evaluate(session)
            }
            // Neither yes nor no: re-ask the same question. The budget was
            // spent when the question was first chosen, never on re-asks.
            None => TurnReply {
                reply: ReplyTemplates::reask(&pending),
                done: false,
            },
        }
    }

    /// Re-rank from accumulated evidence, then either ask the next
    /// question or fall through to the confidence gate.
    fn evaluate(&self, session: &mut Session) -> TurnReply {
        let ranked = ranking::rank(
            &self.kb,
            &session.candidates,
            &session.confirmed,
            &session.denied,
            &self.config,
        );

        if session.candidates.is_empty() || session.questions_asked >= self.config.max_questions {
            return self.finish(session, &ranked);
        }

        let known = session.known_symptoms();
        match selector::select_next(&self.kb, &ranked, &known, self.config.top_k) {
            Some(symptom) => {
                session.stage = Stage::Asking;
                session.asked.insert(symptom.clone());
                session.pending_question = Some(symptom.clone());
                session.questions_asked += 1;
                TurnReply {
                    reply: self.render_question(&symptom),
                    done: false,
                }
            }
            None => self.finish(session, &ranked),
        }
    }

    /// Run the confidence gate and conclude the session.
    fn finish(&self, session: &mut Session, ranked: &[RankedCandidate]) -> TurnReply {
        let conclusion = gate::conclude(&self.kb, ranked, session.initial_confirmed, &self.config);
        session.stage = Stage::Concluded;
        session.pending_question = None;

        let reply = match &conclusion {
            Conclusion::Diagnosis { condition, advice } => self.render_summary(condition, advice),
            Conclusion::Inconclusive {
                reason: InconclusiveReason::NoCandidates,
            } => ReplyTemplates::inconclusive_no_match(),
            Conclusion::Inconclusive {
                reason: InconclusiveReason::BelowConfidenceFloor,
            } => ReplyTemplates::inconclusive_low_confidence(),
        };

        tracing::info!(conclusion = ?conclusion, "Session concluded");
        TurnReply { reply, done: true }
    }

    // ── Single-shot modes (no session mutation) ──────────────

    /// One-shot overview: list every condition matching any mentioned
    /// symptom with its advice. No session is touched.
    pub fn overview(&self, raw_text: &str) -> String {
        let found = self.extractor.extract(raw_text);
        if found.is_empty() {
            return ReplyTemplates::clarification(&self.vocab_samples);
        }

        let matches: Vec<(String, String)> = self
            .kb
            .conditions()
            .filter(|condition| !condition.symptoms.is_disjoint(&found))
            .map(|condition| (condition.name.clone(), condition.advice.clone()))
            .collect();
        ReplyTemplates::overview(&matches)
    }

    /// Single-shot prediction: delegate to the configured `Predictor`,
    /// falling back to one pass of seed/rank/gate when the predictor is
    /// absent, fails, or names a condition outside the catalog.
    pub fn predict_once(&self, raw_text: &str) -> String {
        let found = self.extractor.extract(raw_text);
        if found.is_empty() {
            return ReplyTemplates::clarification(&self.vocab_samples);
        }

        if let Some(predictor) = &self.predictor {
            match predictor.predict(&found) {
                Ok(name) => match self.kb.get(&name) {
                    Some(condition) => {
                        return self.render_summary(&condition.name, &condition.advice);
                    }
                    None => {
                        tracing::warn!(condition = %name, "Predictor named unknown condition, falling back");
                    }
                },
                Err(error) => {
                    tracing::warn!(%error, "Predictor failed, falling back to ranking");
                }
            }
        }

        let names = candidates::seed(&self.kb, &found);
        let ranked = ranking::rank(&self.kb, &names, &found, &HashSet::new(), &self.config);
        match gate::conclude(&self.kb, &ranked, found.len(), &self.config) {
            Conclusion::Diagnosis { condition, advice } => self.render_summary(&condition, &advice),
            Conclusion::Inconclusive {
                reason: InconclusiveReason::NoCandidates,
            } => ReplyTemplates::inconclusive_no_match(),
            Conclusion::Inconclusive {
                reason: InconclusiveReason::BelowConfidenceFloor,
            } => ReplyTemplates::inconclusive_low_confidence(),
        }
    }

    // ── Rendering with graceful degradation ──────────────────

    fn render_question(&self, symptom: &str) -> String {
        if let Some(phrasing) = &self.phrasing {
            match phrasing.render_question(symptom) {
                Ok(text) if !text.trim().is_empty() => return text,
                Ok(_) => {
                    tracing::warn!(symptom, "Phrasing returned empty question, using template");
                }
                Err(error) => {
                    tracing::warn!(%error, symptom, "Phrasing failed, using template");
                }
            }
        }
        ReplyTemplates::question(symptom)
    }

    fn render_summary(&self, condition: &str, advice: &str) -> String {
        if let Some(phrasing) = &self.phrasing {
            match phrasing.render_summary(condition, advice) {
                Ok(text) if !text.trim().is_empty() => return text,
                Ok(_) => {
                    tracing::warn!(condition, "Phrasing returned empty summary, using template");
                }
                Err(error) => {
                    tracing::warn!(%error, condition, "Phrasing failed, using template");
                }
            }
        }
        ReplyTemplates::diagnosis(condition, advice)
    }

    // ── Invariant checks ─────────────────────────────────────

    /// Detect session state the protocol can never produce: overlapping
    /// evidence sets, a pending question outside the vocabulary, or an
    /// `Asking` stage without a pending question.
    fn is_malformed(&self, session: &Session) -> bool {
        if !session.is_consistent() {
            return true;
        }
        if let Some(pending) = &session.pending_question {
            if !self.kb.contains_symptom(pending) {
                return true;
            }
        }
        session.stage == Stage::Asking && session.pending_question.is_none()
    }
}

fn is_reset_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    RESET_KEYWORDS.contains(&lower.as_str())
}

/// Case-insensitive exact match against the small fixed yes/no vocabulary.
fn parse_answer(text: &str) -> Option<bool> {
    let lower = text.to_lowercase();
    if AFFIRMATIVE.contains(&lower.as_str()) {
        Some(true)
    } else if NEGATIVE.contains(&lower.as_str()) {
        Some(false)
    } else {
        None
    }
}
