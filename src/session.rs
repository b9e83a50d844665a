//! Per-conversation state and the in-memory session store.
//!
//! One `Session` per opaque conversation identifier. The engine does not
//! persist sessions; durability and expiry belong to whoever embeds the
//! store. `last_activity` is maintained so an external expiry sweep has
//! something to look at.
//!
//! Concurrency discipline: different sessions are independent, but turns
//! for the *same* identifier must be serialized. The store hands out
//! `Arc<Mutex<Session>>` handles — holding the inner lock for the whole
//! turn guarantees no lost updates or double-counted questions.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════
// Stage
// ═══════════════════════════════════════════════════════════

/// Where a conversation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Awaiting the first free-text symptom description.
    Gathering,
    /// A yes/no question is pending.
    Asking,
    /// Terminal; the session is restartable or eligible for removal.
    Concluded,
}

// ═══════════════════════════════════════════════════════════
// Session
// ═══════════════════════════════════════════════════════════

/// Mutable state of one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub stage: Stage,
    /// Symptoms the user has affirmed. Disjoint from `denied`.
    pub confirmed: HashSet<String>,
    /// Symptoms the user has denied.
    pub denied: HashSet<String>,
    /// Candidate condition names, set once at seeding.
    pub candidates: Vec<String>,
    /// The symptom currently awaiting a yes/no answer.
    pub pending_question: Option<String>,
    /// Every symptom asked this session (answered or not).
    pub asked: HashSet<String>,
    /// Monotone count, bounded by the configured maximum.
    pub questions_asked: u32,
    /// Size of the confirmed set at seeding time; the confidence floor
    /// scales with it.
    pub initial_confirmed: usize,
    pub started_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            stage: Stage::Gathering,
            confirmed: HashSet::new(),
            denied: HashSet::new(),
            candidates: Vec::new(),
            pending_question: None,
            asked: HashSet::new(),
            questions_asked: 0,
            initial_confirmed: 0,
            started_at: now,
            last_activity: now,
        }
    }

    /// Clear all evidence and return to `Gathering`. `started_at` is kept;
    /// the reset conversation is still the same conversation to the store.
    pub fn reset(&mut self) {
        self.stage = Stage::Gathering;
        self.confirmed.clear();
        self.denied.clear();
        self.candidates.clear();
        self.pending_question = None;
        self.asked.clear();
        self.questions_asked = 0;
        self.initial_confirmed = 0;
        self.last_activity = Utc::now();
    }

    /// Record inbound activity for external expiry policies.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// Symptoms that must not be asked again: confirmed, denied, or
    /// already asked this session.
    pub fn known_symptoms(&self) -> HashSet<String> {
        let mut known = self.confirmed.clone();
        known.extend(self.denied.iter().cloned());
        known.extend(self.asked.iter().cloned());
        known
    }

    /// Evidence-set invariant: a symptom cannot be both confirmed and denied.
    pub fn is_consistent(&self) -> bool {
        self.confirmed.is_disjoint(&self.denied)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════
// SessionStore
// ═══════════════════════════════════════════════════════════

/// In-memory session store keyed by opaque conversation identifier.
///
/// `get_or_create` hands out a per-session handle; locking that handle for
/// the duration of a turn serializes concurrent messages for the same
/// identifier while leaving other sessions untouched.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Arc<Mutex<Session>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the handle for `session_id`, creating a fresh `Gathering`
    /// session on first contact.
    pub fn get_or_create(&self, session_id: &str) -> Result<Arc<Mutex<Session>>, SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        let handle = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Session::new())));
        Ok(Arc::clone(handle))
    }

    /// Drop a session. Returns whether it existed.
    pub fn remove(&self, session_id: &str) -> Result<bool, SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(sessions.remove(session_id).is_some())
    }

    /// All live session identifiers.
    pub fn session_ids(&self) -> Result<Vec<String>, SessionStoreError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        Ok(sessions.keys().cloned().collect())
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every session.
    pub fn clear(&self) -> Result<(), SessionStoreError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| SessionStoreError::LockPoisoned)?;
        sessions.clear();
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from session store operations.
#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("Internal lock poisoned")]
    LockPoisoned,
}
