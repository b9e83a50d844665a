//! Candidate set seeding.
//!
//! Seeding is an any-match filter: a condition sharing even one confirmed
//! symptom stays in play. Requiring all confirmed symptoms would discard
//! the correct answer whenever the user mentions one symptom the condition
//! profile lacks. After seeding, the set is only re-scored, never shrunk;
//! denial is counter-evidence in the ranking, not a removal rule.

use std::collections::HashSet;

use crate::knowledge::KnowledgeBase;

/// Seed candidates from the confirmed symptom set: every condition sharing
/// at least one confirmed symptom, ordered by name. Empty input seeds
/// nothing.
pub fn seed(kb: &KnowledgeBase, confirmed: &HashSet<String>) -> Vec<String> {
    if confirmed.is_empty() {
        return Vec::new();
    }
    kb.conditions()
        .filter(|condition| !condition.symptoms.is_disjoint(confirmed))
        .map(|condition| condition.name.clone())
        .collect()
}

/// Hard-elimination alternative: drop every candidate whose profile
/// contains a denied symptom. The state machine does not use this; it
/// exists for callers who want strict elimination semantics instead of
/// the default score penalty.
pub fn narrow_strict(
    kb: &KnowledgeBase,
    current: &[String],
    denied: &HashSet<String>,
) -> Vec<String> {
    current
        .iter()
        .filter(|name| {
            kb.get(name)
                .is_some_and(|condition| condition.symptoms.is_disjoint(denied))
        })
        .cloned()
        .collect()
}
