//! Next-question selection.
//!
//! Attention is restricted to the top-K ranked candidates so questions stay
//! relevant to plausible outcomes. A discriminating symptom (present in
//! some but not all of the top-K) is preferred because its answer moves the
//! relative ranking; a symptom every top candidate shares moves nothing.
//! Ties go to the symptom occurring in the most top-K profiles, then to
//! name order so selection is reproducible.

use std::collections::{BTreeMap, HashSet};

use crate::engine::types::RankedCandidate;
use crate::knowledge::{Condition, KnowledgeBase};

/// Pick the next symptom to ask about, or `None` when no unknown symptom
/// remains among the top-K candidates. `None` signals the state machine to
/// fall through to the confidence gate.
pub fn select_next(
    kb: &KnowledgeBase,
    ranked: &[RankedCandidate],
    known: &HashSet<String>,
    top_k: usize,
) -> Option<String> {
    let top: Vec<&Condition> = ranked
        .iter()
        .take(top_k)
        .filter_map(|candidate| kb.get(&candidate.name))
        .collect();
    if top.is_empty() {
        return None;
    }

    // Occurrence counts of unknown symptoms across the top-K profiles.
    // BTreeMap gives the deterministic name-order tiebreak for free.
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for condition in &top {
        for symptom in &condition.symptoms {
            if !known.contains(symptom) {
                *counts.entry(symptom.as_str()).or_insert(0) += 1;
            }
        }
    }

    pick(&counts, top.len(), true).or_else(|| pick(&counts, top.len(), false))
}

/// Highest-count symptom, optionally restricted to discriminators
/// (count < top_len). First name in order wins count ties.
fn pick(counts: &BTreeMap<&str, usize>, top_len: usize, discriminating_only: bool) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for (&symptom, &count) in counts {
        if discriminating_only && count >= top_len {
            continue;
        }
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((symptom, count)),
        }
    }
    best.map(|(symptom, _)| symptom.to_string())
}
