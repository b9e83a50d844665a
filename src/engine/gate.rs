//! Confidence gate: diagnosis or deferral.
//!
//! Fires when the question budget is spent, the selector runs out of
//! questions, or the candidate set is empty. The floor scales with how much
//! evidence the session started with: a session seeded from one vague
//! symptom must not produce a confident-sounding diagnosis.

use crate::config::EngineConfig;
use crate::engine::types::{Conclusion, InconclusiveReason, RankedCandidate};
use crate::knowledge::KnowledgeBase;

/// Decide the session's conclusion from the final ranking.
///
/// `initial_confirmed` is the confirmed-set size at seeding time; the top
/// candidate needs `score >= floor_multiplier * initial_confirmed` to be
/// reported. Advice is returned verbatim from the knowledge base.
pub fn conclude(
    kb: &KnowledgeBase,
    ranked: &[RankedCandidate],
    initial_confirmed: usize,
    config: &EngineConfig,
) -> Conclusion {
    let Some(top) = ranked.first() else {
        return Conclusion::Inconclusive {
            reason: InconclusiveReason::NoCandidates,
        };
    };

    let floor = config.floor_multiplier * initial_confirmed as i32;
    if top.score < floor {
        return Conclusion::Inconclusive {
            reason: InconclusiveReason::BelowConfidenceFloor,
        };
    }

    match kb.get(&top.name) {
        Some(condition) => Conclusion::Diagnosis {
            condition: condition.name.clone(),
            advice: condition.advice.clone(),
        },
        None => Conclusion::Inconclusive {
            reason: InconclusiveReason::NoCandidates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Condition;

    fn sample_kb() -> KnowledgeBase {
        KnowledgeBase::from_conditions(vec![
            Condition::new("Flu", ["fever", "cough", "headache"], "Rest and fluids."),
            Condition::new("Measles", ["fever", "rash"], "See a doctor."),
        ])
        .unwrap()
    }

    fn candidate(name: &str, score: i32) -> RankedCandidate {
        RankedCandidate {
            name: name.into(),
            score,
        }
    }

    #[test]
    fn empty_candidates_always_inconclusive() {
        let kb = sample_kb();
        let conclusion = conclude(&kb, &[], 3, &EngineConfig::default());
        assert_eq!(
            conclusion,
            Conclusion::Inconclusive {
                reason: InconclusiveReason::NoCandidates,
            },
        );
    }

    #[test]
    fn top_candidate_above_floor_is_diagnosed() {
        let kb = sample_kb();
        // Floor = 2 * 2 initial symptoms = 4.
        let ranked = vec![candidate("Flu", 6), candidate("Measles", 2)];
        let conclusion = conclude(&kb, &ranked, 2, &EngineConfig::default());
        assert_eq!(
            conclusion,
            Conclusion::Diagnosis {
                condition: "Flu".into(),
                advice: "Rest and fluids.".into(),
            },
        );
    }

    #[test]
    fn score_below_floor_is_inconclusive() {
        let kb = sample_kb();
        // Floor = 2 * 3 = 6; a top score of 4 is not specific enough.
        let ranked = vec![candidate("Flu", 4)];
        let conclusion = conclude(&kb, &ranked, 3, &EngineConfig::default());
        assert_eq!(
            conclusion,
            Conclusion::Inconclusive {
                reason: InconclusiveReason::BelowConfidenceFloor,
            },
        );
    }

    #[test]
    fn score_exactly_at_floor_passes() {
        let kb = sample_kb();
        let ranked = vec![candidate("Measles", 4)];
        let conclusion = conclude(&kb, &ranked, 2, &EngineConfig::default());
        assert!(matches!(conclusion, Conclusion::Diagnosis { condition, .. } if condition == "Measles"));
    }

    #[test]
    fn advice_comes_from_catalog_verbatim() {
        let kb = sample_kb();
        let ranked = vec![candidate("Measles", 10)];
        match conclude(&kb, &ranked, 1, &EngineConfig::default()) {
            Conclusion::Diagnosis { advice, .. } => assert_eq!(advice, "See a doctor."),
            other => panic!("Expected diagnosis, got {:?}", other),
        }
    }

    #[test]
    fn unknown_top_name_is_inconclusive() {
        let kb = sample_kb();
        let ranked = vec![candidate("Ghost", 10)];
        let conclusion = conclude(&kb, &ranked, 1, &EngineConfig::default());
        assert_eq!(
            conclusion,
            Conclusion::Inconclusive {
                reason: InconclusiveReason::NoCandidates,
            },
        );
    }
}
