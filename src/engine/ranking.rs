//! Weighted evidence scoring.
//!
//! Pure with respect to its inputs: scores are recomputed from scratch each
//! turn from the accumulated evidence sets, so the order in which evidence
//! arrived can never bias the outcome. A denied symptom in a candidate's
//! profile counts against it; the weights come from `EngineConfig`.

use std::collections::HashSet;

use crate::config::EngineConfig;
use crate::engine::types::RankedCandidate;
use crate::knowledge::KnowledgeBase;

/// Score and order the candidate set, descending by score with ties broken
/// by condition name so the ordering is reproducible.
pub fn rank(
    kb: &KnowledgeBase,
    candidates: &[String],
    confirmed: &HashSet<String>,
    denied: &HashSet<String>,
    config: &EngineConfig,
) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = candidates
        .iter()
        .filter_map(|name| kb.get(name))
        .map(|condition| {
            let yes_hits = condition.symptoms.intersection(confirmed).count() as i32;
            let no_hits = condition.symptoms.intersection(denied).count() as i32;
            RankedCandidate {
                name: condition.name.clone(),
                score: config.yes_weight * yes_hits + config.no_weight * no_hits,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Condition;

    fn sample_kb() -> KnowledgeBase {
        KnowledgeBase::from_conditions(vec![
            Condition::new("Flu", ["fever", "cough", "headache"], "Rest."),
            Condition::new("Measles", ["fever", "rash"], "See a doctor."),
            Condition::new("Cold", ["cough", "runny nose"], "Rest."),
        ])
        .unwrap()
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn all_names(kb: &KnowledgeBase) -> Vec<String> {
        kb.conditions().map(|c| c.name.clone()).collect()
    }

    #[test]
    fn confirmed_symptoms_add_yes_weight() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        let ranked = rank(
            &kb,
            &all_names(&kb),
            &set(&["fever", "cough"]),
            &HashSet::new(),
            &config,
        );
        assert_eq!(ranked[0].name, "Flu");
        assert_eq!(ranked[0].score, 4); // fever + cough, 2 each
        assert_eq!(ranked[1].name, "Cold");
        assert_eq!(ranked[1].score, 2);
        assert_eq!(ranked[2].name, "Measles");
        assert_eq!(ranked[2].score, 2);
    }

    #[test]
    fn denied_symptom_subtracts_no_weight() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        let without_denial = rank(
            &kb,
            &all_names(&kb),
            &set(&["fever"]),
            &HashSet::new(),
            &config,
        );
        let with_denial = rank(
            &kb,
            &all_names(&kb),
            &set(&["fever"]),
            &set(&["rash"]),
            &config,
        );

        let measles_before = without_denial.iter().find(|c| c.name == "Measles").unwrap();
        let measles_after = with_denial.iter().find(|c| c.name == "Measles").unwrap();
        assert_eq!(measles_before.score - measles_after.score, 1);

        // Flu's profile has no rash; its score is unchanged.
        let flu_before = without_denial.iter().find(|c| c.name == "Flu").unwrap();
        let flu_after = with_denial.iter().find(|c| c.name == "Flu").unwrap();
        assert_eq!(flu_before.score, flu_after.score);
    }

    #[test]
    fn denial_never_increases_any_score() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        let confirmed = set(&["fever", "cough"]);
        let before = rank(&kb, &all_names(&kb), &confirmed, &HashSet::new(), &config);
        let after = rank(&kb, &all_names(&kb), &confirmed, &set(&["runny nose"]), &config);

        for candidate in &before {
            let later = after.iter().find(|c| c.name == candidate.name).unwrap();
            assert!(later.score <= candidate.score);
        }
        // Strict decrease for every profile containing the denied symptom.
        let cold_before = before.iter().find(|c| c.name == "Cold").unwrap();
        let cold_after = after.iter().find(|c| c.name == "Cold").unwrap();
        assert!(cold_after.score < cold_before.score);
    }

    #[test]
    fn ties_break_by_name_for_determinism() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        // Cold and Measles both score 0 with no evidence.
        let ranked = rank(&kb, &all_names(&kb), &HashSet::new(), &HashSet::new(), &config);
        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Cold", "Flu", "Measles"]);
    }

    #[test]
    fn ranking_is_deterministic() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        let confirmed = set(&["fever"]);
        let denied = set(&["cough"]);
        let first = rank(&kb, &all_names(&kb), &confirmed, &denied, &config);
        for _ in 0..10 {
            assert_eq!(first, rank(&kb, &all_names(&kb), &confirmed, &denied, &config));
        }
    }

    #[test]
    fn evidence_order_is_commutative() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        // Confirming A then B is the same accumulated set as B then A;
        // ranking sees only the set, so the orderings are identical.
        let ab: HashSet<String> = ["fever", "cough"].iter().map(|s| s.to_string()).collect();
        let ba: HashSet<String> = ["cough", "fever"].iter().map(|s| s.to_string()).collect();
        assert_eq!(
            rank(&kb, &all_names(&kb), &ab, &HashSet::new(), &config),
            rank(&kb, &all_names(&kb), &ba, &HashSet::new(), &config),
        );
    }

    #[test]
    fn unknown_candidate_names_are_skipped() {
        let kb = sample_kb();
        let config = EngineConfig::default();
        let names = vec!["Flu".to_string(), "Ghost".to_string()];
        let ranked = rank(&kb, &names, &set(&["fever"]), &HashSet::new(), &config);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].name, "Flu");
    }
}
