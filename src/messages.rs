//! Deterministic reply templates.
//!
//! These are the fallback phrasings used whenever no `Phrasing` strategy is
//! configured, or when a configured strategy fails mid-turn. Templates never
//! alter advisory text: a condition's advice is passed through verbatim.

/// Template builder for all user-facing replies.
pub struct ReplyTemplates;

impl ReplyTemplates {
    /// Follow-up question about one symptom.
    pub fn question(symptom: &str) -> String {
        format!("Do you also have '{}'?", symptom)
    }

    /// Re-ask after an answer that was neither yes nor no.
    pub fn reask(symptom: &str) -> String {
        format!(
            "Sorry, I need a yes or no: do you also have '{}'?",
            symptom,
        )
    }

    /// Final diagnosis with the catalog's advisory text, verbatim.
    pub fn diagnosis(condition: &str, advice: &str) -> String {
        format!(
            "Based on your symptoms, the most likely condition is **{}**.\nAdvice: {}",
            condition, advice,
        )
    }

    /// No candidate survived the evidence.
    pub fn inconclusive_no_match() -> String {
        "I couldn't match your symptoms to a condition I know. \
         Please consult a doctor."
            .to_string()
    }

    /// A top candidate exists but its score is below the confidence floor.
    pub fn inconclusive_low_confidence() -> String {
        "Your answers weren't specific enough for a confident suggestion. \
         Please consult a doctor to be safe."
            .to_string()
    }

    /// First-contact / reset greeting.
    pub fn greeting() -> String {
        "Hi! Describe the symptoms you're experiencing and I'll try to help."
            .to_string()
    }

    /// Recovery message after an internal state reset.
    pub fn restart() -> String {
        "Let's start over. Please describe the symptoms you're experiencing."
            .to_string()
    }

    /// Nothing recognizable in the user's text; suggest real vocabulary
    /// entries so the hint is always actionable.
    pub fn clarification(samples: &[String]) -> String {
        if samples.is_empty() {
            return "I couldn't recognize any symptoms in that. \
                    Could you describe how you're feeling in more detail?"
                .to_string();
        }
        let quoted: Vec<String> = samples.iter().map(|s| format!("'{}'", s)).collect();
        format!(
            "I couldn't recognize any symptoms in that. \
             Try listing symptoms like {}.",
            quoted.join(", "),
        )
    }

    /// Single-shot overview of every condition matching the mentioned
    /// symptoms.
    pub fn overview(matches: &[(String, String)]) -> String {
        let mut lines =
            vec!["Based on the symptom(s) you mentioned, possible conditions:".to_string()];
        for (condition, advice) in matches {
            lines.push(format!("- {}: {}", condition, advice));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_names_symptom() {
        assert_eq!(ReplyTemplates::question("rash"), "Do you also have 'rash'?");
    }

    #[test]
    fn reask_names_symptom() {
        let reply = ReplyTemplates::reask("rash");
        assert!(reply.contains("yes or no"));
        assert!(reply.contains("'rash'"));
    }

    #[test]
    fn diagnosis_carries_advice_verbatim() {
        let advice = "Rest, fluids, and paracetamol as needed.";
        let reply = ReplyTemplates::diagnosis("Flu", advice);
        assert!(reply.contains("**Flu**"));
        assert!(reply.contains(advice));
    }

    #[test]
    fn clarification_quotes_samples() {
        let samples = vec!["fever".to_string(), "cough".to_string()];
        let reply = ReplyTemplates::clarification(&samples);
        assert!(reply.contains("'fever'"));
        assert!(reply.contains("'cough'"));
    }

    #[test]
    fn clarification_without_samples_still_asks() {
        let reply = ReplyTemplates::clarification(&[]);
        assert!(reply.to_lowercase().contains("describe"));
    }

    #[test]
    fn overview_lists_each_condition() {
        let matches = vec![
            ("Flu".to_string(), "Rest.".to_string()),
            ("Measles".to_string(), "See a doctor.".to_string()),
        ];
        let reply = ReplyTemplates::overview(&matches);
        assert!(reply.contains("- Flu: Rest."));
        assert!(reply.contains("- Measles: See a doctor."));
    }
}
