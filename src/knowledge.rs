//! Immutable condition catalog and derived symptom vocabulary.
//!
//! The catalog is supplied by an external loader (disk, bundled asset,
//! whatever the embedder uses) and validated once at construction. After
//! that it never changes, so a `KnowledgeBase` behind an `Arc` is safe for
//! unsynchronized concurrent reads across sessions.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════
// Condition
// ═══════════════════════════════════════════════════════════

/// One named condition with its symptom profile and advisory text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    pub symptoms: HashSet<String>,
    pub advice: String,
}

impl Condition {
    /// Convenience constructor for tests and hand-built catalogs.
    pub fn new(
        name: impl Into<String>,
        symptoms: impl IntoIterator<Item = impl Into<String>>,
        advice: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            symptoms: symptoms.into_iter().map(Into::into).collect(),
            advice: advice.into(),
        }
    }
}

/// Normalize a symptom identifier: lowercase, separators collapsed to
/// single spaces. Every symptom stored in the vocabulary or in session
/// evidence has this shape.
pub(crate) fn normalize_symptom(raw: &str) -> String {
    raw.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// ═══════════════════════════════════════════════════════════
// KnowledgeBase
// ═══════════════════════════════════════════════════════════

/// Validated, immutable catalog of conditions plus the derived symptom
/// vocabulary (the union of all condition symptom sets).
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    /// Keyed by condition name; BTreeMap keeps iteration order stable.
    conditions: BTreeMap<String, Condition>,
    vocabulary: HashSet<String>,
}

impl KnowledgeBase {
    /// Build a knowledge base from loader output, validating shape:
    /// non-empty catalog, unique non-blank names, non-empty symptom sets,
    /// no blank symptom identifiers. Symptoms are normalized on the way in.
    pub fn from_conditions(
        conditions: impl IntoIterator<Item = Condition>,
    ) -> Result<Self, KnowledgeError> {
        let mut by_name: BTreeMap<String, Condition> = BTreeMap::new();
        let mut vocabulary = HashSet::new();

        for mut condition in conditions {
            condition.name = condition.name.trim().to_string();
            if condition.name.is_empty() {
                return Err(KnowledgeError::BlankName);
            }
            if condition.symptoms.is_empty() {
                return Err(KnowledgeError::NoSymptoms(condition.name));
            }

            let mut normalized = HashSet::with_capacity(condition.symptoms.len());
            for symptom in &condition.symptoms {
                let canonical = normalize_symptom(symptom);
                if canonical.is_empty() {
                    return Err(KnowledgeError::BlankSymptom(condition.name));
                }
                vocabulary.insert(canonical.clone());
                normalized.insert(canonical);
            }
            condition.symptoms = normalized;

            let key = condition.name.to_lowercase();
            if by_name.contains_key(&key) {
                return Err(KnowledgeError::DuplicateName(condition.name));
            }
            by_name.insert(key, condition);
        }

        if by_name.is_empty() {
            return Err(KnowledgeError::EmptyCatalog);
        }

        Ok(Self {
            conditions: by_name,
            vocabulary,
        })
    }

    /// Parse a JSON array of conditions, then validate as `from_conditions`.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, KnowledgeError> {
        let conditions: Vec<Condition> = serde_json::from_slice(bytes)?;
        Self::from_conditions(conditions)
    }

    /// Look up a condition by name (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.conditions.get(&name.to_lowercase())
    }

    /// All conditions, ordered by name.
    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.conditions.values()
    }

    /// The derived symptom vocabulary.
    pub fn vocabulary(&self) -> &HashSet<String> {
        &self.vocabulary
    }

    /// Whether a symptom identifier belongs to the vocabulary.
    pub fn contains_symptom(&self, symptom: &str) -> bool {
        self.vocabulary.contains(symptom)
    }

    /// Number of conditions in the catalog.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// SynonymTable
// ═══════════════════════════════════════════════════════════

/// Optional lay-phrase → canonical-symptom mapping applied before
/// canonical matching ("tummy pain" → "stomach pain").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SynonymTable {
    entries: HashMap<String, String>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one mapping. Both sides are normalized.
    pub fn insert(&mut self, phrase: &str, canonical: &str) {
        self.entries
            .insert(normalize_symptom(phrase), normalize_symptom(canonical));
    }

    /// Check every mapping target against the vocabulary. A synonym that
    /// points outside the vocabulary would smuggle unknown identifiers
    /// into session evidence.
    pub fn validate(&self, kb: &KnowledgeBase) -> Result<(), KnowledgeError> {
        for (phrase, canonical) in &self.entries {
            if !kb.contains_symptom(canonical) {
                return Err(KnowledgeError::UnknownSynonymTarget {
                    phrase: phrase.clone(),
                    target: canonical.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════

/// Load-time validation failures. These are the only fatal errors in the
/// system: a catalog that fails here never becomes a `KnowledgeBase`.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    #[error("Condition catalog is empty")]
    EmptyCatalog,
    #[error("Condition name is blank")]
    BlankName,
    #[error("Duplicate condition name: {0}")]
    DuplicateName(String),
    #[error("Condition '{0}' has no symptoms")]
    NoSymptoms(String),
    #[error("Condition '{0}' has a blank symptom identifier")]
    BlankSymptom(String),
    #[error("Synonym '{phrase}' maps to unknown symptom '{target}'")]
    UnknownSynonymTarget { phrase: String, target: String },
    #[error("Catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> Vec<Condition> {
        vec![
            Condition::new("Flu", ["fever", "cough", "headache"], "Rest and fluids."),
            Condition::new("Measles", ["fever", "rash"], "See a doctor promptly."),
        ]
    }

    #[test]
    fn vocabulary_is_union_of_symptoms() {
        let kb = KnowledgeBase::from_conditions(sample_catalog()).unwrap();
        let expected: HashSet<String> = ["fever", "cough", "headache", "rash"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(*kb.vocabulary(), expected);
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let kb = KnowledgeBase::from_conditions(sample_catalog()).unwrap();
        assert!(kb.get("flu").is_some());
        assert!(kb.get("FLU").is_some());
        assert_eq!(kb.get("Flu").unwrap().name, "Flu");
        assert!(kb.get("plague").is_none());
    }

    #[test]
    fn conditions_iterate_in_name_order() {
        let kb = KnowledgeBase::from_conditions(sample_catalog()).unwrap();
        let names: Vec<&str> = kb.conditions().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Flu", "Measles"]);
    }

    #[test]
    fn symptoms_are_normalized() {
        let kb = KnowledgeBase::from_conditions(vec![Condition::new(
            "Gastritis",
            ["Stomach_Pain", "  loss-of-appetite "],
            "Avoid irritating foods.",
        )])
        .unwrap();
        assert!(kb.contains_symptom("stomach pain"));
        assert!(kb.contains_symptom("loss of appetite"));
        assert!(!kb.contains_symptom("Stomach_Pain"));
    }

    #[test]
    fn empty_catalog_rejected() {
        let result = KnowledgeBase::from_conditions(Vec::new());
        assert!(matches!(result, Err(KnowledgeError::EmptyCatalog)));
    }

    #[test]
    fn condition_without_symptoms_rejected() {
        let result = KnowledgeBase::from_conditions(vec![Condition::new(
            "Mystery",
            Vec::<String>::new(),
            "n/a",
        )]);
        assert!(matches!(result, Err(KnowledgeError::NoSymptoms(name)) if name == "Mystery"));
    }

    #[test]
    fn duplicate_names_rejected() {
        let mut catalog = sample_catalog();
        catalog.push(Condition::new("flu", ["fatigue"], "duplicate"));
        let result = KnowledgeBase::from_conditions(catalog);
        assert!(matches!(result, Err(KnowledgeError::DuplicateName(_))));
    }

    #[test]
    fn blank_symptom_rejected() {
        let result =
            KnowledgeBase::from_conditions(vec![Condition::new("Flu", ["fever", "  "], "rest")]);
        assert!(matches!(result, Err(KnowledgeError::BlankSymptom(name)) if name == "Flu"));
    }

    #[test]
    fn loads_from_json() {
        let json = br#"[
            {"name": "Flu", "symptoms": ["fever", "cough"], "advice": "Rest."},
            {"name": "Measles", "symptoms": ["fever", "rash"], "advice": "See a doctor."}
        ]"#;
        let kb = KnowledgeBase::from_json_slice(json).unwrap();
        assert_eq!(kb.len(), 2);
        assert!(kb.contains_symptom("rash"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let result = KnowledgeBase::from_json_slice(b"{not json");
        assert!(matches!(result, Err(KnowledgeError::Parse(_))));
    }

    #[test]
    fn synonym_table_normalizes_both_sides() {
        let mut synonyms = SynonymTable::new();
        synonyms.insert("Tummy_Pain", "Stomach-Pain");
        let (phrase, canonical) = synonyms.iter().next().unwrap();
        assert_eq!(phrase, "tummy pain");
        assert_eq!(canonical, "stomach pain");
    }

    #[test]
    fn synonym_with_unknown_target_rejected() {
        let kb = KnowledgeBase::from_conditions(sample_catalog()).unwrap();
        let mut synonyms = SynonymTable::new();
        synonyms.insert("temperature", "fever");
        assert!(synonyms.validate(&kb).is_ok());

        synonyms.insert("weird feeling", "vertigo");
        let result = synonyms.validate(&kb);
        assert!(matches!(
            result,
            Err(KnowledgeError::UnknownSynonymTarget { target, .. }) if target == "vertigo"
        ));
    }

    #[test]
    fn normalize_symptom_shapes() {
        assert_eq!(normalize_symptom("Stomach_Pain"), "stomach pain");
        assert_eq!(normalize_symptom("  FEVER  "), "fever");
        assert_eq!(normalize_symptom("loss-of-appetite"), "loss of appetite");
        assert_eq!(normalize_symptom("   "), "");
    }
}
