//! Symptom extraction from free text.
//!
//! Matching is whole-word / whole-phrase only: 'ache' must never match
//! inside 'headache'. Each vocabulary entry compiles to a case-insensitive
//! pattern bounded by word boundaries, with separators inside multi-word
//! phrases matching spaces, underscores or hyphens. Synonyms are applied
//! before canonical matches and contribute to the same result set.
//!
//! Fuzzy recovery of misspellings is deliberately conservative: single-word
//! symptoms only, word length >= 5, edit distance <= 2, and the best match
//! must be unambiguous. Those thresholds keep 'coughing' from becoming
//! 'cough' and leave genuinely unknown words alone.

use std::collections::HashSet;

use regex::Regex;

use crate::config::EngineConfig;
use crate::engine::types::EngineError;
use crate::knowledge::{KnowledgeBase, SynonymTable};

/// Compiled matcher over the knowledge base's symptom vocabulary.
pub struct SymptomExtractor {
    /// Canonical symptom -> boundary-safe pattern, ordered by symptom name.
    canonical: Vec<(String, Regex)>,
    /// Synonym pattern -> canonical symptom it maps to.
    synonyms: Vec<(Regex, String)>,
    /// Single-word vocabulary entries, the only fuzzy-correction targets.
    single_word: Vec<String>,
    fuzzy_matching: bool,
    fuzzy_min_len: usize,
    fuzzy_max_distance: u32,
}

impl SymptomExtractor {
    pub fn new(
        kb: &KnowledgeBase,
        synonyms: &SynonymTable,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let mut vocabulary: Vec<&String> = kb.vocabulary().iter().collect();
        vocabulary.sort();

        let mut canonical = Vec::with_capacity(vocabulary.len());
        let mut single_word = Vec::new();
        for symptom in vocabulary {
            canonical.push((symptom.clone(), phrase_pattern(symptom)?));
            if !symptom.contains(' ') {
                single_word.push(symptom.clone());
            }
        }

        let mut synonym_patterns = Vec::with_capacity(synonyms.len());
        for (phrase, target) in synonyms.iter() {
            synonym_patterns.push((phrase_pattern(phrase)?, target.clone()));
        }

        Ok(Self {
            canonical,
            synonyms: synonym_patterns,
            single_word,
            fuzzy_matching: config.fuzzy_matching,
            fuzzy_min_len: config.fuzzy_min_len,
            fuzzy_max_distance: config.fuzzy_max_distance,
        })
    }

    /// Extract the set of vocabulary symptoms mentioned in `text`.
    /// Pure; an empty result just means nothing was recognized.
    pub fn extract(&self, text: &str) -> HashSet<String> {
        let mut found = HashSet::new();

        for (pattern, target) in &self.synonyms {
            if pattern.is_match(text) {
                found.insert(target.clone());
            }
        }

        for (symptom, pattern) in &self.canonical {
            if pattern.is_match(text) {
                found.insert(symptom.clone());
            }
        }

        if self.fuzzy_matching {
            self.fuzzy_pass(text, &mut found);
        }

        found
    }

    /// Best-effort misspelling recovery over individual words.
    fn fuzzy_pass(&self, text: &str, found: &mut HashSet<String>) {
        for word in text.split(|c: char| !c.is_alphanumeric()) {
            if word.len() < self.fuzzy_min_len {
                continue;
            }
            let lower = word.to_lowercase();
            if found.contains(&lower) {
                continue;
            }

            let mut best: Option<&str> = None;
            let mut best_distance = self.fuzzy_max_distance + 1;
            let mut ambiguous = false;

            for symptom in &self.single_word {
                // Length filter: words further apart than the distance
                // budget cannot match.
                let len_diff =
                    (lower.len() as i64 - symptom.len() as i64).unsigned_abs() as u32;
                if len_diff > self.fuzzy_max_distance {
                    continue;
                }

                let dist = edit_distance(&lower, symptom);
                if dist < best_distance {
                    best_distance = dist;
                    best = Some(symptom);
                    ambiguous = false;
                } else if dist == best_distance && best.is_some() {
                    ambiguous = true;
                }
            }

            if let Some(symptom) = best {
                if !ambiguous {
                    found.insert(symptom.to_string());
                }
            }
        }
    }
}

/// Compile a normalized phrase into a boundary-safe, case-insensitive
/// pattern. Inner separators match any run of whitespace, '_' or '-'.
fn phrase_pattern(phrase: &str) -> Result<Regex, EngineError> {
    let body = phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[\s_\-]+");
    Regex::new(&format!(r"(?i)\b{}\b", body)).map_err(|source| EngineError::Pattern {
        symptom: phrase.to_string(),
        source,
    })
}

/// Levenshtein edit distance, two-row formulation.
fn edit_distance(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (m, n) = (a_chars.len(), b_chars.len());

    if m == 0 {
        return n as u32;
    }
    if n == 0 {
        return m as u32;
    }

    let mut prev: Vec<u32> = (0..=n as u32).collect();
    let mut curr = vec![0u32; n + 1];

    for (i, &a_ch) in a_chars.iter().enumerate() {
        curr[0] = (i + 1) as u32;
        for (j, &b_ch) in b_chars.iter().enumerate() {
            let cost = if a_ch == b_ch { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}
