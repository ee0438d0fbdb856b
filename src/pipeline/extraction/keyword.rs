use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::EntityExtractor;
use crate::pipeline::canonical;
use crate::pipeline::types::{ExtractedEntities, Intent};

/// Vulnerability condition implied by "vulnerable" / "immune".
const LOW_IMMUNE_SYSTEM: &str = "lowImmuneSystem";

/// How many hits per vocabulary a scan keeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Stop at the first vocabulary word found, in vocabulary order.
    First,
    /// Keep every vocabulary word found.
    #[default]
    All,
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for MatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "all" => Ok(Self::All),
            other => Err(format!("unknown match policy: {other}")),
        }
    }
}

/// Lowercase words the keyword scanner recognizes, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub diseases: Vec<String>,
    pub parasite_types: Vec<String>,
    pub person_names: Vec<String>,
    pub symptoms: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        fn words(list: &[&str]) -> Vec<String> {
            list.iter().map(|w| w.to_string()).collect()
        }
        Self {
            diseases: words(&["typoiad", "cold", "malaria"]),
            parasite_types: words(&["bacteria", "virus", "protozoa"]),
            person_names: words(&["bisrat", "amina", "sara"]),
            symptoms: words(&[
                "fever",
                "cough",
                "chills",
                "diarrhea",
                "fatigue",
                "memoryloss",
                "pain",
            ]),
        }
    }
}

/// Deterministic extractor over fixed vocabularies and trigger words.
#[derive(Debug, Clone, Default)]
pub struct KeywordExtractor {
    vocabulary: Vocabulary,
    policy: MatchPolicy,
}

impl KeywordExtractor {
    pub fn new(policy: MatchPolicy) -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            policy,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.vocabulary = vocabulary;
        self
    }

    fn scan(&self, text: &str, words: &[String], rule: fn(&str) -> String) -> BTreeSet<String> {
        let mut hits = words.iter().filter(|w| text.contains(w.as_str()));
        match self.policy {
            MatchPolicy::First => hits.next().map(|w| rule(w)).into_iter().collect(),
            MatchPolicy::All => hits.map(|w| rule(w)).collect(),
        }
    }
}

impl EntityExtractor for KeywordExtractor {
    fn extract(&self, utterance: &str) -> ExtractedEntities {
        let lower = utterance.to_lowercase();
        let v = &self.vocabulary;

        let mut vulnerabilities = BTreeSet::new();
        if mentions_vulnerability(&lower) {
            vulnerabilities.insert(LOW_IMMUNE_SYSTEM.to_string());
        }

        let person_names = self.scan(&lower, &v.person_names, canonical::proper_noun);
        let intent = classify_intent(&lower, !person_names.is_empty());

        ExtractedEntities {
            diseases: self.scan(&lower, &v.diseases, canonical::proper_noun),
            parasite_types: self.scan(&lower, &v.parasite_types, canonical::proper_noun),
            symptoms: self.scan(&lower, &v.symptoms, canonical::symptom),
            person_names,
            vulnerabilities,
            intent,
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

/// Trigger-word intent rules. The first rule that fires wins.
fn classify_intent(text: &str, has_known_name: bool) -> Intent {
    if has_any(text, &["cause", "why"]) {
        return Intent::Causes;
    }
    if text.contains("parasite") {
        return Intent::Symptoms;
    }
    if has_any(text, &["who", "users"]) {
        return Intent::Users;
    }
    if has_known_name {
        return if has_any(text, &["correlation", "related"]) {
            Intent::Correlations
        } else {
            Intent::Causes
        };
    }
    if mentions_vulnerability(text) {
        return if has_any(text, &["treatment", "treat"]) {
            Intent::Treatments
        } else {
            Intent::Vulnerability
        };
    }
    Intent::General
}

fn mentions_vulnerability(text: &str) -> bool {
    has_any(text, &["vulnerable", "immune"])
}

fn has_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}
