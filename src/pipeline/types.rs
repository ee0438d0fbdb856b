use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context used when no knowledge query produced anything.
pub const FALLBACK_CONTEXT: &str =
    "I can help with diseases, parasites, users, vulnerabilities, or symptoms. What do you want to know?";

/// Context line recorded when a knowledge query fails.
pub const RETRIEVAL_ERROR_LINE: &str =
    "Error retrieving medical data. Try again with a different question.";

/// Reply substituted when the language model returns nothing.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I couldn't respond.";

// ═══════════════════════════════════════════════════════════
// Extraction
// ═══════════════════════════════════════════════════════════

/// Coarse classification of what the user wants to know.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Causes,
    Symptoms,
    Treatments,
    Users,
    Correlations,
    Vulnerability,
    #[default]
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Causes => "causes",
            Self::Symptoms => "symptoms",
            Self::Treatments => "treatments",
            Self::Users => "users",
            Self::Correlations => "correlations",
            Self::Vulnerability => "vulnerability",
            Self::General => "general",
        }
    }

    /// Lenient parse of a model-provided label. Unknown labels are `General`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "causes" | "cause" => Self::Causes,
            "symptoms" | "symptom" => Self::Symptoms,
            "treatments" | "treatment" => Self::Treatments,
            "users" | "user" => Self::Users,
            "correlations" | "correlation" => Self::Correlations,
            "vulnerability" | "vulnerabilities" => Self::Vulnerability,
            _ => Self::General,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities found in one user message.
///
/// Sets are ordered so that context assembly over them is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractedEntities {
    pub diseases: BTreeSet<String>,
    pub parasite_types: BTreeSet<String>,
    pub symptoms: BTreeSet<String>,
    pub person_names: BTreeSet<String>,
    pub vulnerabilities: BTreeSet<String>,
    pub intent: Intent,
}

impl ExtractedEntities {
    /// True when no entity category holds anything (intent is ignored).
    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
            && self.parasite_types.is_empty()
            && self.symptoms.is_empty()
            && self.person_names.is_empty()
            && self.vulnerabilities.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════
// Context
// ═══════════════════════════════════════════════════════════

/// Knowledge context handed to the language model, one line per
/// satisfied query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBlock {
    pub lines: Vec<String>,
}

impl ContextBlock {
    pub fn is_fallback(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn text(&self) -> String {
        if self.lines.is_empty() {
            FALLBACK_CONTEXT.to_string()
        } else {
            self.lines.join("\n")
        }
    }
}

impl fmt::Display for ContextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

// ═══════════════════════════════════════════════════════════
// Conversation
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// One message in a conversation. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Result of handling one user message.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub text: String,
    pub entities: ExtractedEntities,
    pub context: ContextBlock,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_block_is_fallback() {
        let block = ContextBlock::default();
        assert!(block.is_fallback());
        assert_eq!(block.text(), FALLBACK_CONTEXT);
    }

    #[test]
    fn context_lines_join_with_newlines() {
        let block = ContextBlock {
            lines: vec!["a".into(), "b".into()],
        };
        assert_eq!(block.to_string(), "a\nb");
    }

    #[test]
    fn intent_labels_parse_leniently() {
        assert_eq!(Intent::from_label("Causes"), Intent::Causes);
        assert_eq!(Intent::from_label(" treatment "), Intent::Treatments);
        assert_eq!(Intent::from_label("vulnerability"), Intent::Vulnerability);
        assert_eq!(Intent::from_label("weather"), Intent::General);
        assert_eq!(Intent::from_label(""), Intent::General);
    }

    #[test]
    fn entities_emptiness_ignores_intent() {
        let entities = ExtractedEntities {
            intent: Intent::Users,
            ..Default::default()
        };
        assert!(entities.is_empty());
    }

    #[test]
    fn roles_render_lowercase() {
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }
}
