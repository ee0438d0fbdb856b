//! Entity extraction: utterance → `ExtractedEntities`.
//!
//! Two strategies share the `EntityExtractor` capability:
//! - `KeywordExtractor` scans fixed vocabularies, deterministic and offline.
//! - `LlmEntityExtractor` asks the language model for strict JSON.
//!
//! Extraction never fails from the caller's point of view. The delegated
//! strategy degrades to empty entities with a `general` intent.

pub mod delegated;
pub mod keyword;

pub use delegated::{parse_extraction, strip_code_fence, LlmEntityExtractor};
pub use keyword::{KeywordExtractor, MatchPolicy, Vocabulary};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::types::ExtractedEntities;

pub trait EntityExtractor: Send + Sync {
    fn extract(&self, utterance: &str) -> ExtractedEntities;

    /// Strategy name for logs and the health endpoint.
    fn name(&self) -> &'static str;
}

/// Which extraction strategy the service runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractorKind {
    #[default]
    Keyword,
    Llm,
}

impl fmt::Display for ExtractorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Llm => write!(f, "llm"),
        }
    }
}

impl FromStr for ExtractorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keyword" | "keywords" => Ok(Self::Keyword),
            "llm" | "delegated" => Ok(Self::Llm),
            other => Err(format!("unknown extractor: {other}")),
        }
    }
}
