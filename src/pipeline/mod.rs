pub mod canonical;
pub mod context;
pub mod conversation;
pub mod extraction;
pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use context::ContextAssembler;
pub use conversation::{ChatHistory, SessionStore};
pub use extraction::{EntityExtractor, ExtractorKind, KeywordExtractor, LlmEntityExtractor, MatchPolicy};
pub use orchestrator::ConversationOrchestrator;
pub use types::*;

use thiserror::Error;

use crate::llm::LlmError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Session store lock poisoned")]
    LockPoisoned,
}
