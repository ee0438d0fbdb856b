use std::sync::Arc;

use super::context::ContextAssembler;
use super::conversation::{lock, SessionStore};
use super::extraction::EntityExtractor;
use super::prompt::build_reply_prompt;
use super::types::{ChatReply, ChatTurn, Role, EMPTY_REPLY_FALLBACK};
use super::PipelineError;
use crate::knowledge::KnowledgeEngine;
use crate::llm::LlmGenerate;

/// Full chat pipeline.
///
/// Coordinates: record user turn → extract → assemble context → prompt →
/// generate → record assistant turn.
pub struct ConversationOrchestrator {
    extractor: Arc<dyn EntityExtractor>,
    engine: Arc<dyn KnowledgeEngine>,
    llm: Arc<dyn LlmGenerate>,
    sessions: SessionStore,
}

impl ConversationOrchestrator {
    pub fn new(
        extractor: Arc<dyn EntityExtractor>,
        engine: Arc<dyn KnowledgeEngine>,
        llm: Arc<dyn LlmGenerate>,
    ) -> Self {
        Self {
            extractor,
            engine,
            llm,
            sessions: SessionStore::new(),
        }
    }

    /// Handle one user message and return the reply text.
    pub fn handle(&self, session_id: &str, message: &str) -> Result<String, PipelineError> {
        self.respond(session_id, message).map(|reply| reply.text)
    }

    /// Handle one user message, returning the reply with the entities and
    /// context it was grounded on.
    ///
    /// The user turn is recorded before anything can fail. The assistant
    /// turn is recorded only when the language model answered, so a failed
    /// call leaves the user turn without a reply.
    pub fn respond(&self, session_id: &str, message: &str) -> Result<ChatReply, PipelineError> {
        let history = self.sessions.session(session_id)?;
        lock(&history)?.push(Role::User, message);

        // Step 1: Extract entities
        let entities = self.extractor.extract(message);

        // Step 2: Knowledge context
        let context = ContextAssembler::new(self.engine.as_ref()).assemble(&entities, message);

        // Step 3: Prompt over the full conversation
        let transcript: Vec<ChatTurn> = lock(&history)?.turns().to_vec();
        let prompt = build_reply_prompt(&context.text(), &transcript);

        // Step 4: Generate
        let generated = self.llm.generate(&prompt)?;
        let text = if generated.trim().is_empty() {
            tracing::warn!(session = %session_id, "Empty LLM response, substituting fallback");
            EMPTY_REPLY_FALLBACK.to_string()
        } else {
            generated
        };

        lock(&history)?.push(Role::Assistant, &text);

        tracing::info!(
            session = %session_id,
            extractor = self.extractor.name(),
            intent = %entities.intent,
            context_lines = context.lines.len(),
            history_turns = transcript.len() + 1,
            "Chat message handled"
        );

        Ok(ChatReply {
            text,
            entities,
            context,
        })
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }
}
