//! Language-model clients.
//!
//! `LlmClient` is the raw provider capability (prompt + model name).
//! The pipeline depends on `LlmGenerate`, which has the model already
//! bound; `BoundModel` bridges the two.

pub mod gemini;
pub mod mock;
pub mod ollama;

pub use gemini::GeminiClient;
pub use mock::MockLlmClient;
pub use ollama::OllamaClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("LLM service is not reachable at {0}")]
    Connection(String),

    #[error("LLM service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("LLM authentication failed (status {0})")]
    Authentication(u16),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Text completion against a named model.
pub trait LlmClient: Send + Sync {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Text completion with the model already chosen.
pub trait LlmGenerate: Send + Sync {
    fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

/// An `LlmClient` bound to one model name.
pub struct BoundModel<C: LlmClient> {
    client: C,
    model: String,
}

impl<C: LlmClient> BoundModel<C> {
    pub fn new(client: C, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }
}

impl<C: LlmClient> LlmGenerate for BoundModel<C> {
    fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "LLM generate");
        self.client.generate(&self.model, prompt)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Map a reqwest send error to `LlmError`.
pub(crate) fn send_error(e: reqwest::Error, base_url: &str, timeout_secs: u64) -> LlmError {
    if e.is_connect() {
        LlmError::Connection(base_url.to_string())
    } else if e.is_timeout() {
        LlmError::HttpClient(format!("Request timed out after {timeout_secs}s"))
    } else {
        LlmError::HttpClient(e.without_url().to_string())
    }
}
