//! Shared types for the chat API layer.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue};
use chrono::{DateTime, Utc};

use crate::pipeline::ConversationOrchestrator;

/// Header carrying the conversation key. Echoed on every API response.
pub const SESSION_HEADER: &str = "x-session-id";

/// Longest session id accepted from a client.
const MAX_SESSION_ID_LEN: usize = 128;

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all API routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub orchestrator: Arc<ConversationOrchestrator>,
    pub started_at: DateTime<Utc>,
}

impl ApiContext {
    pub fn new(orchestrator: Arc<ConversationOrchestrator>) -> Self {
        Self {
            orchestrator,
            started_at: Utc::now(),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Session id: injected by the session middleware
// ═══════════════════════════════════════════════════════════

/// Session key for the current request, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub String);

impl SessionId {
    /// Client-supplied id when usable, otherwise a fresh UUID v4.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| is_acceptable(id))
            .map(|id| Self(id.to_string()))
            .unwrap_or_else(Self::generate)
    }

    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn header_value(&self) -> Option<HeaderValue> {
        HeaderValue::from_str(&self.0).ok()
    }
}

fn is_acceptable(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
