//! Chat endpoints.
//!
//! - `POST /api/chat/`: run one message through the pipeline
//! - `GET /api/chat/history`: the caller's conversation so far

use axum::body::Bytes;
use axum::extract::State;
use axum::Extension;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, SessionId};
use crate::pipeline::ChatTurn;

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub session_id: String,
    pub turns: Vec<ChatTurn>,
}

/// `POST /api/chat/`: answer one message.
///
/// The body is decoded by hand so malformed JSON and a missing message
/// get their own error bodies instead of axum's rejection text.
pub async fn send(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionId>,
    body: Bytes,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = parse_message(&body)?;

    let orchestrator = ctx.orchestrator.clone();
    let session_id = session.0;
    // Knowledge and LLM clients block; keep them off the async workers.
    let response = tokio::task::spawn_blocking(move || orchestrator.handle(&session_id, &message))
        .await
        .map_err(|e| ApiError::Internal(format!("Chat task failed: {e}")))??;

    Ok(Json(ChatResponse { response }))
}

/// `GET /api/chat/history`: turns recorded for the caller's session.
pub async fn history(
    State(ctx): State<ApiContext>,
    Extension(session): Extension<SessionId>,
) -> Result<Json<ChatHistoryResponse>, ApiError> {
    let turns = ctx.orchestrator.sessions().snapshot(session.as_str())?;
    Ok(Json(ChatHistoryResponse {
        session_id: session.0,
        turns,
    }))
}

/// Non-POST on the chat path.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Extract a non-empty string `message` from a JSON body.
fn parse_message(body: &[u8]) -> Result<String, ApiError> {
    let payload: serde_json::Value =
        serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)?;

    payload
        .get("message")
        .and_then(serde_json::Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .ok_or(ApiError::NoMessage)
}
