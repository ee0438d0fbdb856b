//! Chat API router.
//!
//! Returns a composable `Router`: the chat page at `/` and the JSON API
//! under `/api/`.
//!
//! Layer stack (outermost → innermost):
//! 1. HTTP trace → 2. Panic catcher → 3. Session resolver → 4. Audit logger

use std::any::Any;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::error::ApiError;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::pipeline::ConversationOrchestrator;

/// Build the chat router around a ready pipeline.
pub fn chat_router(orchestrator: Arc<ConversationOrchestrator>) -> Router {
    build_router(ApiContext::new(orchestrator))
}

/// Build the router from a pre-constructed `ApiContext`.
pub fn build_router(ctx: ApiContext) -> Router {
    // Both spellings of the chat path; every other method gets the 405 body.
    let chat = post(endpoints::chat::send).fallback(endpoints::chat::method_not_allowed);

    // Layers are applied from bottom (innermost) to top (outermost).
    let api = Router::new()
        .route("/chat", chat.clone())
        .route("/chat/", chat)
        .route("/chat/history", get(endpoints::chat::history))
        .route("/health", get(endpoints::health::check))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::session::resolve));

    Router::new()
        .route("/", get(endpoints::page::index))
        .nest("/api", api)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Turn a handler panic into the generic 500 body.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic payload".to_string());
    ApiError::Internal(format!("Handler panicked: {detail}")).into_response()
}
