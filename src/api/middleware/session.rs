//! Session resolution middleware.
//!
//! Reads `X-Session-Id`, falls back to a fresh UUID v4, injects the
//! resulting `SessionId` into request extensions and writes it back on
//! the response so clients can keep the conversation going.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::{SessionId, SESSION_HEADER};

pub async fn resolve(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let session = SessionId::from_headers(req.headers());
    let header = session.header_value();
    req.extensions_mut().insert(session);

    let mut response = next.run(req).await;

    if let Some(value) = header {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}
