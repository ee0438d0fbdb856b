//! HTTP surface of the chatbot.
//!
//! Serves the chat page and the JSON chat API. Routes under `/api/` pass
//! through a small middleware stack: Session → Audit → Handler.
//!
//! The router is composable: `chat_router()` returns a `Router` that can
//! be mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::{build_router, chat_router};
pub use server::{start_server_on, ChatServer, ServerError, ServerInfo};
pub use types::{ApiContext, SessionId, SESSION_HEADER};
