//! Knowledge layer: typed access to the external symbolic knowledge engine.
//!
//! The engine is consumed as a black box. Everything crossing this boundary
//! is decoded into [`Atom`] immediately and rendered to plain text through
//! [`format`], so no engine-specific value escapes the gateway.

pub mod atom;
pub mod engine;
pub mod format;
pub mod gateway;
pub mod query;

pub use atom::Atom;
pub use engine::{HttpKnowledgeEngine, KnowledgeEngine, StaticKnowledgeEngine};
pub use format::{format_atom, format_result, Formatted};
pub use gateway::KnowledgeGateway;
pub use query::{KnowledgeQuery, NamedQuery, Symbol};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KnowledgeError {
    #[error("Knowledge engine is not reachable at {0}")]
    Connection(String),

    #[error("Knowledge engine returned error (status {status}): {body}")]
    Engine { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed knowledge engine response: {0}")]
    MalformedResponse(String),

    #[error("Invalid knowledge symbol: {0:?}")]
    InvalidSymbol(String),

    #[error("Query {query} expects an argument")]
    MissingArgument { query: &'static str },

    #[error("Fact table error: {0}")]
    FactTable(String),

    #[error("Knowledge retrieval failed: {0}")]
    Retrieval(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
