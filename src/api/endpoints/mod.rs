//! API endpoint handlers.

pub mod chat;
pub mod health;
pub mod page;
