//! API middleware stack.
//!
//! Execution order (outermost → innermost):
//! 1. Session resolver: assigns the conversation key, echoes it back
//! 2. Audit logger: method, path, status and latency per request

pub mod audit;
pub mod session;
