//! Parley - HTTP/1.x protocol core
//!
//! Status lines, quality-value content negotiation and the per-connection
//! session state machine, plus a small demo server built on them.

pub mod config;
pub mod http;
pub mod server;
