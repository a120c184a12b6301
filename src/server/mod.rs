//! Demo server: a tokio accept loop in front of [`crate::http::connection`].

pub mod listener;
pub mod routes;
