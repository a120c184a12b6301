//! HTTP/1.x protocol implementation.
//!
//! The protocol core does no I/O of its own; the transport feeds it bytes and
//! writes back what it renders.
//!
//! # Architecture
//!
//! - **`status`**: Status lines and the status-text registry
//! - **`qvalue`**: Quality-tagged values and their preference order
//! - **`negotiate`**: Content negotiation over two quality-value lists
//! - **`headers`**: Ordered, case-insensitive header map
//! - **`parser`**: Parses request heads from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: Replies as handed to the session, with a builder
//! - **`session`**: The per-connection protocol state machine
//! - **`writer`**: Writes rendered messages to a stream
//! - **`connection`**: Drives a session over a tokio stream
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Feed bytes to the session until a request is complete
//!        └──────┬──────┘
//!               │ Request received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route, negotiate, render the reply
//!        └──────┬───────────┘
//!               │ Reply rendered
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send reply to client
//!        └──────┬───────────┘
//!               │ Reply sent
//!               ├─ Session open → Reading (same connection)
//!               └─ Session closing → Closed
//! ```
//!
//! # Example
//!
//! ```
//! use parley::http::headers::Headers;
//! use parley::http::session::Session;
//!
//! let session = Session::new();
//! let reply = session.generate_reply(200, &Headers::new(), "foo");
//! assert_eq!(reply, "HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nfoo");
//! ```

pub mod connection;
pub mod headers;
pub mod negotiate;
pub mod parser;
pub mod qvalue;
pub mod request;
pub mod response;
pub mod session;
pub mod status;
pub mod writer;
