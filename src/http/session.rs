//! Per-connection protocol state.
//!
//! A [`Session`] does no I/O. The transport deposits whatever bytes it read
//! and calls [`Session::advance`] until it reports [`Progress::Pending`];
//! complete requests come out along the way, and [`Session::remaining_bytes`]
//! says how much of the current body is still outstanding. Replies are
//! rendered to their exact wire form by [`Session::generate_reply`].
//!
//! ```text
//!   AwaitingRequest ── head, Content-Length > 0 ──▶ ReceivingBody
//!         ▲   │                                          │
//!         │   └── head, no body ─▶ request ◀── body complete
//!         └───────────────────────────┘
//!
//!   any phase ── close() / error reply / bad head ──▶ Closing
//! ```

use std::sync::Arc;

use bytes::{Buf, BytesMut};
use percent_encoding::percent_decode_str;
use tracing::{debug, trace};

use crate::http::headers::Headers;
use crate::http::parser::{MAX_HEAD_LEN, ParseError, find_head_end, parse_request_head};
use crate::http::request::{Request, RequestHead};
use crate::http::response::Response;
use crate::http::status::{StatusLine, StatusTexts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Waiting for (the rest of) a request line and headers.
    #[default]
    AwaitingRequest,
    /// A head declared a body; collecting it.
    ReceivingBody,
    /// The connection is to be shut down. Terminal.
    Closing,
}

/// Outcome of [`Session::advance`].
#[derive(Debug)]
pub enum Progress {
    /// Nothing more can be done with the bytes at hand.
    Pending,
    /// A head announcing a body was recognized; the body is being collected.
    Head,
    /// A request is complete.
    Request(Request),
}

#[derive(Debug)]
pub struct Session {
    pub phase: Phase,
    /// Requests whose head has been recognized.
    pub requests: usize,
    /// Final replies rendered through [`Session::reply`].
    pub replies: usize,
    /// Body length declared by the current request.
    pub content_length: usize,
    /// Body bytes of the current request received so far.
    pub content: Vec<u8>,
    /// Received bytes not yet classified as head or body.
    pub raw: BytesMut,
    /// Headers of the current request.
    pub headers: Headers,
    /// Request line of the current request, for the access log.
    pub request_line: String,
    head: Option<RequestHead>,
    /// How much of `raw` has been searched for the end of a head.
    scanned: usize,
    texts: Arc<StatusTexts>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session using the standard status texts.
    pub fn new() -> Self {
        Self::with_status_texts(StatusTexts::shared())
    }

    pub fn with_status_texts(texts: Arc<StatusTexts>) -> Self {
        Self {
            phase: Phase::AwaitingRequest,
            requests: 0,
            replies: 0,
            content_length: 0,
            content: Vec::new(),
            raw: BytesMut::with_capacity(4096),
            headers: Headers::new(),
            request_line: String::new(),
            head: None,
            scanned: 0,
            texts,
        }
    }

    /// Activity counter: requests started plus replies sent.
    pub fn queries(&self) -> usize {
        self.requests + self.replies
    }

    /// Body bytes still expected for the current request.
    pub fn remaining_bytes(&self) -> usize {
        self.content_length.saturating_sub(self.content.len())
    }

    /// Bytes received but not yet consumed as head or body.
    pub fn buffer(&self) -> &[u8] {
        &self.raw
    }

    pub fn is_closing(&self) -> bool {
        self.phase == Phase::Closing
    }

    /// Flags the connection for shutdown.
    pub fn close(&mut self) {
        if self.phase != Phase::Closing {
            debug!(queries = self.queries(), "session closing");
        }
        self.phase = Phase::Closing;
    }

    /// Whether the current request asked for `100 Continue` before its body.
    pub fn expects_continue(&self) -> bool {
        self.headers
            .get("Expect")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("100-continue"))
    }

    /// Appends bytes read from the transport.
    pub fn deposit(&mut self, data: &[u8]) {
        self.raw.extend_from_slice(data);
    }

    /// Moves as far as the buffered bytes allow.
    ///
    /// A malformed head puts the session into [`Phase::Closing`] and returns
    /// the parse error; the caller decides what to tell the client. So does
    /// buffering more than [`MAX_HEAD_LEN`] bytes without the end of a head.
    pub fn advance(&mut self) -> Result<Progress, ParseError> {
        match self.phase {
            Phase::AwaitingRequest => self.read_head(),
            Phase::ReceivingBody => Ok(self.read_body()),
            Phase::Closing => Ok(Progress::Pending),
        }
    }

    fn read_head(&mut self) -> Result<Progress, ParseError> {
        // The terminator may straddle the previous scan boundary.
        let Some(end) = find_head_end(&self.raw, self.scanned.saturating_sub(3)) else {
            self.scanned = self.raw.len();
            if self.raw.len() > MAX_HEAD_LEN {
                return Err(self.reject(ParseError::HeadTooLarge));
            }
            return Ok(Progress::Pending);
        };
        self.scanned = 0;

        let (head, consumed) = match parse_request_head(&self.raw[..end]) {
            Ok(parsed) => parsed,
            Err(e) => return Err(self.reject(e)),
        };
        self.raw.advance(consumed);

        self.requests += 1;
        self.request_line = head.line.clone();
        self.headers = head.headers.clone();
        self.content_length = head.content_length();
        self.content.clear();
        trace!(request = %self.request_line, length = self.content_length, "request head");

        self.head = Some(head);
        if self.content_length == 0 {
            return Ok(self.finish_request());
        }

        self.phase = Phase::ReceivingBody;
        Ok(Progress::Head)
    }

    fn reject(&mut self, error: ParseError) -> ParseError {
        debug!(%error, buffered = self.raw.len(), "rejecting request head");
        self.request_line.clear();
        self.headers = Headers::new();
        self.close();
        error
    }

    fn read_body(&mut self) -> Progress {
        let take = self.remaining_bytes().min(self.raw.len());
        let chunk = self.raw.split_to(take);
        self.content.extend_from_slice(&chunk);

        if self.remaining_bytes() > 0 {
            return Progress::Pending;
        }
        self.finish_request()
    }

    fn finish_request(&mut self) -> Progress {
        self.phase = Phase::AwaitingRequest;
        self.content_length = 0;
        let body = std::mem::take(&mut self.content);

        match self.head.take() {
            Some(head) => Progress::Request(head.with_body(body)),
            None => Progress::Pending,
        }
    }

    /// Formats an access log line for the current request.
    ///
    /// The layout follows the combined log format, without identity, user or
    /// time: `addr - - [-] "request" status length "referer" "user-agent"`.
    pub fn log_message(&self, address: &str, status: u16, length: usize) -> String {
        let referer = match self.headers.get("Referer") {
            None => "-",
            Some(r) if is_loggable_uri(r) => r,
            Some(_) => "(invalid)",
        };
        let user_agent = match self.headers.get("User-Agent") {
            None => "-",
            Some(ua) if ua.contains('"') => "(redacted)",
            Some(ua) => ua,
        };

        format!(
            "{address} - - [-] \"{}\" {status} {length} \"{referer}\" \"{user_agent}\"",
            self.request_line
        )
    }

    /// Renders a complete response message.
    ///
    /// Informational (1xx) replies end after the headers; their body is
    /// dropped. Replies with a status of 400 or above carry
    /// `Connection: close`. Everything except 1xx gets a `Content-Length`.
    ///
    /// Declared headers are written as given. If they already say
    /// `Connection: close` it is not repeated; any other `Connection` value is
    /// still followed by the added `Connection: close`.
    pub fn generate_reply(&self, status: u16, headers: &Headers, body: &str) -> String {
        let mut reply = StatusLine::from_code(status, &self.texts).to_string();

        for (name, value) in headers.iter() {
            reply.push_str(&format!("{name}: {value}\r\n"));
        }

        if is_informational(status) {
            reply.push_str("\r\n");
            return reply;
        }

        if status >= 400 && !declares_close(headers) {
            reply.push_str("Connection: close\r\n");
        }
        reply.push_str(&format!("Content-Length: {}\r\n\r\n", body.len()));
        reply.push_str(body);
        reply
    }

    /// Renders `response` and records it as sent.
    ///
    /// Interim (1xx) responses are not counted. An error status flags the
    /// session for closing, matching the `Connection: close` it advertises.
    pub fn reply(&mut self, response: &Response) -> String {
        let message = self.generate_reply(response.status, &response.headers, &response.body);

        if !is_informational(response.status) {
            self.replies += 1;
        }
        if response.status >= 400 {
            self.close();
        }
        message
    }
}

fn is_informational(status: u16) -> bool {
    (100..200).contains(&status)
}

fn declares_close(headers: &Headers) -> bool {
    headers.get("Connection").is_some_and(|v| {
        v.split(',')
            .any(|token| token.trim().eq_ignore_ascii_case("close"))
    })
}

/// A referer is logged verbatim only if every `%` starts a two-digit hex
/// escape, it decodes to UTF-8, and it cannot break out of the quoted field.
fn is_loggable_uri(uri: &str) -> bool {
    let bytes = uri.as_bytes();
    let escapes_ok = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });

    escapes_ok && !uri.contains('"') && percent_decode_str(uri).decode_utf8().is_ok()
}
