use std::fmt;

use crate::http::headers::Headers;
use crate::http::request::{Method, RequestHead, parse_content_length};

/// Longest request head accepted, blank line included.
pub const MAX_HEAD_LEN: usize = 8 * 1024;

/// Largest body a request may declare.
pub const MAX_BODY_LEN: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidRequest,
    InvalidMethod,
    InvalidHeader,
    InvalidContentLength,
    HeadTooLarge,
    BodyTooLarge,
    Incomplete,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ParseError::InvalidRequest => "malformed request line",
            ParseError::InvalidMethod => "unsupported method",
            ParseError::InvalidHeader => "malformed header line",
            ParseError::InvalidContentLength => "invalid Content-Length",
            ParseError::HeadTooLarge => "request head too large",
            ParseError::BodyTooLarge => "declared body too large",
            ParseError::Incomplete => "incomplete request head",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for ParseError {}

/// Parses a request line and its headers from the front of `buf`.
///
/// Returns the head and the number of bytes it occupied, including the
/// blank line. Body bytes are left for the caller. A head longer than
/// [`MAX_HEAD_LEN`] is rejected whether or not its end has arrived.
pub fn parse_request_head(buf: &[u8]) -> Result<(RequestHead, usize), ParseError> {
    let consumed = match find_head_end(buf, 0) {
        Some(end) if end > MAX_HEAD_LEN => return Err(ParseError::HeadTooLarge),
        Some(end) => end,
        None if buf.len() > MAX_HEAD_LEN => return Err(ParseError::HeadTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    let header_bytes = &buf[..consumed - 4];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;
    if parts.next().is_some() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_token(method_str).ok_or(ParseError::InvalidMethod)?;

    // Headers
    let mut headers = Headers::new();

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        let (key, value) = (key.trim(), value.trim());
        if key.eq_ignore_ascii_case("Content-Length")
            && headers.get(key).is_some_and(|prev| prev != value)
        {
            return Err(ParseError::InvalidContentLength);
        }
        headers.insert(key, value);
    }

    if let Some(v) = headers.get("Content-Length") {
        let length = parse_content_length(v).ok_or(ParseError::InvalidContentLength)?;
        if length > MAX_BODY_LEN {
            return Err(ParseError::BodyTooLarge);
        }
    }

    let head = RequestHead {
        line: request_line.to_string(),
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
    };

    Ok((head, consumed))
}

/// Offset just past the first `\r\n\r\n` at or after `from`.
pub fn find_head_end(buf: &[u8], from: usize) -> Option<usize> {
    buf.get(from..)?
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|pos| from + pos + 4)
}
