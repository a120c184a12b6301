//! HTTP status lines and the status-text registry.
//!
//! A [`StatusLine`] is never an error: anything that does not look like
//! `HTTP/1.x NNN reason` parses to an invalid line, and an invalid line
//! formats to a fixed fallback that is still a well-formed status line.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Rendered in place of any status line that is not [`StatusLine::valid`].
pub const BAD_STATUS_LINE: &str = "HTTP/1.1 500 Bad Status Line\r\n";

/// Description used for codes the registry does not know.
pub const OTHER_STATUS: &str = "Other Status";

/// Protocol versions a status line may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Version {
    /// HTTP/1.0
    Http10,
    /// HTTP/1.1
    #[default]
    Http11,
}

impl Version {
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }

    /// Parses a protocol token; only the exact `HTTP/1.0` and `HTTP/1.1` are known.
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only mapping from status code to reason phrase.
///
/// The default is the standard table. Tests and embedders may build their
/// own with [`StatusTexts::from_iter`].
#[derive(Debug, Clone)]
pub struct StatusTexts {
    texts: HashMap<u16, String>,
}

static STANDARD: LazyLock<Arc<StatusTexts>> = LazyLock::new(|| Arc::new(StatusTexts::standard()));

impl StatusTexts {
    /// The standard registry, as specified by RFC 2616 and its successors.
    pub fn standard() -> Self {
        const TABLE: &[(u16, &str)] = &[
            (100, "Continue"),
            (101, "Switching Protocols"),
            (102, "Processing"),
            (200, "OK"),
            (201, "Created"),
            (202, "Accepted"),
            (203, "Non-Authoritative Information"),
            (204, "No Content"),
            (205, "Reset Content"),
            (206, "Partial Content"),
            (300, "Multiple Choices"),
            (301, "Moved Permanently"),
            (302, "Found"),
            (303, "See Other"),
            (304, "Not Modified"),
            (305, "Use Proxy"),
            (307, "Temporary Redirect"),
            (308, "Permanent Redirect"),
            (400, "Bad Request"),
            (401, "Unauthorized"),
            (402, "Payment Required"),
            (403, "Forbidden"),
            (404, "Not Found"),
            (405, "Method Not Allowed"),
            (406, "Not Acceptable"),
            (407, "Proxy Authentication Required"),
            (408, "Request Timeout"),
            (409, "Conflict"),
            (410, "Gone"),
            (411, "Length Required"),
            (412, "Precondition Failed"),
            (413, "Request Entity Too Large"),
            (414, "Request-URI Too Long"),
            (415, "Unsupported Media Type"),
            (416, "Requested Range Not Satisfiable"),
            (417, "Expectation Failed"),
            (426, "Upgrade Required"),
            (428, "Precondition Required"),
            (429, "Too Many Requests"),
            (431, "Request Header Fields Too Large"),
            (500, "Internal Server Error"),
            (501, "Not Implemented"),
            (502, "Bad Gateway"),
            (503, "Service Unavailable"),
            (504, "Gateway Timeout"),
            (505, "HTTP Version Not Supported"),
        ];

        TABLE.iter().map(|&(code, text)| (code, text)).collect()
    }

    /// Shared handle to the standard registry.
    pub fn shared() -> Arc<StatusTexts> {
        Arc::clone(&STANDARD)
    }

    /// Looks up the reason phrase for `code`, falling back to [`OTHER_STATUS`].
    pub fn describe(&self, code: u16) -> &str {
        self.texts
            .get(&code)
            .map(|v| v.as_str())
            .unwrap_or(OTHER_STATUS)
    }
}

impl Default for StatusTexts {
    fn default() -> Self {
        Self::standard()
    }
}

impl<S: Into<String>> FromIterator<(u16, S)> for StatusTexts {
    fn from_iter<I: IntoIterator<Item = (u16, S)>>(iter: I) -> Self {
        Self {
            texts: iter.into_iter().map(|(c, s)| (c, s.into())).collect(),
        }
    }
}

/// A status line broken out into its fields.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    /// Protocol version; `None` if the line never parsed.
    pub version: Option<Version>,
    /// The status code, `0` for lines that did not parse.
    pub code: u16,
    /// Reason phrase. Only useful to humans reading a transcript.
    pub description: String,
}

impl StatusLine {
    /// Parses a (suspected) status line.
    ///
    /// Accepts `HTTP/1.0` and `HTTP/1.1` followed by whitespace, exactly three
    /// digits, whitespace and the reason phrase. Anything else yields an
    /// instance with `code == 0`.
    pub fn parse(line: &str) -> Self {
        Self::scan(line).unwrap_or_default()
    }

    fn scan(line: &str) -> Option<Self> {
        let (proto, rest) = line.split_at_checked(8)?;
        let version = Version::from_token(proto)?;

        let rest = skip_whitespace(rest)?;
        let (digits, rest) = rest.split_at_checked(3)?;
        if !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let description = reason_phrase(skip_whitespace(rest)?)?;

        Some(Self {
            version: Some(version),
            code: digits.parse().unwrap_or(500),
            description: description.to_string(),
        })
    }

    /// Builds an `HTTP/1.1` status line for replying with `code`.
    pub fn from_code(code: u16, texts: &StatusTexts) -> Self {
        Self::with_version(code, Version::Http11, texts)
    }

    pub fn with_version(code: u16, version: Version, texts: &StatusTexts) -> Self {
        Self {
            version: Some(version),
            code,
            description: texts.describe(code).to_string(),
        }
    }

    /// Whether the code is within `100..600`.
    pub fn valid(&self) -> bool {
        (100..600).contains(&self.code)
    }
}

impl fmt::Display for StatusLine {
    /// Renders `<protocol> <code> <description>\r\n`, or [`BAD_STATUS_LINE`]
    /// when the line is not valid.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid() {
            return f.write_str(BAD_STATUS_LINE);
        }

        write!(
            f,
            "{} {} {}\r\n",
            self.version.unwrap_or_default(),
            self.code,
            self.description
        )
    }
}

/// Strips one or more leading whitespace characters; `None` if there are none.
fn skip_whitespace(s: &str) -> Option<&str> {
    let trimmed = s.trim_start();
    (trimmed.len() < s.len()).then_some(trimmed)
}

/// The reason runs up to the first line break; only whitespace may follow it.
fn reason_phrase(s: &str) -> Option<&str> {
    match s.find(['\r', '\n']) {
        Some(end) if s[end..].trim().is_empty() => Some(&s[..end]),
        Some(_) => None,
        None => Some(s),
    }
}
