use crate::http::headers::Headers;

/// HTTP request methods.
///
/// Represents the HTTP method/verb of a request. Anything outside this set is
/// rejected by the head parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// DELETE - Delete a resource
    DELETE,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Method names are case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use parley::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_token("get"), None);
    /// ```
    pub fn from_token(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            "HEAD" => Some(Method::HEAD),
            "OPTIONS" => Some(Method::OPTIONS),
            "PATCH" => Some(Method::PATCH),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
        }
    }
}

/// Request line and headers, as recognized before any body bytes arrive.
#[derive(Debug, Clone)]
pub struct RequestHead {
    /// The request line exactly as received, without its CRLF.
    pub line: String,
    pub method: Method,
    /// The request target (e.g. "/index.html")
    pub path: String,
    /// Protocol token (typically "HTTP/1.1")
    pub version: String,
    pub headers: Headers,
}

/// A complete request: head plus the body declared by `Content-Length`.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub version: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// Reads a `Content-Length` value: one or more ASCII digits, nothing else.
pub(crate) fn parse_content_length(value: &str) -> Option<usize> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

fn declared_length(headers: &Headers) -> usize {
    headers
        .get("Content-Length")
        .and_then(parse_content_length)
        .unwrap_or(0)
}

impl RequestHead {
    /// Declared body length; 0 if the header is missing.
    ///
    /// The parser has already rejected values that are not numbers.
    pub fn content_length(&self) -> usize {
        declared_length(&self.headers)
    }

    pub(crate) fn with_body(self, body: Vec<u8>) -> Request {
        Request {
            method: self.method,
            path: self.path,
            version: self.version,
            headers: self.headers,
            body,
        }
    }
}

impl Request {
    /// Retrieves a header value by name, ignoring case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Declared body length; 0 if the header is missing.
    ///
    /// Requests read off a [`Session`](crate::http::session::Session) always
    /// carry a valid value. For hand-built requests anything other than plain
    /// digits also counts as 0.
    pub fn content_length(&self) -> usize {
        declared_length(&self.headers)
    }

    /// Determines whether the connection should remain open after the response.
    ///
    /// `Connection: close` always closes and `Connection: keep-alive` always
    /// keeps the connection. Without either, HTTP/1.1 keeps it open and
    /// HTTP/1.0 does not.
    pub fn keep_alive(&self) -> bool {
        let tokens = || {
            self.header("Connection")
                .into_iter()
                .flat_map(|v| v.split(','))
                .map(str::trim)
        };

        if tokens().any(|t| t.eq_ignore_ascii_case("close")) {
            return false;
        }
        if tokens().any(|t| t.eq_ignore_ascii_case("keep-alive")) {
            return true;
        }
        self.version == "HTTP/1.1"
    }
}
