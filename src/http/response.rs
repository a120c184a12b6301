use crate::http::headers::Headers;

/// A reply the application wants sent.
///
/// Serialized by [`Session::reply`](crate::http::session::Session::reply),
/// which adds the status line, `Connection: close` for errors and
/// `Content-Length`.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: u16,
    /// Headers to emit, in order
    pub headers: Headers,
    pub body: String,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use parley::http::response::ResponseBuilder;
/// let response = ResponseBuilder::new(200)
///     .header("Content-Type", "application/json")
///     .body("{}")
///     .build();
/// assert_eq!(response.headers.get("content-type"), Some("application/json"));
/// ```
pub struct ResponseBuilder {
    status: u16,
    headers: Headers,
    body: String,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: String::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Sets the response body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        ResponseBuilder::new(200).body(body).build()
    }

    pub fn bad_request() -> Self {
        ResponseBuilder::new(400).body("400 Bad Request").build()
    }

    pub fn not_found() -> Self {
        ResponseBuilder::new(404).body("404 Not Found").build()
    }

    pub fn payload_too_large() -> Self {
        ResponseBuilder::new(413)
            .body("413 Request Entity Too Large")
            .build()
    }

    pub fn header_fields_too_large() -> Self {
        ResponseBuilder::new(431)
            .body("431 Request Header Fields Too Large")
            .build()
    }

    /// No representation both sides accept.
    pub fn not_acceptable() -> Self {
        ResponseBuilder::new(406).body("406 Not Acceptable").build()
    }
}
