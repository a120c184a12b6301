use std::sync::Arc;

use parley::http::headers::Headers;
use parley::http::parser::{MAX_BODY_LEN, MAX_HEAD_LEN, ParseError};
use parley::http::response::{Response, ResponseBuilder};
use parley::http::session::{Phase, Progress, Session};
use parley::http::status::StatusTexts;

#[test]
fn test_session_counters_in_every_phase() {
    for phase in [Phase::AwaitingRequest, Phase::ReceivingBody, Phase::Closing] {
        let mut session = Session::new();
        session.phase = phase;
        session.requests = 1;
        session.replies = 2;
        session.content_length = 500;
        session.content = b"foo".to_vec();

        assert_eq!(session.queries(), 3);
        assert_eq!(session.remaining_bytes(), 497);
        assert!(session.buffer().is_empty());
    }
}

#[test]
fn test_session_remaining_bytes_saturates() {
    let mut session = Session::new();
    session.content_length = 2;
    session.content = b"foo".to_vec();

    assert_eq!(session.remaining_bytes(), 0);
}

fn logged(request: &str, headers: Headers) -> String {
    let mut session = Session::new();
    session.request_line = request.to_string();
    session.headers = headers;
    session.log_message("[UNIX]", 200, 42)
}

#[test]
fn test_log_message_defaults() {
    let mut session = Session::new();
    session.request_line = "GET / HTTP/1.1".to_string();

    assert_eq!(
        session.log_message("foo", 200, 42),
        "foo - - [-] \"GET / HTTP/1.1\" 200 42 \"-\" \"-\""
    );
}

#[test]
fn test_log_message_user_agent() {
    assert_eq!(
        logged("GET / HTTP/1.1", Headers::from([("User-Agent", "frob/123")])),
        "[UNIX] - - [-] \"GET / HTTP/1.1\" 200 42 \"-\" \"frob/123\""
    );
}

#[test]
fn test_log_message_user_agent_with_quote_is_redacted() {
    assert_eq!(
        logged("GET / HTTP/1.1", Headers::from([("User-Agent", "frob/123\"foo\"")])),
        "[UNIX] - - [-] \"GET / HTTP/1.1\" 200 42 \"-\" \"(redacted)\""
    );
}

#[test]
fn test_log_message_referer() {
    assert_eq!(
        logged("GET / HTTP/1.1", Headers::from([("Referer", "http://foo/")])),
        "[UNIX] - - [-] \"GET / HTTP/1.1\" 200 42 \"http://foo/\" \"-\""
    );
}

#[test]
fn test_log_message_referer_with_bad_escape_is_invalid() {
    assert_eq!(
        logged("GET / HTTP/1.1", Headers::from([("Referer", "http://foo/%2")])),
        "[UNIX] - - [-] \"GET / HTTP/1.1\" 200 42 \"(invalid)\" \"-\""
    );
}

#[test]
fn test_log_message_referer_and_user_agent() {
    assert_eq!(
        logged(
            "GET / HTTP/1.1",
            Headers::from([("Referer", "http://foo/"), ("User-Agent", "frob/123")])
        ),
        "[UNIX] - - [-] \"GET / HTTP/1.1\" 200 42 \"http://foo/\" \"frob/123\""
    );
}

#[test]
fn test_log_message_header_names_ignore_case() {
    assert_eq!(
        logged("GET / HTTP/1.1", Headers::from([("user-agent", "frob/123")])),
        "[UNIX] - - [-] \"GET / HTTP/1.1\" 200 42 \"-\" \"frob/123\""
    );
}

#[test]
fn test_generate_reply_informational() {
    let session = Session::new();

    assert_eq!(
        session.generate_reply(100, &Headers::new(), ""),
        "HTTP/1.1 100 Continue\r\n\r\n"
    );
    assert_eq!(
        session.generate_reply(100, &Headers::new(), "ignored"),
        "HTTP/1.1 100 Continue\r\n\r\n"
    );
}

#[test]
fn test_generate_reply_ok() {
    let session = Session::new();

    assert_eq!(
        session.generate_reply(200, &Headers::new(), "foo"),
        "HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nfoo"
    );
}

#[test]
fn test_generate_reply_error_closes() {
    let session = Session::new();

    assert_eq!(
        session.generate_reply(404, &Headers::new(), "sorry"),
        "HTTP/1.1 404 Not Found\r\nConnection: close\r\nContent-Length: 5\r\n\r\nsorry"
    );
}

#[test]
fn test_generate_reply_declared_headers_come_first() {
    let session = Session::new();
    let headers = Headers::from([("Content-Type", "text/plain"), ("X-Trace", "abc")]);

    assert_eq!(
        session.generate_reply(500, &headers, "oops"),
        "HTTP/1.1 500 Internal Server Error\r\n\
         Content-Type: text/plain\r\n\
         X-Trace: abc\r\n\
         Connection: close\r\n\
         Content-Length: 4\r\n\
         \r\n\
         oops"
    );
}

#[test]
fn test_generate_reply_does_not_repeat_declared_close() {
    let session = Session::new();
    let headers = Headers::from([("Connection", "close")]);

    assert_eq!(
        session.generate_reply(400, &headers, ""),
        "HTTP/1.1 400 Bad Request\r\nConnection: close\r\nContent-Length: 0\r\n\r\n"
    );
}

#[test]
fn test_generate_reply_uses_injected_texts() {
    let texts: StatusTexts = [(200, "Groovy")].into_iter().collect();
    let session = Session::with_status_texts(Arc::new(texts));

    assert_eq!(
        session.generate_reply(200, &Headers::new(), ""),
        "HTTP/1.1 200 Groovy\r\nContent-Length: 0\r\n\r\n"
    );
}

#[test]
fn test_generate_reply_bad_status() {
    let session = Session::new();

    assert_eq!(
        session.generate_reply(42, &Headers::new(), "x"),
        "HTTP/1.1 500 Bad Status Line\r\nContent-Length: 1\r\n\r\nx"
    );
}

#[test]
fn test_reply_counts_and_closes_on_error() {
    let mut session = Session::new();

    session.reply(&Response::ok("hi"));
    assert_eq!(session.replies, 1);
    assert_eq!(session.phase, Phase::AwaitingRequest);

    session.reply(&ResponseBuilder::new(100).build());
    assert_eq!(session.replies, 1);

    let message = session.reply(&Response::not_found());
    assert!(message.contains("Connection: close\r\n"));
    assert_eq!(session.replies, 2);
    assert!(session.is_closing());
}

#[test]
fn test_advance_request_without_body() {
    let mut session = Session::new();
    session.deposit(b"GET /x HTTP/1.1\r\nUser-Agent: t\r\n\r\n");

    let Ok(Progress::Request(req)) = session.advance() else {
        panic!("expected a complete request");
    };
    assert_eq!(req.path, "/x");
    assert!(req.body.is_empty());
    assert_eq!(session.requests, 1);
    assert_eq!(session.request_line, "GET /x HTTP/1.1");
    assert_eq!(session.headers.get("user-agent"), Some("t"));
    assert!(session.buffer().is_empty());
    assert!(matches!(session.advance(), Ok(Progress::Pending)));
}

#[test]
fn test_advance_incomplete_head() {
    let mut session = Session::new();
    session.deposit(b"GET / HTTP/1.1\r\nHost:");

    assert!(matches!(session.advance(), Ok(Progress::Pending)));
    assert_eq!(session.requests, 0);
    assert_eq!(session.buffer(), b"GET / HTTP/1.1\r\nHost:");
}

#[test]
fn test_advance_body_in_pieces() {
    let mut session = Session::new();
    session.deposit(b"POST /api HTTP/1.1\r\nContent-Length: 10\r\n\r\nhel");

    assert!(matches!(session.advance(), Ok(Progress::Head)));
    assert_eq!(session.phase, Phase::ReceivingBody);

    assert!(matches!(session.advance(), Ok(Progress::Pending)));
    assert_eq!(session.remaining_bytes(), 7);
    assert!(session.buffer().is_empty());

    session.deposit(b"lo wo");
    assert!(matches!(session.advance(), Ok(Progress::Pending)));
    assert_eq!(session.remaining_bytes(), 2);

    session.deposit(b"rl");
    let Ok(Progress::Request(req)) = session.advance() else {
        panic!("expected a complete request");
    };
    assert_eq!(req.body, b"hello worl");
    assert_eq!(session.phase, Phase::AwaitingRequest);
    assert_eq!(session.remaining_bytes(), 0);
}

#[test]
fn test_advance_pipelined_requests() {
    let mut session = Session::new();
    session.deposit(
        b"POST /a HTTP/1.1\r\nContent-Length: 2\r\n\r\nokGET /b HTTP/1.1\r\n\r\nGET /c HTTP/1.1\r\n",
    );

    assert!(matches!(session.advance(), Ok(Progress::Head)));
    assert!(matches!(session.advance(), Ok(Progress::Request(r)) if r.path == "/a" && r.body == b"ok"));
    assert!(matches!(session.advance(), Ok(Progress::Request(r)) if r.path == "/b"));
    assert!(matches!(session.advance(), Ok(Progress::Pending)));

    assert_eq!(session.requests, 2);
    assert_eq!(session.buffer(), b"GET /c HTTP/1.1\r\n");
}

#[test]
fn test_advance_bad_head_closes() {
    let mut session = Session::new();
    session.deposit(b"BREW /pot HTTP/1.1\r\n\r\n");

    assert!(matches!(session.advance(), Err(ParseError::InvalidMethod)));
    assert!(session.is_closing());
    assert!(matches!(session.advance(), Ok(Progress::Pending)));
}

#[test]
fn test_closing_consumes_nothing() {
    let mut session = Session::new();
    session.close();
    session.deposit(b"GET / HTTP/1.1\r\n\r\n");

    assert!(matches!(session.advance(), Ok(Progress::Pending)));
    assert_eq!(session.requests, 0);
    assert_eq!(session.buffer().len(), 18);
}

#[test]
fn test_expects_continue() {
    let mut session = Session::new();
    session.deposit(b"PUT /f HTTP/1.1\r\nExpect: 100-Continue\r\nContent-Length: 1\r\n\r\n");

    assert!(matches!(session.advance(), Ok(Progress::Head)));
    assert!(session.expects_continue());
}

#[test]
fn test_advance_head_split_across_deposits() {
    let mut session = Session::new();
    let request = b"GET /slow HTTP/1.1\r\nHost: x\r\n\r\n";

    let (last, rest) = request.split_last().unwrap();
    for byte in rest {
        session.deposit(std::slice::from_ref(byte));
        assert!(matches!(session.advance(), Ok(Progress::Pending)));
    }

    session.deposit(std::slice::from_ref(last));
    assert!(matches!(session.advance(), Ok(Progress::Request(r)) if r.path == "/slow"));
    assert!(session.buffer().is_empty());
}

#[test]
fn test_advance_unterminated_head_is_capped() {
    let mut session = Session::new();
    session.deposit(b"GET / HTTP/1.1\r\nX: ");

    let chunk = [b'a'; 1024];
    let mut result = session.advance();
    while matches!(result, Ok(Progress::Pending)) {
        assert!(session.buffer().len() <= MAX_HEAD_LEN);
        session.deposit(&chunk);
        result = session.advance();
    }

    assert!(matches!(result, Err(ParseError::HeadTooLarge)));
    assert!(session.is_closing());
    assert!(session.buffer().len() <= MAX_HEAD_LEN + chunk.len());
    assert_eq!(session.requests, 0);
}

#[test]
fn test_advance_oversized_body_is_rejected() {
    let mut session = Session::new();
    session.deposit(format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_LEN + 1).as_bytes());

    assert!(matches!(session.advance(), Err(ParseError::BodyTooLarge)));
    assert!(session.is_closing());
    assert_eq!(session.remaining_bytes(), 0);
}
