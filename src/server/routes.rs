//! The demo application: a negotiated "Hello World!" and a quit switch.

use crate::config::ContentConfig;
use crate::http::negotiate::{negotiate, parse_list};
use crate::http::qvalue::QValue;
use crate::http::request::Request;
use crate::http::response::{Response, ResponseBuilder};

/// What the server offers, parsed once from [`ContentConfig`].
#[derive(Debug, Clone)]
pub struct Offers {
    pub media: Vec<QValue>,
    pub languages: Vec<QValue>,
}

impl Offers {
    pub fn from_config(content: &ContentConfig) -> Self {
        Self {
            media: parse_offers(&content.produces),
            languages: parse_offers(&content.languages),
        }
    }
}

fn parse_offers(list: &[String]) -> Vec<QValue> {
    list.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(QValue::parse)
        .collect()
}

pub enum Outcome {
    Reply(Response),
    /// Reply, then stop accepting connections.
    Shutdown(Response),
}

pub fn handle(req: &Request, offers: &Offers) -> Outcome {
    match req.path.as_str() {
        "/" => Outcome::Reply(hello(req, offers)),
        "/quit" => Outcome::Shutdown(Response::ok("Goodbye!\n")),
        _ => Outcome::Reply(Response::not_found()),
    }
}

fn hello(req: &Request, offers: &Offers) -> Response {
    let accept = parse_list(req.header("Accept").unwrap_or_default());
    let media = negotiate(&accept, &offers.media);
    if media.is_empty() {
        return Response::not_acceptable();
    }

    let body = if media.starts_with("text/html") {
        "<!DOCTYPE html>\n<title>Hello World!</title>\n<p>Hello World!</p>\n"
    } else {
        "Hello World!\n"
    };

    let mut builder = ResponseBuilder::new(200).header("Content-Type", media.as_str());

    let languages = parse_list(req.header("Accept-Language").unwrap_or_default());
    let language = negotiate(&languages, &offers.languages);
    if !language.is_empty() {
        builder = builder.header("Content-Language", language);
    }

    builder.body(body).build()
}
