use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::http::parser::ParseError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::session::{Progress, Session};
use crate::http::writer::ResponseWriter;
use crate::server::routes::{self, Offers, Outcome};

/// Drives one client connection through its [`Session`].
pub struct Connection<S> {
    stream: S,
    peer: String,
    session: Session,
    offers: Arc<Offers>,
    shutdown: Arc<Notify>,
    /// Set by `/quit`; the signal goes out once its reply has been written.
    shutdown_pending: bool,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>, offers: Arc<Offers>, shutdown: Arc<Notify>) -> Self {
        Self {
            stream,
            peer: peer.into(),
            session: Session::new(),
            offers,
            shutdown,
            shutdown_pending: false,
            state: ConnectionState::Reading,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_request().await? {
                    Some(req) => ConnectionState::Processing(req),
                    None => ConnectionState::Closed,
                },

                ConnectionState::Processing(req) => {
                    ConnectionState::Writing(self.respond(&req))
                }

                ConnectionState::Writing(mut writer) => {
                    let written = writer.write_to_stream(&mut self.stream).await;
                    if self.shutdown_pending {
                        self.shutdown.notify_one();
                    }
                    written?;

                    if self.session.is_closing() {
                        ConnectionState::Closed
                    } else {
                        ConnectionState::Reading // go back for next request
                    }
                }

                ConnectionState::Closed => break,
            };
        }

        debug!(peer = %self.peer, queries = self.session.queries(), "connection done");
        Ok(())
    }

    /// Reads until the session yields a complete request.
    ///
    /// Returns `None` when the client went away or sent something that could
    /// not be parsed; in the latter case a 400, 413 or 431 has already been
    /// written.
    pub async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        loop {
            match self.session.advance() {
                Ok(Progress::Request(req)) => return Ok(Some(req)),

                Ok(Progress::Head) => {
                    if self.session.expects_continue() {
                        let interim = self.session.generate_reply(100, &Default::default(), "");
                        ResponseWriter::new(interim)
                            .write_to_stream(&mut self.stream)
                            .await?;
                    }
                    continue;
                }

                Ok(Progress::Pending) if self.session.is_closing() => return Ok(None),
                Ok(Progress::Pending) => {}

                Err(e) => {
                    warn!(peer = %self.peer, "HTTP parse error: {e}");
                    let response = match e {
                        ParseError::HeadTooLarge => Response::header_fields_too_large(),
                        ParseError::BodyTooLarge => Response::payload_too_large(),
                        _ => Response::bad_request(),
                    };
                    let mut writer = self.send(&response);
                    writer.write_to_stream(&mut self.stream).await?;
                    return Ok(None);
                }
            }

            // Read more data
            let mut temp = [0u8; 1024];
            let n = self.stream.read(&mut temp).await?;

            if n == 0 {
                // Client closed connection
                self.session.close();
                return Ok(None);
            }

            self.session.deposit(&temp[..n]);
        }
    }

    fn respond(&mut self, req: &Request) -> ResponseWriter {
        let response = match routes::handle(req, &self.offers) {
            Outcome::Reply(response) => response,
            Outcome::Shutdown(response) => {
                info!(peer = %self.peer, "shutdown requested");
                self.shutdown_pending = true;
                self.session.close();
                response
            }
        };

        if !req.keep_alive() {
            self.session.close();
        }
        self.send(&response)
    }

    fn send(&mut self, response: &Response) -> ResponseWriter {
        let message = self.session.reply(response);
        info!(
            target: "access",
            "{}",
            self.session.log_message(&self.peer, response.status, response.body.len())
        );
        ResponseWriter::new(message)
    }
}
