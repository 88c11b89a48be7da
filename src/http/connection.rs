use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

use crate::access_log::LogRecord;
use crate::dynamic;
use crate::http::mime;
use crate::http::parser::parse_http_request;
use crate::http::request::Request;
use crate::http::response::{Body, ResponseEnvelope, StatusCode};
use crate::http::writer::write_response;
use crate::resources::ResolvedTarget;
use crate::server::ServerContext;

pub const IF_MODIFIED_SINCE: &str = "If-Modified-Since";

/// Upper bound on the request line plus headers, in bytes.
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// What the Reading stage got from the client.
enum Incoming {
    /// Nothing before end of stream or the first blank line.
    Empty,
    Head(String),
    /// The head did not end within `MAX_HEAD_BYTES`. Carries the first line
    /// read, possibly cut short.
    TooLarge(String),
}

/// Per-request state threaded through the pipeline.
#[derive(Debug)]
pub struct Exchange {
    pub request_line: String,
    pub date: SystemTime,
    pub status: StatusCode,
    pub send_body: bool,
    /// `None` once a conditional GET has dropped the file.
    pub target: Option<ResolvedTarget>,
}

impl Exchange {
    fn new(request_line: String, send_body: bool) -> Self {
        Self {
            request_line,
            date: SystemTime::now(),
            status: StatusCode::Ok,
            send_body,
            target: None,
        }
    }

    fn failed(mut self, status: StatusCode) -> Self {
        self.status = status;
        self.target = Some(ResolvedTarget::Error(status));
        self
    }
}

/// Pipeline stages, in order. Each stage produces the next; there are no
/// backward transitions, and a failed stage skips ahead to `Composing`.
pub enum ConnectionState {
    Reading,
    Parsing(String),
    Resolving(Exchange, Request),
    Checking(Exchange, Request),
    Composing(Exchange),
    Transmitting(String, ResponseEnvelope),
    Logging(LogRecord),
    Closed,
}

/// Handles exactly one request on one connection.
pub struct Connection<S = TcpStream> {
    stream: BufReader<S>,
    peer: SocketAddr,
    ctx: Arc<ServerContext>,
    state: ConnectionState,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: SocketAddr, ctx: Arc<ServerContext>) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer,
            ctx,
            state: ConnectionState::Reading,
        }
    }

    /// Drives the pipeline to completion.
    ///
    /// An I/O error aborts the remaining stages: nothing more is written and
    /// no log record is emitted. The error is returned to the caller.
    pub async fn run(&mut self) -> std::io::Result<()> {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed);

            self.state = match state {
                ConnectionState::Reading => match self.read_head().await? {
                    Incoming::Head(head) => ConnectionState::Parsing(head),
                    // Client sent nothing: no response, no record
                    Incoming::Empty => ConnectionState::Closed,
                    Incoming::TooLarge(request_line) => {
                        warn!(peer = %self.peer, limit = MAX_HEAD_BYTES, "request head too large");
                        let exchange = Exchange::new(request_line, true).failed(StatusCode::BadRequest);
                        ConnectionState::Composing(exchange)
                    }
                },

                ConnectionState::Parsing(head) => Self::parse(head),

                ConnectionState::Resolving(exchange, request) => self.resolve(exchange, request).await,

                ConnectionState::Checking(exchange, request) => {
                    ConnectionState::Composing(check_not_modified(exchange, &request))
                }

                ConnectionState::Composing(mut exchange) => {
                    let request_line = std::mem::take(&mut exchange.request_line);
                    ConnectionState::Transmitting(request_line, compose(exchange).await)
                }

                ConnectionState::Transmitting(request_line, mut envelope) => {
                    write_response(&mut self.stream, &mut envelope).await?;

                    ConnectionState::Logging(LogRecord {
                        request_line,
                        client: self.peer.ip(),
                        date: envelope.date,
                        status: envelope.status,
                        body_size: envelope.body_size(),
                    })
                }

                ConnectionState::Logging(record) => {
                    info!(
                        peer = %self.peer,
                        status = record.status.as_u16(),
                        request = %record.request_line,
                        size = record.body_size,
                        "request completed"
                    );
                    self.ctx.log.record_or_warn(&record).await;
                    ConnectionState::Closed
                }

                ConnectionState::Closed => break,
            };
        }

        Ok(())
    }

    /// Reads lines up to the first empty line or end of stream, reading at
    /// most `MAX_HEAD_BYTES`.
    async fn read_head(&mut self) -> std::io::Result<Incoming> {
        let mut head = String::new();
        let mut line = Vec::with_capacity(256);
        let mut total = 0usize;

        loop {
            let remaining = MAX_HEAD_BYTES - total;
            if remaining == 0 {
                return Ok(Incoming::TooLarge(first_line(&head, &line)));
            }

            line.clear();
            let n = (&mut self.stream)
                .take(remaining as u64)
                .read_until(b'\n', &mut line)
                .await?;
            if n == 0 {
                break;
            }
            total += n;

            if !line.ends_with(b"\n") && total == MAX_HEAD_BYTES {
                return Ok(Incoming::TooLarge(first_line(&head, &line)));
            }

            let text = String::from_utf8_lossy(&line);
            let text = text.trim_end_matches(['\r', '\n']);
            if text.is_empty() {
                break;
            }

            head.push_str(text);
            head.push('\n');
        }

        Ok(if head.is_empty() { Incoming::Empty } else { Incoming::Head(head) })
    }

    fn parse(head: String) -> ConnectionState {
        let request_line = head.lines().next().unwrap_or_default().to_string();

        match parse_http_request(&head) {
            Ok(request) => {
                debug!(method = request.method.as_str(), target = %request.target, "parsed request");
                let exchange = Exchange::new(request_line, request.wants_body());
                ConnectionState::Resolving(exchange, request)
            }
            Err(e) => {
                debug!(error = %e, request = %request_line, "rejected request line");
                let exchange = Exchange::new(request_line, e.wants_body()).failed(e.status());
                ConnectionState::Composing(exchange)
            }
        }
    }

    async fn resolve(&self, mut exchange: Exchange, request: Request) -> ConnectionState {
        let target = if request.is_dynamic() {
            self.dispatch(&request).await
        } else {
            self.ctx.resolver.resolve(request.path()).await
        };

        exchange.status = target.status();
        let is_file = matches!(target, ResolvedTarget::StaticFile { .. });
        exchange.target = Some(target);

        if is_file {
            ConnectionState::Checking(exchange, request)
        } else {
            ConnectionState::Composing(exchange)
        }
    }

    async fn dispatch(&self, request: &Request) -> ResolvedTarget {
        let Some(name) = dynamic::handler_name(&request.target) else {
            return ResolvedTarget::Error(StatusCode::NotFound);
        };

        let params = dynamic::parse_query(&request.target);
        match self.ctx.handlers.dispatch(name, params).await {
            Ok(body) => ResolvedTarget::GeneratedBody(body),
            Err(e) => {
                warn!(error = %e, target = %request.target, "dynamic request failed");
                ResolvedTarget::Error(e.status())
            }
        }
    }
}

/// First line of an oversized head, for the log record. `pending` is the
/// partial line being read when the limit was hit.
fn first_line(head: &str, pending: &[u8]) -> String {
    match head.lines().next() {
        Some(line) => line.to_string(),
        None => String::from_utf8_lossy(pending).trim_end_matches(['\r', '\n']).to_string(),
    }
}

/// Seconds since the epoch; HTTP dates carry no finer resolution.
fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0)
}

/// Applies `If-Modified-Since` to a resolved file. A file not modified
/// strictly after the given date becomes a 304 with no body. An
/// unparseable date is ignored.
pub fn check_not_modified(mut exchange: Exchange, request: &Request) -> Exchange {
    let Some(ResolvedTarget::StaticFile { modified, .. }) = &exchange.target else {
        return exchange;
    };
    let modified = *modified;
    if exchange.status != StatusCode::Ok {
        return exchange;
    }

    let Some(since) = request.header(IF_MODIFIED_SINCE) else {
        return exchange;
    };

    match httpdate::parse_http_date(since) {
        Ok(since) if epoch_secs(modified) <= epoch_secs(since) => {
            exchange.status = StatusCode::NotModified;
            exchange.target = None;
            exchange.send_body = false;
        }
        Ok(_) => {}
        Err(_) => debug!(value = %since, "ignoring unparseable If-Modified-Since"),
    }

    exchange
}

/// Builds the response envelope: opens the file to stream or picks the
/// HTML to send.
pub async fn compose(exchange: Exchange) -> ResponseEnvelope {
    let mut status = exchange.status;

    let body = if let Some(page) = status.error_page() {
        Some(Body::Html(page))
    } else {
        match exchange.target {
            Some(ResolvedTarget::StaticFile { path, modified, .. }) => match open_file(&path).await {
                Ok((file, len)) => Some(Body::File {
                    file,
                    len,
                    modified,
                    content_type: mime::content_type_for(&path),
                }),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "resolved file could not be opened");
                    status = StatusCode::NotFound;
                    status.error_page().map(Body::Html)
                }
            },
            Some(ResolvedTarget::GeneratedBody(html)) | Some(ResolvedTarget::DirectoryListing(html)) => {
                Some(Body::Html(html))
            }
            Some(ResolvedTarget::Error(_)) | None => None,
        }
    };

    ResponseEnvelope {
        status,
        date: exchange.date,
        body,
        send_body: exchange.send_body,
    }
}

async fn open_file(path: &std::path::Path) -> std::io::Result<(tokio::fs::File, u64)> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    Ok((file, len))
}
