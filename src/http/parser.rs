use crate::http::request::{Method, Request, RequestBuilder};
use crate::http::response::StatusCode;
use thiserror::Error;

/// Versions accepted on the request line.
pub const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request line must have exactly three space separated tokens")]
    InvalidRequestLine,
    #[error("method {0} is not implemented")]
    NotImplemented(String),
    #[error("unknown method {0}")]
    InvalidMethod(String),
    #[error("unsupported protocol version {version}")]
    UnsupportedVersion { method: Method, version: String },
}

impl ParseError {
    /// The terminal status reported to the client for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::InvalidRequestLine | ParseError::InvalidMethod(_) => StatusCode::BadRequest,
            ParseError::NotImplemented(_) => StatusCode::NotImplemented,
            ParseError::UnsupportedVersion { .. } => StatusCode::HttpVersionNotSupported,
        }
    }

    /// Whether the error page is sent. The method is known by the time the
    /// version is checked, so a HEAD request still gets headers only.
    pub fn wants_body(&self) -> bool {
        !matches!(self, ParseError::UnsupportedVersion { method: Method::HEAD, .. })
    }
}

/// Parses a request head: the request line followed by header lines.
///
/// `head` holds everything read before the blank line. The method is
/// validated before the version, so `PUT / HTTP/2.0` is a 501 and
/// `BREW / HTTP/2.0` is a 400.
pub fn parse_http_request(head: &str) -> Result<Request, ParseError> {
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();

    let tokens: Vec<&str> = request_line.split(' ').collect();
    let [method_str, target, version] = tokens[..] else {
        return Err(ParseError::InvalidRequestLine);
    };

    let method = match Method::from_str(method_str) {
        Some(m) if m.is_unsupported() => {
            return Err(ParseError::NotImplemented(method_str.to_string()));
        }
        Some(m) => m,
        None => return Err(ParseError::InvalidMethod(method_str.to_string())),
    };

    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(ParseError::UnsupportedVersion {
            method,
            version: version.to_string(),
        });
    }

    lines
        .filter_map(parse_header_line)
        .fold(
            RequestBuilder::new().method(method).target(target).version(version),
            |builder, (key, value)| builder.header(key, value),
        )
        .build()
        .map_err(|_| ParseError::InvalidRequestLine)
}

/// Splits `Key: Value`. Lines without a colon are ignored.
fn parse_header_line(line: &str) -> Option<(String, String)> {
    if line.is_empty() {
        return None;
    }

    let (key, value) = line.split_once(':')?;
    Some((key.to_string(), value.trim().to_string()))
}
