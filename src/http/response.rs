use std::time::SystemTime;

/// HTTP status codes the server can answer with.
///
/// The set is closed: every terminal state of the request pipeline maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 304 Not Modified
    NotModified,
    /// 400 Bad Request
    BadRequest,
    /// 403 Forbidden
    Forbidden,
    /// 404 Not Found
    NotFound,
    /// 501 Not Implemented
    NotImplemented,
    /// 505 HTTP Version Not Supported
    HttpVersionNotSupported,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use webserver::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::HttpVersionNotSupported.as_u16(), 505);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotModified => 304,
            StatusCode::BadRequest => 400,
            StatusCode::Forbidden => 403,
            StatusCode::NotFound => 404,
            StatusCode::NotImplemented => 501,
            StatusCode::HttpVersionNotSupported => 505,
        }
    }

    /// Name used on the status line and in error pages, e.g. `NOT_FOUND`.
    pub fn name(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotModified => "NOT_MODIFIED",
            StatusCode::BadRequest => "BAD_REQUEST",
            StatusCode::Forbidden => "FORBIDDEN",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::NotImplemented => "NOT_IMPLEMENTED",
            StatusCode::HttpVersionNotSupported => "HTTP_VERSION_NOT_SUPPORTED",
        }
    }

    /// Human readable explanation, shown in error pages and error log entries.
    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "",
            StatusCode::NotModified => "The requested page has not been modified.",
            StatusCode::BadRequest => "Your client has issued a malformed or illegal request.",
            StatusCode::Forbidden => "You don't have permission to view this resource.",
            StatusCode::NotFound => "The requested URL was not found on this server.",
            StatusCode::NotImplemented => "The method or operation is not implemented.",
            StatusCode::HttpVersionNotSupported => {
                "The server does not support the HTTP protocol version that was used in the request message."
            }
        }
    }

    pub fn is_error(&self) -> bool {
        self.as_u16() >= 400
    }

    /// Canned HTML body for error statuses, `None` otherwise.
    pub fn error_page(&self) -> Option<String> {
        if !self.is_error() {
            return None;
        }

        Some(format!(
            "<html><body><p><h1>Error {}</h1></p><p><h3>{}</h3></p><p><h5>{}</h5></p></body></html>",
            self.as_u16(),
            self.name(),
            self.reason()
        ))
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.name())
    }
}

/// Where the response body comes from.
#[derive(Debug)]
pub enum Body {
    /// A file streamed verbatim.
    File {
        file: tokio::fs::File,
        len: u64,
        modified: SystemTime,
        content_type: &'static str,
    },
    /// Generated HTML: a dynamic page, a directory listing or an error page.
    Html(String),
}

impl Body {
    /// Value of the Content-Length header for this body.
    pub fn len(&self) -> u64 {
        match self {
            Body::File { len, .. } => *len,
            Body::Html(html) => html.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything needed to write a response, decided before the first byte is
/// written.
#[derive(Debug)]
pub struct ResponseEnvelope {
    pub status: StatusCode,
    pub date: SystemTime,
    pub body: Option<Body>,
    /// False for HEAD requests and 304 responses. Headers still describe
    /// `body` when this is false.
    pub send_body: bool,
}

impl ResponseEnvelope {
    /// Bytes of body actually transmitted, as reported to the access log.
    pub fn body_size(&self) -> u64 {
        match (&self.body, self.send_body) {
            (Some(body), true) => body.len(),
            _ => 0,
        }
    }
}
