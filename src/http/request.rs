/// HTTP request methods the server recognises.
///
/// Only GET and HEAD are served. POST and PUT are recognised so they can be
/// answered with 501 instead of 400.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// POST - recognised, not implemented
    POST,
    /// PUT - recognised, not implemented
    PUT,
}

/// Suffix that marks a request target as a dynamic request.
pub const DYNAMIC_MARKER: &str = ".do";

/// Represents a fully parsed request from a client.
///
/// Headers are kept in arrival order with keys exactly as received; lookups
/// are case-sensitive.
#[derive(Debug, Clone)]
pub struct Request {
    /// The first line, verbatim, for the access log
    pub request_line: String,
    /// The HTTP method
    pub method: Method,
    /// The raw request target, query string included
    pub target: String,
    /// Protocol version token, `HTTP/1.0` or `HTTP/1.1`
    pub version: String,
    /// Header lines in arrival order
    pub headers: Vec<(String, String)>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Option<Method>,
    target: Option<String>,
    version: Option<String>,
    headers: Vec<(String, String)>,
}

impl Method {
    /// Parses an HTTP method from a string.
    ///
    /// Matching is case-sensitive.
    ///
    /// ```
    /// # use webserver::http::request::Method;
    /// assert_eq!(Method::from_str("HEAD"), Some(Method::HEAD));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("DELETE"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            "HEAD" => Some(Method::HEAD),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
        }
    }

    /// Whether the server answers this method with 501.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Method::POST | Method::PUT)
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: None,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        let target = self.target.ok_or("target missing")?;
        let version = self.version.unwrap_or_else(|| "HTTP/1.0".to_string());

        Ok(Request {
            request_line: format!("{} {} {}", method.as_str(), target, version),
            method,
            target,
            version,
            headers: self.headers,
        })
    }
}

impl Request {
    /// Returns the value of the first header whose key equals `key` exactly.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Whether a response body is sent for this request at all.
    pub fn wants_body(&self) -> bool {
        self.method != Method::HEAD
    }

    pub fn is_dynamic(&self) -> bool {
        self.target.contains(DYNAMIC_MARKER)
    }

    /// Target with any query string removed.
    pub fn path(&self) -> &str {
        self.target
            .split_once('?')
            .map_or(self.target.as_str(), |(path, _)| path)
    }

    /// The raw query string, if the target has one.
    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }
}
