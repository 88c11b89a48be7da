//! Dynamic pages.
//!
//! A request whose target contains `.do` names a handler by the path
//! segment before the marker: `/tools/search.do?nombre=a` runs the handler
//! registered as `search`. Handlers live in a [`HandlerRegistry`] built at
//! startup; there is no lookup outside that table.

pub mod search;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::http::request::DYNAMIC_MARKER;
use crate::http::response::StatusCode;

pub use search::FileSearch;

/// Query parameters handed to a handler.
pub type Params = HashMap<String, String>;

/// A dynamic page generator.
pub trait DynamicHandler: Send + Sync {
    /// Produces a complete HTML document for `params`.
    fn generate(&self, params: &Params) -> anyhow::Result<String>;
}

impl<F> DynamicHandler for F
where
    F: Fn(&Params) -> anyhow::Result<String> + Send + Sync,
{
    fn generate(&self, params: &Params) -> anyhow::Result<String> {
        self(params)
    }
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no dynamic handler named {0:?}")]
    UnknownHandler(String),
    #[error("handler {name:?} failed: {source:#}")]
    Failed {
        name: String,
        #[source]
        source: anyhow::Error,
    },
}

impl DispatchError {
    /// Both an unknown handler and a failing one are answered with 404.
    pub fn status(&self) -> StatusCode {
        StatusCode::NotFound
    }
}

/// Table of known handlers, keyed by name.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn DynamicHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry every server starts with: the file search handler over
    /// `root`.
    pub fn with_builtins(root: impl Into<std::path::PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.register(search::HANDLER_NAME, FileSearch::new(root));
        registry
    }

    /// Registers `handler` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, handler: impl DynamicHandler + 'static) {
        self.handlers.insert(name.into(), Arc::new(handler));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Runs the handler named `name`.
    ///
    /// Handlers may walk the filesystem, so they run on the blocking pool.
    pub async fn dispatch(&self, name: &str, params: Params) -> Result<String, DispatchError> {
        let handler = self
            .handlers
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnknownHandler(name.to_string()))?;

        let result = tokio::task::spawn_blocking(move || handler.generate(&params))
            .await
            .map_err(anyhow::Error::from)
            .and_then(|generated| generated);

        result.map_err(|source| DispatchError::Failed {
            name: name.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Extracts the handler name from a dynamic target: the text between the
/// last `/` and the first `.do`.
///
/// ```
/// # use webserver::dynamic::handler_name;
/// assert_eq!(handler_name("/tools/search.do?nombre=a"), Some("search"));
/// assert_eq!(handler_name("/index.html"), None);
/// ```
pub fn handler_name(target: &str) -> Option<&str> {
    let (before, _) = target.split_once(DYNAMIC_MARKER)?;
    Some(before.rsplit('/').next().unwrap_or(before))
}

/// Parses the query string after `?`.
///
/// Pairs are split on `&`, each pair on its first `=`. A key without `=`
/// maps to an empty value. Keys and values are percent-decoded.
pub fn parse_query(target: &str) -> Params {
    let Some((_, query)) = target.split_once('?') else {
        return Params::new();
    };

    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .filter(|(key, _)| !key.is_empty())
        .collect()
}
