//! Resource resolution.
//!
//! Maps a request path onto the resource root: a file to stream, a
//! directory listing to render, or an error status.

pub mod listing;
pub mod resolver;

use crate::http::response::StatusCode;
use std::path::PathBuf;
use std::time::SystemTime;

pub use resolver::Resolver;

/// Outcome of resolving a request target. Exactly one variant per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedTarget {
    StaticFile {
        path: PathBuf,
        size: u64,
        modified: SystemTime,
    },
    /// HTML produced by a dynamic handler.
    GeneratedBody(String),
    DirectoryListing(String),
    Error(StatusCode),
}

impl ResolvedTarget {
    pub fn status(&self) -> StatusCode {
        match self {
            ResolvedTarget::Error(status) => *status,
            _ => StatusCode::Ok,
        }
    }
}
