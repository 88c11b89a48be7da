use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::ResourceConfig;
use crate::http::response::StatusCode;
use crate::resources::{ResolvedTarget, listing};

/// Resolves request paths against the resource root.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: PathBuf,
    default_file: String,
    allow_listing: bool,
}

impl Resolver {
    /// Builds a resolver for `cfg`. The root is canonicalized once here so
    /// containment checks compare like with like.
    pub fn new(cfg: &ResourceConfig) -> anyhow::Result<Self> {
        let root = cfg
            .root
            .canonicalize()
            .with_context(|| format!("resolving resource root {}", cfg.root.display()))?;

        Ok(Self {
            root,
            default_file: cfg.default_file.clone(),
            allow_listing: cfg.allow_listing,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `request_path` (no query string) to a file, a listing page
    /// or an error status.
    ///
    /// A path that would leave the root, lexically or through a symlink,
    /// resolves to `NOT_FOUND`.
    pub async fn resolve(&self, request_path: &str) -> ResolvedTarget {
        let Some(path) = join_under_root(&self.root, request_path) else {
            debug!(path = %request_path, "path escapes resource root");
            return ResolvedTarget::Error(StatusCode::NotFound);
        };

        let Some(metadata) = self.contained_metadata(&path).await else {
            return ResolvedTarget::Error(StatusCode::NotFound);
        };

        if metadata.is_file() {
            return static_file(path, &metadata);
        }

        if !metadata.is_dir() {
            return ResolvedTarget::Error(StatusCode::NotFound);
        }

        let default_path = path.join(&self.default_file);
        if let Some(default_meta) = self.contained_metadata(&default_path).await {
            if default_meta.is_file() {
                return static_file(default_path, &default_meta);
            }
        }

        if !self.allow_listing {
            return ResolvedTarget::Error(StatusCode::Forbidden);
        }

        match listing::render(&path, request_path).await {
            Ok(page) => ResolvedTarget::DirectoryListing(page),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to list directory");
                ResolvedTarget::Error(StatusCode::Forbidden)
            }
        }
    }

    /// Metadata for `path`, provided it exists and its real location is
    /// still inside the root.
    async fn contained_metadata(&self, path: &Path) -> Option<std::fs::Metadata> {
        let real = tokio::fs::canonicalize(path).await.ok()?;
        if !real.starts_with(&self.root) {
            debug!(path = %path.display(), "symlink target outside resource root");
            return None;
        }
        tokio::fs::metadata(&real).await.ok()
    }
}

fn static_file(path: PathBuf, metadata: &std::fs::Metadata) -> ResolvedTarget {
    ResolvedTarget::StaticFile {
        path,
        size: metadata.len(),
        modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
    }
}

/// Joins `request_path` onto `root`, collapsing redundant separators and
/// `.` segments. Returns `None` if a `..` segment would climb above the
/// root.
pub fn join_under_root(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut joined = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(request_path.trim_start_matches('/')).components() {
        match component {
            Component::Normal(segment) => {
                joined.push(segment);
                depth += 1;
            }
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                joined.pop();
                depth -= 1;
            }
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }

    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_collapses_leading_separator() {
        let root = Path::new("/srv/www");
        assert_eq!(join_under_root(root, "/a/b.txt"), Some(PathBuf::from("/srv/www/a/b.txt")));
        assert_eq!(join_under_root(root, "//a//b.txt"), Some(PathBuf::from("/srv/www/a/b.txt")));
        assert_eq!(join_under_root(root, "/"), Some(PathBuf::from("/srv/www")));
    }

    #[test]
    fn join_allows_parent_inside_root() {
        let root = Path::new("/srv/www");
        assert_eq!(join_under_root(root, "/a/../b.txt"), Some(PathBuf::from("/srv/www/b.txt")));
        assert_eq!(join_under_root(root, "/./a/./b.txt"), Some(PathBuf::from("/srv/www/a/b.txt")));
    }

    #[test]
    fn join_rejects_escape() {
        let root = Path::new("/srv/www");
        assert_eq!(join_under_root(root, "/../etc/passwd"), None);
        assert_eq!(join_under_root(root, "/a/../../etc/passwd"), None);
    }
}
