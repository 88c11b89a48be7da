//! File search page.
//!
//! `search.do?nombre=<name>&extension=<.ext>` walks the resource root for
//! entries named exactly `name + ext`. When there are none it falls back to
//! entries whose name without its extension equals `name`.

use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::dynamic::{DynamicHandler, Params};
use crate::resources::listing::escape_html;

pub const HANDLER_NAME: &str = "search";

pub const NAME_PARAM: &str = "nombre";
pub const EXTENSION_PARAM: &str = "extension";

pub struct FileSearch {
    root: PathBuf,
}

impl FileSearch {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Every entry under the root whose file name satisfies `matches`, in
    /// traversal order.
    fn find(&self, matches: impl Fn(&str) -> bool) -> Vec<PathBuf> {
        WalkDir::new(&self.root)
            .min_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable entry during search");
                    None
                }
            })
            .filter(|entry| matches(entry.file_name().to_string_lossy().as_ref()))
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Root-relative link for `path`, always with `/` separators.
    fn link_for(&self, path: &Path) -> String {
        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        let segments: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        format!("/{}", segments.join("/"))
    }

    fn render_links(&self, paths: &[PathBuf]) -> String {
        let mut out = String::from("<ul>");
        for path in paths {
            let link = escape_html(&self.link_for(path));
            out.push_str(&format!("<li><a href=\"{link}\">{link}</a></li>"));
        }
        out.push_str("</ul>");
        out
    }
}

/// `report.txt` -> `report`. Names without a non-empty extension are
/// returned unchanged.
fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !ext.is_empty() => stem,
        _ => file_name,
    }
}

impl DynamicHandler for FileSearch {
    fn generate(&self, params: &Params) -> anyhow::Result<String> {
        let name = params.get(NAME_PARAM).map(String::as_str).unwrap_or_default();
        let extension = params.get(EXTENSION_PARAM).map(String::as_str).unwrap_or_default();

        let mut body = String::from("<html><head><title>Search results</title></head><body>");

        if name.is_empty() {
            body.push_str("<h1>File not found</h1>");
        } else {
            let wanted = format!("{name}{extension}");
            let exact = self.find(|file_name| file_name == wanted);

            if !exact.is_empty() {
                body.push_str("<h1>Files found:</h1>");
                body.push_str(&self.render_links(&exact));
            } else {
                let same_name = self.find(|file_name| strip_extension(file_name) == name);
                if same_name.is_empty() {
                    body.push_str("<h1>File not found</h1>");
                } else {
                    body.push_str("<h1>Files found with the same name:</h1>");
                    body.push_str(&self.render_links(&same_name));
                }
            }
        }

        body.push_str("</body></html>");
        Ok(body)
    }
}
