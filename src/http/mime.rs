//! Content-Type lookup by file extension.

use phf::phf_map;
use std::path::Path;
use unicase::UniCase;

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const HTML: &str = "text/html";

static CONTENT_TYPE_BY_EXTENSION: phf::Map<UniCase<&'static str>, &'static str> = phf_map!(
    UniCase::ascii("css") => "text/css",
    UniCase::ascii("htm") => HTML,
    UniCase::ascii("html") => HTML,
    UniCase::ascii("js") => "text/javascript",
    UniCase::ascii("md") => "text/markdown",
    UniCase::ascii("txt") => "text/plain",
    UniCase::ascii("csv") => "text/csv",
    UniCase::ascii("yaml") => "text/yaml",

    UniCase::ascii("json") => "application/json",
    UniCase::ascii("pdf") => "application/pdf",
    UniCase::ascii("zip") => "application/zip",
    UniCase::ascii("gz") => "application/gzip",
    UniCase::ascii("tar") => "application/x-tar",
    UniCase::ascii("xml") => "application/xml",

    UniCase::ascii("gif") => "image/gif",
    UniCase::ascii("ico") => "image/x-icon",
    UniCase::ascii("jpeg") => "image/jpeg",
    UniCase::ascii("jpg") => "image/jpeg",
    UniCase::ascii("png") => "image/png",
    UniCase::ascii("svg") => "image/svg+xml",
    UniCase::ascii("webp") => "image/webp",

    UniCase::ascii("mp3") => "audio/mpeg",
    UniCase::ascii("wav") => "audio/wav",
    UniCase::ascii("mp4") => "video/mp4",
    UniCase::ascii("webm") => "video/webm",
);

/// Returns the Content-Type for `path`, falling back to
/// `application/octet-stream` for unknown or missing extensions.
pub fn content_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| CONTENT_TYPE_BY_EXTENSION.get(&UniCase::ascii(ext)))
        .copied()
        .unwrap_or(OCTET_STREAM)
}
