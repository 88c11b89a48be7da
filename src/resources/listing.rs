use std::path::Path;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders the listing page for `dir`, whose request path is `request_path`.
///
/// Only direct children are listed, in the order the filesystem returns
/// them. Subdirectories get a trailing `/`. Links are absolute so they work
/// whether or not `request_path` ends with a separator.
pub async fn render(dir: &Path, request_path: &str) -> std::io::Result<String> {
    let base = if request_path.ends_with('/') {
        request_path.to_string()
    } else {
        format!("{request_path}/")
    };

    let mut page = format!(
        "<html><head><meta charset=\"UTF-8\"><title>Index of {0}</title></head>\n\
         <body><h1>Index of {0}</h1>\n<ul>\n",
        escape_html(&base)
    );

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let mut name = entry.file_name().to_string_lossy().into_owned();
        if entry.file_type().await?.is_dir() {
            name.push('/');
        }

        let name = escape_html(&name);
        page.push_str(&format!(
            "<li><a href=\"{}{name}\">{name}</a></li>\n",
            escape_html(&base)
        ));
    }

    page.push_str("</ul></body></html>");
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn plain_names_unchanged() {
        assert_eq!(escape_html("report.txt"), "report.txt");
    }
}
