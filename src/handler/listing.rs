//! Directory listing module
//!
//! Renders a directory as a small HTML index. Names are HTML-escaped and links
//! are relative, percent-encoded hrefs, so they stay inside the listed directory.

use percent_encoding::utf8_percent_encode;
use std::io;
use std::path::Path;
use tokio::fs;

use crate::logger;
use crate::resolve::SEGMENT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read and sort the entries of `dir`.
/// Entries with non-UTF-8 names, or whose type cannot be read, are skipped.
pub async fn read_entries(dir: &Path) -> io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let Ok(name) = entry.file_name().into_string() else {
            logger::log_debug("Skipping non-UTF-8 name in directory listing");
            continue;
        };
        // Follows symlinks so a link to a directory is listed as one.
        let is_dir = match fs::metadata(entry.path()).await {
            Ok(meta) => meta.is_dir(),
            Err(_) => match entry.file_type().await {
                Ok(t) => t.is_dir(),
                Err(_) => continue,
            },
        };
        entries.push(ListingEntry { name, is_dir });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Render the listing page for `title` (the decoded directory URL)
pub fn render(title: &str, entries: &[ListingEntry]) -> String {
    let title = escape_html(title);
    let mut html = String::with_capacity(256 + entries.len() * 64);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Index of {title}</title>\n</head>\n<body>\n<h1>Index of {title}</h1>\n<pre>\n"
    ));
    for entry in entries {
        let suffix = if entry.is_dir { "/" } else { "" };
        html.push_str(&format!(
            "<a href=\"{}{suffix}\">{}{suffix}</a>\n",
            escape_html(&utf8_percent_encode(&entry.name, SEGMENT).to_string()),
            escape_html(&entry.name),
        ));
    }
    html.push_str("</pre>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir,
        }
    }

    #[test]
    fn test_render_links_and_dirs() {
        let html = render("/docs/", &[entry("a.txt", false), entry("img", true)]);
        assert!(html.contains("<title>Index of /docs/</title>"));
        assert!(html.contains("<a href=\"a.txt\">a.txt</a>"));
        assert!(html.contains("<a href=\"img/\">img/</a>"));
    }

    #[test]
    fn test_render_escapes_names() {
        let html = render("/<x>/", &[entry("<script>\"&'.txt", false)]);
        assert!(html.contains("Index of /&lt;x&gt;/"));
        assert!(html.contains("&lt;script&gt;&quot;&amp;&#39;.txt</a>"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("href=\"%3Cscript%3E%22&amp;%27.txt\""));
    }

    #[test]
    fn test_render_colon_is_not_a_scheme() {
        let html = render("/", &[entry("javascript:alert(1)", false)]);
        assert!(html.contains("href=\"javascript%3Aalert(1)\""));
    }

    #[tokio::test]
    async fn test_read_entries_sorted_with_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("c")).unwrap();
        std::fs::write(dir.path().join(".hidden"), b"h").unwrap();

        let entries = read_entries(dir.path()).await.unwrap();
        assert_eq!(
            entries,
            vec![
                entry(".hidden", false),
                entry("a.txt", false),
                entry("b.txt", false),
                entry("c", true),
            ]
        );
    }
}
