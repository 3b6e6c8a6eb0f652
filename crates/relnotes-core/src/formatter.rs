//! HTML release document formatting.
//!
//! Entries are rendered one per work item, kept in append order, and wrapped
//! in a static page shell by [`Formatter::render_document`].
//!
//! The default renderer injects titles and notes without escaping. Use
//! [`render_entry_escaped`] when the content is not trusted.

use relnotes_models::{ReleaseHeading, WorkItem};
use tracing::warn;

/// Turns one work item into one list entry.
pub type EntryRenderer = fn(&WorkItem) -> String;

const DOCUMENT_HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="UTF-8">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <link rel="preconnect" href="https://fonts.gstatic.com">
        <link href="https://fonts.googleapis.com/css2?family=Open+Sans:ital,wght@0,400;0,600;0,700;1,400&display=swap" rel="stylesheet">
        <title>Release Notes Template</title>
        <style type="text/css">
            h1 { font-family: Poppins, Helvetica; font-weight: 400; font-size: large; color: #1B9CB9; }
            ol { font-family: Poppins, Helvetica; font-size: medium;}
        </style>
    </head>
<body>
"#;

const DOCUMENT_TAIL: &str = r#"    </ol>
</body>
</html>
"#;

/// Render an entry as `<li><b>Title:</b> note <b>id</b></li>`, unescaped.
pub fn render_entry(item: &WorkItem) -> String {
    format!(
        "<li><b>{}:</b> {} <b>{}</b></li>\n",
        item.title,
        item.note(),
        item.id
    )
}

/// Like [`render_entry`], with HTML special characters escaped.
pub fn render_entry_escaped(item: &WorkItem) -> String {
    format!(
        "<li><b>{}:</b> {} <b>{}</b></li>\n",
        escape_html(&item.title),
        escape_html(item.note()),
        item.id
    )
}

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Accumulates rendered entries and produces the release document.
pub struct Formatter {
    entries: Vec<String>,
    renderer: EntryRenderer,
    heading: ReleaseHeading,
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter {
    /// Create an empty formatter with the unescaped renderer and a
    /// placeholder heading.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            renderer: render_entry,
            heading: ReleaseHeading::placeholder(),
        }
    }

    /// Use a different entry renderer.
    pub fn with_renderer(mut self, renderer: EntryRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Use a release heading instead of placeholders.
    pub fn with_heading(mut self, heading: ReleaseHeading) -> Self {
        self.heading = heading;
        self
    }

    /// Render `item` and append it after all previous entries.
    pub fn append_entry(&mut self, item: &WorkItem) {
        if !item.has_note() {
            warn!(work_item_id = %item.id, "Formatting work item without a generated note");
        }
        self.entries.push((self.renderer)(item));
    }

    /// Entries appended so far, in order.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of entries appended so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wrap the accumulated entries in the page shell.
    ///
    /// Does not clear the entries; calling it twice yields the same document.
    pub fn render_document(&self) -> String {
        let body_len: usize = self.entries.iter().map(|e| e.len() + 8).sum();
        let mut html = String::with_capacity(DOCUMENT_HEAD.len() + body_len + 256);

        html.push_str(DOCUMENT_HEAD);
        html.push_str(&format!(
            "    <h1>Upcoming Release: {} (Release Date {}) </h1>\n",
            self.heading.display_name(),
            self.heading.display_date()
        ));
        html.push_str("    <ol>\n");
        for entry in &self.entries {
            html.push_str("\t\t");
            html.push_str(entry);
        }
        html.push_str(DOCUMENT_TAIL);
        html
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn item(id: u64, title: &str, note: &str) -> WorkItem {
        WorkItem::new(id, title, "description").with_note(note)
    }

    #[test]
    fn test_entry_format() {
        let mut formatter = Formatter::new();
        formatter.append_entry(&item(101, "Fix login bug", "Resolved an SSO login failure."));

        let html = formatter.render_document();
        assert!(html.contains(
            "<li><b>Fix login bug:</b> Resolved an SSO login failure. <b>101</b></li>"
        ));
    }

    #[test]
    fn test_empty_document() {
        let html = Formatter::new().render_document();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<ol>\n    </ol>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(!html.contains("<li>"));
    }

    #[test]
    fn test_placeholder_heading() {
        let html = Formatter::new().render_document();
        assert!(html.contains("<h1>Upcoming Release: XXXX (Release Date XX/XX/XXXX) </h1>"));
    }

    #[test]
    fn test_custom_heading() {
        let heading = ReleaseHeading::placeholder()
            .with_name("4.2")
            .with_date(NaiveDate::from_ymd_opt(2026, 11, 2).unwrap());
        let html = Formatter::new().with_heading(heading).render_document();
        assert!(html.contains("Upcoming Release: 4.2 (Release Date 11/02/2026)"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut formatter = Formatter::new();
        formatter.append_entry(&item(1, "A", "first"));
        let first = formatter.render_document();
        let second = formatter.render_document();
        assert_eq!(first, second);
        assert_eq!(formatter.len(), 1);
    }

    #[test]
    fn test_entries_keep_append_order() {
        let mut formatter = Formatter::new();
        formatter.append_entry(&item(9, "Zeta", "z"));
        formatter.append_entry(&item(2, "Alpha", "a much longer note than the first one"));
        formatter.append_entry(&item(9, "Zeta", "z"));

        assert_eq!(formatter.entries().len(), 3);
        let html = formatter.render_document();
        let zeta = html.find("<b>Zeta:</b>").unwrap();
        let alpha = html.find("<b>Alpha:</b>").unwrap();
        assert!(zeta < alpha);
        assert_eq!(html.matches("<b>Zeta:</b>").count(), 2);
    }

    #[test]
    fn test_default_renderer_does_not_escape() {
        let entry = render_entry(&item(3, "Use <b> tags", "A & B"));
        assert_eq!(entry, "<li><b>Use <b> tags:</b> A & B <b>3</b></li>\n");
    }

    #[test]
    fn test_escaped_renderer() {
        let mut formatter = Formatter::new().with_renderer(render_entry_escaped);
        formatter.append_entry(&item(3, "Use <script>", "Tom's \"fix\" & more"));
        let html = formatter.render_document();
        assert!(html.contains(
            "<li><b>Use &lt;script&gt;:</b> Tom&#39;s &quot;fix&quot; &amp; more <b>3</b></li>"
        ));
    }

    #[test]
    fn test_entry_without_note() {
        let mut formatter = Formatter::new();
        formatter.append_entry(&WorkItem::new(4, "Pending", ""));
        assert_eq!(formatter.entries()[0], "<li><b>Pending:</b>  <b>4</b></li>\n");
    }
}
