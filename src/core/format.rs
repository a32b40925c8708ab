//! Markdown → HTML formatter boundary.
//!
//! The card renderer treats formatting as an opaque pure function. Whatever a
//! [`MarkdownFormatter`] returns is placed unescaped inside the response area,
//! so implementations own the safety of their output.

use pulldown_cmark::{Event, Options, Parser, html};

pub trait MarkdownFormatter: Send + Sync {
    fn format(&self, markdown: &str) -> String;
}

/// CommonMark formatter backed by `pulldown_cmark`.
///
/// Raw HTML in the answer is demoted to text, which the HTML writer then
/// escapes. Everything else (tables, strikethrough, task lists) renders.
#[derive(Debug, Default, Clone, Copy)]
pub struct CmarkFormatter;

impl MarkdownFormatter for CmarkFormatter {
    fn format(&self, markdown: &str) -> String {
        let mut opts = Options::empty();
        opts.insert(Options::ENABLE_STRIKETHROUGH);
        opts.insert(Options::ENABLE_TABLES);
        opts.insert(Options::ENABLE_TASKLISTS);

        let parser = Parser::new_ext(markdown, opts).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_becomes_strong() {
        assert_eq!(CmarkFormatter.format("**Hi**"), "<p><strong>Hi</strong></p>\n");
    }

    #[test]
    fn empty_markdown_is_empty_markup() {
        assert_eq!(CmarkFormatter.format(""), "");
    }

    #[test]
    fn raw_html_is_not_passed_through() {
        let out = CmarkFormatter.format("hello <script>alert(1)</script>");
        assert!(!out.contains("<script>"), "got {out}");
        assert!(out.contains("&lt;script&gt;"), "got {out}");
    }

    #[test]
    fn tables_render() {
        let out = CmarkFormatter.format("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(out.contains("<table>"), "got {out}");
        assert!(out.contains("<td>1</td>"), "got {out}");
    }
}
