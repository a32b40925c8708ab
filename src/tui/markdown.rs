//! Markdown → ratatui `Text` for answer bodies.
//!
//! Walks `pulldown_cmark` events and emits styled `Line`/`Span` values:
//! headings, emphasis, inline code, fenced code with syntect highlighting,
//! lists, block quotes, links, and simple pipe tables. Raw HTML in an answer
//! is shown as literal text, same as the HTML formatter does.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const CODE_THEME: &str = "base16-ocean.dark";

fn chrome() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Renders an answer's markdown. Owned output, so callers can cache it.
pub fn render(content: &str, base_fg: Color) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut w = Writer::new(base_fg);
    for event in Parser::new_ext(content, opts) {
        w.handle(event);
    }
    w.text
}

// ── Writer ──────────────────────────────────────────────────────────────────

struct Writer {
    text: Text<'static>,
    base_fg: Color,
    /// Inline styles; each entry already includes its parent's modifiers.
    styles: Vec<Style>,
    /// Per-line prefix spans (blockquote and code borders).
    line_prefixes: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = ordered list at item n.
    list_indices: Vec<Option<u64>>,
    code: Option<CodeBlock>,
    link_url: Option<String>,
    /// Cells of the table row being collected.
    table: Option<Vec<Vec<Span<'static>>>>,
    needs_newline: bool,
}

enum CodeBlock {
    Highlighted(HighlightLines<'static>),
    Plain,
}

impl Writer {
    fn new(base_fg: Color) -> Self {
        Self {
            text: Text::default(),
            base_fg,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            code: None,
            link_url: None,
            table: None,
            needs_newline: false,
        }
    }

    // ── Style helpers ───────────────────────────────────────────────────

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.base_fg))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    // ── Line/span helpers ───────────────────────────────────────────────

    fn push_line(&mut self, line: Line<'static>) {
        let mut out = line;
        for pfx in self.line_prefixes.iter().rev().cloned() {
            out.spans.insert(0, pfx);
        }
        self.text.lines.push(out);
    }

    fn push_span(&mut self, span: Span<'static>) {
        // Inside a table row, spans collect into the current cell
        if let Some(cell) = self.table.as_mut().and_then(|cells| cells.last_mut()) {
            cell.push(span);
            return;
        }
        match self.text.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.push_line(Line::from(vec![span])),
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_newline {
            self.push_line(Line::default());
            self.needs_newline = false;
        }
    }

    // ── Event dispatch ──────────────────────────────────────────────────

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            // Shown literally, never interpreted
            Event::Html(t) | Event::InlineHtml(t) => self.text(t),
            Event::Code(c) => self.inline_code(c),
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                self.push_line(Line::from(Span::styled("─".repeat(40), chrome())));
                self.needs_newline = true;
            }
            Event::TaskListMarker(checked) => {
                self.push_span(Span::raw(if checked { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let hs = heading_style(self.base_fg, level);
                self.push_line(Line::from(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    hs,
                )));
                self.push_style(hs);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes.push(Span::styled("│ ", chrome()));
                self.push_style(Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => self.open_code_block(kind),
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => {
                self.push_line(Line::default());
                let indent = "  ".repeat(self.list_indices.len().saturating_sub(1));
                let marker = match self.list_indices.last_mut() {
                    Some(Some(n)) => {
                        let m = format!("{indent}{n}. ");
                        *n += 1;
                        m
                    }
                    _ => format!("{indent}• "),
                };
                self.push_span(Span::styled(marker, chrome()));
            }
            Tag::Table(_) => {
                self.blank_line_if_needed();
                self.table = Some(Vec::new());
            }
            Tag::TableCell => {
                if let Some(cells) = self.table.as_mut() {
                    cells.push(Vec::new());
                }
            }

            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style());
            }
            _ => {}
        }
    }

    fn open_code_block(&mut self, kind: CodeBlockKind<'_>) {
        if !self.text.lines.is_empty() {
            self.push_line(Line::default());
        }
        let lang = match &kind {
            CodeBlockKind::Fenced(l) => l.as_ref(),
            CodeBlockKind::Indented => "",
        };

        let top = if lang.is_empty() {
            Line::from(Span::styled("╭──", chrome()))
        } else {
            Line::from(vec![
                Span::styled("╭── ", chrome()),
                Span::styled(lang.to_owned(), chrome().add_modifier(Modifier::BOLD)),
                Span::styled(" ──", chrome()),
            ])
        };
        self.push_line(top);
        self.line_prefixes.push(Span::styled("│ ", chrome()));

        let highlighter = (!lang.is_empty())
            .then(|| SYNTAX_SET.find_syntax_by_token(lang))
            .flatten()
            .zip(THEME_SET.themes.get(CODE_THEME))
            .map(|(syntax, theme)| HighlightLines::new(syntax, theme));
        self.code = Some(match highlighter {
            Some(hl) => CodeBlock::Highlighted(hl),
            None => CodeBlock::Plain,
        });
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_newline = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_newline = true;
            }
            TagEnd::CodeBlock => {
                self.code = None;
                self.line_prefixes.pop();
                self.push_line(Line::from(Span::styled("╰──", chrome())));
                self.needs_newline = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_newline = true;
            }
            TagEnd::TableHead => self.flush_table_row(true),
            TagEnd::TableRow => self.flush_table_row(false),
            TagEnd::Table => {
                self.table = None;
                self.needs_newline = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, link_style()));
                    self.push_span(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    /// Emits the collected cells as one ` a │ b ` line. The header row gets
    /// bold cells and a rule underneath.
    fn flush_table_row(&mut self, head: bool) {
        let Some(cells) = self.table.as_mut().map(std::mem::take) else {
            return;
        };

        let mut spans = Vec::new();
        for (i, cell) in cells.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" │ ", chrome()));
            }
            for span in cell {
                spans.push(if head {
                    span.patch_style(Style::default().add_modifier(Modifier::BOLD))
                } else {
                    span
                });
            }
        }
        let width: usize = spans.iter().map(Span::width).sum();
        self.push_line(Line::from(spans));
        if head {
            self.push_line(Line::from(Span::styled("─".repeat(width.max(3)), chrome())));
        }
    }

    // ── Content handlers ────────────────────────────────────────────────

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        match self.code.as_mut() {
            Some(CodeBlock::Highlighted(hl)) => {
                let mut lines = Vec::new();
                for line in LinesWithEndings::from(text.as_str()) {
                    let Ok(ranges) = hl.highlight_line(line, &SYNTAX_SET) else {
                        lines.push(Line::from(line.trim_end_matches('\n').to_owned()));
                        continue;
                    };
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .filter_map(|(hl_style, frag)| {
                            let content = frag.trim_end_matches('\n');
                            if content.is_empty() {
                                return None;
                            }
                            let fg = hl_style.foreground;
                            Some(Span::styled(
                                content.to_owned(),
                                Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                            ))
                        })
                        .collect();
                    lines.push(Line::from(spans));
                }
                for line in lines {
                    self.push_line(line);
                }
            }
            Some(CodeBlock::Plain) => {
                for line in text.lines() {
                    self.push_line(Line::from(Span::styled(
                        line.to_owned(),
                        Style::default().fg(Color::White),
                    )));
                }
            }
            None => {
                let style = self.style();
                self.push_span(Span::styled(text, style));
            }
        }
    }

    fn inline_code(&mut self, cow: CowStr<'_>) {
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        self.push_span(Span::styled(cow.to_string(), style));
    }
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn link_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::UNDERLINED)
}

fn heading_style(base_fg: Color, level: HeadingLevel) -> Style {
    let modifiers = match level {
        HeadingLevel::H1 => Modifier::BOLD | Modifier::UNDERLINED,
        HeadingLevel::H2 => Modifier::BOLD,
        _ => Modifier::BOLD | Modifier::ITALIC,
    };
    Style::default().fg(base_fg).add_modifier(modifiers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_text_inherits_heading_style() {
        let text = render("## Hello", Color::Blue);
        let line = &text.lines[0];
        assert!(line.spans.len() >= 2, "expected >= 2 spans, got {:?}", line);
        assert_eq!(line.spans[0].content, "## ");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].style.fg, Some(Color::Blue));
    }

    #[test]
    fn bold_text_is_bold() {
        let text = render("Some **bold** text", Color::Blue);
        let bold = text.lines[0].spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn plain_text_uses_base_color() {
        let text = render("hello", Color::Green);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(Color::Green));
    }

    #[test]
    fn empty_answer_renders_nothing() {
        assert!(render("", Color::White).lines.is_empty());
    }

    #[test]
    fn raw_html_is_shown_literally() {
        let text = render("a <b>tag</b>", Color::White);
        assert_eq!(plain(&text)[0], "a <b>tag</b>");
    }

    #[test]
    fn ordered_and_bullet_lists() {
        let lines = plain(&render("1. one\n2. two\n\n- x", Color::White));
        assert!(lines.iter().any(|l| l == "1. one"), "{lines:?}");
        assert!(lines.iter().any(|l| l == "2. two"), "{lines:?}");
        assert!(lines.iter().any(|l| l == "• x"), "{lines:?}");
    }

    #[test]
    fn code_block_has_border_structure() {
        let lines = plain(&render("```\nline1\n\tline2\n```", Color::Blue));
        assert!(lines[0].starts_with('╭'), "{lines:?}");
        assert_eq!(lines[1], "│ line1");
        assert_eq!(lines[2], "│     line2");
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn highlighted_code_keeps_text() {
        let lines = plain(&render("```rust\nfn main() {}\n```", Color::Blue));
        assert!(lines[0].contains("rust"));
        assert_eq!(lines[1], "│ fn main() {}");
    }

    #[test]
    fn table_rows_are_joined_with_separators() {
        let lines = plain(&render("| a | b |\n|---|---|\n| 1 | 2 |\n", Color::White));
        assert_eq!(lines[0], "a │ b");
        assert!(lines[1].starts_with('─'));
        assert_eq!(lines[2], "1 │ 2");
    }

    #[test]
    fn links_show_destination() {
        let lines = plain(&render("[docs](https://example.com)", Color::White));
        assert_eq!(lines[0], "docs (https://example.com)");
    }
}
