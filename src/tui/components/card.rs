//! # Card Widget
//!
//! Draws one [`Card`] and answers "what did this click land on?" for it.
//!
//! ```text
//! ╭ ▾ ─────────────────────────────── [x] ╮   row 0: toggle / dismiss
//! │ What is TSI?                          │   question (bold)
//! │ ───────────────────────────────────── │   divider        ┐
//! │ TSI is ...                            │   response       │ expanded
//! │ ▾ Sources (2)                         │   sources header │ only
//! │  Source 1   Source 2                  │   tabs           ┐ sources
//! │ ID: doc-1                             │   active panel   ┘ expanded
//! ╰───────────────────────────────────────╯
//! ```
//!
//! [`CardLayout`] measures every row once per frame; the widget draws from the
//! same numbers, so a hit test never disagrees with what is on screen.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};
use unicode_width::UnicodeWidthStr;

use crate::core::card::{Card, CitationEntry};
use crate::core::interaction::{CardEventKind, HeaderTarget};

/// Border (2) + horizontal padding (2)
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Column of the first content cell (border + padding)
const CONTENT_X: u16 = 2;
const TOGGLE_LABEL_EXPANDED: &str = " ▾ ";
const TOGGLE_LABEL_COLLAPSED: &str = " ▸ ";
const DISMISS_LABEL: &str = " [x] ";
/// Exit progress after which a leaving card is drawn in gray.
const FADE_GRAY_AT: f32 = 0.5;

/// Row and column positions of one card, relative to its top-left cell.
#[derive(Debug, Clone, PartialEq)]
pub struct CardLayout {
    pub width: u16,
    pub height: u16,
    question_rows: u16,
    response_rows: u16,
    sources_header_row: Option<u16>,
    tabs_row: Option<u16>,
    /// `[start, end)` columns of each citation tab on the tabs row
    tab_columns: Vec<(u16, u16)>,
    panel_rows: u16,
}

impl CardLayout {
    pub fn measure(card: &Card, response: &Text<'_>, width: u16) -> Self {
        let inner = width.saturating_sub(HORIZONTAL_OVERHEAD).max(1);
        let question_rows = rows(Paragraph::new(card.question.as_str()), inner);

        let mut row = question_rows.saturating_add(1);
        let mut response_rows = 0;
        let mut sources_header_row = None;
        let mut tabs_row = None;
        let mut tab_columns = Vec::new();
        let mut panel_rows = 0;

        if card.expanded {
            row = row.saturating_add(1); // divider
            response_rows = rows(Paragraph::new(response.clone()), inner);
            row = row.saturating_add(response_rows);

            if let Some(sources) = &card.sources {
                sources_header_row = Some(row);
                row = row.saturating_add(1);

                if sources.expanded {
                    tabs_row = Some(row);
                    row = row.saturating_add(1);
                    // Tabs past the last column are unreachable and not recorded
                    let mut x = CONTENT_X;
                    for entry in sources.entries() {
                        if x == u16::MAX {
                            break;
                        }
                        let w = clamp_u16(tab_label(entry).width());
                        let end = x.saturating_add(w);
                        tab_columns.push((x, end));
                        x = end.saturating_add(1);
                    }
                    panel_rows = rows(Paragraph::new(panel_text(sources.active())), inner);
                    row = row.saturating_add(panel_rows);
                }
            }
        }

        Self {
            width,
            height: row.saturating_add(1),
            question_rows,
            response_rows,
            sources_header_row,
            tabs_row,
            tab_columns,
            panel_rows,
        }
    }

    /// Maps a cell (relative to the card) to the interaction it triggers.
    pub fn hit(&self, col: u16, row: u16) -> Option<CardEventKind> {
        if row >= self.height || col >= self.width {
            return None;
        }

        if row == 0 {
            let toggle_end = 1 + TOGGLE_LABEL_EXPANDED.width() as u16;
            let dismiss_start = self.width.saturating_sub(1 + DISMISS_LABEL.width() as u16);
            let target = if (1..toggle_end).contains(&col) {
                HeaderTarget::Toggle
            } else if col >= dismiss_start && col < self.width.saturating_sub(1) {
                HeaderTarget::Dismiss
            } else {
                HeaderTarget::Body
            };
            return Some(CardEventKind::HeaderClick(target));
        }
        if row <= self.question_rows {
            return Some(CardEventKind::HeaderClick(HeaderTarget::Body));
        }
        if self.sources_header_row == Some(row) {
            return Some(CardEventKind::ToggleSources);
        }
        if self.tabs_row == Some(row) {
            return self
                .tab_columns
                .iter()
                .position(|&(start, end)| (start..end).contains(&col))
                .map(CardEventKind::SelectCitation);
        }
        None
    }
}

fn rows(paragraph: Paragraph<'_>, width: u16) -> u16 {
    clamp_u16(paragraph.wrap(Wrap { trim: false }).line_count(width)).max(1)
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

fn tab_label(entry: &CitationEntry) -> String {
    format!(" {} ", entry.label)
}

fn panel_text(entry: &CitationEntry) -> Text<'static> {
    let label = Style::default().fg(Color::DarkGray);
    let cite = &entry.citation;
    Text::from(vec![
        Line::from(vec![Span::styled("ID: ", label), Span::raw(cite.id.clone())]),
        Line::from(vec![
            Span::styled("Source: ", label),
            Span::raw(cite.source.clone()),
        ]),
        Line::from(Span::styled("Page Content:", label)),
        Line::from(Span::styled(
            cite.page_content.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
}

pub struct CardWidget<'a> {
    pub card: &'a Card,
    pub response: &'a Text<'static>,
    pub layout: &'a CardLayout,
    pub selected: bool,
    /// Exit progress while the card is leaving
    pub fade: Option<f32>,
}

impl CardWidget<'_> {
    fn row_rect(inner: Rect, offset: u16, height: u16) -> Rect {
        Rect::new(inner.x, inner.y.saturating_add(offset), inner.width, height).intersection(inner)
    }
}

impl Widget for CardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let card = self.card;
        let layout = self.layout;

        let border_style = if self.selected {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Blue).add_modifier(Modifier::DIM)
        };
        let toggle = if card.expanded {
            TOGGLE_LABEL_EXPANDED
        } else {
            TOGGLE_LABEL_COLLAPSED
        };

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_top(Line::from(toggle).left_aligned())
            .title_top(Line::from(DISMISS_LABEL).right_aligned())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut row = 0;
        Paragraph::new(card.question.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: false })
            .render(Self::row_rect(inner, row, layout.question_rows), buf);
        row = row.saturating_add(layout.question_rows);

        if card.expanded {
            let divider = "─".repeat(inner.width as usize);
            Line::styled(divider, Style::default().fg(Color::DarkGray))
                .render(Self::row_rect(inner, row, 1), buf);
            row = row.saturating_add(1);

            Paragraph::new(self.response.clone())
                .wrap(Wrap { trim: false })
                .render(Self::row_rect(inner, row, layout.response_rows), buf);
            row = row.saturating_add(layout.response_rows);

            if let Some(sources) = &card.sources {
                let marker = if sources.expanded { "▾" } else { "▸" };
                Line::styled(
                    format!("{marker} Sources ({})", sources.len()),
                    Style::default().fg(Color::Yellow),
                )
                .render(Self::row_rect(inner, row, 1), buf);
                row = row.saturating_add(1);

                if sources.expanded {
                    let mut tabs = Vec::new();
                    for (idx, entry) in sources.entries().iter().enumerate() {
                        if idx > 0 {
                            tabs.push(Span::raw(" "));
                        }
                        let style = if entry.active {
                            Style::default().fg(Color::Black).bg(Color::Yellow)
                        } else {
                            Style::default().fg(Color::DarkGray)
                        };
                        tabs.push(Span::styled(tab_label(entry), style));
                    }
                    Line::from(tabs).render(Self::row_rect(inner, row, 1), buf);
                    row = row.saturating_add(1);

                    Paragraph::new(panel_text(sources.active()))
                        .wrap(Wrap { trim: false })
                        .render(Self::row_rect(inner, row, layout.panel_rows), buf);
                }
            }
        }

        if let Some(progress) = self.fade {
            let mut fade = Style::default().add_modifier(Modifier::DIM);
            if progress >= FADE_GRAY_AT {
                fade = fade.fg(Color::DarkGray).bg(Color::Reset);
            }
            buf.set_style(area, fade);
        }
    }
}
