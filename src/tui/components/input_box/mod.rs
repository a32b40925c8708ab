//! # InputBox Component
//!
//! The question entry control. A transient view over the controller's
//! [`InputGate`] (which owns the text, lock, and height) and the persistent
//! [`CursorState`].
//!
//! While the gate is locked the box shows the pending question dimmed, hides
//! the cursor, and swallows every edit.

mod cursor;
mod text_wrap;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};

use crate::core::gate::InputGate;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

pub use cursor::CursorState;
pub use text_wrap::inner_width;
use text_wrap::{next_char_boundary, prev_char_boundary, wrap_options};

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter with sendable text. The text stays in the gate.
    Submit(String),
    ContentChanged,
}

pub struct InputBox<'a> {
    pub gate: &'a mut InputGate,
    pub cursor: &'a mut CursorState,
    /// Rendered dim when focus is on the card list
    pub dimmed: bool,
}

impl<'a> InputBox<'a> {
    pub fn new(gate: &'a mut InputGate, cursor: &'a mut CursorState) -> Self {
        Self {
            gate,
            cursor,
            dimmed: false,
        }
    }

    /// Applies `f` to the gate's text and moves the cursor to `new_pos`.
    /// Returns `None` when the gate is locked.
    fn edit(&mut self, f: impl FnOnce(&mut String), new_pos: usize) -> Option<InputEvent> {
        self.gate
            .edit(f)
            .then(|| {
                self.cursor.pos = new_pos;
                self.cursor.sync(self.gate.text());
                InputEvent::ContentChanged
            })
    }

    fn visible_text(&self, area_width: u16) -> String {
        let text = self.gate.text();
        if self.cursor.scroll_offset == 0 {
            return text.to_string();
        }
        let width = inner_width(area_width);
        if width == 0 {
            return String::new();
        }
        textwrap::wrap(text, wrap_options(width))
            .iter()
            .skip(self.cursor.scroll_offset as usize)
            .take(self.gate.max_text_rows() as usize)
            .map(|l| l.as_ref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn title(&self) -> Line<'static> {
        if self.gate.is_locked() {
            Line::from(" Waiting for answer… ")
        } else if self.gate.can_send() {
            Line::from(" Ask (Enter to send) ")
        } else {
            Line::from(" Ask ")
        }
    }
}

impl Component for InputBox<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.cursor.last_width = area.width;
        self.cursor.sync(self.gate.text());
        self.cursor
            .update_scroll_offset(self.gate.text(), area.width, self.gate.max_text_rows());

        let locked = self.gate.is_locked();
        let mut border = if self.gate.can_send() {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut text_style = Style::default().fg(Color::Green);
        if locked || self.dimmed {
            border = border.add_modifier(Modifier::DIM);
            text_style = text_style.add_modifier(Modifier::DIM);
        }

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(self.title())
            .padding(Padding::horizontal(1));

        let input = Paragraph::new(self.visible_text(area.width))
            .block(block)
            .style(text_style);
        frame.render_widget(input, area);

        if self.gate.is_focused() && !self.dimmed {
            frame.set_cursor_position(self.cursor.screen_pos(self.gate.text(), area));
        }
    }
}

impl EventHandler for InputBox<'_> {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if self.gate.is_locked() {
            return None;
        }
        self.cursor.sync(self.gate.text());
        let pos = self.cursor.pos;
        let text = self.gate.text();

        match event {
            TuiEvent::InputChar(c) => {
                let c = *c;
                self.edit(|s| s.insert(pos, c), pos + c.len_utf8())
            }
            TuiEvent::Paste(pasted) => {
                let len = pasted.len();
                self.edit(|s| s.insert_str(pos, pasted), pos + len)
            }
            TuiEvent::Backspace if pos > 0 => {
                let prev = prev_char_boundary(text, pos);
                self.edit(|s| drop(s.drain(prev..pos)), prev)
            }
            TuiEvent::Delete if pos < text.len() => {
                let next = next_char_boundary(text, pos);
                self.edit(|s| drop(s.drain(pos..next)), pos)
            }
            TuiEvent::CursorLeft if pos > 0 => {
                self.cursor.pos = prev_char_boundary(text, pos);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorRight if pos < text.len() => {
                self.cursor.pos = next_char_boundary(text, pos);
                Some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorHome => {
                let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
                (pos != line_start).then(|| {
                    self.cursor.pos = line_start;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorEnd => {
                let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
                (pos != line_end).then(|| {
                    self.cursor.pos = line_end;
                    InputEvent::ContentChanged
                })
            }
            TuiEvent::CursorUp => {
                let text = text.to_string();
                self.cursor
                    .move_vertically(&text, -1)
                    .then_some(InputEvent::ContentChanged)
            }
            TuiEvent::CursorDown => {
                let text = text.to_string();
                self.cursor
                    .move_vertically(&text, 1)
                    .then_some(InputEvent::ContentChanged)
            }
            TuiEvent::Submit => self
                .gate
                .can_send()
                .then(|| InputEvent::Submit(self.gate.text().to_string())),
            _ => None,
        }
    }
}
