//! # TitleBar Component
//!
//! One-line header: which server the assistant talks to, how many answers
//! are in the log, and a transient status message (e.g. where a transcript
//! was written).
//!
//! Stateless: every field is a prop set by the parent each frame.
//!
//! ```text
//! TSI Assistant (server: http://localhost:5000) | 3 answers | Transcript saved
//! ```

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar<'a> {
    pub server: &'a str,
    pub answers: usize,
    /// Empty when there is nothing to report
    pub status_message: &'a str,
}

impl<'a> TitleBar<'a> {
    pub fn new(server: &'a str, answers: usize, status_message: &'a str) -> Self {
        Self {
            server,
            answers,
            status_message,
        }
    }

    fn text(&self) -> String {
        let mut text = format!("TSI Assistant (server: {})", self.server);
        if self.answers > 0 {
            let noun = if self.answers == 1 { "answer" } else { "answers" };
            text.push_str(&format!(" | {} {}", self.answers, noun));
        }
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(self.status_message);
        }
        text
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(Span::styled(
            self.text(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        ));
        frame.render_widget(line, area);
    }
}
