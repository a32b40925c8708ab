//! # StatusLine Component
//!
//! The row between the conversation and the input box. While a question is
//! pending it shows a spinner and the live timer; afterwards, how long the
//! last answer took. Key hints for the current mode sit on the right.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::timer::Elapsed;
use crate::tui::component::Component;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct StatusLine<'a> {
    pub loading: bool,
    /// Live display from the request timer
    pub timer: Option<&'a str>,
    pub elapsed: Option<Elapsed>,
    pub spinner_frame: usize,
    pub hints: &'a str,
}

impl StatusLine<'_> {
    fn left(&self) -> Line<'static> {
        if self.loading {
            let frame = SPINNER[self.spinner_frame % SPINNER.len()];
            return Line::from(vec![
                Span::styled(format!("{frame} "), Style::default().fg(Color::Yellow)),
                Span::raw(format!("Thinking… {}", self.timer.unwrap_or("0.0s"))),
            ]);
        }
        match self.elapsed {
            Some(elapsed) => Line::styled(
                format!("Response took {elapsed}"),
                Style::default().fg(Color::Green),
            ),
            None => Line::default(),
        }
    }
}

impl Component for StatusLine<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let hints_width = self.hints.chars().count() as u16;
        let [left, right] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(hints_width)]).areas(area);
        frame.render_widget(self.left(), left);
        frame.render_widget(
            Line::styled(self.hints.to_string(), Style::default().fg(Color::DarkGray)).right_aligned(),
            right,
        );
    }
}
