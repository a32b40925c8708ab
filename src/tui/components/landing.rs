//! # Intro Panel
//!
//! Shown in place of the card list until the first question is submitted.
//! Lists the suggested prompts; each one remembers the screen row it was
//! drawn on so a click can submit it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;

const HEADING: &str = "TSI Assistant";
const SUBHEADING: &str = "Can I help you with anything?";
/// Heading, subheading, blank line
const PREAMBLE_ROWS: u16 = 3;

#[derive(Debug, Default)]
pub struct IntroState {
    prompt_rows: Vec<Rect>,
}

impl IntroState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the prompt drawn at this cell, if any.
    pub fn prompt_at(&self, col: u16, row: u16) -> Option<usize> {
        let pos = Position { x: col, y: row };
        self.prompt_rows.iter().position(|r| r.contains(pos))
    }
}

pub struct IntroPanel<'a> {
    pub state: &'a mut IntroState,
    pub prompts: &'a [String],
}

impl<'a> IntroPanel<'a> {
    pub fn new(state: &'a mut IntroState, prompts: &'a [String]) -> Self {
        Self { state, prompts }
    }
}

impl Component for IntroPanel<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines = vec![
            Line::from(Span::styled(
                HEADING,
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(SUBHEADING, Style::default().fg(Color::Gray))),
            Line::default(),
        ];
        for (idx, prompt) in self.prompts.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("[Alt+{}] ", idx + 1), Style::default().fg(Color::DarkGray)),
                Span::styled(prompt.clone(), Style::default().fg(Color::Cyan)),
            ]));
        }

        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);
        let [text_area] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);

        // Prompts cut off by a short terminal get no click rect
        let first_row = text_area.y.saturating_add(PREAMBLE_ROWS);
        self.state.prompt_rows = (0..self.prompts.len())
            .map_while(|i| {
                let y = first_row.saturating_add(u16::try_from(i).ok()?);
                let row = Rect::new(text_area.x, y, text_area.width, 1).intersection(text_area);
                (row.height > 0).then_some(row)
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), text_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn prompts() -> Vec<String> {
        vec!["What is TSI?".into(), "Where is the checklist?".into()]
    }

    #[test]
    fn renders_heading_and_prompts() {
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        let mut state = IntroState::new();
        let prompts = prompts();
        terminal
            .draw(|f| IntroPanel::new(&mut state, &prompts).render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains(HEADING));
        assert!(text.contains(SUBHEADING));
        assert!(text.contains("[Alt+1] What is TSI?"));
    }

    #[test]
    fn prompt_rows_are_clickable() {
        let mut terminal = Terminal::new(TestBackend::new(50, 12)).unwrap();
        let mut state = IntroState::new();
        let prompts = prompts();
        terminal
            .draw(|f| IntroPanel::new(&mut state, &prompts).render(f, f.area()))
            .unwrap();

        let buf = terminal.backend().buffer();
        let first = (0..12u16)
            .find(|&y| {
                (0..50u16)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .contains("[Alt+1]")
            })
            .unwrap();

        assert_eq!(state.prompt_at(10, first), Some(0));
        assert_eq!(state.prompt_at(10, first + 1), Some(1));
        assert_eq!(state.prompt_at(10, first - 1), None);
        assert_eq!(state.prompt_at(10, first + 2), None);
    }

    #[test]
    fn clipped_prompts_are_not_clickable() {
        // Panel sits above a one-row status line, with room for one prompt
        let mut terminal = Terminal::new(TestBackend::new(50, 5)).unwrap();
        let mut state = IntroState::new();
        let prompts = prompts();
        terminal
            .draw(|f| {
                let panel = Rect::new(0, 0, 50, 4);
                IntroPanel::new(&mut state, &prompts).render(f, panel)
            })
            .unwrap();

        assert_eq!(state.prompt_at(10, 3), Some(0));
        assert_eq!(state.prompt_at(10, 4), None, "status row must not submit");
        assert!((0..5).all(|y| state.prompt_at(10, y) != Some(1)));
    }
}
