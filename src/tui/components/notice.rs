//! Blocking failure notice drawn over the whole screen.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Clear, Padding, Paragraph, Wrap};

use crate::tui::component::Component;

const DISMISS_HINT: &str = "Press any key to continue";
const MAX_WIDTH: u16 = 60;

pub struct Notice<'a> {
    pub message: &'a str,
}

impl Component for Notice<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = MAX_WIDTH.min(area.width);
        let text = vec![
            Line::from(self.message.to_string()),
            Line::default(),
            Line::styled(DISMISS_HINT, Style::default().fg(Color::DarkGray)),
        ];
        let paragraph = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        // borders (2) + padding (2)
        let height = (paragraph.line_count(width.saturating_sub(4)) as u16 + 2).min(area.height);

        let [row] = Layout::vertical([Constraint::Length(height)])
            .flex(Flex::Center)
            .areas(area);
        let [modal] = Layout::horizontal([Constraint::Length(width)])
            .flex(Flex::Center)
            .areas(row);

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Red))
            .title(Line::styled(" Error ", Style::default().add_modifier(Modifier::BOLD)))
            .padding(Padding::horizontal(1));

        frame.render_widget(Clear, modal);
        frame.render_widget(paragraph.block(block), modal);
    }
}
