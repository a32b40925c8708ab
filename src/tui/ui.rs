//! Frame layout and mouse routing.
//!
//! ```text
//! ┌ title bar ───────────────────────┐  1 row
//! │ intro panel  or  card list       │  rest
//! ├ status line ─────────────────────┤  1 row
//! │ input box                        │  height from the gate
//! └──────────────────────────────────┘
//! ```
//!
//! The failure notice, when raised, is drawn over everything.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position};

use crate::core::action::Action;
use crate::core::controller::ConversationController;
use crate::tui::component::Component;
use crate::tui::components::{
    CardList, InputBox, IntroPanel, Notice, StatusLine, TitleBar, inner_width,
};
use crate::tui::{InputMode, TuiState};

pub fn draw_ui(frame: &mut Frame, ctl: &mut ConversationController, tui: &mut TuiState) {
    use Constraint::{Length, Min};

    let area = frame.area();
    let input_height = ctl.gate_mut().resize(inner_width(area.width));
    let [title_area, main_area, status_area, input_area] =
        Layout::vertical([Length(1), Min(0), Length(1), Length(input_height)]).areas(area);
    tui.input_area = input_area;

    let answers = ctl.cards().iter().filter(|c| !c.is_leaving()).count();
    TitleBar::new(&tui.server, answers, &tui.status_message).render(frame, title_area);

    if ctl.intro_visible() {
        IntroPanel::new(&mut tui.intro, &tui.prompts).render(frame, main_area);
    } else {
        CardList::new(&mut tui.card_list, ctl.cards(), ctl.now()).render(frame, main_area);
    }

    StatusLine {
        loading: ctl.is_loading(),
        timer: ctl.timer_display(),
        elapsed: ctl.elapsed_notice(),
        spinner_frame: tui.spinner_frame,
        hints: tui.mode.hints(),
    }
    .render(frame, status_area);

    let mut input = InputBox::new(ctl.gate_mut(), &mut tui.cursor);
    input.dimmed = tui.mode == InputMode::Cards;
    input.render(frame, input_area);

    if let Some(message) = ctl.failure_notice() {
        Notice { message }.render(frame, area);
    }
}

/// Turns a left click into an action, using the placements recorded by the
/// last draw. Clicking a card also selects it; clicking the input box returns
/// focus to it.
pub fn route_click(tui: &mut TuiState, intro_visible: bool, col: u16, row: u16) -> Option<Action> {
    if tui.input_area.contains(Position { x: col, y: row }) {
        tui.mode = InputMode::Input;
        return None;
    }
    if intro_visible {
        let index = tui.intro.prompt_at(col, row)?;
        return tui.prompts.get(index).map(|p| Action::Submit(p.clone()));
    }
    let hit = tui.card_list.hit_test(col, row)?;
    tui.card_list.selected = Some(hit.card);
    hit.event().map(Action::Card)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TransportError;
    use crate::core::interaction::{CardEvent, CardEventKind, HeaderTarget};
    use crate::test_support::{controller, payload};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn tui() -> TuiState {
        TuiState::new(
            "http://localhost:5000".into(),
            vec!["What is TSI?".into(), "Second prompt".into()],
        )
    }

    fn draw(ctl: &mut ConversationController, tui: &mut TuiState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| draw_ui(f, ctl, tui)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn first_frame_shows_intro() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        let text = draw(&mut ctl, &mut tui);
        assert!(text.contains("TSI Assistant (server: http://localhost:5000)"));
        assert!(text.contains("Can I help you with anything?"));
        assert!(text.contains("[Alt+2] Second prompt"));
        assert_eq!(tui.input_area.height, 3);
        assert_eq!(tui.input_area.y, 17);
    }

    #[test]
    fn startup_notice_shows_in_title_bar() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        tui.status_message = "bad config".into();
        let text = draw(&mut ctl, &mut tui);
        assert!(text.contains("(server: http://localhost:5000) | bad config"));
    }

    #[test]
    fn pending_question_shows_timer_and_locked_input() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.gate_mut().edit(|s| s.push_str("What is TSI?"));
        ctl.submit("What is TSI?");
        let text = draw(&mut ctl, &mut tui);
        assert!(text.contains("Thinking… 0.0s"));
        assert!(text.contains("Waiting for answer"));
        assert!(!text.contains("Can I help you"));
    }

    #[test]
    fn answered_question_shows_card() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.submit("What is TSI?");
        ctl.resolve(Ok(payload("TSI is the answer.", vec![])));
        let text = draw(&mut ctl, &mut tui);
        assert!(text.contains("What is TSI?"));
        assert!(text.contains("TSI is the answer."));
        assert!(text.contains("Response took 0.0s"));
        assert!(text.contains("| 1 answer"));
    }

    #[test]
    fn failure_draws_notice() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.submit("test");
        ctl.resolve(Err(TransportError::Network("refused".into())));
        let text = draw(&mut ctl, &mut tui);
        assert!(text.contains("Something went wrong."));
        assert!(text.contains("Press any key to continue"));
    }

    #[test]
    fn input_grows_with_multiline_text() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.gate_mut().edit(|s| s.push_str("a\nb\nc"));
        draw(&mut ctl, &mut tui);
        assert_eq!(tui.input_area.height, 5);
    }

    #[test]
    fn clicking_a_prompt_submits_it() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        draw(&mut ctl, &mut tui);
        let row = (0..20)
            .find(|&y| tui.intro.prompt_at(10, y) == Some(0))
            .unwrap();
        assert_eq!(
            route_click(&mut tui, true, 10, row),
            Some(Action::Submit("What is TSI?".into()))
        );
        assert_eq!(route_click(&mut tui, true, 10, 0), None);
    }

    #[test]
    fn clicking_a_card_header_targets_that_card() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.submit("q");
        ctl.resolve(Ok(payload("a", vec![])));
        draw(&mut ctl, &mut tui);
        let id = ctl.cards()[0].id;

        // card list starts on row 1, below the title bar
        assert_eq!(
            route_click(&mut tui, false, 2, 1),
            Some(Action::Card(CardEvent::new(
                id,
                CardEventKind::HeaderClick(HeaderTarget::Toggle)
            )))
        );
        assert_eq!(tui.card_list.selected, Some(id));
    }

    #[test]
    fn clicking_input_returns_focus() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        tui.mode = InputMode::Cards;
        draw(&mut ctl, &mut tui);
        assert_eq!(route_click(&mut tui, true, 5, 18), None);
        assert_eq!(tui.mode, InputMode::Input);
    }
}
