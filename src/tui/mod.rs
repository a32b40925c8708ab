//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI, and
//! translates terminal events into `core::Action` values.
//!
//! This is the only module that knows about ratatui and crossterm. The core
//! never sees a key code or a screen cell: clicks are resolved to card events
//! by hit testing here, then handed to the controller.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (question pending, card fading out): draws every tick so
//!   the live timer and spinner move.
//! - **Idle**: sleeps up to 500ms and only redraws on events or resize.
//!
//! A `SteadyBlock` cursor is used because `set_cursor_position` resets the
//! terminal's blink timer on every `draw()`, which makes a blinking cursor
//! stutter during continuous redraws.

mod component;
mod components;
mod event;
pub mod export;
pub mod markdown;
mod ui;

use log::{debug, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::layout::Rect;

use crate::api::{HttpTransport, Transport};
use crate::core::action::{Action, Effect, update};
use crate::core::card::CardId;
use crate::core::config::ResolvedConfig;
use crate::core::controller::ConversationController;
use crate::core::format::CmarkFormatter;
use crate::core::interaction::{CardEvent, CardEventKind, HeaderTarget};
use crate::core::payload::Question;
use crate::core::timer::SystemClock;
use crate::tui::component::EventHandler;
use crate::tui::components::{CardListState, CursorState, InputBox, InputEvent, IntroState};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const IDLE_POLL: Duration = Duration::from_millis(500);
/// Spinner frames per second
const SPINNER_RATE: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Text editing in the input box. Esc switches to Cards.
    Input,
    /// Navigate and operate cards from the keyboard. Typing switches back.
    Cards,
}

impl InputMode {
    fn hints(self) -> &'static str {
        match self {
            InputMode::Input => "Enter send · Esc cards · ^S save · ^C quit",
            InputMode::Cards => "↑↓ select · Space open · s sources · ←→ tab · x close",
        }
    }
}

/// TUI-specific presentation state (not part of the conversation itself)
pub struct TuiState {
    pub card_list: CardListState,
    pub cursor: CursorState,
    pub intro: IntroState,
    pub mode: InputMode,
    /// Where the input box was drawn last frame, for click routing
    pub input_area: Rect,
    /// Transient title bar message (transcript export result)
    pub status_message: String,
    pub spinner_frame: usize,
    pub server: String,
    pub prompts: Vec<String>,
}

impl TuiState {
    pub fn new(server: String, prompts: Vec<String>) -> Self {
        Self {
            card_list: CardListState::new(),
            cursor: CursorState::new(),
            intro: IntroState::new(),
            mode: InputMode::Input, // User expects to type immediately
            input_area: Rect::default(),
            status_message: String::new(),
            spinner_frame: 0,
            server,
            prompts,
        }
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without
        // it ignore the request
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, steady cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Runs the event loop until quit. `notice` starts out in the title bar.
pub fn run(config: ResolvedConfig, notice: Option<String>) -> std::io::Result<()> {
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(&config.base_url, &config.endpoint));
    let mut ctl = ConversationController::new(
        Arc::new(SystemClock),
        Arc::new(CmarkFormatter),
        config.tick,
        config.max_input_height,
    );
    let mut tui = TuiState::new(config.base_url.clone(), config.prompts.clone());
    tui.status_message = notice.unwrap_or_default();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Transport results come back on this channel
    let (tx, rx) = mpsc::channel();

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame

    'event_loop: loop {
        let animating = ctl.is_animating();
        if animating {
            needs_redraw = true;
        }

        if needs_redraw {
            tui.spinner_frame = (start_time.elapsed().as_secs_f32() * SPINNER_RATE) as usize;
            terminal.draw(|f| ui::draw_ui(f, &mut ctl, &mut tui))?;
            needs_redraw = false;
        }

        let timeout = if animating { config.tick } else { IDLE_POLL };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain everything pending before the next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            let action = match event {
                TuiEvent::Resize => continue,
                TuiEvent::ForceQuit => Some(Action::Quit),
                TuiEvent::ExportTranscript => {
                    export_transcript(&ctl, &mut tui, &config);
                    continue;
                }
                event => route_event(&mut tui, &mut ctl, &event),
            };
            let Some(action) = action else { continue };

            match update(&mut ctl, action) {
                Effect::Quit => break 'event_loop,
                Effect::Dispatch(question) => {
                    tui.status_message.clear();
                    spawn_request(transport.clone(), question, tx.clone());
                }
                Effect::Redraw | Effect::None => {}
            }
        }

        // Transport results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            if update(&mut ctl, action) == Effect::Quit {
                break 'event_loop;
            }
            // Success cleared the gate; failure put the question back
            tui.cursor.move_to_end(ctl.gate().text());
        }

        if update(&mut ctl, Action::Tick) == Effect::Redraw {
            needs_redraw = true;
        }
    }

    ratatui::restore();
    info!("TSI assistant shutting down");
    Ok(())
}

/// Maps a terminal event to an action for the controller, updating
/// presentation state (mode, selection, cursor, scroll) on the way.
fn route_event(
    tui: &mut TuiState,
    ctl: &mut ConversationController,
    event: &TuiEvent,
) -> Option<Action> {
    // The failure notice is modal: any key or click acknowledges it
    if ctl.failure_notice().is_some() {
        return match event {
            TuiEvent::ScrollUp | TuiEvent::ScrollDown => None,
            _ => Some(Action::AcknowledgeFailure),
        };
    }

    match event {
        TuiEvent::SelectPrompt(index) => {
            if !ctl.intro_visible() {
                return None;
            }
            return tui.prompts.get(*index).map(|p| Action::Submit(p.clone()));
        }
        TuiEvent::MouseClick(col, row) => {
            return ui::route_click(tui, ctl.intro_visible(), *col, *row);
        }
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown => {
            tui.card_list.handle_event(event);
            return None;
        }
        _ => {}
    }

    match tui.mode {
        InputMode::Input => {
            if matches!(event, TuiEvent::Escape) {
                if !ctl.cards().is_empty() {
                    tui.mode = InputMode::Cards;
                    tui.card_list.select_next(ctl.cards());
                }
                return None;
            }
            match InputBox::new(ctl.gate_mut(), &mut tui.cursor).handle_event(event)? {
                InputEvent::Submit(text) => Some(Action::Submit(text)),
                InputEvent::ContentChanged => None,
            }
        }
        InputMode::Cards => card_mode_event(tui, ctl, event),
    }
}

fn card_mode_event(
    tui: &mut TuiState,
    ctl: &mut ConversationController,
    event: &TuiEvent,
) -> Option<Action> {
    let selected = tui.card_list.selected;
    let on_selected = |kind| selected.map(|id| Action::Card(CardEvent::new(id, kind)));

    match event {
        TuiEvent::CursorUp => {
            tui.card_list.select_prev(ctl.cards());
            None
        }
        TuiEvent::CursorDown => {
            tui.card_list.select_next(ctl.cards());
            None
        }
        TuiEvent::Submit | TuiEvent::InputChar(' ') => {
            on_selected(CardEventKind::HeaderClick(HeaderTarget::Toggle))
        }
        TuiEvent::InputChar('s') => on_selected(CardEventKind::ToggleSources),
        TuiEvent::InputChar('x') | TuiEvent::Delete => on_selected(CardEventKind::Dismiss),
        TuiEvent::InputChar(c @ '1'..='9') => {
            let index = c.to_digit(10).map_or(0, |d| d as usize - 1);
            on_selected(CardEventKind::SelectCitation(index))
        }
        TuiEvent::CursorLeft => {
            let index = active_tab(ctl, selected)?.checked_sub(1)?;
            on_selected(CardEventKind::SelectCitation(index))
        }
        TuiEvent::CursorRight => {
            let index = active_tab(ctl, selected)? + 1;
            on_selected(CardEventKind::SelectCitation(index))
        }
        // Typing switches back to the input box and goes there
        TuiEvent::InputChar(_) | TuiEvent::Paste(_) | TuiEvent::Backspace => {
            tui.mode = InputMode::Input;
            tui.card_list.selected = None;
            InputBox::new(ctl.gate_mut(), &mut tui.cursor).handle_event(event);
            None
        }
        _ => None,
    }
}

fn active_tab(ctl: &ConversationController, selected: Option<CardId>) -> Option<usize> {
    let card = ctl.card(selected?)?;
    card.sources.as_ref().map(|sources| sources.active_index())
}

fn export_transcript(ctl: &ConversationController, tui: &mut TuiState, config: &ResolvedConfig) {
    let path = &config.transcript_path;
    tui.status_message = match export::write_transcript(path, ctl.cards()) {
        Ok(count) => format!("Saved {} card(s) to {}", count, path.display()),
        Err(e) => {
            warn!("Transcript export failed: {}", e);
            format!("Export failed: {}", e)
        }
    };
}

/// Runs one transport call on the tokio runtime and reports the outcome
/// back to the event loop as `Action::Resolved`.
fn spawn_request(
    transport: Arc<dyn Transport>,
    question: Question,
    tx: mpsc::Sender<Action>,
) -> tokio::task::JoinHandle<()> {
    info!("Spawning request");
    tokio::spawn(async move {
        let started = Instant::now();
        let result = transport.ask(question.as_str()).await;
        debug!(
            "Request finished in {}ms (ok={})",
            started.elapsed().as_millis(),
            result.is_ok()
        );
        if tx.send(Action::Resolved(result)).is_err() {
            warn!("Failed to deliver response: receiver dropped");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TransportError;
    use crate::test_support::{MockTransport, citation, controller, payload};

    fn tui() -> TuiState {
        TuiState::new("http://localhost:5000".into(), vec!["What is TSI?".into()])
    }

    fn type_str(tui: &mut TuiState, ctl: &mut ConversationController, text: &str) {
        for c in text.chars() {
            route_event(tui, ctl, &TuiEvent::InputChar(c));
        }
    }

    #[test]
    fn typing_then_enter_submits() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        type_str(&mut tui, &mut ctl, "hello");
        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::Submit),
            Some(Action::Submit("hello".into()))
        );
    }

    #[test]
    fn prompt_shortcut_only_while_intro_visible() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::SelectPrompt(0)),
            Some(Action::Submit("What is TSI?".into()))
        );
        assert_eq!(route_event(&mut tui, &mut ctl, &TuiEvent::SelectPrompt(4)), None);

        ctl.submit("q");
        assert_eq!(route_event(&mut tui, &mut ctl, &TuiEvent::SelectPrompt(0)), None);
    }

    #[test]
    fn failure_notice_swallows_next_key() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.submit("test");
        ctl.resolve(Err(TransportError::Network("refused".into())));

        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::InputChar('a')),
            Some(Action::AcknowledgeFailure)
        );
        assert_eq!(ctl.gate().text(), "test", "key did not reach the input");
    }

    #[test]
    fn escape_enters_card_mode_only_with_cards() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        route_event(&mut tui, &mut ctl, &TuiEvent::Escape);
        assert_eq!(tui.mode, InputMode::Input);

        ctl.submit("q");
        ctl.resolve(Ok(payload("a", vec![])));
        route_event(&mut tui, &mut ctl, &TuiEvent::Escape);
        assert_eq!(tui.mode, InputMode::Cards);
        assert_eq!(tui.card_list.selected, Some(ctl.cards()[0].id));
    }

    #[test]
    fn card_mode_keys_target_selected_card() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        let cites = vec![citation("a", "s", "c"), citation("b", "s", "c"), citation("c", "s", "c")];
        ctl.submit("q");
        ctl.resolve(Ok(payload("a", cites)));
        route_event(&mut tui, &mut ctl, &TuiEvent::Escape);
        let id = ctl.cards()[0].id;
        let card = |kind| Some(Action::Card(CardEvent::new(id, kind)));

        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::InputChar(' ')),
            card(CardEventKind::HeaderClick(HeaderTarget::Toggle))
        );
        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::InputChar('s')),
            card(CardEventKind::ToggleSources)
        );
        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::InputChar('3')),
            card(CardEventKind::SelectCitation(2))
        );
        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::CursorRight),
            card(CardEventKind::SelectCitation(1))
        );
        assert_eq!(route_event(&mut tui, &mut ctl, &TuiEvent::CursorLeft), None, "already on the first tab");
        assert_eq!(
            route_event(&mut tui, &mut ctl, &TuiEvent::InputChar('x')),
            card(CardEventKind::Dismiss)
        );
    }

    #[test]
    fn typing_in_card_mode_returns_to_input() {
        let (_, mut ctl) = controller();
        let mut tui = tui();
        ctl.submit("q");
        ctl.resolve(Ok(payload("a", vec![])));
        route_event(&mut tui, &mut ctl, &TuiEvent::Escape);

        assert_eq!(route_event(&mut tui, &mut ctl, &TuiEvent::InputChar('w')), None);
        assert_eq!(tui.mode, InputMode::Input);
        assert_eq!(tui.card_list.selected, None);
        assert_eq!(ctl.gate().text(), "w");
    }

    #[tokio::test]
    async fn spawned_request_reports_back() {
        let transport = Arc::new(MockTransport::new(Ok(payload("pong", vec![]))));
        let (tx, rx) = mpsc::channel();

        let question = Question::parse("  ping ").unwrap();
        spawn_request(transport.clone(), question, tx).await.unwrap();

        match rx.try_recv().unwrap() {
            Action::Resolved(Ok(p)) => assert_eq!(p.response, "pong"),
            other => panic!("unexpected action {other:?}"),
        }
        assert_eq!(transport.asked(), ["ping"]);
    }

    #[tokio::test]
    async fn spawned_failure_reports_error() {
        let transport = Arc::new(MockTransport::new(Err(TransportError::Status {
            status: 500,
            body: "boom".into(),
        })));
        let (tx, rx) = mpsc::channel();

        spawn_request(transport, Question::parse("q").unwrap(), tx)
            .await
            .unwrap();
        assert!(matches!(rx.try_recv(), Ok(Action::Resolved(Err(TransportError::Status { status: 500, .. })))));
    }
}
