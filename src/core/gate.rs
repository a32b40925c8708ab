//! # Input Gate
//!
//! State of the question-entry control: its text, whether it is locked while a
//! question is pending, whether the send affordance is active, and how tall
//! the control should be for its content.
//!
//! The gate owns the text so that `unlock()` can clear it; the terminal input
//! box only tracks a cursor into it.

use log::debug;

/// Rows taken by the entry control's top and bottom borders.
pub const BORDER_ROWS: u16 = 2;
/// Intrinsic minimum: one text row plus borders.
pub const MIN_HEIGHT: u16 = 1 + BORDER_ROWS;
/// Default cap: five text rows plus borders.
pub const DEFAULT_MAX_HEIGHT: u16 = 5 + BORDER_ROWS;

/// Textwrap options shared by height calculation and cursor placement.
pub fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Count wrapped lines for `text` at `width`, including the empty line a
/// trailing newline opens.
pub fn wrap_line_count(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }

    let lines = textwrap::wrap(text, wrap_options(width));
    let mut count = (lines.len() as u16).max(1);

    // textwrap doesn't always produce an empty trailing line for a trailing newline
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        count += 1;
    }

    count
}

#[derive(Debug, Clone)]
pub struct InputGate {
    text: String,
    locked: bool,
    focused: bool,
    send_active: bool,
    height: u16,
    width: u16,
    max_height: u16,
}

impl Default for InputGate {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEIGHT)
    }
}

impl InputGate {
    pub fn new(max_height: u16) -> Self {
        Self {
            text: String::new(),
            locked: false,
            focused: true,
            send_active: false,
            height: MIN_HEIGHT,
            width: 0,
            max_height: max_height.max(MIN_HEIGHT),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_send_active(&self) -> bool {
        self.send_active
    }

    /// Whether a send action would currently go through.
    pub fn can_send(&self) -> bool {
        !self.locked && self.send_active
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn max_height(&self) -> u16 {
        self.max_height
    }

    /// Text rows visible before the control starts scrolling internally.
    pub fn max_text_rows(&self) -> u16 {
        self.max_height - BORDER_ROWS
    }

    /// Disables text entry and the send affordance. The text stays visible.
    pub fn lock(&mut self) {
        self.locked = true;
        self.focused = false;
        debug!("Input gate locked");
    }

    /// Clears the text, re-enables entry and send, and takes focus back.
    pub fn unlock(&mut self) {
        self.text.clear();
        self.locked = false;
        self.focused = true;
        self.on_input();
        debug!("Input gate unlocked");
    }

    /// Puts `text` back into an unlocked control (after a failed exchange).
    pub fn restore(&mut self, text: &str) {
        if self.locked {
            return;
        }
        self.text = text.to_string();
        self.on_input();
    }

    /// Applies an edit to the text. Rejected while locked.
    pub fn edit(&mut self, f: impl FnOnce(&mut String)) -> bool {
        if self.locked {
            return false;
        }
        f(&mut self.text);
        self.on_input();
        true
    }

    /// Recomputes the control's height for a text area `width` columns wide,
    /// clamped to `MIN_HEIGHT..=max_height`.
    pub fn resize(&mut self, width: u16) -> u16 {
        self.width = width;
        let rows = wrap_line_count(&self.text, width);
        self.height = rows
            .saturating_add(BORDER_ROWS)
            .clamp(MIN_HEIGHT, self.max_height);
        self.height
    }

    /// Send activity is purely a function of whether there is content.
    pub fn set_send_enabled(&mut self, has_content: bool) {
        self.send_active = has_content;
    }

    fn on_input(&mut self) {
        self.resize(self.width);
        self.set_send_enabled(!self.text.trim().is_empty());
    }
}
