//! Cursor position and internal scroll for the input box.
//!
//! The text itself belongs to the `InputGate`; every method here takes it as
//! `buffer: &str`. The gate can replace its text underneath the cursor
//! (unlock clears it, a failed exchange restores it), so callers `sync`
//! before using `pos`.

use super::text_wrap::{
    CONTENT_OFFSET_X, CONTENT_OFFSET_Y, floor_char_boundary, inner_width, wrap_line_count,
    wrap_options,
};
use ratatui::layout::Rect;

pub struct CursorState {
    /// Byte offset into the gate's text (0..=len)
    pub pos: usize,
    /// First visible wrapped line when the text outgrows the box
    pub scroll_offset: u16,
    /// Area width from the last render, used for vertical movement
    pub last_width: u16,
}

impl Default for CursorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CursorState {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
            last_width: Self::DEFAULT_WIDTH,
        }
    }

    /// Pulls `pos` back inside `buffer` after the gate changed it.
    pub fn sync(&mut self, buffer: &str) {
        self.pos = floor_char_boundary(buffer, self.pos);
    }

    pub fn move_to_end(&mut self, buffer: &str) {
        self.pos = buffer.len();
    }

    /// Moves one wrapped line up (`-1`) or down (`1`), keeping the column
    /// where the target line allows. Returns `false` at the first/last line.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16) -> bool {
        let width = inner_width(self.last_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }

        let lines = textwrap::wrap(buffer, wrap_options(width));
        if lines.is_empty() {
            return false;
        }

        // Bytes a wrapped line spans in `buffer`, including a newline after it
        let span_of = |line: &str, start: usize| -> usize {
            let end = start + line.len();
            line.len() + usize::from(buffer.as_bytes().get(end) == Some(&b'\n'))
        };

        let mut start = 0;
        let mut current = lines.len() - 1;
        let mut column = 0;
        for (idx, line) in lines.iter().enumerate() {
            if start + line.len() >= self.pos {
                current = idx;
                column = self.pos - start;
                break;
            }
            start += span_of(line, start);
        }

        let target = match direction {
            d if d < 0 && current > 0 => current - 1,
            d if d > 0 && current + 1 < lines.len() => current + 1,
            _ => return false,
        };

        let target_start = lines
            .iter()
            .take(target)
            .fold(0, |offset, line| offset + span_of(line, offset));
        let target_pos = target_start + column.min(lines[target].len());
        self.pos = floor_char_boundary(buffer, target_pos);
        true
    }

    /// Wrapped line (0-based) holding the cursor.
    pub fn line(&self, buffer: &str, area_width: u16) -> u16 {
        let width = inner_width(area_width);
        if width == 0 {
            return 0;
        }

        let before = &buffer[..self.pos];
        let lines = textwrap::wrap(before, wrap_options(width));
        let mut line = lines.len().saturating_sub(1) as u16;

        // textwrap drops the empty line a trailing newline opens
        if before.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
            line += 1;
        }
        line
    }

    /// Keeps the cursor's line inside the `max_rows` window.
    pub fn update_scroll_offset(&mut self, buffer: &str, area_width: u16, max_rows: u16) {
        let total = wrap_line_count(buffer, inner_width(area_width));
        if total <= max_rows {
            self.scroll_offset = 0;
            return;
        }

        let line = self.line(buffer, area_width);
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if line >= self.scroll_offset + max_rows {
            self.scroll_offset = line + 1 - max_rows;
        }
    }

    /// Screen (column, row) of the cursor inside the input box `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        if width == 0 {
            return (area.x + CONTENT_OFFSET_X, area.y + CONTENT_OFFSET_Y);
        }

        let before = &buffer[..self.pos];

        // Column comes from the current logical line; wrapped output trims
        // trailing spaces, so counting its chars would lose them
        let logical = &before[before.rfind('\n').map_or(0, |i| i + 1)..];
        let segments = textwrap::wrap(logical, wrap_options(width));
        let column = match segments.split_last() {
            None => 0,
            Some((_, earlier)) => {
                let consumed: usize = earlier.iter().map(|s| s.chars().count()).sum();
                logical.chars().count().saturating_sub(consumed) as u16
            }
        };

        let visible_line = self.line(buffer, area.width).saturating_sub(self.scroll_offset);
        (
            area.x + CONTENT_OFFSET_X + column.min(width),
            area.y + CONTENT_OFFSET_Y + visible_line,
        )
    }
}
