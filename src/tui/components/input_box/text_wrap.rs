//! Dimensions and UTF-8 helpers for the input box.
//!
//! Wrapping itself lives with the gate (`core::gate`) so the gate's height
//! and the cursor's placement always agree.

pub(super) use crate::core::gate::{wrap_line_count, wrap_options};

/// Border (2) + padding (2) consumed horizontally by the bordered block
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Offset from area edge to content (border + padding)
pub(super) const CONTENT_OFFSET_X: u16 = 2;
/// Offset from area edge to the first text row
pub(super) const CONTENT_OFFSET_Y: u16 = 1;

/// Text width inside the block. 0 if the area is too narrow.
pub fn inner_width(area_width: u16) -> u16 {
    area_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Byte offset of the character before `pos`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos].char_indices().next_back().map_or(0, |(i, _)| i)
}

/// Byte offset of the character after the one at `pos`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

/// Largest char boundary not past `pos`, clamped to the text.
pub(super) fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
