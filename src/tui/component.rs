use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// Something drawn into one area of the frame.
///
/// Implementors are built fresh every frame from props and, for stateful
/// views, a borrow of state the adapter keeps (`CardListState`,
/// `IntroState`). `render` takes `&mut self` so it can record card
/// placements and prompt rects that later clicks are hit-tested against.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A view that consumes terminal events.
pub trait EventHandler {
    /// What the view reports upward (`InputEvent::Submit`, a scroll, ...).
    type Event;

    /// Returns `None` when the event was absorbed or ignored.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
