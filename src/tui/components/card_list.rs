//! # CardList Component
//!
//! Scrollable conversation log, newest card on top.
//!
//! `CardList` is transient (built each frame from `&mut CardListState` and the
//! controller's cards). During render it measures every card, records where
//! each one landed, and keeps a cache of markdown already converted to
//! terminal text. Mouse clicks are resolved against those placements by
//! [`CardListState::hit_test`], which turns a screen cell into a
//! [`CardEvent`] for the controller.

use std::collections::HashMap;
use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Text;
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::card::{Card, CardId};
use crate::core::interaction::{CardEvent, CardEventKind};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::card::{CardLayout, CardWidget};
use crate::tui::event::TuiEvent;
use crate::tui::markdown;

const EMPTY_HINT: &str = "No answers yet. Ask a question below.";

#[derive(Debug, Clone)]
struct PlacedCard {
    id: CardId,
    top: u16,
    layout: CardLayout,
}

impl PlacedCard {
    fn bottom(&self) -> u16 {
        self.top.saturating_add(self.layout.height)
    }
}

/// Result of a click on the list: the card under the cursor, and the
/// interaction if the click landed on a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardHit {
    pub card: CardId,
    pub kind: Option<CardEventKind>,
}

impl CardHit {
    pub fn event(self) -> Option<CardEvent> {
        self.kind.map(|kind| CardEvent::new(self.card, kind))
    }
}

pub struct CardListState {
    pub scroll_state: ScrollViewState,
    /// Card highlighted in card mode
    pub selected: Option<CardId>,
    placed: Vec<PlacedCard>,
    rendered: HashMap<CardId, Text<'static>>,
    viewport: Rect,
    newest_seen: Option<CardId>,
}

impl Default for CardListState {
    fn default() -> Self {
        Self::new()
    }
}

impl CardListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            selected: None,
            placed: Vec::new(),
            rendered: HashMap::new(),
            viewport: Rect::default(),
            newest_seen: None,
        }
    }

    fn total_height(&self) -> u16 {
        self.placed.last().map_or(0, PlacedCard::bottom)
    }

    pub fn clamp_scroll(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport.height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scrolls so the selected card is visible, aligning its top edge when it
    /// is taller than the viewport.
    pub fn scroll_to_selected(&mut self) {
        let Some(placed) = self
            .selected
            .and_then(|id| self.placed.iter().find(|p| p.id == id))
        else {
            return;
        };
        let (top, bottom) = (placed.top, placed.bottom());
        let offset_y = self.scroll_state.offset().y;

        if top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: top });
        } else if bottom > offset_y.saturating_add(self.viewport.height) {
            let y = bottom.saturating_sub(self.viewport.height).min(top);
            self.scroll_state.set_offset(Position { x: 0, y });
        }
    }

    /// Moves the selection one card down the log. Starts at the newest card.
    pub fn select_next(&mut self, cards: &[Card]) {
        self.step_selection(cards, 1);
    }

    pub fn select_prev(&mut self, cards: &[Card]) {
        self.step_selection(cards, -1);
    }

    fn step_selection(&mut self, cards: &[Card], step: isize) {
        let live: Vec<CardId> = cards.iter().filter(|c| !c.is_leaving()).map(|c| c.id).collect();
        let Some(&first) = live.first() else {
            self.selected = None;
            return;
        };
        let next = match self.selected.and_then(|id| live.iter().position(|&l| l == id)) {
            Some(idx) => {
                let target = idx.saturating_add_signed(step).min(live.len() - 1);
                live[target]
            }
            None => first,
        };
        self.selected = Some(next);
        self.scroll_to_selected();
    }

    /// Resolves a screen cell to the card under it.
    pub fn hit_test(&self, col: u16, row: u16) -> Option<CardHit> {
        if !self.viewport.contains(Position { x: col, y: row }) {
            return None;
        }
        let x = col - self.viewport.x;
        let y = (row - self.viewport.y).saturating_add(self.scroll_state.offset().y);

        let placed = self.placed.iter().find(|p| (p.top..p.bottom()).contains(&y))?;
        Some(CardHit {
            card: placed.id,
            kind: placed.layout.hit(x, y - placed.top),
        })
    }

    /// Converts new answers to terminal text and forgets removed ones.
    fn refresh_rendered(&mut self, cards: &[Card]) {
        self.rendered
            .retain(|id, _| cards.iter().any(|card| card.id == *id));
        for card in cards {
            self.rendered
                .entry(card.id)
                .or_insert_with(|| markdown::render(&card.response.markdown, Color::White));
        }
    }

    fn follow_newest(&mut self, cards: &[Card]) {
        let newest = cards.first().map(|c| c.id);
        if newest.is_some() && newest != self.newest_seen {
            self.scroll_state.set_offset(Position::ORIGIN);
        }
        self.newest_seen = newest;

        if self
            .selected
            .is_some_and(|id| !cards.iter().any(|c| c.id == id && !c.is_leaving()))
        {
            self.selected = None;
        }
    }
}

impl EventHandler for CardListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => self.scroll_state.scroll_up(),
            TuiEvent::ScrollDown => self.scroll_state.scroll_down(),
            TuiEvent::ScrollPageUp => self.scroll_state.scroll_page_up(),
            TuiEvent::ScrollPageDown => self.scroll_state.scroll_page_down(),
            _ => return None,
        }
        self.clamp_scroll();
        None
    }
}

pub struct CardList<'a> {
    pub state: &'a mut CardListState,
    pub cards: &'a [Card],
    pub now: Instant,
}

impl<'a> CardList<'a> {
    pub fn new(state: &'a mut CardListState, cards: &'a [Card], now: Instant) -> Self {
        Self { state, cards, now }
    }
}

impl Component for CardList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.viewport = area;
        self.state.follow_newest(self.cards);
        self.state.refresh_rendered(self.cards);

        if self.cards.is_empty() {
            self.state.placed.clear();
            let hint = Paragraph::new(EMPTY_HINT)
                .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM))
                .alignment(Alignment::Center);
            frame.render_widget(hint, area);
            return;
        }

        // 1. Measure
        let content_width = area.width.saturating_sub(1); // scrollbar
        let empty = Text::default();
        let mut top = 0u16;
        self.state.placed = self
            .cards
            .iter()
            .map(|card| {
                let response = self.state.rendered.get(&card.id).unwrap_or(&empty);
                let layout = CardLayout::measure(card, response, content_width);
                let placed = PlacedCard {
                    id: card.id,
                    top,
                    layout,
                };
                top = top.saturating_add(placed.layout.height);
                placed
            })
            .collect();
        self.state.clamp_scroll();

        // 2. Draw cards that intersect the viewport
        let total_height = self.state.total_height();
        let offset_y = self.state.scroll_state.offset().y;
        let visible = offset_y..offset_y.saturating_add(area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for (card, placed) in self.cards.iter().zip(&self.state.placed) {
            if placed.bottom() <= visible.start || placed.top >= visible.end {
                continue;
            }
            let response = self.state.rendered.get(&card.id).unwrap_or(&empty);
            let widget = CardWidget {
                card,
                response,
                layout: &placed.layout,
                selected: self.state.selected == Some(card.id),
                fade: card.exit_progress(self.now),
            };
            let rect = Rect::new(0, placed.top, content_width, placed.layout.height);
            scroll_view.render_widget(widget, rect);
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}
