//! Card interaction events.
//!
//! Every interaction with a rendered card is addressed by `(kind, card id)`
//! and handled in one place, [`ConversationController::handle_card_event`],
//! rather than by handlers bound to each card. Cards come and go during the
//! session; the handler never does.
//!
//! [`ConversationController::handle_card_event`]: crate::core::controller::ConversationController::handle_card_event

use crate::core::card::CardId;

/// Where inside a card header a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderTarget {
    /// Question text or empty header space.
    Body,
    /// The expand/collapse chevron.
    Toggle,
    /// The close control. Dismisses and stops there.
    Dismiss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEventKind {
    HeaderClick(HeaderTarget),
    Dismiss,
    ToggleSources,
    SelectCitation(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardEvent {
    pub card: CardId,
    pub kind: CardEventKind,
}

impl CardEvent {
    pub fn new(card: CardId, kind: CardEventKind) -> Self {
        Self { card, kind }
    }
}
