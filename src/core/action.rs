//! # Actions
//!
//! Everything that can happen in the assistant becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Service answers? That's `Action::Resolved(result)`.
//! User clicks a card? That's `Action::Card(event)`.
//!
//! `update()` applies an action to the controller and returns an [`Effect`]
//! describing the I/O the adapter must perform. No side effects here.
//!
//! ```text
//! Controller + Action  →  update()  →  Effect
//! ```

use log::debug;

use crate::api::TransportError;
use crate::core::controller::ConversationController;
use crate::core::interaction::CardEvent;
use crate::core::payload::{Question, ResponsePayload};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Submit(String),
    Resolved(Result<ResponsePayload, TransportError>),
    Card(CardEvent),
    AcknowledgeFailure,
    Tick,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    /// Spawn a transport call for this question.
    Dispatch(Question),
    /// Something changed on screen; redraw.
    Redraw,
    Quit,
}

pub fn update(controller: &mut ConversationController, action: Action) -> Effect {
    match action {
        Action::Submit(text) => match controller.submit(&text) {
            Some(question) => Effect::Dispatch(question),
            None => Effect::None,
        },
        Action::Resolved(result) => {
            controller.resolve(result);
            Effect::Redraw
        }
        Action::Card(event) => {
            if controller.handle_card_event(event) {
                Effect::Redraw
            } else {
                Effect::None
            }
        }
        Action::AcknowledgeFailure => {
            if controller.failure_notice().is_some() {
                controller.acknowledge_failure();
                Effect::Redraw
            } else {
                Effect::None
            }
        }
        Action::Tick => {
            if controller.tick() {
                Effect::Redraw
            } else {
                Effect::None
            }
        }
        Action::Quit => {
            debug!("Quit requested");
            Effect::Quit
        }
    }
}
