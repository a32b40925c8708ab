//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::api::{Transport, TransportError};
use crate::core::controller::ConversationController;
use crate::core::format::CmarkFormatter;
use crate::core::gate::DEFAULT_MAX_HEIGHT;
use crate::core::payload::{Citation, ResponsePayload};
use crate::core::timer::{Clock, DEFAULT_CADENCE};

/// A clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().unwrap() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap()
    }
}

pub fn citation(id: &str, source: &str, content: &str) -> Citation {
    Citation {
        id: id.to_string(),
        source: source.to_string(),
        page_content: content.to_string(),
    }
}

pub fn payload(response: &str, citations: Vec<Citation>) -> ResponsePayload {
    ResponsePayload {
        question: None,
        response: response.to_string(),
        citations,
    }
}

/// A controller on a manual clock with the default formatter and cadence.
pub fn controller() -> (Arc<ManualClock>, ConversationController) {
    let clock = Arc::new(ManualClock::new());
    let ctl = ConversationController::new(
        clock.clone(),
        Arc::new(CmarkFormatter),
        DEFAULT_CADENCE,
        DEFAULT_MAX_HEIGHT,
    );
    (clock, ctl)
}

/// Replies with a fixed result and records every question it was asked.
pub struct MockTransport {
    reply: Result<ResponsePayload, TransportError>,
    asked: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new(reply: Result<ResponsePayload, TransportError>) -> Self {
        Self {
            reply,
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn ask(&self, question: &str) -> Result<ResponsePayload, TransportError> {
        self.asked.lock().unwrap().push(question.to_string());
        self.reply.clone()
    }
}
