//! # Conversation Controller
//!
//! The submission state machine and the card log. One instance per session,
//! owned by the adapter's event loop and passed by reference to whatever
//! handles an event. No globals.
//!
//! ```text
//!            submit(text)                 resolve(Ok)  → card prepended
//!   ┌──────┐ ───────────────▶ ┌─────────┐ ───────────────────────────┐
//!   │ Idle │                  │ Pending │                            │
//!   └──────┘ ◀─────────────── └─────────┘ ───────────────────────────┘
//!        ▲     resolve(Err)  → failure notice, no card              │
//!        └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Every exit from `Pending` stops the timer, hides the loading indicator,
//! and unlocks the gate, exactly once.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::api::TransportError;
use crate::core::card::{Card, CardId, CardRenderer};
use crate::core::format::MarkdownFormatter;
use crate::core::gate::InputGate;
use crate::core::interaction::{CardEvent, CardEventKind, HeaderTarget};
use crate::core::payload::{Question, ResponsePayload};
use crate::core::timer::{Clock, Elapsed, SessionHandle, TimerService};

pub const FAILURE_NOTICE: &str = "Something went wrong. Please make sure the server is running.";

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Pending {
        question: Question,
        timer: SessionHandle,
    },
}

pub struct ConversationController {
    clock: Arc<dyn Clock>,
    epoch: Instant,
    renderer: CardRenderer,
    timer: TimerService,
    gate: InputGate,
    state: SubmissionState,
    /// Most recent first.
    cards: Vec<Card>,
    last_card_id: Option<CardId>,
    intro_visible: bool,
    loading: bool,
    elapsed_notice: Option<Elapsed>,
    failure_notice: Option<&'static str>,
}

impl ConversationController {
    pub fn new(
        clock: Arc<dyn Clock>,
        formatter: Arc<dyn MarkdownFormatter>,
        timer_cadence: Duration,
        max_input_height: u16,
    ) -> Self {
        let epoch = clock.now();
        Self {
            timer: TimerService::new(clock.clone(), timer_cadence),
            clock,
            epoch,
            renderer: CardRenderer::new(formatter),
            gate: InputGate::new(max_input_height),
            state: SubmissionState::Idle,
            cards: Vec::new(),
            last_card_id: None,
            intro_visible: true,
            loading: false,
            elapsed_notice: None,
            failure_notice: None,
        }
    }

    // ── Read access ─────────────────────────────────────────────────────

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SubmissionState::Pending { .. })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn card(&self, id: CardId) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn gate(&self) -> &InputGate {
        &self.gate
    }

    pub fn gate_mut(&mut self) -> &mut InputGate {
        &mut self.gate
    }

    pub fn intro_visible(&self) -> bool {
        self.intro_visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Live elapsed time while a question is pending.
    pub fn timer_display(&self) -> Option<&str> {
        self.timer.display()
    }

    pub fn elapsed_notice(&self) -> Option<Elapsed> {
        self.elapsed_notice
    }

    pub fn failure_notice(&self) -> Option<&'static str> {
        self.failure_notice
    }

    /// True while something on screen changes without user input.
    pub fn is_animating(&self) -> bool {
        self.is_pending() || self.cards.iter().any(Card::is_leaving)
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    // ── Submission lifecycle ────────────────────────────────────────────

    /// `Idle → Pending`. Returns the question to dispatch, or `None` when the
    /// text is blank or a question is already pending.
    pub fn submit(&mut self, text: &str) -> Option<Question> {
        let question = Question::parse(text)?;
        if self.is_pending() || self.gate.is_locked() {
            debug!("Submit ignored: a question is already pending");
            return None;
        }

        if self.intro_visible {
            self.intro_visible = false;
            debug!("Intro panel hidden");
        }

        self.gate.lock();
        let timer = self.timer.start();
        self.elapsed_notice = None;
        self.failure_notice = None;
        self.loading = true;
        let collapsed = self.collapse_all();

        info!(
            "Submitting question ({} chars), collapsed {} card(s)",
            question.as_str().len(),
            collapsed
        );
        self.state = SubmissionState::Pending {
            question: question.clone(),
            timer,
        };
        Some(question)
    }

    /// `Pending → Idle` on either outcome. Ignored when nothing is pending.
    pub fn resolve(&mut self, result: Result<ResponsePayload, TransportError>) {
        let SubmissionState::Pending { question, timer } =
            std::mem::replace(&mut self.state, SubmissionState::Idle)
        else {
            warn!("Resolution arrived with no pending question; ignoring");
            return;
        };

        let elapsed = match self.timer.stop(timer) {
            Ok(elapsed) => Some(elapsed),
            Err(e) => {
                warn!("Timer stop failed: {}", e);
                None
            }
        };
        self.loading = false;

        match result {
            Ok(payload) => {
                self.elapsed_notice = elapsed;
                self.gate.unlock();
                let id = self.next_card_id();
                let card = self.renderer.render(id, question.as_str(), &payload);
                info!(
                    "Answer rendered as {} in {}",
                    id,
                    elapsed.map(|e| e.to_string()).unwrap_or_else(|| "?".into())
                );
                self.cards.insert(0, card);
            }
            Err(e) => {
                warn!("Question failed: {}", e);
                self.gate.unlock();
                self.gate.restore(question.as_str());
                self.failure_notice = Some(FAILURE_NOTICE);
            }
        }
    }

    pub fn acknowledge_failure(&mut self) {
        self.failure_notice = None;
    }

    /// Collapses exactly the cards that are expanded right now. Returns how
    /// many changed; a second call returns 0. Leaving cards are skipped.
    pub fn collapse_all(&mut self) -> usize {
        let mut changed = 0;
        for card in self.cards.iter_mut().filter(|c| !c.is_leaving()) {
            if card.collapse() {
                changed += 1;
            }
        }
        changed
    }

    fn next_card_id(&mut self) -> CardId {
        let millis = self.clock.now().saturating_duration_since(self.epoch).as_millis() as u64;
        let id = CardId::at(millis, self.last_card_id);
        self.last_card_id = Some(id);
        id
    }

    // ── Card interactions ───────────────────────────────────────────────

    /// Delegated handler for every card interaction. Returns whether any
    /// state changed. Unknown or leaving cards ignore events.
    pub fn handle_card_event(&mut self, event: CardEvent) -> bool {
        let now = self.clock.now();
        let Some(card) = self
            .cards
            .iter_mut()
            .find(|c| c.id == event.card && !c.is_leaving())
        else {
            debug!("Card event {:?} for missing or leaving card", event);
            return false;
        };

        match event.kind {
            CardEventKind::HeaderClick(HeaderTarget::Dismiss) | CardEventKind::Dismiss => {
                card.begin_exit(now);
                info!("{} dismissed", card.id);
                true
            }
            CardEventKind::HeaderClick(HeaderTarget::Body | HeaderTarget::Toggle) => {
                card.toggle();
                true
            }
            CardEventKind::ToggleSources => match card.sources.as_mut() {
                Some(sources) => {
                    sources.toggle();
                    true
                }
                None => false,
            },
            CardEventKind::SelectCitation(index) => card
                .sources
                .as_mut()
                .is_some_and(|sources| sources.select(index)),
        }
    }

    // ── Clock-driven work ───────────────────────────────────────────────

    /// Samples the request timer and removes cards whose exit finished.
    /// Returns whether anything visible changed.
    pub fn tick(&mut self) -> bool {
        let sampled = self.timer.tick().is_some();
        let now = self.clock.now();
        let before = self.cards.len();
        self.cards.retain(|c| !c.exit_finished(now));
        let purged = before - self.cards.len();
        if purged > 0 {
            debug!("Removed {} dismissed card(s)", purged);
        }
        sampled || purged > 0 || self.cards.iter().any(Card::is_leaving)
    }
}
