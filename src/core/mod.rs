//! # Core Application Logic
//!
//! The assistant's conversation logic. It knows nothing about any specific
//! UI technology.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │            CORE             │
//!                    │       (this module)         │
//!                    │                             │
//!                    │  • ConversationController   │
//!                    │  • Action → update → Effect │
//!                    │  • Cards, timer, gate       │
//!                    │                             │
//!                    │  No I/O. No UI. Clock is    │
//!                    │  injected.                  │
//!                    └──────────────┬──────────────┘
//!                                   │
//!                   ┌───────────────┴──────────────┐
//!                   ▼                              ▼
//!            ┌────────────┐                 ┌────────────┐
//!            │    TUI     │                 │    HTML    │
//!            │  Adapter   │                 │   markup   │
//!            │ (ratatui)  │                 │ (to_markup)│
//!            └────────────┘                 └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`controller`]: submission state machine and the card log
//! - [`action`]: the `Action` enum and the `update()` reducer
//! - [`card`]: cards and the renderer that builds them
//! - [`timer`]: request timer with an injected clock
//! - [`gate`]: input entry state
//! - [`markup`], [`escape`], [`format`]: HTML building blocks

pub mod action;
pub mod card;
pub mod config;
pub mod controller;
pub mod escape;
pub mod format;
pub mod gate;
pub mod interaction;
pub mod markup;
pub mod payload;
pub mod timer;
