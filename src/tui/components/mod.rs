//! # TUI Components
//!
//! Two kinds of component live here:
//!
//! - **Stateless**: every input is a prop set by the parent each frame
//!   (`TitleBar`, `StatusLine`, `Notice`, the `CardWidget`).
//! - **Stateful**: a transient view over persistent state the parent keeps
//!   between frames (`InputBox` over the gate and `CursorState`, `CardList`
//!   over `CardListState`, `IntroPanel` over `IntroState`). Render may update
//!   that state with layout measurements used for hit testing.
//!
//! ```text
//! components/
//! ├── title_bar.rs    server and answer count
//! ├── landing.rs      intro panel with suggested prompts
//! ├── card.rs         one response card: layout + widget
//! ├── card_list.rs    scrollable log of cards, hit testing
//! ├── status_line.rs  spinner, live timer, elapsed notice
//! ├── notice.rs       failure modal
//! └── input_box/      gate-backed question entry
//! ```

pub mod card;
pub mod card_list;
pub mod input_box;
pub mod landing;
mod notice;
mod status_line;
mod title_bar;

pub use card_list::{CardHit, CardList, CardListState};
pub use input_box::{CursorState, InputBox, InputEvent, inner_width};
pub use landing::{IntroPanel, IntroState};
pub use notice::Notice;
pub use status_line::StatusLine;
pub use title_bar::TitleBar;
