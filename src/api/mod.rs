pub mod client;
pub mod types;

pub use client::{DEFAULT_BASE_URL, DEFAULT_ENDPOINT, HttpTransport, Transport, TransportError};
pub use types::{AskRequest, AskResponse};
