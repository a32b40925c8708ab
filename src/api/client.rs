//! HTTP transport to the answering service.
//!
//! One endpoint: `POST {base_url}{endpoint}` with `{"question": ...}`. Any
//! network failure, non-success status, or unreadable body comes back as a
//! [`TransportError`]; the controller treats them all alike.

use std::fmt;

use async_trait::async_trait;
use log::{debug, info, warn};

use super::types::{AskRequest, AskResponse};
use crate::core::payload::ResponsePayload;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ENDPOINT: &str = "/api/ask";

/// Errors from one exchange with the service.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Connection refused, DNS, reset, or the body could not be read.
    Network(String),
    /// The service answered with a non-success status.
    Status { status: u16, body: String },
    /// The body was not the expected JSON shape.
    Parse(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Network(msg) => write!(f, "network error: {msg}"),
            TransportError::Status { status, body } => {
                write!(f, "service error (HTTP {status}): {body}")
            }
            TransportError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for TransportError {}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Asks one question and returns the normalised payload.
    async fn ask(&self, question: &str) -> Result<ResponsePayload, TransportError>;
}

pub struct HttpTransport {
    url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, endpoint: &str) -> Self {
        let url = format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Self {
            url,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn ask(&self, question: &str) -> Result<ResponsePayload, TransportError> {
        info!("Asking {} ({} chars)", self.url, question.len());

        let response = self
            .client
            .post(&self.url)
            .json(&AskRequest { question })
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Service response status: {}", status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("Service error: {} - {}", status.as_u16(), body);
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        debug!("Service response body: {} bytes", body.len());

        let parsed: AskResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!("Malformed service response: {}", e);
            TransportError::Parse(e.to_string())
        })?;

        let payload = ResponsePayload::from(parsed);
        info!(
            "Answer received: {} chars, {} citations",
            payload.response.len(),
            payload.citations.len()
        );
        Ok(payload)
    }
}
