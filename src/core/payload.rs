//! Domain values exchanged between the transport and the card renderer.
//!
//! These are the already-normalised shapes: every fallback for missing wire
//! fields has been applied by the time a [`ResponsePayload`] exists (see
//! `api::types`).

use std::fmt;

/// Placeholder for a citation id or source that the service did not send.
pub const MISSING_FIELD: &str = "N/A";
/// Placeholder for citation page content that the service did not send.
pub const MISSING_CONTENT: &str = "No content available.";

/// A trimmed, non-empty question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question(String);

impl Question {
    /// Returns `None` when `text` is empty after trimming.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        (!trimmed.is_empty()).then(|| Question(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One answer from the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsePayload {
    /// Server echo of the question. Never shown; the submitted text wins.
    pub question: Option<String>,
    /// Markdown answer, possibly empty.
    pub response: String,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Citation {
    pub id: String,
    pub source: String,
    pub page_content: String,
}

impl Default for Citation {
    fn default() -> Self {
        Self {
            id: MISSING_FIELD.to_string(),
            source: MISSING_FIELD.to_string(),
            page_content: MISSING_CONTENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_trimmed() {
        let q = Question::parse("  What is TSI?\n").unwrap();
        assert_eq!(q.as_str(), "What is TSI?");
    }

    #[test]
    fn whitespace_only_is_rejected() {
        for text in ["", " ", "\n\t  ", "\u{3000}"] {
            assert!(Question::parse(text).is_none(), "{text:?} should be rejected");
        }
    }

    #[test]
    fn default_citation_uses_placeholders() {
        let c = Citation::default();
        assert_eq!(c.id, "N/A");
        assert_eq!(c.source, "N/A");
        assert_eq!(c.page_content, "No content available.");
    }
}
