//! Wire types for the answering service.
//!
//! The service is loosely typed: any field may be missing or null, ids can
//! arrive as numbers, and citation sources hide inside `metadata`. Parsing is
//! lenient at the field level and the conversion into [`ResponsePayload`]
//! applies every fallback, so a half-populated answer still renders.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::core::payload::{Citation, MISSING_CONTENT, MISSING_FIELD, ResponsePayload};

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct AskRequest<'a> {
    pub question: &'a str,
}

/// Top-level response body. `modelResult` is required; everything inside it
/// is optional.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AskResponse {
    #[serde(rename = "modelResult")]
    pub model_result: ModelResult,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ModelResult {
    #[serde(default, deserialize_with = "lenient_string")]
    pub question: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "lenient_citations")]
    pub citations: Option<Vec<RawCitation>>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawCitation {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: Option<CitationMetadata>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub page_content: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CitationMetadata {
    #[serde(default, deserialize_with = "lenient_string")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: Option<String>,
}

// ============================================================================
// Lenient field parsing
// ============================================================================

/// Strings pass through, numbers and booleans are stringified, empty strings
/// and anything else count as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }))
}

/// A non-array `citations` is treated as no citations; array entries that
/// are not objects become empty citations (all placeholders).
fn lenient_citations<'de, D>(deserializer: D) -> Result<Option<Vec<RawCitation>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_metadata<'de, D>(deserializer: D) -> Result<Option<CitationMetadata>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

// ============================================================================
// Translation Layer
// ============================================================================

impl From<RawCitation> for Citation {
    fn from(raw: RawCitation) -> Self {
        let metadata = raw.metadata.unwrap_or_default();
        Citation {
            id: raw
                .id
                .or(metadata.id)
                .unwrap_or_else(|| MISSING_FIELD.to_string()),
            source: metadata
                .source
                .unwrap_or_else(|| MISSING_FIELD.to_string()),
            page_content: raw
                .page_content
                .unwrap_or_else(|| MISSING_CONTENT.to_string()),
        }
    }
}

impl From<ModelResult> for ResponsePayload {
    fn from(result: ModelResult) -> Self {
        ResponsePayload {
            question: result.question,
            response: result.response.unwrap_or_default(),
            citations: result
                .citations
                .unwrap_or_default()
                .into_iter()
                .map(Citation::from)
                .collect(),
        }
    }
}

impl From<AskResponse> for ResponsePayload {
    fn from(resp: AskResponse) -> Self {
        resp.model_result.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ResponsePayload {
        serde_json::from_str::<AskResponse>(json).unwrap().into()
    }

    #[test]
    fn request_serializes_question_only() {
        let body = serde_json::to_string(&AskRequest { question: "What is TSI?" }).unwrap();
        assert_eq!(body, r#"{"question":"What is TSI?"}"#);
    }

    #[test]
    fn full_payload() {
        let payload = parse(
            r#"{"modelResult": {
                "question": "echo",
                "response": "**Hi**",
                "citations": [
                    {"id": "c1", "metadata": {"source": "docs/a.pdf", "id": "m1"}, "page_content": "text"}
                ]
            }}"#,
        );
        assert_eq!(payload.question.as_deref(), Some("echo"));
        assert_eq!(payload.response, "**Hi**");
        assert_eq!(
            payload.citations,
            vec![Citation {
                id: "c1".into(),
                source: "docs/a.pdf".into(),
                page_content: "text".into(),
            }]
        );
    }

    #[test]
    fn empty_model_result_defaults() {
        let payload = parse(r#"{"modelResult": {}}"#);
        assert_eq!(payload.question, None);
        assert_eq!(payload.response, "");
        assert!(payload.citations.is_empty());
    }

    #[test]
    fn nulls_are_absent() {
        let payload = parse(r#"{"modelResult": {"question": null, "response": null, "citations": null}}"#);
        assert_eq!(payload.response, "");
        assert!(payload.citations.is_empty());
    }

    #[test]
    fn citation_id_falls_back_to_metadata_then_placeholder() {
        let payload = parse(
            r#"{"modelResult": {"citations": [
                {"metadata": {"id": "meta-id"}},
                {"id": "", "metadata": {"source": ""}},
                {}
            ]}}"#,
        );
        let ids: Vec<&str> = payload.citations.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["meta-id", "N/A", "N/A"]);
        assert!(payload.citations.iter().all(|c| c.source == "N/A"));
        assert!(payload.citations.iter().all(|c| c.page_content == "No content available."));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let payload = parse(r#"{"modelResult": {"citations": [{"id": 42, "page_content": "p"}]}}"#);
        assert_eq!(payload.citations[0].id, "42");
    }

    #[test]
    fn malformed_citation_entries_render_placeholders() {
        let payload = parse(r#"{"modelResult": {"citations": ["oops", {"metadata": "nope"}]}}"#);
        assert_eq!(payload.citations, vec![Citation::default(), Citation::default()]);
    }

    #[test]
    fn non_array_citations_mean_none() {
        let payload = parse(r#"{"modelResult": {"response": "a", "citations": "x"}}"#);
        assert!(payload.citations.is_empty());
    }

    #[test]
    fn missing_model_result_is_an_error() {
        assert!(serde_json::from_str::<AskResponse>(r#"{"status": "ok"}"#).is_err());
        assert!(serde_json::from_str::<AskResponse>(r#"{"modelResult": null}"#).is_err());
    }
}
