//! # Response Cards
//!
//! A [`Card`] is one question/answer exchange in the conversation log. The
//! [`CardRenderer`] builds it from a [`ResponsePayload`]; afterwards only the
//! card's own interaction state changes (expanded, sources expanded, active
//! citation, leaving). Cards never touch each other.
//!
//! ```text
//! Card
//! ├── header: question + toggle + dismiss
//! └── body (collapsible)
//!     ├── response (formatted markdown, trusted)
//!     └── sources (only when citations exist, collapsible)
//!         ├── tabs:   Source 1 | Source 2 | ...
//!         └── panels: ID / Source / Page Content
//! ```
//!
//! Two adapters read the same structure: [`Card::to_markup`] for HTML, and the
//! terminal card widget which walks the fields directly.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::core::format::MarkdownFormatter;
use crate::core::markup::{Element, Node};
use crate::core::payload::{Citation, ResponsePayload};

/// How long a dismissed card stays in the log while it fades out.
pub const EXIT_TRANSITION: Duration = Duration::from_millis(300);

/// Card identifier taken from the session clock at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(u64);

impl CardId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Id for a card created at `millis` on the session clock. Two cards
    /// created within the same millisecond get consecutive ids.
    pub fn at(millis: u64, previous: Option<CardId>) -> Self {
        match previous {
            Some(prev) if millis <= prev.0 => Self(prev.0.saturating_add(1)),
            _ => Self(millis),
        }
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card-{}", self.0)
    }
}

/// The answer body: original markdown (for the terminal renderer) and the
/// formatter's markup (for HTML).
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseBody {
    pub markdown: String,
    pub markup: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CitationEntry {
    /// "Source N", 1-based.
    pub label: String,
    pub citation: Citation,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourcesSection {
    pub expanded: bool,
    entries: Vec<CitationEntry>,
}

impl SourcesSection {
    fn new(citations: &[Citation]) -> Option<Self> {
        if citations.is_empty() {
            return None;
        }
        let entries = citations
            .iter()
            .enumerate()
            .map(|(idx, citation)| CitationEntry {
                label: format!("Source {}", idx + 1),
                citation: citation.clone(),
                active: idx == 0,
            })
            .collect();
        Some(Self {
            expanded: false,
            entries,
        })
    }

    pub fn entries(&self) -> &[CitationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.entries.iter().position(|e| e.active).unwrap_or(0)
    }

    pub fn active(&self) -> &CitationEntry {
        &self.entries[self.active_index()]
    }

    /// Makes entry `index` the only active one. Out-of-range indices are
    /// ignored and return `false`.
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.active = i == index;
        }
        true
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub question: String,
    pub response: ResponseBody,
    pub sources: Option<SourcesSection>,
    pub expanded: bool,
    leaving_since: Option<Instant>,
}

impl Card {
    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    /// Returns whether the card was expanded before.
    pub fn collapse(&mut self) -> bool {
        std::mem::replace(&mut self.expanded, false)
    }

    pub fn is_leaving(&self) -> bool {
        self.leaving_since.is_some()
    }

    pub(crate) fn begin_exit(&mut self, at: Instant) {
        self.leaving_since.get_or_insert(at);
    }

    /// Fade-out progress in `0.0..=1.0`, or `None` while the card is live.
    pub fn exit_progress(&self, now: Instant) -> Option<f32> {
        self.leaving_since.map(|since| {
            let elapsed = now.saturating_duration_since(since);
            (elapsed.as_secs_f32() / EXIT_TRANSITION.as_secs_f32()).min(1.0)
        })
    }

    pub(crate) fn exit_finished(&self, now: Instant) -> bool {
        self.leaving_since
            .is_some_and(|since| now.saturating_duration_since(since) >= EXIT_TRANSITION)
    }

    /// Builds the card's element tree from its current state.
    pub fn to_markup(&self) -> Element {
        let header = Element::div()
            .class("card-header")
            .child(
                Element::button()
                    .class("card-toggle")
                    .attr("title", "Expand / Collapse"),
            )
            .child(Element::div().class("card-question").text(&self.question))
            .child(
                Element::button()
                    .class("card-close")
                    .attr("title", "Close card"),
            );

        let mut body = Element::div().class("card-body").child(
            Element::div()
                .class("response-content")
                .child(Node::trusted(&self.response.markup)),
        );
        if let Some(sources) = &self.sources {
            body = body.child(sources_markup(sources));
        }

        Element::div()
            .class("response-card")
            .class_if("expanded", self.expanded)
            .class_if("leaving", self.is_leaving())
            .attr("id", self.id.to_string())
            .child(header)
            .child(body)
    }
}

fn sources_markup(sources: &SourcesSection) -> Element {
    let tabs = sources.entries.iter().enumerate().map(|(idx, entry)| {
        Element::button()
            .class("citation-tab")
            .class_if("active", entry.active)
            .attr("data-idx", idx.to_string())
            .text(&entry.label)
    });

    let panels = sources.entries.iter().enumerate().map(|(idx, entry)| {
        Element::div()
            .class("citation-panel")
            .class_if("active", entry.active)
            .attr("data-idx", idx.to_string())
            .child(cite_field("ID", &entry.citation.id, false))
            .child(cite_field("Source", &entry.citation.source, false))
            .child(cite_field("Page Content", &entry.citation.page_content, true))
    });

    Element::div()
        .class("sources-section")
        .class_if("expanded", sources.expanded)
        .child(
            Element::div()
                .class("sources-header")
                .child(Element::div().class("sources-label").text("Sources"))
                .child(
                    Element::button()
                        .class("sources-toggle")
                        .attr("title", "Show sources"),
                ),
        )
        .child(
            Element::div()
                .class("sources-body")
                .child(Element::div().class("citation-tabs").children(tabs))
                .child(Element::div().class("citation-panels").children(panels)),
        )
}

fn cite_field(label: &str, value: &str, page_content: bool) -> Element {
    Element::div()
        .class("cite-field")
        .child(Element::div().class("cite-field-label").text(label))
        .child(
            Element::div()
                .class("cite-field-value")
                .class_if("page-content", page_content)
                .text(value),
        )
}

/// Turns payloads into cards. Pure apart from the formatter it holds.
#[derive(Clone)]
pub struct CardRenderer {
    formatter: Arc<dyn MarkdownFormatter>,
}

impl CardRenderer {
    pub fn new(formatter: Arc<dyn MarkdownFormatter>) -> Self {
        Self { formatter }
    }

    /// Renders a new, expanded card. `question` is what the user submitted
    /// and always replaces whatever the payload echoed back.
    pub fn render(&self, id: CardId, question: &str, payload: &ResponsePayload) -> Card {
        Card {
            id,
            question: question.to_string(),
            response: ResponseBody {
                markdown: payload.response.clone(),
                markup: self.formatter.format(&payload.response),
            },
            sources: SourcesSection::new(&payload.citations),
            expanded: true,
            leaving_since: None,
        }
    }
}

impl fmt::Debug for CardRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRenderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::format::CmarkFormatter;
    use crate::test_support::{citation, payload};

    fn renderer() -> CardRenderer {
        CardRenderer::new(Arc::new(CmarkFormatter))
    }

    #[test]
    fn card_id_uses_clock_reading() {
        assert_eq!(CardId::at(1500, None), CardId::new(1500));
        assert_eq!(CardId::at(1500, Some(CardId::new(1200))), CardId::new(1500));
    }

    #[test]
    fn card_id_collision_bumps_past_previous() {
        assert_eq!(CardId::at(1500, Some(CardId::new(1500))), CardId::new(1501));
        assert_eq!(CardId::at(1400, Some(CardId::new(1500))), CardId::new(1501));
        assert_eq!(CardId::new(42).to_string(), "card-42");
    }

    #[test]
    fn submitted_question_wins_over_echo() {
        let mut p = payload("answer", vec![]);
        p.question = Some("server echo".into());
        let card = renderer().render(CardId::new(1), "What is TSI?", &p);
        assert_eq!(card.question, "What is TSI?");
        let markup = card.to_markup();
        assert_eq!(markup.find_class("card-question").unwrap().text_content(), "What is TSI?");
    }

    #[test]
    fn new_card_starts_expanded() {
        let card = renderer().render(CardId::new(1), "q", &payload("a", vec![]));
        assert!(card.expanded);
        assert!(!card.is_leaving());
        assert!(card.to_markup().has_class("expanded"));
    }

    #[test]
    fn zero_citations_means_no_sources_section() {
        let card = renderer().render(CardId::new(1), "q", &payload("a", vec![]));
        assert!(card.sources.is_none());
        assert!(card.to_markup().find_class("sources-section").is_none());
    }

    #[test]
    fn response_markdown_is_formatted_and_trusted() {
        let card = renderer().render(CardId::new(1), "q", &payload("**Hi**", vec![]));
        let html = card.to_markup().to_string();
        assert!(html.contains(r#"<div class="response-content"><p><strong>Hi</strong></p>"#), "{html}");
        assert_eq!(card.response.markdown, "**Hi**");
    }

    #[test]
    fn empty_response_renders_empty_content() {
        let card = renderer().render(CardId::new(1), "q", &payload("", vec![]));
        let markup = card.to_markup();
        assert_eq!(markup.find_class("response-content").unwrap().text_content(), "");
    }

    #[test]
    fn citations_produce_tabs_and_panels_with_first_active() {
        let cites = vec![
            citation("doc-1", "manual.pdf", "first page"),
            citation("doc-2", "guide.pdf", "second page"),
            citation("doc-3", "faq.md", "third page"),
        ];
        let card = renderer().render(CardId::new(1), "q", &payload("a", cites));
        let markup = card.to_markup();

        let tabs = markup.find_all_class("citation-tab");
        let panels = markup.find_all_class("citation-panel");
        assert_eq!(tabs.len(), 3);
        assert_eq!(panels.len(), 3);

        let labels: Vec<String> = tabs.iter().map(|t| t.text_content()).collect();
        assert_eq!(labels, ["Source 1", "Source 2", "Source 3"]);

        for (idx, (tab, panel)) in tabs.iter().zip(&panels).enumerate() {
            assert_eq!(tab.has_class("active"), idx == 0);
            assert_eq!(panel.has_class("active"), idx == 0);
            assert_eq!(panel.attr_value("data-idx"), Some(idx.to_string().as_str()));
        }

        let values: Vec<String> = panels[1]
            .find_all_class("cite-field-value")
            .iter()
            .map(|v| v.text_content())
            .collect();
        assert_eq!(values, ["doc-2", "guide.pdf", "second page"]);
    }

    #[test]
    fn sources_section_starts_collapsed() {
        let card = renderer().render(CardId::new(1), "q", &payload("a", vec![citation("i", "s", "c")]));
        let sources = card.sources.as_ref().unwrap();
        assert!(!sources.expanded);
        assert!(!card.to_markup().find_class("sources-section").unwrap().has_class("expanded"));
    }

    #[test]
    fn untrusted_fields_are_escaped_in_html() {
        let cites = vec![citation("<id>", "a&b.pdf", "<script>x</script>")];
        let card = renderer().render(CardId::new(1), "<b>bold?</b>", &payload("a", cites));
        let html = card.to_markup().to_string();
        assert!(html.contains("&lt;b&gt;bold?&lt;/b&gt;"));
        assert!(html.contains("&lt;id&gt;"));
        assert!(html.contains("a&amp;b.pdf"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn select_keeps_exactly_one_active() {
        let cites = (0..4).map(|i| citation(&i.to_string(), "s", "c")).collect();
        let mut card = renderer().render(CardId::new(1), "q", &payload("a", cites));
        let sources = card.sources.as_mut().unwrap();
        for k in 0..4 {
            assert!(sources.select(k));
            assert_eq!(sources.active_index(), k);
            assert_eq!(sources.entries().iter().filter(|e| e.active).count(), 1);
        }
    }

    #[test]
    fn select_out_of_range_is_ignored() {
        let cites = vec![citation("a", "s", "c"), citation("b", "s", "c")];
        let mut card = renderer().render(CardId::new(1), "q", &payload("a", cites));
        let sources = card.sources.as_mut().unwrap();
        sources.select(1);
        assert!(!sources.select(2));
        assert_eq!(sources.active_index(), 1);
    }

    #[test]
    fn collapse_reports_previous_state() {
        let mut card = renderer().render(CardId::new(1), "q", &payload("a", vec![]));
        assert!(card.collapse());
        assert!(!card.collapse());
        assert!(!card.expanded);
    }

    #[test]
    fn exit_transition_finishes_after_duration() {
        let mut card = renderer().render(CardId::new(1), "q", &payload("a", vec![]));
        let t0 = Instant::now();
        card.begin_exit(t0);
        assert!(card.is_leaving());
        assert!(!card.exit_finished(t0 + Duration::from_millis(299)));
        assert!(card.exit_finished(t0 + EXIT_TRANSITION));
        assert_eq!(card.exit_progress(t0 + Duration::from_secs(5)), Some(1.0));
    }
}
