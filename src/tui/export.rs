//! Transcript export.
//!
//! Writes the conversation log as a standalone HTML page. Each card is
//! serialized from [`Card::to_markup`], so the page shows exactly what the
//! log holds: collapsed cards stay collapsed, and only the active citation
//! panel is visible.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use log::info;

use crate::core::card::Card;
use crate::core::markup::Element;

const PAGE_TITLE: &str = "TSI Assistant transcript";

const STYLESHEET: &str = "\
body { font-family: sans-serif; max-width: 50rem; margin: 2rem auto; }
.generated { color: #777; }
.response-card { border: 1px solid #ccc; border-radius: 8px; margin: 1rem 0; padding: 0.5rem 1rem; }
.card-header { display: flex; align-items: center; gap: 0.5rem; }
.card-question { font-weight: bold; flex: 1; }
.card-toggle, .card-close, .sources-toggle { display: none; }
.response-card:not(.expanded) .card-body { display: none; }
.sources-section:not(.expanded) .sources-body { display: none; }
.citation-tab { border: 1px solid #ccc; background: none; margin-right: 0.25rem; }
.citation-tab.active { background: #ffd54f; }
.citation-panel:not(.active) { display: none; }
.cite-field-label { color: #777; font-size: 0.8rem; }
.page-content { white-space: pre-wrap; font-style: italic; }
";

#[derive(Debug)]
pub enum ExportError {
    Io(PathBuf, std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io(path, e) => write!(f, "cannot write {}: {}", path.display(), e),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io(_, e) => Some(e),
        }
    }
}

/// Builds the transcript page. Cards that are fading out are left out.
pub fn transcript_html(cards: &[Card], generated: DateTime<Local>) -> String {
    let main = Element::new("main")
        .class("conversation")
        .child(Element::new("h1").text(PAGE_TITLE))
        .child(
            Element::new("p")
                .class("generated")
                .text(format!("Generated {}", generated.format("%Y-%m-%d %H:%M:%S"))),
        )
        .children(cards.iter().filter(|c| !c.is_leaving()).map(Card::to_markup));

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n<style>\n{STYLESHEET}</style>\n</head>\n\
         <body>\n{main}\n</body>\n</html>\n"
    )
}

/// Writes the transcript to `path`. Returns how many cards were written.
pub fn write_transcript(path: &Path, cards: &[Card]) -> Result<usize, ExportError> {
    let html = transcript_html(cards, Local::now());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
    }
    fs::write(path, html).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;

    let written = cards.iter().filter(|c| !c.is_leaving()).count();
    info!("Transcript with {} card(s) written to {}", written, path.display());
    Ok(written)
}
