//! HTML escaping for untrusted text.
//!
//! Everything that did not come out of the markdown formatter (the question,
//! citation fields, attribute values) passes through [`escape`] before it is
//! written as markup.

/// Returns `text` with every character that could be read as markup replaced
/// by its entity. Total: every input has an output, `""` maps to `""`.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
