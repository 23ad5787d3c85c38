//! # Prompt Rendering
//!
//! Combines an instruction template with the leading part of a document's text.
//! Rendering is pure: the same inputs always produce the same prompt.

/// The placeholder marking where the document body is inserted into a template.
///
/// Templates without it receive the body at the end.
pub const DOCUMENT_PLACEHOLDER: &str = "{document}";

/// Returns the longest prefix of `text` containing at most `max_chars` characters.
///
/// Counting is by `char`, so a multi-byte sequence is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Generates the separator placed between the instructions and the document body.
pub fn get_truncation_separator(max_chars: usize) -> String {
    format!("\n\n--- PDF Content Follows (Truncated to first {max_chars} characters):---\n")
}

/// Renders the final prompt sent to a completion backend.
///
/// The result holds the template's instruction text, a separator stating the
/// truncation limit, and the first `max_chars` characters of `document_text`.
/// Only the first `{document}` placeholder is substituted.
pub fn render_prompt(template: &str, document_text: &str, max_chars: usize) -> String {
    let body = truncate_chars(document_text, max_chars);
    let insertion = format!("{}{body}", get_truncation_separator(max_chars));

    if template.contains(DOCUMENT_PLACEHOLDER) {
        template.replacen(DOCUMENT_PLACEHOLDER, &insertion, 1)
    } else {
        format!("{template}{insertion}")
    }
}
