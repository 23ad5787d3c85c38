//! # Prompt Rendering Tests
//!
//! This test suite validates `render_prompt` and its helpers: the truncation
//! boundary, the separator text, placeholder handling, and determinism.

use docextract::prompts::core::{
    get_truncation_separator, render_prompt, truncate_chars, DOCUMENT_PLACEHOLDER,
};
use docextract::prompts::extraction::{FUND_TERMS_EXTRACTION_PROMPT, TIMELINE_EXTRACTION_PROMPT};

// --- Tests for `truncate_chars` ---

/// A limit larger than the text keeps the whole text.
#[test]
fn test_truncate_shorter_than_limit() {
    assert_eq!(truncate_chars("hello", 10), "hello");
    assert_eq!(truncate_chars("hello", 5), "hello");
}

/// A limit of zero yields an empty body.
#[test]
fn test_truncate_zero_limit() {
    assert_eq!(truncate_chars("hello", 0), "");
    assert_eq!(truncate_chars("", 0), "");
}

/// Truncation counts characters, not bytes, and never splits a multi-byte sequence.
#[test]
fn test_truncate_counts_characters_not_bytes() {
    let text = "héllo wörld ✅ done";
    let truncated = truncate_chars(text, 13);
    assert_eq!(truncated, "héllo wörld ✅");
    assert_eq!(truncated.chars().count(), 13);
    assert!(truncated.len() > 13, "multi-byte characters take more bytes");
}

/// For a range of limits, exactly `min(len, N)` leading characters survive.
#[test]
fn test_truncate_keeps_prefix_for_every_limit() {
    let text = "Target IRR: 16-20% — Minimum Investment: $50,000 — Hold Period: 3-5 years";
    let total = text.chars().count();
    for n in 0..=total + 3 {
        let truncated = truncate_chars(text, n);
        assert_eq!(truncated.chars().count(), n.min(total));
        assert!(text.starts_with(truncated));
    }
}

// --- Tests for `render_prompt` ---

/// The separator states the limit and the body follows the instructions.
#[test]
fn test_render_appends_separator_and_body() {
    let rendered = render_prompt("Extract the timeline.", "Fall 2023 starts 09/2023", 15000);
    assert_eq!(
        rendered,
        "Extract the timeline.\n\n--- PDF Content Follows (Truncated to first 15000 characters):---\nFall 2023 starts 09/2023"
    );
}

/// Only the leading characters of the document reach the prompt, never trailing ones.
#[test]
fn test_render_never_includes_trailing_characters() {
    let text = "AAAAABBBBB";
    let rendered = render_prompt("Instructions", text, 5);
    assert!(rendered.ends_with(&format!("{}AAAAA", get_truncation_separator(5))));
    assert!(!rendered.contains('B'));
}

/// An empty document still produces a valid prompt.
#[test]
fn test_render_with_empty_document() {
    let rendered = render_prompt("Instructions", "", 100);
    assert_eq!(rendered, format!("Instructions{}", get_truncation_separator(100)));
}

/// A `{document}` placeholder marks the insertion point; only the first one is used.
#[test]
fn test_render_substitutes_first_placeholder() {
    let template = format!("Before\n{DOCUMENT_PLACEHOLDER}\nAfter {DOCUMENT_PLACEHOLDER}");
    let rendered = render_prompt(&template, "BODY", 10);
    assert_eq!(
        rendered,
        format!(
            "Before\n{}BODY\nAfter {DOCUMENT_PLACEHOLDER}",
            get_truncation_separator(10)
        )
    );
}

/// Document text containing the placeholder is inserted verbatim.
#[test]
fn test_render_does_not_expand_placeholder_inside_document() {
    let rendered = render_prompt("Instructions", "literal {document} text", 100);
    assert!(rendered.ends_with("literal {document} text"));
}

/// Rendering twice with the same inputs yields byte-identical output.
#[test]
fn test_render_is_deterministic() {
    let text = "Target IRR: 16-20%, Minimum Investment: $50,000, Hold Period: 3-5 years";
    let first = render_prompt(FUND_TERMS_EXTRACTION_PROMPT, text, 40);
    let second = render_prompt(FUND_TERMS_EXTRACTION_PROMPT, text, 40);
    assert_eq!(first.as_bytes(), second.as_bytes());
}

// --- Built-in templates ---

/// The built-in templates name the exact output formats the parser recognises.
#[test]
fn test_builtin_templates_describe_output_formats() {
    assert!(FUND_TERMS_EXTRACTION_PROMPT
        .contains("`Target Return: [value], Minimum: [value], Hold Period: [value]`"));
    assert!(TIMELINE_EXTRACTION_PROMPT.contains("Timeline: Unknown"));
    assert!(!FUND_TERMS_EXTRACTION_PROMPT.contains(DOCUMENT_PLACEHOLDER));
    assert!(!TIMELINE_EXTRACTION_PROMPT.contains(DOCUMENT_PLACEHOLDER));
}
