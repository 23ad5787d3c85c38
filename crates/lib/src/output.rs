//! # Structured Output Parsing
//!
//! Optional validation of a completion against the two single-line formats the
//! built-in templates ask for. The pipeline itself never calls this; the
//! completion text is untrusted free text until a caller opts in.

use crate::errors::ExtractError;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// The value models are told to emit when a field is absent.
pub const UNKNOWN_VALUE: &str = "Unknown";

/// Fields recovered from a well-formed completion line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExtractedFields {
    FundTerms {
        target_return: String,
        minimum: String,
        hold_period: String,
    },
    Timeline {
        timeline: String,
    },
}

impl ExtractedFields {
    /// True when every field carries the `Unknown` sentinel.
    pub fn is_unknown(&self) -> bool {
        match self {
            ExtractedFields::FundTerms {
                target_return,
                minimum,
                hold_period,
            } => [target_return, minimum, hold_period]
                .iter()
                .all(|v| v.as_str() == UNKNOWN_VALUE),
            ExtractedFields::Timeline { timeline } => timeline == UNKNOWN_VALUE,
        }
    }
}

fn fund_terms_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^Target Return:\s*(?P<target>[^,]+?),\s*Minimum:\s*(?P<minimum>.+?),\s*Hold Period:\s*(?P<hold>.+?)$",
        )
        .expect("static regex is valid")
    })
}

fn timeline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Timeline:\s*(?P<value>.+?)$").expect("static regex is valid"))
}

/// Parses a completion into `ExtractedFields`.
///
/// Only the first non-empty line is considered, after trimming. Minimum
/// amounts may contain thousands separators (`$100,000`), so the `Minimum`
/// field extends up to the `, Hold Period:` marker.
pub fn parse_extraction_line(text: &str) -> Result<ExtractedFields, ExtractError> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| ExtractError::MalformedOutput(text.to_string()))?;

    if let Some(caps) = fund_terms_regex().captures(line) {
        return Ok(ExtractedFields::FundTerms {
            target_return: caps["target"].trim().to_string(),
            minimum: caps["minimum"].trim().to_string(),
            hold_period: caps["hold"].trim().to_string(),
        });
    }

    if let Some(caps) = timeline_regex().captures(line) {
        return Ok(ExtractedFields::Timeline {
            timeline: caps["value"].trim().to_string(),
        });
    }

    Err(ExtractError::MalformedOutput(line.to_string()))
}
