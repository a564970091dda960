//! New-value resolution for update requests

use crate::extraction::types::ExtractionError;
use regex::Regex;
use std::sync::OnceLock;

fn value_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Punctuation only terminates when followed by whitespace or end of input,
    // so "5.5 years" and "a@b.com" survive intact.
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:to|as|with)\s+(.+?)\s*(?:[.;!?](?:\s|$)|$)")
            .expect("valid value pattern")
    })
}

/// Resolve the value following the first `to` / `as` / `with` connective
pub fn resolve_new_value(text: &str) -> Result<String, ExtractionError> {
    value_pattern()
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ExtractionError::ValueNotFound)
}
