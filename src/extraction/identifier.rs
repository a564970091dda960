//! Employee identifier resolution
//!
//! Read and write paths use different rules. The read path is deliberately
//! naive: with an id cue present, every digit in the text is concatenated, so
//! "id 2 ... id 3" yields "23".

use crate::extraction::types::{ExtractionError, Identifier};
use regex::Regex;
use std::sync::OnceLock;

/// Capitalized word run, e.g. "John Doe"
const CAPITALIZED_WORDS: &str = r"([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*)";

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(?:employee\s+id|id)\s*[=:]?\s*(\d+)").expect("valid id pattern")
    })
}

fn name_cue_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(r"\b(?i:name|for)\s+{}", CAPITALIZED_WORDS))
            .expect("valid name pattern")
    })
}

fn leading_verb_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(&format!(
            r"^\s*(?i:update|change|set|modify)\s+{}",
            CAPITALIZED_WORDS
        ))
        .expect("valid verb pattern")
    })
}

/// Resolve the identifier of a read (fetch) request
pub fn resolve_read_identifier(text: &str) -> Result<Identifier, ExtractionError> {
    if text.to_lowercase().contains("id") {
        let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(ExtractionError::IdentifierNotFound);
        }
        return Ok(Identifier::id(digits));
    }

    text.split_whitespace()
        .find(|token| token.chars().next().is_some_and(char::is_uppercase))
        .map(|token| token.trim_end_matches(|c: char| !c.is_alphanumeric()))
        .filter(|name| !name.is_empty())
        .map(Identifier::name)
        .ok_or(ExtractionError::IdentifierNotFound)
}

/// Resolve the identifier of a write (update) request
pub fn resolve_write_identifier(text: &str) -> Result<Identifier, ExtractionError> {
    if let Some(caps) = id_pattern().captures(text) {
        return Ok(Identifier::id(&caps[1]));
    }

    name_cue_pattern()
        .captures(text)
        .or_else(|| leading_verb_pattern().captures(text))
        .map(|caps| Identifier::name(&caps[1]))
        .ok_or(ExtractionError::IdentifierNotFound)
}
