//! Field resolution over an ordered synonym table
//!
//! The table is scanned top to bottom against the case-folded input and the
//! first phrase found anywhere in the text wins. Two ordering rules hold:
//!
//! 1. A phrase comes before every phrase that is a substring of it
//!    ("employee id" before "id", "skill set" before "skill").
//! 2. Attribute phrases come before identity phrases, so the identifier cue in
//!    "phone number of employee id 2" does not capture the field.

use crate::extraction::types::{ExtractionError, Field};

/// Ordered (phrase, field) rules
pub const FIELD_SYNONYMS: &[(&str, Field)] = &[
    ("phone number", Field::PhoneNumber),
    ("ph no", Field::PhoneNumber),
    ("phone", Field::PhoneNumber),
    ("skill set", Field::SkillSet),
    ("skills", Field::SkillSet),
    ("skill", Field::SkillSet),
    ("office", Field::Office),
    ("address", Field::Address),
    ("experience", Field::Experience),
    ("name", Field::Name),
    ("employee id", Field::EmployeeId),
    ("id", Field::EmployeeId),
];

/// Matched rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMatch {
    pub field: Field,
    pub phrase: &'static str,
}

/// Resolve the requested field from free text
pub fn resolve_field(text: &str) -> Result<FieldMatch, ExtractionError> {
    let folded = text.to_lowercase();

    FIELD_SYNONYMS
        .iter()
        .find(|(phrase, _)| folded.contains(phrase))
        .map(|&(phrase, field)| FieldMatch { field, phrase })
        .ok_or(ExtractionError::FieldNotFound)
}
