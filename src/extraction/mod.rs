//! Command extraction engine
//!
//! Deterministic parsing of free text into an [`ExtractedCommand`]:
//! - Ordered field synonym table (first match wins)
//! - Read/write identifier rules
//! - Value after the `to` / `as` / `with` connective

pub mod types;
pub mod fields;
pub mod identifier;
pub mod value;
pub mod command;

// Re-export commonly used types
pub use types::{
    ExtractedCommand, ExtractionError, ExtractionStage, Field, Identifier, IdentifierKind,
};
pub use fields::{resolve_field, FieldMatch, FIELD_SYNONYMS};
pub use command::{extract_fetch_command, extract_update_command};
