//! Extraction pipelines for the fetch and update tools
//!
//! Stages run strictly in order (field → identifier → value). The first
//! failing stage aborts the pipeline, later stages never run.

use crate::extraction::fields::resolve_field;
use crate::extraction::identifier::{resolve_read_identifier, resolve_write_identifier};
use crate::extraction::types::{ExtractedCommand, ExtractionError};
use crate::extraction::value::resolve_new_value;

/// Extract a read command, e.g. "What is the phone number of employee id 2?"
pub fn extract_fetch_command(text: &str) -> Result<ExtractedCommand, ExtractionError> {
    let field = resolve_field(text)?.field;
    let identifier = resolve_read_identifier(text)?;

    Ok(ExtractedCommand {
        field,
        identifier,
        new_value: None,
    })
}

/// Extract a write command, e.g. "Update Sujoy address to Kolkata"
pub fn extract_update_command(text: &str) -> Result<ExtractedCommand, ExtractionError> {
    let field = resolve_field(text)?.field;
    let identifier = resolve_write_identifier(text)?;
    let new_value = resolve_new_value(text)?;

    Ok(ExtractedCommand {
        field,
        identifier,
        new_value: Some(new_value),
    })
}
