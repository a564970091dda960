//! Structured command types produced by the extraction engine

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Employee column a command reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    EmployeeId,
    Name,
    Office,
    Address,
    Experience,
    PhoneNumber,
    SkillSet,
}

impl Field {
    /// Column name in the `employees` table
    pub fn column(&self) -> &'static str {
        match self {
            Field::EmployeeId => "employee_id",
            Field::Name => "name",
            Field::Office => "office",
            Field::Address => "address",
            Field::Experience => "experience",
            Field::PhoneNumber => "phone_number",
            Field::SkillSet => "skill_set",
        }
    }

    /// All fields in table order
    pub fn all() -> [Field; 7] {
        [
            Field::EmployeeId,
            Field::Name,
            Field::Office,
            Field::Address,
            Field::Experience,
            Field::PhoneNumber,
            Field::SkillSet,
        ]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// How an employee is identified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Id,
    Name,
}

impl IdentifierKind {
    /// Column the identifier is matched against
    pub fn column(&self) -> &'static str {
        match self {
            IdentifierKind::Id => "employee_id",
            IdentifierKind::Name => "name",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Resolved employee identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub kind: IdentifierKind,
    pub value: String,
}

impl Identifier {
    pub fn id(value: impl Into<String>) -> Self {
        Self {
            kind: IdentifierKind::Id,
            value: value.into(),
        }
    }

    pub fn name(value: impl Into<String>) -> Self {
        Self {
            kind: IdentifierKind::Name,
            value: value.into(),
        }
    }
}

/// Structured command extracted from free text
///
/// Fields are only populated by [`crate::extraction::extract_fetch_command`]
/// and [`crate::extraction::extract_update_command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedCommand {
    pub field: Field,
    pub identifier: Identifier,
    /// Present on the write path only
    pub new_value: Option<String>,
}

/// Extraction pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStage {
    Field,
    Identifier,
    Value,
}

impl fmt::Display for ExtractionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtractionStage::Field => "field",
            ExtractionStage::Identifier => "identifier",
            ExtractionStage::Value => "value",
        };
        f.write_str(name)
    }
}

/// Stage failure; each stage has its own variant
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Could not determine which employee field is meant.")]
    FieldNotFound,

    #[error("Could not determine employee identifier. Please specify an ID or name.")]
    IdentifierNotFound,

    #[error("Could not determine the new value to set.")]
    ValueNotFound,
}

impl ExtractionError {
    /// Stage that produced this error
    pub fn stage(&self) -> ExtractionStage {
        match self {
            ExtractionError::FieldNotFound => ExtractionStage::Field,
            ExtractionError::IdentifierNotFound => ExtractionStage::Identifier,
            ExtractionError::ValueNotFound => ExtractionStage::Value,
        }
    }
}
