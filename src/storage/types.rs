//! Store seam and row types

use crate::errors::Result;
use async_trait::async_trait;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Bound statement parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlParam {
    Integer(i64),
    Text(String),
}

impl SqlParam {
    pub fn to_value(&self) -> Value {
        match self {
            SqlParam::Integer(n) => Value::Integer(*n),
            SqlParam::Text(s) => Value::Text(s.clone()),
        }
    }
}

/// Result of a transactional update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Rows the statement touched before commit/rollback
    pub affected: usize,

    /// Whether the transaction was committed
    pub committed: bool,
}

/// Employee row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: i64,
    pub name: String,
    pub office: Option<String>,
    pub address: Option<String>,
    pub experience: Option<String>,
    pub phone_number: Option<String>,
    pub skill_set: Option<String>,
}

impl Employee {
    /// Employee with only id and name set
    pub fn new(employee_id: i64, name: impl Into<String>) -> Self {
        Self {
            employee_id,
            name: name.into(),
            office: None,
            address: None,
            experience: None,
            phone_number: None,
            skill_set: None,
        }
    }
}

/// Relational store used by the employee tools
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Run a single-column SELECT; each row's value is rendered as text
    async fn fetch_column(&self, sql: &str, params: Vec<SqlParam>) -> Result<Vec<String>>;

    /// Run an UPDATE inside a transaction
    ///
    /// Commits only when at least one row, and at most `max_rows` rows (if
    /// given), are affected; otherwise rolls back.
    async fn update_in_transaction(
        &self,
        sql: &str,
        params: Vec<SqlParam>,
        max_rows: Option<usize>,
    ) -> Result<UpdateOutcome>;
}
