//! Employee tools: fetch or update one column of one employee
//!
//! Both handlers run the extraction pipeline first and only touch the store
//! with a fully resolved command. Column names come from the closed `Field`
//! enum; every user-supplied value is a bound parameter.

use crate::deadline::with_deadline;
use crate::errors::DispatchError;
use crate::extraction::{
    extract_fetch_command, extract_update_command, ExtractedCommand, Field, Identifier,
    IdentifierKind,
};
use crate::storage::{EmployeeStore, SqlParam};
use crate::tools::registry::ToolHandler;
use crate::tools::types::{SideEffect, ToolResult, ToolSchema};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

pub const FETCH_EMPLOYEE_FIELD: &str = "FetchEmployeeField";
pub const UPDATE_EMPLOYEE_FIELD: &str = "UpdateEmployeeField";

/// Bind an identifier value for its column
///
/// `None` when an id is not a valid integer; such an id can match no row.
fn identifier_param(identifier: &Identifier) -> Option<SqlParam> {
    match identifier.kind {
        IdentifierKind::Id => identifier.value.parse::<i64>().ok().map(SqlParam::Integer),
        IdentifierKind::Name => Some(SqlParam::Text(identifier.value.clone())),
    }
}

fn no_record(tool: &str, identifier: &Identifier) -> ToolResult {
    ToolResult::not_found(
        tool,
        format!("No record found for {} = {}", identifier.kind, identifier.value),
    )
}

fn ambiguous(tool: &str, identifier: &Identifier, matches: usize) -> ToolResult {
    let err = DispatchError::AmbiguousIdentifier {
        kind: identifier.kind.to_string(),
        value: identifier.value.clone(),
        matches,
    };
    ToolResult::error(tool, err.to_string())
}

/// Parameterized single-column SELECT
pub fn fetch_statement(command: &ExtractedCommand) -> String {
    format!(
        "SELECT {} FROM employees WHERE {} = ?1",
        command.field.column(),
        command.identifier.kind.column()
    )
}

/// Parameterized single-column UPDATE
pub fn update_statement(command: &ExtractedCommand) -> String {
    format!(
        "UPDATE employees SET {} = ?1 WHERE {} = ?2",
        command.field.column(),
        command.identifier.kind.column()
    )
}

/// Reads one employee column
pub struct FetchEmployeeFieldTool {
    schema: ToolSchema,
    store: Arc<dyn EmployeeStore>,
    timeout: Duration,
}

impl FetchEmployeeFieldTool {
    pub fn new(store: Arc<dyn EmployeeStore>, timeout: Duration) -> Self {
        let schema = ToolSchema::new(
            FETCH_EMPLOYEE_FIELD,
            "Fetch employee information (employee_id, name, office, address, experience, phone_number, skill_set) by employee id or name.",
            "the user's question naming one field and an employee id or name",
            SideEffect::Read,
        )
        .with_examples([
            "What is the employee id of Sujoy?",
            "What is the phone number of employee id 2?",
            "What is the skill set of Sunita?",
        ]);

        Self {
            schema,
            store,
            timeout,
        }
    }
}

#[async_trait]
impl ToolHandler for FetchEmployeeFieldTool {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(&self, input: &str) -> ToolResult {
        let command = match extract_fetch_command(input) {
            Ok(command) => command,
            Err(e) => return ToolResult::error(FETCH_EMPLOYEE_FIELD, e.to_string()),
        };
        debug!(command = ?command, "fetch command extracted");

        let Some(param) = identifier_param(&command.identifier) else {
            return no_record(FETCH_EMPLOYEE_FIELD, &command.identifier);
        };

        let sql = fetch_statement(&command);
        let query = self.store.fetch_column(&sql, vec![param]);
        let rows = match with_deadline("database fetch", self.timeout, query).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "employee fetch failed");
                return ToolResult::error(FETCH_EMPLOYEE_FIELD, e.to_string());
            }
        };

        match rows.as_slice() {
            [] => no_record(FETCH_EMPLOYEE_FIELD, &command.identifier),
            [value] => ToolResult::success(
                FETCH_EMPLOYEE_FIELD,
                format!("{}: {}", command.field, value),
            ),
            many => ambiguous(FETCH_EMPLOYEE_FIELD, &command.identifier, many.len()),
        }
    }
}

/// Updates one employee column inside a transaction
pub struct UpdateEmployeeFieldTool {
    schema: ToolSchema,
    store: Arc<dyn EmployeeStore>,
    timeout: Duration,
}

impl UpdateEmployeeFieldTool {
    pub fn new(store: Arc<dyn EmployeeStore>, timeout: Duration) -> Self {
        let schema = ToolSchema::new(
            UPDATE_EMPLOYEE_FIELD,
            "Update one employee field (phone_number, address, office, experience, skill_set) by employee id or name.",
            "the user's request naming one field, an employee id or name, and the new value after 'to', 'as' or 'with'",
            SideEffect::Write,
        )
        .with_examples([
            "Update employee id = 2 phone number to 462347382",
            "Update Sujoy address to Kolkata",
            "Update Raktim skill set to C, Java, Python",
        ]);

        Self {
            schema,
            store,
            timeout,
        }
    }
}

#[async_trait]
impl ToolHandler for UpdateEmployeeFieldTool {
    fn schema(&self) -> &ToolSchema {
        &self.schema
    }

    async fn call(&self, input: &str) -> ToolResult {
        let command = match extract_update_command(input) {
            Ok(command) => command,
            Err(e) => return ToolResult::error(UPDATE_EMPLOYEE_FIELD, e.to_string()),
        };
        debug!(command = ?command, "update command extracted");

        if command.field == Field::EmployeeId {
            return ToolResult::error(
                UPDATE_EMPLOYEE_FIELD,
                "The employee id cannot be changed.",
            );
        }

        let Some(param) = identifier_param(&command.identifier) else {
            return no_record(UPDATE_EMPLOYEE_FIELD, &command.identifier);
        };
        let new_value = command.new_value.clone().unwrap_or_default();

        // Ids are unique; a name must touch exactly one row to commit
        let max_rows = match command.identifier.kind {
            IdentifierKind::Id => None,
            IdentifierKind::Name => Some(1),
        };

        let sql = update_statement(&command);
        let update = self.store.update_in_transaction(
            &sql,
            vec![SqlParam::Text(new_value), param],
            max_rows,
        );
        let outcome = match with_deadline("database update", self.timeout, update).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "employee update failed");
                return ToolResult::error(UPDATE_EMPLOYEE_FIELD, e.to_string());
            }
        };

        if outcome.affected == 0 {
            return no_record(UPDATE_EMPLOYEE_FIELD, &command.identifier);
        }
        if !outcome.committed {
            return ambiguous(UPDATE_EMPLOYEE_FIELD, &command.identifier, outcome.affected);
        }

        ToolResult::success(
            UPDATE_EMPLOYEE_FIELD,
            format!(
                "Successfully updated {} for employee {}",
                command.field, command.identifier.value
            ),
        )
    }
}
