//! SQLite employee store
//!
//! Embedded store using rusqlite with r2d2 connection pooling. Statements run
//! on the blocking pool; every connection goes back to the pool on all exit
//! paths and an unfinished transaction rolls back when dropped.

use crate::errors::{DispatchError, Result};
use crate::storage::types::{Employee, EmployeeStore, SqlParam, UpdateOutcome};
use async_trait::async_trait;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS employees (
    employee_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    office TEXT,
    address TEXT,
    experience TEXT,
    phone_number TEXT,
    skill_set TEXT
)";

/// Employee store backed by SQLite
#[derive(Clone)]
pub struct SqliteEmployeeStore {
    pool: DbPool,
}

impl SqliteEmployeeStore {
    /// Open (or create) the database file with a connection pool
    pub fn open(path: impl AsRef<Path>, pool_size: u32, connect_timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let manager = SqliteConnectionManager::file(path);
        let pool = Pool::builder()
            .max_size(pool_size.max(1))
            .connection_timeout(connect_timeout)
            .build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory database for testing
    ///
    /// A single connection that never recycles, so every caller sees the same
    /// database.
    pub fn in_memory() -> Result<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(manager)?;

        let store = Self { pool };
        store.init_schema()?;
        Ok(store)
    }

    /// Create the employees table if missing
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(SCHEMA, [])?;
        Ok(())
    }

    /// Insert an employee row
    pub fn insert(&self, employee: &Employee) -> Result<()> {
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO employees (employee_id, name, office, address, experience, phone_number, skill_set)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                employee.employee_id,
                employee.name,
                employee.office,
                employee.address,
                employee.experience,
                employee.phone_number,
                employee.skill_set,
            ],
        )?;
        Ok(())
    }

    /// Load an employee by id
    pub fn get(&self, employee_id: i64) -> Result<Option<Employee>> {
        let conn = self.pool.get()?;
        let employee = conn
            .query_row(
                "SELECT employee_id, name, office, address, experience, phone_number, skill_set
                 FROM employees WHERE employee_id = ?1",
                params![employee_id],
                |row| {
                    Ok(Employee {
                        employee_id: row.get(0)?,
                        name: row.get(1)?,
                        office: row.get(2)?,
                        address: row.get(3)?,
                        experience: row.get(4)?,
                        phone_number: row.get(5)?,
                        skill_set: row.get(6)?,
                    })
                },
            )
            .optional()?;
        Ok(employee)
    }

    /// Number of employee rows
    pub fn count(&self) -> Result<usize> {
        let conn = self.pool.get()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get the underlying pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Render a column value the way results are reported
fn render_value(value: Value) -> String {
    match value {
        Value::Null => "(not set)".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s,
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

fn join_error(err: tokio::task::JoinError) -> DispatchError {
    DispatchError::Database(format!("database worker failed: {}", err))
}

#[async_trait]
impl EmployeeStore for SqliteEmployeeStore {
    async fn fetch_column(&self, sql: &str, params: Vec<SqlParam>) -> Result<Vec<String>> {
        let pool = self.pool.clone();
        let sql = sql.to_string();
        debug!(sql = %sql, params = ?params, "fetch");

        tokio::task::spawn_blocking(move || -> Result<Vec<String>> {
            let conn = pool.get()?;
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter().map(SqlParam::to_value)), |row| {
                row.get::<_, Value>(0)
            })?;

            let mut values = Vec::new();
            for value in rows {
                values.push(render_value(value?));
            }
            Ok(values)
        })
        .await
        .map_err(join_error)?
    }

    async fn update_in_transaction(
        &self,
        sql: &str,
        params: Vec<SqlParam>,
        max_rows: Option<usize>,
    ) -> Result<UpdateOutcome> {
        let pool = self.pool.clone();
        let sql = sql.to_string();
        debug!(sql = %sql, params = ?params, "update");

        tokio::task::spawn_blocking(move || -> Result<UpdateOutcome> {
            let mut conn = pool.get()?;
            let tx = conn.transaction()?;
            let affected = tx.execute(&sql, params_from_iter(params.iter().map(SqlParam::to_value)))?;

            let committed = affected >= 1 && max_rows.map_or(true, |max| affected <= max);
            if committed {
                tx.commit()?;
            } else {
                tx.rollback()?;
            }

            Ok(UpdateOutcome { affected, committed })
        })
        .await
        .map_err(join_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeded() -> SqliteEmployeeStore {
        let store = SqliteEmployeeStore::in_memory().unwrap();
        let mut sujoy = Employee::new(1, "Sujoy");
        sujoy.address = Some("Pune".to_string());
        store.insert(&sujoy).unwrap();
        let mut sunita = Employee::new(2, "Sunita");
        sunita.phone_number = Some("9876543210".to_string());
        store.insert(&sunita).unwrap();
        store
    }

    #[tokio::test]
    async fn test_fetch_column() {
        let store = seeded();
        let values = store
            .fetch_column(
                "SELECT phone_number FROM employees WHERE employee_id = ?1",
                vec![SqlParam::Integer(2)],
            )
            .await
            .unwrap();
        assert_eq!(values, vec!["9876543210"]);
    }

    #[tokio::test]
    async fn test_fetch_null_column() {
        let store = seeded();
        let values = store
            .fetch_column(
                "SELECT office FROM employees WHERE name = ?1",
                vec![SqlParam::Text("Sujoy".into())],
            )
            .await
            .unwrap();
        assert_eq!(values, vec!["(not set)"]);
    }

    #[tokio::test]
    async fn test_update_commits_single_row() {
        let store = seeded();
        let outcome = store
            .update_in_transaction(
                "UPDATE employees SET address = ?1 WHERE name = ?2",
                vec![SqlParam::Text("Kolkata".into()), SqlParam::Text("Sujoy".into())],
                Some(1),
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { affected: 1, committed: true });
        assert_eq!(store.get(1).unwrap().unwrap().address.as_deref(), Some("Kolkata"));
    }

    #[tokio::test]
    async fn test_update_rolls_back_over_limit() {
        let store = seeded();
        store.insert(&Employee::new(3, "Sujoy")).unwrap();

        let outcome = store
            .update_in_transaction(
                "UPDATE employees SET address = ?1 WHERE name = ?2",
                vec![SqlParam::Text("Delhi".into()), SqlParam::Text("Sujoy".into())],
                Some(1),
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome { affected: 2, committed: false });
        assert_eq!(store.get(1).unwrap().unwrap().address.as_deref(), Some("Pune"));
        assert!(store.get(3).unwrap().unwrap().address.is_none());
    }

    #[tokio::test]
    async fn test_update_no_rows() {
        let store = seeded();
        let outcome = store
            .update_in_transaction(
                "UPDATE employees SET address = ?1 WHERE employee_id = ?2",
                vec![SqlParam::Text("Delhi".into()), SqlParam::Integer(99)],
                None,
            )
            .await
            .unwrap();
        assert!(!outcome.committed);
        assert_eq!(outcome.affected, 0);
    }

    #[tokio::test]
    async fn test_bad_sql_is_database_error() {
        let store = seeded();
        let err = store
            .fetch_column("SELECT nope FROM employees", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Database(_)));
    }

    #[test]
    fn test_open_file_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("employees.db");
        let store = SqliteEmployeeStore::open(&path, 2, Duration::from_secs(1)).unwrap();
        store.insert(&Employee::new(7, "Raktim")).unwrap();

        let reopened = SqliteEmployeeStore::open(&path, 2, Duration::from_secs(1)).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
