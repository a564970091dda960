//! Relational store collaborator
//!
//! The dispatch core only formulates parameterized statements; this module
//! owns connections, transactions and the SQLite schema.

pub mod types;
pub mod sqlite;

pub use types::{Employee, EmployeeStore, SqlParam, UpdateOutcome};
pub use sqlite::{DbPool, SqliteEmployeeStore};
