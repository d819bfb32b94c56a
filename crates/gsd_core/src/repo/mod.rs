//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per record kind.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `NothingToUpdate`)
//!   in addition to DB transport errors.
//! - UPDATE statements contain exactly the fields present in the patch.

use crate::db::DbError;
use crate::model::patch::FieldPatch;
use rusqlite::types::Value;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod inbox_repo;
pub mod next_action_repo;
pub mod project_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// SQL expression stamping an RFC 3339 UTC creation timestamp.
pub(crate) const CREATED_AT_SQL: &str = "strftime('%Y-%m-%dT%H:%M:%SZ', 'now')";

/// Generic repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// No record exists under the given id.
    NotFound(String),
    /// The patch named zero recognized fields.
    NothingToUpdate,
    /// Persisted state failed to parse into the domain model.
    InvalidData(String),
    /// The connection has never been migrated.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::NothingToUpdate => write!(f, "no fields to update"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} has not been migrated to {expected_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Appends a SET clause and its bind value when the patch field is present.
///
/// `Absent` contributes nothing, `Null` binds SQL NULL, `Value` binds the
/// converted value. This keeps omitted fields out of the statement entirely.
pub(crate) fn push_set<T>(
    assignments: &mut Vec<&'static str>,
    binds: &mut Vec<Value>,
    clause: &'static str,
    field: &FieldPatch<T>,
    to_value: impl Fn(&T) -> Value,
) {
    match field {
        FieldPatch::Absent => {}
        FieldPatch::Null => {
            assignments.push(clause);
            binds.push(Value::Null);
        }
        FieldPatch::Value(value) => {
            assignments.push(clause);
            binds.push(to_value(value));
        }
    }
}

pub(crate) fn ensure_connection_migrated(conn: &Connection) -> RepoResult<()> {
    let expected = crate::db::migrations::latest_version();
    let actual: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual == 0 {
        return Err(RepoError::UninitializedConnection {
            expected_version: expected,
            actual_version: actual,
        });
    }
    Ok(())
}

pub(crate) fn ensure_table(
    conn: &Connection,
    table: &'static str,
    columns: &[&'static str],
) -> RepoResult<()> {
    if !table_exists(conn, table)? {
        return Err(RepoError::MissingRequiredTable(table));
    }
    for &column in columns {
        if !table_has_column(conn, table, column)? {
            return Err(RepoError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
