//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `projects` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Creation allocates position and inserts inside one immediate
//!   transaction, so appends serialize at the storage layer.
//! - Updates write exactly the patched columns and re-read the stored row.

use crate::model::new_record_id;
use crate::model::project::{NewProject, Project, ProjectPatch};
use crate::position::next_position;
use crate::repo::{
    ensure_connection_migrated, ensure_table, push_set, RepoError, RepoResult, CREATED_AT_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    position,
    deadline,
    created_at
FROM projects";

/// Repository interface for project CRUD operations.
pub trait ProjectRepository {
    /// Inserts a new project and returns the stored record.
    fn create_project(&mut self, request: &NewProject) -> RepoResult<Project>;
    /// Gets one project by id.
    fn get_project(&self, id: &str) -> RepoResult<Option<Project>>;
    /// Lists all projects ascending by position.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
    /// Applies a sparse patch and returns the full current record.
    fn update_project(&self, id: &str, patch: &ProjectPatch) -> RepoResult<Project>;
    /// Hard-deletes one project by id.
    fn delete_project(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        ensure_table(
            conn,
            "projects",
            &["id", "name", "position", "deadline", "created_at"],
        )?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&mut self, request: &NewProject) -> RepoResult<Project> {
        let id = new_record_id(request.id.as_deref());

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current_max: Option<f64> =
            tx.query_row("SELECT MAX(position) FROM projects;", [], |row| row.get(0))?;
        tx.execute(
            &format!(
                "INSERT INTO projects (id, name, position, deadline, created_at)
                 VALUES (?1, ?2, ?3, ?4, {CREATED_AT_SQL});"
            ),
            params![
                id,
                request.name,
                next_position(current_max),
                request.deadline
            ],
        )?;
        tx.commit()?;

        self.get_project(&id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created project `{id}` could not be read back"))
        })
    }

    fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }
        Ok(None)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} ORDER BY position ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn update_project(&self, id: &str, patch: &ProjectPatch) -> RepoResult<Project> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        push_set(
            &mut assignments,
            &mut binds,
            "position = ?",
            &patch.position,
            |value| Value::Real(*value),
        );
        push_set(
            &mut assignments,
            &mut binds,
            "deadline = ?",
            &patch.deadline,
            |value| Value::Text(value.clone()),
        );

        if assignments.is_empty() {
            return Err(RepoError::NothingToUpdate);
        }

        let sql = format!("UPDATE projects SET {} WHERE id = ?;", assignments.join(", "));
        binds.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        self.get_project(id)?
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    fn delete_project(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    Ok(Project {
        id: row.get("id")?,
        name: row.get("name")?,
        position: row.get("position")?,
        created_at: row.get("created_at")?,
        deadline: row.get("deadline")?,
    })
}
