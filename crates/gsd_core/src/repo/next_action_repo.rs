//! Next-action repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over the `next_actions` table.
//! - Map enumerated metadata between domain enums and CHECK'd TEXT columns.
//!
//! # Invariants
//! - Creation allocates position and inserts inside one immediate
//!   transaction, so appends serialize at the storage layer.
//! - `completed_at` is NULL at creation; only a patch can set or clear it.
//! - Read paths reject invalid persisted enum values instead of masking
//!   them.

use crate::model::new_record_id;
use crate::model::next_action::{
    ActionEnergy, ActionSize, NewNextAction, NextAction, NextActionPatch,
};
use crate::position::next_position;
use crate::repo::{
    ensure_connection_migrated, ensure_table, push_set, RepoError, RepoResult, CREATED_AT_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};

const NEXT_ACTION_SELECT_SQL: &str = "SELECT
    id,
    action,
    project_id,
    url,
    size,
    energy,
    created_at,
    completed_at,
    position
FROM next_actions";

/// Repository interface for next-action CRUD operations.
pub trait NextActionRepository {
    /// Inserts a new next action and returns the stored record.
    fn create_next_action(&mut self, request: &NewNextAction) -> RepoResult<NextAction>;
    /// Gets one next action by id.
    fn get_next_action(&self, id: &str) -> RepoResult<Option<NextAction>>;
    /// Lists all next actions ascending by position.
    fn list_next_actions(&self) -> RepoResult<Vec<NextAction>>;
    /// Applies a sparse patch and returns the full current record.
    fn update_next_action(&self, id: &str, patch: &NextActionPatch) -> RepoResult<NextAction>;
    /// Hard-deletes one next action by id.
    fn delete_next_action(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed next-action repository.
pub struct SqliteNextActionRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNextActionRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        ensure_table(
            conn,
            "next_actions",
            &[
                "id",
                "action",
                "project_id",
                "url",
                "size",
                "energy",
                "created_at",
                "completed_at",
                "position",
            ],
        )?;
        Ok(Self { conn })
    }
}

impl NextActionRepository for SqliteNextActionRepository<'_> {
    fn create_next_action(&mut self, request: &NewNextAction) -> RepoResult<NextAction> {
        let id = new_record_id(request.id.as_deref());

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current_max: Option<f64> = tx.query_row(
            "SELECT MAX(position) FROM next_actions;",
            [],
            |row| row.get(0),
        )?;
        tx.execute(
            &format!(
                "INSERT INTO next_actions
                     (id, action, project_id, url, size, energy, created_at, completed_at, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, {CREATED_AT_SQL}, NULL, ?7);"
            ),
            params![
                id,
                request.action,
                request.project_id,
                request.url,
                request.size.map(size_to_db),
                request.energy.map(energy_to_db),
                next_position(current_max),
            ],
        )?;
        tx.commit()?;

        self.get_next_action(&id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created next action `{id}` could not be read back"))
        })
    }

    fn get_next_action(&self, id: &str) -> RepoResult<Option<NextAction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NEXT_ACTION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_next_action_row(row)?));
        }
        Ok(None)
    }

    fn list_next_actions(&self) -> RepoResult<Vec<NextAction>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NEXT_ACTION_SELECT_SQL} ORDER BY position ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut actions = Vec::new();
        while let Some(row) = rows.next()? {
            actions.push(parse_next_action_row(row)?);
        }
        Ok(actions)
    }

    fn update_next_action(&self, id: &str, patch: &NextActionPatch) -> RepoResult<NextAction> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        push_set(
            &mut assignments,
            &mut binds,
            "action = ?",
            &patch.action,
            |value| Value::Text(value.clone()),
        );
        push_set(
            &mut assignments,
            &mut binds,
            "project_id = ?",
            &patch.project_id,
            |value| Value::Text(value.clone()),
        );
        push_set(&mut assignments, &mut binds, "url = ?", &patch.url, |value| {
            Value::Text(value.clone())
        });
        push_set(&mut assignments, &mut binds, "size = ?", &patch.size, |value| {
            Value::Text(size_to_db(*value).to_string())
        });
        push_set(
            &mut assignments,
            &mut binds,
            "energy = ?",
            &patch.energy,
            |value| Value::Text(energy_to_db(*value).to_string()),
        );
        push_set(
            &mut assignments,
            &mut binds,
            "completed_at = ?",
            &patch.completed_at,
            |value| Value::Text(value.clone()),
        );
        push_set(
            &mut assignments,
            &mut binds,
            "position = ?",
            &patch.position,
            |value| Value::Real(*value),
        );

        if assignments.is_empty() {
            return Err(RepoError::NothingToUpdate);
        }

        let sql = format!(
            "UPDATE next_actions SET {} WHERE id = ?;",
            assignments.join(", ")
        );
        binds.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        self.get_next_action(id)?
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    fn delete_next_action(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM next_actions WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_next_action_row(row: &Row<'_>) -> RepoResult<NextAction> {
    let size = match row.get::<_, Option<String>>("size")? {
        Some(value) => Some(parse_size(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid size value `{value}` in next_actions.size"))
        })?),
        None => None,
    };

    let energy = match row.get::<_, Option<String>>("energy")? {
        Some(value) => Some(parse_energy(&value).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid energy value `{value}` in next_actions.energy"
            ))
        })?),
        None => None,
    };

    Ok(NextAction {
        id: row.get("id")?,
        action: row.get("action")?,
        project_id: row.get("project_id")?,
        url: row.get("url")?,
        size,
        energy,
        created_at: row.get("created_at")?,
        completed_at: row.get("completed_at")?,
        position: row.get("position")?,
    })
}

fn size_to_db(size: ActionSize) -> &'static str {
    match size {
        ActionSize::Small => "small",
        ActionSize::Medium => "medium",
        ActionSize::Big => "big",
    }
}

fn parse_size(value: &str) -> Option<ActionSize> {
    match value {
        "small" => Some(ActionSize::Small),
        "medium" => Some(ActionSize::Medium),
        "big" => Some(ActionSize::Big),
        _ => None,
    }
}

fn energy_to_db(energy: ActionEnergy) -> &'static str {
    match energy {
        ActionEnergy::High => "high",
        ActionEnergy::Low => "low",
    }
}

fn parse_energy(value: &str) -> Option<ActionEnergy> {
    match value {
        "high" => Some(ActionEnergy::High),
        "low" => Some(ActionEnergy::Low),
        _ => None,
    }
}
