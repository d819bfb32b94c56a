//! Inbox repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide capture/list/update APIs over the `inbox` table.
//! - Own the soft-delete lifecycle transition.
//!
//! # Invariants
//! - Active rows have `state IS NULL`; every default read is constrained
//!   to active rows.
//! - Soft-deleted rows stay in storage and are never resurrected by core
//!   code.

use crate::model::inbox_item::{InboxItem, InboxItemPatch, NewInboxItem};
use crate::model::new_record_id;
use crate::repo::{
    ensure_connection_migrated, ensure_table, push_set, RepoError, RepoResult, CREATED_AT_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const INBOX_SELECT_SQL: &str = "SELECT
    id,
    description,
    url,
    created_at
FROM inbox";

/// Repository interface for inbox capture items.
pub trait InboxRepository {
    /// Inserts a new inbox item and returns the stored record.
    fn create_item(&self, request: &NewInboxItem) -> RepoResult<InboxItem>;
    /// Gets one active item by id.
    fn get_item(&self, id: &str) -> RepoResult<Option<InboxItem>>;
    /// Lists active items in creation order.
    fn list_items(&self) -> RepoResult<Vec<InboxItem>>;
    /// Applies a sparse patch to an active item and returns the record.
    fn update_item(&self, id: &str, patch: &InboxItemPatch) -> RepoResult<InboxItem>;
    /// Marks one item as deleted. The row is retained.
    fn soft_delete_item(&self, id: &str) -> RepoResult<()>;
}

/// SQLite-backed inbox repository.
pub struct SqliteInboxRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteInboxRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_migrated(conn)?;
        ensure_table(
            conn,
            "inbox",
            &["id", "description", "url", "created_at", "state"],
        )?;
        Ok(Self { conn })
    }
}

impl InboxRepository for SqliteInboxRepository<'_> {
    fn create_item(&self, request: &NewInboxItem) -> RepoResult<InboxItem> {
        let id = new_record_id(request.id.as_deref());
        self.conn.execute(
            &format!(
                "INSERT INTO inbox (id, description, url, created_at, state)
                 VALUES (?1, ?2, ?3, {CREATED_AT_SQL}, NULL);"
            ),
            params![id, request.description, request.url],
        )?;

        self.get_item(&id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("created inbox item `{id}` could not be read back"))
        })
    }

    fn get_item(&self, id: &str) -> RepoResult<Option<InboxItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INBOX_SELECT_SQL} WHERE id = ?1 AND state IS NULL;"
        ))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_inbox_row(row)?));
        }
        Ok(None)
    }

    fn list_items(&self) -> RepoResult<Vec<InboxItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "{INBOX_SELECT_SQL} WHERE state IS NULL ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_inbox_row(row)?);
        }
        Ok(items)
    }

    fn update_item(&self, id: &str, patch: &InboxItemPatch) -> RepoResult<InboxItem> {
        let mut assignments: Vec<&'static str> = Vec::new();
        let mut binds: Vec<Value> = Vec::new();
        push_set(
            &mut assignments,
            &mut binds,
            "description = ?",
            &patch.description,
            |value| Value::Text(value.clone()),
        );
        push_set(&mut assignments, &mut binds, "url = ?", &patch.url, |value| {
            Value::Text(value.clone())
        });

        if assignments.is_empty() {
            return Err(RepoError::NothingToUpdate);
        }

        let sql = format!(
            "UPDATE inbox SET {} WHERE id = ? AND state IS NULL;",
            assignments.join(", ")
        );
        binds.push(Value::Text(id.to_string()));

        let changed = self.conn.execute(&sql, params_from_iter(binds))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }

        self.get_item(id)?
            .ok_or_else(|| RepoError::NotFound(id.to_string()))
    }

    fn soft_delete_item(&self, id: &str) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("UPDATE inbox SET state = 'deleted' WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn parse_inbox_row(row: &Row<'_>) -> RepoResult<InboxItem> {
    Ok(InboxItem {
        id: row.get("id")?,
        description: row.get("description")?,
        url: row.get("url")?,
        created_at: row.get("created_at")?,
    })
}
