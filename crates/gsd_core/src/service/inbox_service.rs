//! Inbox use-case service and live-update wiring.
//!
//! # Responsibility
//! - Provide capture/list/update/delete entry points for inbox items.
//! - Broadcast the `inbox_item_created` event after a successful capture.
//!
//! # Invariants
//! - Capture is the only mutation that broadcasts; other inbox mutations
//!   deliberately do not (the notification surface is per event type, not
//!   blanket per mutation).
//! - A broadcast failure never affects the outcome of the mutation that
//!   triggered it.

use crate::hub::UpdateHub;
use crate::model::inbox_item::{InboxItem, InboxItemPatch, NewInboxItem};
use crate::repo::inbox_repo::InboxRepository;
use crate::repo::RepoResult;

/// Event name broadcast when an inbox item is captured.
pub const INBOX_ITEM_CREATED: &str = "inbox_item_created";

/// Use-case service wrapper for inbox capture items.
pub struct InboxService<R: InboxRepository> {
    repo: R,
    hub: Option<UpdateHub>,
}

impl<R: InboxRepository> InboxService<R> {
    /// Creates a service without live-update notifications.
    pub fn new(repo: R) -> Self {
        Self { repo, hub: None }
    }

    /// Creates a service that notifies the given hub on capture.
    pub fn with_hub(repo: R, hub: UpdateHub) -> Self {
        Self {
            repo,
            hub: Some(hub),
        }
    }

    /// Captures a new inbox item and notifies connected clients.
    ///
    /// # Side effects
    /// - Broadcasts `inbox_item_created` with the stored record once the
    ///   insert has succeeded. Fire-and-forget: the caller's result does
    ///   not wait on, or observe, delivery.
    pub fn capture(&self, request: &NewInboxItem) -> RepoResult<InboxItem> {
        let item = self.repo.create_item(request)?;
        if let Some(hub) = &self.hub {
            hub.broadcast(INBOX_ITEM_CREATED, &item);
        }
        Ok(item)
    }

    /// Gets one active item by id.
    pub fn get_item(&self, id: &str) -> RepoResult<Option<InboxItem>> {
        self.repo.get_item(id)
    }

    /// Lists active items in creation order.
    pub fn list_items(&self) -> RepoResult<Vec<InboxItem>> {
        self.repo.list_items()
    }

    /// Applies a sparse patch to an active item and returns the record.
    pub fn update_item(&self, id: &str, patch: &InboxItemPatch) -> RepoResult<InboxItem> {
        self.repo.update_item(id, patch)
    }

    /// Soft-deletes one item; the row is retained in storage.
    pub fn soft_delete_item(&self, id: &str) -> RepoResult<()> {
        self.repo.soft_delete_item(id)
    }
}
