//! Next-action use-case service.
//!
//! # Responsibility
//! - Provide next-action CRUD entry points plus completion conveniences.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Completion state is only ever expressed through `completed_at`
//!   patches; there is no separate completed flag to drift out of sync.

use crate::model::next_action::{NewNextAction, NextAction, NextActionPatch};
use crate::model::patch::FieldPatch;
use crate::repo::next_action_repo::NextActionRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for next-action operations.
pub struct NextActionService<R: NextActionRepository> {
    repo: R,
}

impl<R: NextActionRepository> NextActionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a next action at the end of the display order.
    pub fn create_next_action(&mut self, request: &NewNextAction) -> RepoResult<NextAction> {
        self.repo.create_next_action(request)
    }

    /// Gets one next action by id.
    pub fn get_next_action(&self, id: &str) -> RepoResult<Option<NextAction>> {
        self.repo.get_next_action(id)
    }

    /// Lists all next actions ascending by position.
    pub fn list_next_actions(&self) -> RepoResult<Vec<NextAction>> {
        self.repo.list_next_actions()
    }

    /// Applies a sparse patch and returns the full current record.
    pub fn update_next_action(&self, id: &str, patch: &NextActionPatch) -> RepoResult<NextAction> {
        self.repo.update_next_action(id, patch)
    }

    /// Marks an action completed at the supplied timestamp.
    ///
    /// # Contract
    /// - `completed_at` is the caller's RFC 3339 UTC stamp.
    /// - Equivalent to a patch containing only `completed_at`.
    pub fn complete(&self, id: &str, completed_at: impl Into<String>) -> RepoResult<NextAction> {
        let patch = NextActionPatch {
            completed_at: FieldPatch::Value(completed_at.into()),
            ..NextActionPatch::default()
        };
        self.repo.update_next_action(id, &patch)
    }

    /// Clears completion, returning the action to the active list.
    ///
    /// Equivalent to a patch containing `completed_at: null`.
    pub fn reopen(&self, id: &str) -> RepoResult<NextAction> {
        let patch = NextActionPatch {
            completed_at: FieldPatch::Null,
            ..NextActionPatch::default()
        };
        self.repo.update_next_action(id, &patch)
    }

    /// Hard-deletes one next action by id.
    pub fn delete_next_action(&self, id: &str) -> RepoResult<()> {
        self.repo.delete_next_action(id)
    }
}
