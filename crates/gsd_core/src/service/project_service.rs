//! Project use-case service.
//!
//! # Responsibility
//! - Provide stable project CRUD entry points for transport callers.
//! - Delegate persistence to repository implementations.

use crate::model::project::{NewProject, Project, ProjectPatch};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for project CRUD operations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a project at the end of the display order.
    pub fn create_project(&mut self, request: &NewProject) -> RepoResult<Project> {
        self.repo.create_project(request)
    }

    /// Gets one project by id.
    pub fn get_project(&self, id: &str) -> RepoResult<Option<Project>> {
        self.repo.get_project(id)
    }

    /// Lists all projects ascending by position.
    pub fn list_projects(&self) -> RepoResult<Vec<Project>> {
        self.repo.list_projects()
    }

    /// Applies a sparse patch and returns the full current record.
    pub fn update_project(&self, id: &str, patch: &ProjectPatch) -> RepoResult<Project> {
        self.repo.update_project(id, patch)
    }

    /// Hard-deletes one project by id.
    pub fn delete_project(&self, id: &str) -> RepoResult<()> {
        self.repo.delete_project(id)
    }
}
