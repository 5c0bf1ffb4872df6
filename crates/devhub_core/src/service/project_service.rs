//! Project use-case service.
//!
//! # Responsibility
//! - Create, edit, view, and delete projects.
//! - Filter projects by free-text search and status.
//! - Expose the project board (three columns, no drag UI).
//!
//! # Invariants
//! - Project names are trimmed and never blank.
//! - New projects default to `planning` with no tags.

use super::{matches_search, non_blank, StatusFilter};
use crate::kanban::{Column, DropOutcome, KanbanBoard};
use crate::model::project::{Project, ProjectDraft, ProjectPatch, ProjectStatus};
use crate::model::EntityId;
use crate::repo::collection::EntityCollection;
use crate::repo::{CollectionError, CollectionResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProjectServiceError {
    /// Name is empty after trimming.
    InvalidName,
    Collection(CollectionError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName => write!(f, "project name cannot be blank"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            Self::InvalidName => None,
        }
    }
}

impl From<CollectionError> for ProjectServiceError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

/// Search box plus status dropdown of the projects screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub search: String,
    pub status: StatusFilter<ProjectStatus>,
}

pub struct ProjectService {
    board: KanbanBoard<Project>,
    viewing: Option<EntityId>,
}

impl ProjectService {
    pub fn new(projects: EntityCollection<Project>) -> Self {
        Self {
            board: KanbanBoard::new(projects),
            viewing: None,
        }
    }

    pub fn collection(&self) -> &EntityCollection<Project> {
        self.board.collection()
    }

    pub fn create(&self, draft: ProjectDraft) -> Result<Project, ProjectServiceError> {
        let name = non_blank(&draft.name).ok_or(ProjectServiceError::InvalidName)?;
        let project = self.collection().create(ProjectDraft { name, ..draft })?;
        info!(
            "event=project_create module=service status=ok id={}",
            project.id
        );
        Ok(project)
    }

    /// Saves edits to one project. Unknown ids yield `Ok(None)`.
    pub fn update(
        &self,
        id: &str,
        mut patch: ProjectPatch,
    ) -> Result<Option<Project>, ProjectServiceError> {
        if let Some(name) = patch.name.take() {
            patch.name = Some(non_blank(&name).ok_or(ProjectServiceError::InvalidName)?);
        }
        Ok(self.collection().update(id, patch)?)
    }

    /// Deletes a project and closes it if it was open.
    pub fn delete(&mut self, id: &str) -> CollectionResult<Option<Project>> {
        let removed = self.collection().remove(id)?;
        if self.viewing.as_deref() == Some(id) {
            self.viewing = None;
        }
        Ok(removed)
    }

    /// Opens a project for viewing. Returns `None` for unknown ids.
    pub fn view(&mut self, id: &str) -> Option<Project> {
        let project = self.collection().get(id)?;
        self.viewing = Some(project.id.clone());
        Some(project)
    }

    pub fn viewing(&self) -> Option<Project> {
        self.viewing
            .as_deref()
            .and_then(|id| self.collection().get(id))
    }

    pub fn close_view(&mut self) {
        self.viewing = None;
    }

    /// Projects matching `filter`, in insertion order.
    pub fn filter(&self, filter: &ProjectFilter) -> Vec<Project> {
        self.collection()
            .all()
            .into_iter()
            .filter(|project| filter.status.matches(project.status))
            .filter(|project| {
                matches_search(
                    &filter.search,
                    [
                        Some(project.name.as_str()),
                        Some(project.description.as_str()),
                        project.notes.as_deref(),
                    ],
                )
            })
            .collect()
    }

    pub fn columns(&self) -> Vec<Column<Project>> {
        self.board.columns()
    }

    /// Moves a project to another status column.
    pub fn move_to(
        &mut self,
        id: &str,
        status: ProjectStatus,
    ) -> CollectionResult<DropOutcome<ProjectStatus>> {
        self.board.drop_onto(id, status)
    }
}

#[cfg(test)]
mod tests {
    use super::{ProjectService, ProjectServiceError};
    use crate::model::project::{ProjectDraft, ProjectPatch, ProjectStatus};
    use crate::repo::collection::EntityCollection;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn service() -> ProjectService {
        ProjectService::new(EntityCollection::open(
            Arc::new(MemoryStore::standalone()),
            "projects",
        ))
    }

    #[test]
    fn create_rejects_blank_name_and_defaults_status() {
        let service = service();
        assert!(matches!(
            service.create(ProjectDraft::new("   ")),
            Err(ProjectServiceError::InvalidName)
        ));

        let project = service
            .create(ProjectDraft::new("  Site  "))
            .expect("create should succeed");
        assert_eq!(project.name, "Site");
        assert_eq!(project.status, ProjectStatus::Planning);
        assert!(project.tags.is_empty());
    }

    #[test]
    fn delete_closes_open_view() {
        let mut service = service();
        let project = service
            .create(ProjectDraft::new("Site"))
            .expect("create should succeed");
        service.view(&project.id).expect("project should open");

        service.delete(&project.id).expect("delete should succeed");
        assert!(service.viewing().is_none());
    }

    #[test]
    fn update_rejects_blank_rename() {
        let service = service();
        let project = service
            .create(ProjectDraft::new("Site"))
            .expect("create should succeed");
        let patch = ProjectPatch {
            name: Some(" ".to_string()),
            ..ProjectPatch::default()
        };
        assert!(service.update(&project.id, patch).is_err());
    }
}
