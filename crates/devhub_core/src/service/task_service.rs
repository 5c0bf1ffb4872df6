//! Task board use-case service.
//!
//! # Responsibility
//! - Add, edit, and delete tasks.
//! - Drive the task kanban board through `begin_drag`/`drop`.
//!
//! # Invariants
//! - New tasks start in `todo`.
//! - Deleting the task shown in the details panel closes the panel.

use crate::kanban::{Column, DragSession, DropOutcome, KanbanBoard};
use crate::model::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::model::EntityId;
use crate::repo::collection::EntityCollection;
use crate::repo::CollectionResult;
use log::info;

pub struct TaskService {
    board: KanbanBoard<Task>,
    details: Option<EntityId>,
}

impl TaskService {
    pub fn new(tasks: EntityCollection<Task>) -> Self {
        Self {
            board: KanbanBoard::new(tasks),
            details: None,
        }
    }

    pub fn collection(&self) -> &EntityCollection<Task> {
        self.board.collection()
    }

    /// Adds a task to the `todo` column. The description is trimmed and may
    /// be empty.
    pub fn add(&self, draft: TaskDraft) -> CollectionResult<Task> {
        let task = self.collection().create(TaskDraft {
            description: draft.description.trim().to_string(),
            ..draft
        })?;
        info!("event=task_add module=service status=ok id={}", task.id);
        Ok(task)
    }

    /// Saves the details panel. Unknown ids yield `Ok(None)`.
    pub fn update(&self, id: &str, mut patch: TaskPatch) -> CollectionResult<Option<Task>> {
        if let Some(description) = patch.description.as_mut() {
            *description = description.trim().to_string();
        }
        self.collection().update(id, patch)
    }

    pub fn delete(&mut self, id: &str) -> CollectionResult<Option<Task>> {
        let removed = self.collection().remove(id)?;
        if self.details.as_deref() == Some(id) {
            self.details = None;
        }
        Ok(removed)
    }

    /// Opens the details panel for a task.
    pub fn open_details(&mut self, id: &str) -> Option<Task> {
        let task = self.collection().get(id)?;
        self.details = Some(task.id.clone());
        Some(task)
    }

    pub fn details(&self) -> Option<Task> {
        self.details
            .as_deref()
            .and_then(|id| self.collection().get(id))
    }

    pub fn close_details(&mut self) {
        self.details = None;
    }

    pub fn columns(&self) -> Vec<Column<Task>> {
        self.board.columns()
    }

    pub fn column(&self, status: TaskStatus) -> Vec<Task> {
        self.board.column(status)
    }

    /// Picks up a task. Unknown ids start no drag.
    pub fn begin_drag(&mut self, id: &str) -> Option<DragSession<TaskStatus>> {
        let task = self.collection().get(id)?;
        Some(self.board.begin_drag(id, task.status).clone())
    }

    pub fn cancel_drag(&mut self) {
        self.board.cancel_drag();
    }

    pub fn drop_onto(
        &mut self,
        id: &str,
        status: TaskStatus,
    ) -> CollectionResult<DropOutcome<TaskStatus>> {
        self.board.drop_onto(id, status)
    }

    /// Drop addressed by column name, as delivered by a drag surface.
    pub fn drop_onto_column(
        &mut self,
        id: &str,
        column: &str,
    ) -> CollectionResult<DropOutcome<TaskStatus>> {
        self.board.drop_onto_column(id, column)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskService;
    use crate::kanban::DropOutcome;
    use crate::model::task::{TaskDraft, TaskPatch, TaskStatus};
    use crate::repo::collection::EntityCollection;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn service() -> TaskService {
        TaskService::new(EntityCollection::open(
            Arc::new(MemoryStore::standalone()),
            "tasks",
        ))
    }

    #[test]
    fn drag_and_drop_moves_task_between_columns() {
        let mut service = service();
        let task = service
            .add(TaskDraft::new("write docs"))
            .expect("add should succeed");

        let session = service.begin_drag(&task.id).expect("task should be draggable");
        assert_eq!(session.source, TaskStatus::Todo);

        let outcome = service
            .drop_onto(&task.id, TaskStatus::Done)
            .expect("drop should succeed");
        assert_eq!(
            outcome,
            DropOutcome::Moved {
                from: TaskStatus::Todo,
                to: TaskStatus::Done
            }
        );
        assert_eq!(service.column(TaskStatus::Done).len(), 1);
        assert!(service.column(TaskStatus::Todo).is_empty());
    }

    #[test]
    fn delete_closes_details_panel() {
        let mut service = service();
        let task = service
            .add(TaskDraft::new("write docs"))
            .expect("add should succeed");
        service.open_details(&task.id).expect("details should open");

        service.delete(&task.id).expect("delete should succeed");
        assert!(service.details().is_none());
    }

    #[test]
    fn title_only_task_is_saved_and_description_can_be_cleared() {
        let service = service();
        let task = service
            .add(TaskDraft {
                title: Some("Fix login".to_string()),
                ..TaskDraft::new("  ")
            })
            .expect("title-only task should be saved");
        assert_eq!(task.description, "");
        assert_eq!(service.collection().get(&task.id), Some(task));

        let edited = service
            .add(TaskDraft::new(" write docs "))
            .expect("add should succeed");
        assert_eq!(edited.description, "write docs");
        let cleared = service
            .update(
                &edited.id,
                TaskPatch {
                    description: Some(String::new()),
                    ..TaskPatch::default()
                },
            )
            .expect("update should succeed")
            .expect("task should exist");
        assert_eq!(cleared.description, "");
        assert_eq!(service.collection().get(&edited.id), Some(cleared));
    }
}
