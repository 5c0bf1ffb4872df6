//! Kanban status machine and drag/drop protocol.
//!
//! # Responsibility
//! - Group board-shaped collections into fixed status columns.
//! - Apply drag/drop transitions through `EntityCollection::update`.
//!
//! # Invariants
//! - Every status type has exactly three columns and no hidden states.
//! - The transition graph is complete; self-transitions are no-ops.
//! - Drops on missing entities or unknown columns change nothing and never
//!   fail.
//! - Column contents follow collection insertion order.

use crate::model::Entity;
use crate::repo::collection::EntityCollection;
use crate::repo::CollectionResult;
use log::debug;
use std::fmt::Debug;
use std::hash::Hash;

/// Status value of a board column.
pub trait BoardStatus: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Columns in display order.
    const COLUMNS: [Self; 3];

    /// Wire name of the status.
    fn as_str(self) -> &'static str;

    /// Parses a wire name. Unknown names yield `None`.
    fn parse(value: &str) -> Option<Self> {
        Self::COLUMNS
            .into_iter()
            .find(|status| status.as_str() == value)
    }
}

/// Record type shown on a board.
pub trait BoardEntity: Entity {
    type Status: BoardStatus;

    fn status(&self) -> Self::Status;

    /// Patch that moves a record to `status`.
    fn status_patch(status: Self::Status) -> Self::Patch;
}

/// Whether `from -> to` is a legal move. The graph is complete.
pub fn can_transition<S: BoardStatus>(_from: S, _to: S) -> bool {
    true
}

/// Pickup information recorded by `begin_drag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession<S> {
    pub entity_id: String,
    pub source: S,
}

/// What a drop did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome<S> {
    /// Status changed and was persisted.
    Moved { from: S, to: S },
    /// Entity already had the target status.
    Unchanged(S),
    /// Entity no longer exists.
    MissingEntity,
    /// Target column name is not a status of this board.
    UnknownStatus(String),
}

/// One board column with its records in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column<T: BoardEntity> {
    pub status: T::Status,
    pub items: Vec<T>,
}

/// Board view over a collection, holding the in-flight drag.
pub struct KanbanBoard<T: BoardEntity> {
    collection: EntityCollection<T>,
    drag: Option<DragSession<T::Status>>,
}

impl<T: BoardEntity> KanbanBoard<T> {
    pub fn new(collection: EntityCollection<T>) -> Self {
        Self {
            collection,
            drag: None,
        }
    }

    pub fn collection(&self) -> &EntityCollection<T> {
        &self.collection
    }

    /// Records the picked-up entity. Informational only.
    pub fn begin_drag(&mut self, entity_id: &str, source: T::Status) -> &DragSession<T::Status> {
        debug!(
            "event=kanban_begin_drag module=kanban status=ok kind={} id={} source={}",
            T::KIND,
            entity_id,
            source.as_str()
        );
        self.drag.insert(DragSession {
            entity_id: entity_id.to_string(),
            source,
        })
    }

    pub fn active_drag(&self) -> Option<&DragSession<T::Status>> {
        self.drag.as_ref()
    }

    /// Abandons the in-flight drag without touching the collection.
    pub fn cancel_drag(&mut self) -> Option<DragSession<T::Status>> {
        self.drag.take()
    }

    /// Drops `entity_id` onto the column named `column`.
    ///
    /// Unknown column names are ignored.
    pub fn drop_onto_column(
        &mut self,
        entity_id: &str,
        column: &str,
    ) -> CollectionResult<DropOutcome<T::Status>> {
        match T::Status::parse(column) {
            Some(target) => self.drop_onto(entity_id, target),
            None => {
                self.drag = None;
                debug!(
                    "event=kanban_drop module=kanban status=skip kind={} id={} reason=unknown_status",
                    T::KIND,
                    entity_id
                );
                Ok(DropOutcome::UnknownStatus(column.to_string()))
            }
        }
    }

    /// Drops `entity_id` onto `target`, persisting the new status.
    pub fn drop_onto(
        &mut self,
        entity_id: &str,
        target: T::Status,
    ) -> CollectionResult<DropOutcome<T::Status>> {
        self.drag = None;

        let Some(current) = self.collection.get(entity_id) else {
            debug!(
                "event=kanban_drop module=kanban status=skip kind={} id={} reason=not_found",
                T::KIND,
                entity_id
            );
            return Ok(DropOutcome::MissingEntity);
        };

        let from = current.status();
        if from == target || !can_transition(from, target) {
            return Ok(DropOutcome::Unchanged(from));
        }

        match self.collection.update(entity_id, T::status_patch(target))? {
            Some(_) => {
                debug!(
                    "event=kanban_drop module=kanban status=ok kind={} id={} from={} to={}",
                    T::KIND,
                    entity_id,
                    from.as_str(),
                    target.as_str()
                );
                Ok(DropOutcome::Moved { from, to: target })
            }
            None => Ok(DropOutcome::MissingEntity),
        }
    }

    /// All columns in display order.
    pub fn columns(&self) -> Vec<Column<T>> {
        let records = self.collection.all();
        T::Status::COLUMNS
            .into_iter()
            .map(|status| Column {
                status,
                items: records
                    .iter()
                    .filter(|record| record.status() == status)
                    .cloned()
                    .collect(),
            })
            .collect()
    }

    /// Records in one column, in insertion order.
    pub fn column(&self, status: T::Status) -> Vec<T> {
        self.collection
            .all()
            .into_iter()
            .filter(|record| record.status() == status)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{can_transition, BoardStatus};
    use crate::model::project::ProjectStatus;
    use crate::model::task::TaskStatus;

    #[test]
    fn parse_accepts_wire_names_only() {
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("planning"), None);
        assert_eq!(TaskStatus::parse("In-Progress"), None);
        assert_eq!(ProjectStatus::parse("planning"), Some(ProjectStatus::Planning));
    }

    #[test]
    fn transition_graph_is_complete() {
        for from in TaskStatus::COLUMNS {
            for to in TaskStatus::COLUMNS {
                assert!(can_transition(from, to));
            }
        }
    }

    #[test]
    fn wire_names_match_serde() {
        for status in TaskStatus::COLUMNS {
            let json = serde_json::to_value(status).expect("status should serialize");
            assert_eq!(json, status.as_str());
        }
        for status in ProjectStatus::COLUMNS {
            let json = serde_json::to_value(status).expect("status should serialize");
            assert_eq!(json, status.as_str());
        }
    }
}
