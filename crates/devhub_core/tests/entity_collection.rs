use devhub_core::model::learning::{LearningSubject, LearningSubjectDraft};
use devhub_core::model::note::{Note, NoteDraft, NotePatch};
use devhub_core::model::project::{Project, ProjectDraft, ProjectStatus};
use devhub_core::model::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use devhub_core::model::tool::{Tool, ToolDraft};
use devhub_core::{EntityCollection, LoadOutcome, MemoryStorage, MemoryStore, PersistentStore};
use std::collections::HashSet;
use std::sync::Arc;

fn store() -> Arc<dyn PersistentStore> {
    Arc::new(MemoryStore::standalone())
}

#[test]
fn absent_key_loads_empty() {
    let tasks: EntityCollection<Task> = EntityCollection::open(store(), "tasks");
    assert!(tasks.is_empty());
    assert_eq!(tasks.last_load(), LoadOutcome::Absent);
    assert_eq!(tasks.snapshot(), None);
}

#[test]
fn created_records_round_trip_through_reload() {
    let storage = MemoryStorage::new();
    let first: Arc<dyn PersistentStore> = Arc::new(storage.open_context());

    let tasks: EntityCollection<Task> = EntityCollection::open(Arc::clone(&first), "tasks");
    let task = tasks
        .create(TaskDraft {
            title: Some("Release".to_string()),
            due_date: Some("2026-11-01".to_string()),
            ..TaskDraft::new("cut the release")
        })
        .unwrap();

    let notes: EntityCollection<Note> = EntityCollection::open(Arc::clone(&first), "notes");
    let note = notes
        .create(NoteDraft {
            tags: vec!["rust".to_string(), "rust".to_string()],
            ..NoteDraft::default()
        })
        .unwrap();

    let projects: EntityCollection<Project> = EntityCollection::open(Arc::clone(&first), "projects");
    let project = projects.create(ProjectDraft::new("Site")).unwrap();

    let tools: EntityCollection<Tool> = EntityCollection::open(Arc::clone(&first), "tools");
    let tool = tools
        .create(ToolDraft {
            title: "Docs".to_string(),
            url: "https://docs.rs".to_string(),
            color: "from-blue-500 to-blue-600".to_string(),
            description: None,
            category: Some("Development".to_string()),
        })
        .unwrap();

    let subjects: EntityCollection<LearningSubject> =
        EntityCollection::open(Arc::clone(&first), "learningSubjects");
    let subject = subjects
        .create(LearningSubjectDraft::new("Rust"))
        .unwrap();

    let reloaded: Arc<dyn PersistentStore> = Arc::new(storage.open_context());
    let tasks_again: EntityCollection<Task> = EntityCollection::open(Arc::clone(&reloaded), "tasks");
    let notes_again: EntityCollection<Note> = EntityCollection::open(Arc::clone(&reloaded), "notes");
    let projects_again: EntityCollection<Project> =
        EntityCollection::open(Arc::clone(&reloaded), "projects");
    let tools_again: EntityCollection<Tool> = EntityCollection::open(Arc::clone(&reloaded), "tools");
    let subjects_again: EntityCollection<LearningSubject> =
        EntityCollection::open(reloaded, "learningSubjects");

    assert_eq!(tasks_again.all(), vec![task]);
    assert_eq!(notes_again.all(), vec![note]);
    assert_eq!(projects_again.all(), vec![project]);
    assert_eq!(tools_again.all(), vec![tool]);
    assert_eq!(subjects_again.all(), vec![subject]);
    assert_eq!(tasks_again.last_load(), LoadOutcome::Loaded { records: 1 });
}

#[test]
fn rapid_creates_yield_distinct_ids_in_insertion_order() {
    let tasks: EntityCollection<Task> = EntityCollection::open(store(), "tasks");
    let created: Vec<Task> = (0..200)
        .map(|index| tasks.create(TaskDraft::new(format!("task {index}"))).unwrap())
        .collect();

    let ids: HashSet<&str> = created.iter().map(|task| task.id.as_str()).collect();
    assert_eq!(ids.len(), 200);
    let stored: Vec<String> = tasks.all().into_iter().map(|task| task.description).collect();
    assert_eq!(stored.first().map(String::as_str), Some("task 0"));
    assert_eq!(stored.last().map(String::as_str), Some("task 199"));
}

#[test]
fn malformed_value_recovers_to_empty_without_writing() {
    let storage = MemoryStorage::new();
    storage.seed("tasks", "{not json").unwrap();

    let tasks: EntityCollection<Task> = EntityCollection::open(Arc::new(storage.open_context()), "tasks");
    assert!(tasks.is_empty());
    assert_eq!(tasks.last_load(), LoadOutcome::Recovered);
    assert_eq!(storage.raw("tasks").unwrap().as_deref(), Some("{not json"));

    tasks.create(TaskDraft::new("fresh start")).unwrap();
    assert_eq!(tasks.len(), 1);
    assert_ne!(storage.raw("tasks").unwrap().as_deref(), Some("{not json"));
}

#[test]
fn schema_mismatch_is_treated_as_malformed() {
    let storage = MemoryStorage::new();
    storage.seed("tasks", r#"{"id":"1"}"#).unwrap();

    let tasks: EntityCollection<Task> = EntityCollection::open(Arc::new(storage.open_context()), "tasks");
    assert!(tasks.is_empty());
    assert_eq!(tasks.last_load(), LoadOutcome::Recovered);
}

#[test]
fn missing_fields_are_backfilled_with_defaults() {
    let storage = MemoryStorage::new();
    storage
        .seed(
            "devhub_notes",
            r#"[{"id":"1","title":"Old","createdAt":"2024-01-02T03:04:05.000Z"}]"#,
        )
        .unwrap();
    storage
        .seed("projects", r#"[{"id":"p1","name":"Legacy"}]"#)
        .unwrap();

    let store: Arc<dyn PersistentStore> = Arc::new(storage.open_context());
    let notes: EntityCollection<Note> = EntityCollection::open(Arc::clone(&store), "devhub_notes");
    let note = notes.get("1").unwrap();
    assert_eq!(note.content, "");
    assert!(note.tags.is_empty());
    assert!(!note.is_favorite);
    assert_eq!(note.created_at.to_rfc3339(), "2024-01-02T03:04:05+00:00");

    let projects: EntityCollection<Project> = EntityCollection::open(store, "projects");
    let project = projects.get("p1").unwrap();
    assert_eq!(project.status, ProjectStatus::Planning);
    assert_eq!(project.description, "");
    assert_eq!(project.deadline, None);
}

#[test]
fn update_merges_patch_and_missing_id_is_a_noop() {
    let storage = MemoryStorage::new();
    let tasks: EntityCollection<Task> =
        EntityCollection::open(Arc::new(storage.open_context()), "tasks");
    let task = tasks.create(TaskDraft::new("draft")).unwrap();

    let updated = tasks
        .update(
            &task.id,
            TaskPatch {
                status: Some(TaskStatus::InProgress),
                notes: Some(Some("halfway".to_string())),
                ..TaskPatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.id, task.id);
    assert_eq!(updated.description, "draft");
    assert_eq!(updated.status, TaskStatus::InProgress);
    assert_eq!(updated.notes.as_deref(), Some("halfway"));

    let before = storage.raw("tasks").unwrap();
    assert_eq!(tasks.update("missing", TaskPatch::default()).unwrap(), None);
    assert_eq!(tasks.remove("missing").unwrap(), None);
    assert_eq!(storage.raw("tasks").unwrap(), before);
}

#[test]
fn note_patch_refreshes_updated_at_only() {
    let notes: EntityCollection<Note> = EntityCollection::open(store(), "devhub_notes");
    let note = notes.create(NoteDraft::default()).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(5));

    let untouched = notes.update(&note.id, NotePatch::default()).unwrap().unwrap();
    assert_eq!(untouched.updated_at, note.updated_at);

    let edited = notes
        .update(
            &note.id,
            NotePatch {
                content: Some("# hi".to_string()),
                ..NotePatch::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(edited.created_at, note.created_at);
    assert!(edited.updated_at > note.updated_at);
}

#[test]
fn remove_deletes_and_all_returns_a_copy() {
    let tasks: EntityCollection<Task> = EntityCollection::open(store(), "tasks");
    let first = tasks.create(TaskDraft::new("one")).unwrap();
    let second = tasks.create(TaskDraft::new("two")).unwrap();

    let mut copy = tasks.all();
    copy.clear();
    assert_eq!(tasks.len(), 2);

    assert_eq!(tasks.remove(&first.id).unwrap(), Some(first));
    assert_eq!(tasks.all(), vec![second]);
}

#[test]
fn duplicate_ids_are_repaired_and_persisted_on_load() {
    let storage = MemoryStorage::new();
    storage
        .seed(
            "tasks",
            r#"[{"id":"7","description":"a"},{"id":"7","description":"b"},{"description":"c"}]"#,
        )
        .unwrap();

    let tasks: EntityCollection<Task> =
        EntityCollection::open(Arc::new(storage.open_context()), "tasks");
    let ids: HashSet<String> = tasks.all().into_iter().map(|task| task.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains("7"));
    assert!(!ids.contains(""));

    let persisted: serde_json::Value =
        serde_json::from_str(&storage.raw("tasks").unwrap().unwrap()).unwrap();
    assert_eq!(persisted[0]["id"], "7");
    assert_ne!(persisted[1]["id"], "7");
    assert_eq!(tasks.snapshot(), storage.raw("tasks").unwrap());
}

#[test]
fn wire_format_uses_camel_case_and_omits_unset_optionals() {
    let storage = MemoryStorage::new();
    let tasks: EntityCollection<Task> =
        EntityCollection::open(Arc::new(storage.open_context()), "tasks");
    tasks
        .create(TaskDraft {
            due_date: Some("2026-12-24".to_string()),
            ..TaskDraft::new("wrap gifts")
        })
        .unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&storage.raw("tasks").unwrap().unwrap()).unwrap();
    let record = &value[0];
    assert_eq!(record["dueDate"], "2026-12-24");
    assert_eq!(record["status"], "todo");
    assert!(record.get("title").is_none());
    assert!(record.get("notes").is_none());
}
