use devhub_core::model::task::{TaskDraft, TaskStatus};
use devhub_core::service::tool_service::NewTool;
use devhub_core::{
    ConfigError, MemoryStorage, PersistentStore, SqliteStore, Workspace, WorkspaceConfig,
    WorkspaceError,
};
use std::sync::Arc;
use tempfile::TempDir;

fn open(storage: &Arc<MemoryStorage>) -> Workspace {
    let store: Arc<dyn PersistentStore> = Arc::new(storage.open_context());
    Workspace::open(store, WorkspaceConfig::default()).unwrap()
}

#[test]
fn two_workspaces_on_one_storage_stay_in_sync() {
    let storage = MemoryStorage::new();
    let mut tab_a = open(&storage);
    let mut tab_b = open(&storage);
    assert_eq!(tab_a.synchronizer().watched_keys().len(), 7);

    let task = tab_a.tasks().add(TaskDraft::new("review PR")).unwrap();
    tab_a.tasks().drop_onto(&task.id, TaskStatus::InProgress).unwrap();
    tab_a.profile().set_name("Ada Lovelace").unwrap();
    tab_a.tools().add_category("Research").unwrap();

    assert_eq!(
        tab_b.tasks().collection().get(&task.id).unwrap().status,
        TaskStatus::InProgress
    );
    assert_eq!(tab_b.profile().first_name().as_deref(), Some("Ada"));
    assert!(tab_b.tools().categories().contains("Research"));

    tab_b
        .tools()
        .add_tool(NewTool {
            title: "Papers".to_string(),
            url: "arxiv.org".to_string(),
            description: String::new(),
            category: Some("Research".to_string()),
        })
        .unwrap();
    assert_eq!(tab_a.tools().collection().len(), 1);
}

#[test]
fn summary_counts_records_and_open_tasks() {
    let storage = MemoryStorage::new();
    let mut workspace = open(&storage);
    let done = workspace.tasks().add(TaskDraft::new("done")).unwrap();
    workspace.tasks().add(TaskDraft::new("open")).unwrap();
    workspace.tasks().drop_onto(&done.id, TaskStatus::Done).unwrap();
    workspace.learning().create_subject("Rust").unwrap();

    let summary = workspace.summary();

    assert_eq!(summary.user_name, None);
    assert_eq!(summary.tasks, 2);
    assert_eq!(summary.open_tasks, 1);
    // Default note seeded on first open.
    assert_eq!(summary.notes, 1);
    assert_eq!(summary.learning_subjects, 1);
    assert_eq!(summary.projects, 0);
    assert_eq!(summary.tools, 0);
}

#[test]
fn invalid_config_is_rejected_before_touching_the_store() {
    let storage = MemoryStorage::new();
    let store: Arc<dyn PersistentStore> = Arc::new(storage.open_context());
    let mut config = WorkspaceConfig::default();
    config.keys.notes = config.keys.tasks.clone();

    let result = Workspace::open(store, config);

    assert!(matches!(
        result,
        Err(WorkspaceError::Config(ConfigError::DuplicateKey(key))) if key == "tasks"
    ));
    assert_eq!(storage.raw("devhub_notes").unwrap(), None);
    assert_eq!(storage.subscriber_count(), 0);
}

#[test]
fn workspace_persists_across_sqlite_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("devhub.sqlite3");

    let note_id = {
        let store: Arc<dyn PersistentStore> = Arc::new(SqliteStore::open(&path).unwrap());
        let mut workspace = Workspace::open(store, WorkspaceConfig::default()).unwrap();
        workspace.notes().update_title("Kept").unwrap();
        workspace.notes().active_id().map(str::to_string).unwrap()
    };

    let store: Arc<dyn PersistentStore> = Arc::new(SqliteStore::open(&path).unwrap());
    let mut workspace = Workspace::open(store, WorkspaceConfig::default()).unwrap();
    let notes = workspace.notes().collection().all();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].id, note_id);
    assert_eq!(notes[0].title, "Kept");
}
