//! One context's fully wired workspace.
//!
//! # Responsibility
//! - Open every collection, registry, and slot named by `WorkspaceConfig`.
//! - Build the screen services on top of them.
//! - Keep them in sync with other contexts through one synchronizer.
//!
//! # Invariants
//! - Every configured key is watched for external changes while the
//!   workspace is alive.

use crate::config::{ConfigError, WorkspaceConfig};
use crate::model::task::TaskStatus;
use crate::repo::category_registry::CategoryRegistry;
use crate::repo::collection::EntityCollection;
use crate::repo::user_profile::UserProfile;
use crate::repo::CollectionError;
use crate::service::learning_service::LearningService;
use crate::service::note_service::NoteService;
use crate::service::project_service::ProjectService;
use crate::service::task_service::TaskService;
use crate::service::tool_service::ToolService;
use crate::store::PersistentStore;
use crate::sync::CrossTabSynchronizer;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug)]
pub enum WorkspaceError {
    Config(ConfigError),
    Collection(CollectionError),
}

impl Display for WorkspaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WorkspaceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Collection(err) => Some(err),
        }
    }
}

impl From<ConfigError> for WorkspaceError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<CollectionError> for WorkspaceError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

/// Record counts shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSummary {
    pub user_name: Option<String>,
    pub projects: usize,
    pub tasks: usize,
    pub open_tasks: usize,
    pub notes: usize,
    pub tools: usize,
    pub learning_subjects: usize,
}

pub struct Workspace {
    config: WorkspaceConfig,
    store: Arc<dyn PersistentStore>,
    projects: ProjectService,
    tasks: TaskService,
    notes: NoteService,
    tools: ToolService,
    learning: LearningService,
    profile: UserProfile,
    synchronizer: CrossTabSynchronizer,
}

impl Workspace {
    /// Opens one context over `store`.
    pub fn open(
        store: Arc<dyn PersistentStore>,
        config: WorkspaceConfig,
    ) -> Result<Self, WorkspaceError> {
        config.validate()?;
        let keys = &config.keys;

        let projects = EntityCollection::open(Arc::clone(&store), keys.projects.as_str());
        let tasks = EntityCollection::open(Arc::clone(&store), keys.tasks.as_str());
        let notes = EntityCollection::open(Arc::clone(&store), keys.notes.as_str());
        let tools = EntityCollection::open(Arc::clone(&store), keys.tools.as_str());
        let subjects =
            EntityCollection::open(Arc::clone(&store), keys.learning_subjects.as_str());
        let categories = CategoryRegistry::open(
            Arc::clone(&store),
            keys.tool_categories.as_str(),
            config.default_categories.clone(),
        );
        let profile = UserProfile::open(Arc::clone(&store), keys.user_name.as_str());

        let mut synchronizer = CrossTabSynchronizer::new(Arc::clone(&store));
        synchronizer.watch(projects.clone());
        synchronizer.watch(tasks.clone());
        synchronizer.watch(notes.clone());
        synchronizer.watch(tools.clone());
        synchronizer.watch(subjects.clone());
        synchronizer.watch(categories.clone());
        synchronizer.watch(profile.clone());

        let workspace = Self {
            projects: ProjectService::new(projects),
            tasks: TaskService::new(tasks),
            notes: NoteService::open(notes)?,
            tools: ToolService::new(tools, categories),
            learning: LearningService::new(subjects),
            profile,
            synchronizer,
            store,
            config,
        };
        info!(
            "event=workspace_open module=workspace status=ok context={} watched={}",
            workspace.store.context_id(),
            workspace.synchronizer.watched_keys().len()
        );
        Ok(workspace)
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    pub fn projects(&mut self) -> &mut ProjectService {
        &mut self.projects
    }

    pub fn tasks(&mut self) -> &mut TaskService {
        &mut self.tasks
    }

    pub fn notes(&mut self) -> &mut NoteService {
        &mut self.notes
    }

    pub fn tools(&self) -> &ToolService {
        &self.tools
    }

    pub fn learning(&mut self) -> &mut LearningService {
        &mut self.learning
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn synchronizer(&self) -> &CrossTabSynchronizer {
        &self.synchronizer
    }

    pub fn summary(&self) -> WorkspaceSummary {
        let tasks = self.tasks.collection().all();
        WorkspaceSummary {
            user_name: self.profile.name(),
            projects: self.projects.collection().len(),
            open_tasks: tasks
                .iter()
                .filter(|task| task.status != TaskStatus::Done)
                .count(),
            tasks: tasks.len(),
            notes: self.notes.collection().len(),
            tools: self.tools.collection().len(),
            learning_subjects: self.learning.collection().len(),
        }
    }
}
