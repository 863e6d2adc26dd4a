//! Persistence-service boundary.
//!
//! A `Store` keeps Project and Task records keyed by opaque string ids. It
//! offers insert, field-level update, delete-by-id, delete-by-foreign-key and
//! a sorted find-all. Updates overwrite fields in place with last-write-wins;
//! there is no version check.

use crate::project::{Project, ProjectPatch};
use crate::task::{Task, TaskPatch};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("invalid stored record: {0}")]
    Invalid(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait Store {
    /// Projects by creation time, tasks by (project id, order).
    fn load(&self) -> Result<(Vec<Project>, Vec<Task>), StoreError>;

    fn insert_project(&mut self, project: &Project) -> Result<(), StoreError>;
    fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError>;
    fn delete_project(&mut self, id: &str) -> Result<(), StoreError>;

    fn insert_task(&mut self, task: &Task) -> Result<(), StoreError>;
    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), StoreError>;
    fn delete_task(&mut self, id: &str) -> Result<(), StoreError>;
    /// Returns how many tasks were removed.
    fn delete_tasks_for_project(&mut self, project_id: &str) -> Result<usize, StoreError>;
}

/// Plain collections with document-store semantics. Shared by every `Store`
/// implementation that keeps its data in memory between reads and writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collections {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
}

impl Collections {
    pub fn new(projects: Vec<Project>, tasks: Vec<Task>) -> Self {
        Self { projects, tasks }
    }

    pub fn sorted(&self) -> (Vec<Project>, Vec<Task>) {
        let mut projects = self.projects.clone();
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        let mut tasks = self.tasks.clone();
        tasks.sort_by(|a, b| {
            a.project_id
                .cmp(&b.project_id)
                .then_with(|| a.sort_order().cmp(&b.sort_order()))
        });

        (projects, tasks)
    }

    pub fn insert_project(&mut self, project: &Project) {
        self.projects.push(project.clone());
    }

    pub fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("project {id}")))?;
        patch.apply_to(project);
        Ok(())
    }

    pub fn delete_project(&mut self, id: &str) {
        self.projects.retain(|p| p.id != id);
    }

    pub fn insert_task(&mut self, task: &Task) {
        self.tasks.push(task.clone());
    }

    pub fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("task {id}")))?;
        patch.apply_to(task);
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) {
        self.tasks.retain(|t| t.id != id);
    }

    pub fn delete_tasks_for_project(&mut self, project_id: &str) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.project_id != project_id);
        before - self.tasks.len()
    }
}

/// In-process store. Holds its collections for the life of the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Collections,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(projects: Vec<Project>, tasks: Vec<Task>) -> Self {
        Self { data: Collections::new(projects, tasks) }
    }

    pub fn collections(&self) -> &Collections {
        &self.data
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<(Vec<Project>, Vec<Task>), StoreError> {
        Ok(self.data.sorted())
    }

    fn insert_project(&mut self, project: &Project) -> Result<(), StoreError> {
        self.data.insert_project(project);
        Ok(())
    }

    fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError> {
        self.data.update_project(id, patch)
    }

    fn delete_project(&mut self, id: &str) -> Result<(), StoreError> {
        self.data.delete_project(id);
        Ok(())
    }

    fn insert_task(&mut self, task: &Task) -> Result<(), StoreError> {
        self.data.insert_task(task);
        Ok(())
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        self.data.update_task(id, patch)
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.data.delete_task(id);
        Ok(())
    }

    fn delete_tasks_for_project(&mut self, project_id: &str) -> Result<usize, StoreError> {
        Ok(self.data.delete_tasks_for_project(project_id))
    }
}
