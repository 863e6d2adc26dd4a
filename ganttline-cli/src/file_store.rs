//! JSON-file persistence for the workspace.
//!
//! The whole snapshot is rewritten on every mutation: written to a sibling
//! temp file, then renamed over the real one, so a crash never leaves a
//! half-written file behind.

use ganttline_core::{
    Collections, Project, ProjectPatch, Snapshot, Store, StoreError, Task, TaskPatch,
};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Collections,
}

impl FileStore {
    /// Open `path`, reading it if it exists. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = if path.exists() {
            let bytes = fs::read(&path)?;
            let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
            let (projects, tasks) = snapshot
                .into_domain()
                .map_err(|e| StoreError::Invalid(format!("{}: {e}", path.display())))?;
            Collections::new(projects, tasks)
        } else {
            Collections::default()
        };
        debug!(
            path = %path.display(),
            projects = data.projects.len(),
            tasks = data.tasks.len(),
            "opened file store"
        );
        Ok(Self { path, data })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let snapshot = Snapshot::from_domain(&self.data.projects, &self.data.tasks);
        let json = serde_json::to_vec_pretty(&snapshot)?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<(Vec<Project>, Vec<Task>), StoreError> {
        Ok(self.data.sorted())
    }

    fn insert_project(&mut self, project: &Project) -> Result<(), StoreError> {
        self.data.insert_project(project);
        self.persist()
    }

    fn update_project(&mut self, id: &str, patch: &ProjectPatch) -> Result<(), StoreError> {
        self.data.update_project(id, patch)?;
        self.persist()
    }

    fn delete_project(&mut self, id: &str) -> Result<(), StoreError> {
        self.data.delete_project(id);
        self.persist()
    }

    fn insert_task(&mut self, task: &Task) -> Result<(), StoreError> {
        self.data.insert_task(task);
        self.persist()
    }

    fn update_task(&mut self, id: &str, patch: &TaskPatch) -> Result<(), StoreError> {
        self.data.update_task(id, patch)?;
        self.persist()
    }

    fn delete_task(&mut self, id: &str) -> Result<(), StoreError> {
        self.data.delete_task(id);
        self.persist()
    }

    fn delete_tasks_for_project(&mut self, project_id: &str) -> Result<usize, StoreError> {
        let removed = self.data.delete_tasks_for_project(project_id);
        self.persist()?;
        Ok(removed)
    }
}
