//! The local copy of all projects and tasks.
//!
//! Mutations are optimistic: the local copy changes first, then the change is
//! forwarded to the `Store`. A store failure is logged and otherwise ignored:
//! no rollback, no retry, no error to the caller. Concurrent writers race
//! with last-write-wins in the store.

use chrono::{NaiveDate, SecondsFormat};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::chain::{DEFAULT_DURATION_DAYS, chain_next, next_order, next_wbs, sort_by_order};
use crate::error::{Error, Result};
use crate::overview::{ProjectSummary, TodayItem, project_summary, today_tasks};
use crate::project::{Project, ProjectPatch, normalize_name, validate_color};
use crate::store::{Store, StoreError};
use crate::task::{Task, TaskPatch, clamp_progress, status_for_progress};
use crate::time::Now;
use crate::timeline::{Timeline, build_timeline};

/// Input for a new task. Dates are used only when both are given; otherwise
/// the task is auto-chained after the project's last task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    /// Inclusive length for auto-chained tasks. Defaults to 2.
    pub duration_days: Option<i64>,
    pub progress: Option<i64>,
    pub pinned_to_today: bool,
    pub wbs: Option<String>,
    /// Generate the next "1.N" label when no explicit wbs is given.
    pub auto_wbs: bool,
    pub order: Option<i64>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Default::default() }
    }

    pub fn planned(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.planned_start = Some(start);
        self.planned_end = Some(end);
        self
    }

    pub fn lasting(mut self, days: i64) -> Self {
        self.duration_days = Some(days);
        self
    }
}

#[derive(Debug)]
pub struct Workspace<S: Store> {
    projects: Vec<Project>,
    tasks: Vec<Task>,
    store: S,
}

impl<S: Store> Workspace<S> {
    /// Empty workspace in front of `store`, without reading it.
    pub fn new(store: S) -> Self {
        Self { projects: Vec::new(), tasks: Vec::new(), store }
    }

    /// Load everything from the store. A failed load is logged and leaves
    /// the workspace empty.
    pub fn hydrate(store: S) -> Self {
        let mut ws = Self::new(store);
        match ws.store.load() {
            Ok((projects, tasks)) => {
                debug!(projects = projects.len(), tasks = tasks.len(), "hydrated workspace");
                ws.projects = projects;
                ws.tasks = tasks;
            }
            Err(e) => warn!(error = %e, "hydrate failed; starting empty"),
        }
        ws
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Look a project up by id, then by case-insensitive name.
    pub fn find_project(&self, key: &str) -> Option<&Project> {
        let key = key.trim();
        self.project(key).or_else(|| {
            let lower = key.to_lowercase();
            self.projects.iter().find(|p| p.name.to_lowercase() == lower)
        })
    }

    /// A project's tasks in manual order.
    pub fn project_tasks(&self, project_id: &str) -> Vec<&Task> {
        sort_by_order(self.tasks.iter().filter(|t| t.project_id == project_id))
    }

    pub fn timeline(&self, project_id: &str, day_width: f64, today: NaiveDate) -> Result<Timeline> {
        self.require_project(project_id)?;
        Ok(build_timeline(self.project_tasks(project_id), day_width, today))
    }

    pub fn today(&self, today: NaiveDate) -> Vec<TodayItem<'_>> {
        today_tasks(&self.projects, &self.tasks, today)
    }

    pub fn project_summary(&self, project_id: &str, today: NaiveDate) -> Result<ProjectSummary<'_>> {
        self.require_project(project_id)?;
        Ok(project_summary(&self.project_tasks(project_id), today))
    }

    // ----------------------------------------------------------------------
    // Projects
    // ----------------------------------------------------------------------

    pub fn add_project(&mut self, name: &str, color: Option<&str>, now: Now) -> Result<String> {
        let mut project = Project::new(
            Uuid::new_v4().to_string(),
            normalize_name(name)?,
            now.utc.to_rfc3339_opts(SecondsFormat::Millis, true),
        );
        if let Some(color) = color {
            project.color = validate_color(color)?;
        }

        let id = project.id.clone();
        self.projects.push(project.clone());
        info!(project = %id, name = %project.name, "project added");

        self.forward("insert_project", |s| s.insert_project(&project));
        Ok(id)
    }

    pub fn rename_project(&mut self, id: &str, name: &str) -> Result<()> {
        let patch = ProjectPatch { name: Some(normalize_name(name)?), color: None };
        self.patch_project(id, patch)
    }

    pub fn recolor_project(&mut self, id: &str, color: &str) -> Result<()> {
        let patch = ProjectPatch { name: None, color: Some(validate_color(color)?) };
        self.patch_project(id, patch)
    }

    fn patch_project(&mut self, id: &str, patch: ProjectPatch) -> Result<()> {
        let project = self
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| Error::UnknownProject(id.to_string()))?;
        patch.apply_to(project);
        debug!(project = %id, ?patch, "project patched");

        self.forward("update_project", |s| s.update_project(id, &patch));
        Ok(())
    }

    /// Remove a project and every task that references it. Irreversible.
    /// Returns how many tasks went with it.
    pub fn delete_project(&mut self, id: &str) -> Result<usize> {
        self.require_project(id)?;

        self.projects.retain(|p| p.id != id);
        let before = self.tasks.len();
        self.tasks.retain(|t| t.project_id != id);
        let removed = before - self.tasks.len();
        info!(project = %id, tasks = removed, "project deleted");

        self.forward("delete_project", |s| s.delete_project(id));
        self.forward("delete_tasks_for_project", |s| {
            s.delete_tasks_for_project(id).map(|_| ())
        });
        Ok(removed)
    }

    // ----------------------------------------------------------------------
    // Tasks
    // ----------------------------------------------------------------------

    pub fn add_task(&mut self, project_id: &str, new: NewTask, now: Now) -> Result<String> {
        self.require_project(project_id)?;

        let title = new.title.trim();
        if title.is_empty() {
            return Err(Error::Missing("title"));
        }

        let project_tasks = self.project_tasks(project_id);
        let (planned_start, planned_end, order) = match (new.planned_start, new.planned_end) {
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(Error::EndBeforeStart { start, end });
                }
                (start, end, next_order(&project_tasks))
            }
            _ => {
                let duration = new.duration_days.unwrap_or(DEFAULT_DURATION_DAYS);
                let slot = chain_next(project_tasks.iter().copied(), duration, now.today);
                (slot.planned_start, slot.planned_end, slot.order)
            }
        };

        let wbs = match new.wbs {
            Some(w) => Some(w),
            None if new.auto_wbs => Some(next_wbs(project_tasks.iter().copied())),
            None => None,
        };

        let mut task = Task::new(
            Uuid::new_v4().to_string(),
            project_id,
            title,
            planned_start,
            planned_end,
        )
        .with_progress(new.progress.unwrap_or(0))
        .with_order(new.order.unwrap_or(order));
        task.description = new.description;
        task.pinned_to_today = new.pinned_to_today;
        task.wbs = wbs;
        task.created_at = Some(now.utc.to_rfc3339_opts(SecondsFormat::Millis, true));

        let id = task.id.clone();
        self.tasks.push(task.clone());
        info!(
            task = %id,
            project = %project_id,
            start = %task.planned_start,
            end = %task.planned_end,
            "task added"
        );

        self.forward("insert_task", |s| s.insert_task(&task));
        Ok(id)
    }

    /// Apply a partial update. Setting progress clamps it and re-derives
    /// status; an explicit status in the same patch wins. The effective patch,
    /// derived status included, is what the store receives.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Result<()> {
        let mut effective = patch;
        if let Some(title) = &effective.title {
            let trimmed = title.trim();
            if trimmed.is_empty() {
                return Err(Error::Missing("title"));
            }
            effective.title = Some(trimmed.to_string());
        }
        if let Some(progress) = effective.progress {
            let progress = clamp_progress(progress);
            effective.progress = Some(progress as i64);
            if effective.status.is_none() {
                effective.status = Some(status_for_progress(progress));
            }
        }

        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::UnknownTask(id.to_string()))?;

        let start = effective.planned_start.unwrap_or(task.planned_start);
        let end = effective.planned_end.unwrap_or(task.planned_end);
        if end < start {
            return Err(Error::EndBeforeStart { start, end });
        }

        effective.apply_to(task);
        debug!(task = %id, ?effective, "task patched");

        self.forward("update_task", |s| s.update_task(id, &effective));
        Ok(())
    }

    pub fn delete_task(&mut self, id: &str) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            return Err(Error::UnknownTask(id.to_string()));
        }
        info!(task = %id, "task deleted");

        self.forward("delete_task", |s| s.delete_task(id));
        Ok(())
    }

    fn require_project(&self, id: &str) -> Result<()> {
        match self.project(id) {
            Some(_) => Ok(()),
            None => Err(Error::UnknownProject(id.to_string())),
        }
    }

    /// Fire-and-forget write to the store.
    fn forward(&mut self, op: &'static str, write: impl FnOnce(&mut S) -> Result<(), StoreError>) {
        if let Err(e) = write(&mut self.store) {
            warn!(op, error = %e, "store write failed; local change kept");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::task::TaskStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ws_with_project() -> (Workspace<MemoryStore>, String) {
        let mut ws = Workspace::new(MemoryStore::new());
        let pid = ws.add_project("EECS 151", None, Now::on(d(2024, 3, 1))).unwrap();
        (ws, pid)
    }

    #[test]
    fn first_task_starts_today_then_chains() {
        let (mut ws, pid) = ws_with_project();
        let now = Now::on(d(2024, 3, 8));

        let a = ws.add_task(&pid, NewTask::titled("Outline"), now).unwrap();
        let b = ws.add_task(&pid, NewTask::titled("Draft").lasting(3), now).unwrap();

        let a = ws.task(&a).unwrap();
        assert_eq!((a.planned_start, a.planned_end, a.order), (d(2024, 3, 8), d(2024, 3, 9), Some(1)));
        let b = ws.task(&b).unwrap();
        assert_eq!((b.planned_start, b.planned_end, b.order), (d(2024, 3, 10), d(2024, 3, 12), Some(2)));
    }

    #[test]
    fn explicit_dates_need_both_ends() {
        let (mut ws, pid) = ws_with_project();
        let now = Now::on(d(2024, 3, 8));

        let mut half = NewTask::titled("Half");
        half.planned_start = Some(d(2024, 4, 1));
        let id = ws.add_task(&pid, half, now).unwrap();
        assert_eq!(ws.task(&id).unwrap().planned_start, d(2024, 3, 8));

        let full = NewTask::titled("Full").planned(d(2024, 4, 1), d(2024, 4, 3));
        let id = ws.add_task(&pid, full, now).unwrap();
        assert_eq!(ws.task(&id).unwrap().planned_end, d(2024, 4, 3));
    }

    #[test]
    fn explicit_dates_skip_chaining_but_still_take_the_next_order() {
        let (mut ws, pid) = ws_with_project();
        let now = Now::on(d(2024, 3, 8));
        let last = NewTask::titled("Open ended").planned(d(2024, 3, 1), NaiveDate::MAX);
        ws.add_task(&pid, last, now).unwrap();

        let pinned = NewTask::titled("Pinned").planned(d(2024, 3, 2), d(2024, 3, 4));
        let id = ws.add_task(&pid, pinned, now).unwrap();
        let t = ws.task(&id).unwrap();
        assert_eq!((t.planned_start, t.planned_end, t.order), (d(2024, 3, 2), d(2024, 3, 4), Some(2)));
    }

    #[test]
    fn user_colors_must_be_hex() {
        let (mut ws, pid) = ws_with_project();
        assert!(matches!(
            ws.add_project("Other", Some("slate"), Now::on(d(2024, 3, 1))),
            Err(Error::InvalidColor(_))
        ));
        assert!(matches!(ws.recolor_project(&pid, "blue"), Err(Error::InvalidColor(_))));
        ws.recolor_project(&pid, "#0f172a").unwrap();
        assert_eq!(ws.project(&pid).unwrap().color, "#0f172a");
        assert_eq!(ws.projects().len(), 1);
    }

    #[test]
    fn inverted_explicit_dates_are_rejected() {
        let (mut ws, pid) = ws_with_project();
        let bad = NewTask::titled("Bad").planned(d(2024, 4, 3), d(2024, 4, 1));
        assert!(matches!(
            ws.add_task(&pid, bad, Now::on(d(2024, 3, 8))),
            Err(Error::EndBeforeStart { .. })
        ));
        assert!(ws.tasks().is_empty());
    }

    #[test]
    fn new_task_status_follows_progress() {
        let (mut ws, pid) = ws_with_project();
        let mut new = NewTask::titled("Half done");
        new.progress = Some(150);
        let id = ws.add_task(&pid, new, Now::on(d(2024, 3, 8))).unwrap();
        let t = ws.task(&id).unwrap();
        assert_eq!(t.progress, 100);
        assert_eq!(t.status, TaskStatus::Done);
    }

    #[test]
    fn auto_wbs_counts_up() {
        let (mut ws, pid) = ws_with_project();
        let now = Now::on(d(2024, 3, 8));
        let mut first = NewTask::titled("One");
        first.auto_wbs = true;
        let mut second = first.clone();
        second.title = "Two".into();

        let a = ws.add_task(&pid, first, now).unwrap();
        let b = ws.add_task(&pid, second, now).unwrap();
        assert_eq!(ws.task(&a).unwrap().wbs.as_deref(), Some("1.1"));
        assert_eq!(ws.task(&b).unwrap().wbs.as_deref(), Some("1.2"));
    }

    #[test]
    fn progress_patch_derives_status_but_status_patch_sticks() {
        let (mut ws, pid) = ws_with_project();
        let id = ws.add_task(&pid, NewTask::titled("x"), Now::on(d(2024, 3, 8))).unwrap();

        ws.update_task(&id, TaskPatch { progress: Some(40), ..Default::default() }).unwrap();
        assert_eq!(ws.task(&id).unwrap().status, TaskStatus::Doing);

        ws.update_task(&id, TaskPatch { status: Some(TaskStatus::Blocked), ..Default::default() })
            .unwrap();
        let t = ws.task(&id).unwrap();
        assert_eq!((t.progress, t.status), (40, TaskStatus::Blocked));

        ws.update_task(
            &id,
            TaskPatch { progress: Some(80), status: Some(TaskStatus::Blocked), ..Default::default() },
        )
        .unwrap();
        let t = ws.task(&id).unwrap();
        assert_eq!((t.progress, t.status), (80, TaskStatus::Blocked));
    }

    #[test]
    fn store_receives_effective_patch() {
        let (mut ws, pid) = ws_with_project();
        let id = ws.add_task(&pid, NewTask::titled("x"), Now::on(d(2024, 3, 8))).unwrap();
        ws.update_task(&id, TaskPatch { progress: Some(100), ..Default::default() }).unwrap();

        let stored = ws.store().collections().tasks.iter().find(|t| t.id == id).unwrap();
        assert_eq!(stored.status, TaskStatus::Done);
    }

    #[test]
    fn delete_project_cascades() {
        let (mut ws, pid) = ws_with_project();
        let other = ws.add_project("Intern Prep", Some("#0f172a"), Now::on(d(2024, 3, 1))).unwrap();
        let now = Now::on(d(2024, 3, 8));
        ws.add_task(&pid, NewTask::titled("a"), now).unwrap();
        ws.add_task(&pid, NewTask::titled("b"), now).unwrap();
        ws.add_task(&other, NewTask::titled("c"), now).unwrap();

        assert_eq!(ws.delete_project(&pid).unwrap(), 2);
        assert!(ws.project(&pid).is_none());
        assert_eq!(ws.tasks().len(), 1);
        assert_eq!(ws.store().collections().tasks.len(), 1);
        assert_eq!(ws.store().collections().projects.len(), 1);
    }

    #[test]
    fn find_project_by_name() {
        let (ws, pid) = ws_with_project();
        assert_eq!(ws.find_project("eecs 151").map(|p| p.id.clone()), Some(pid.clone()));
        assert_eq!(ws.find_project(&pid).map(|p| p.name.as_str()), Some("EECS 151"));
        assert!(ws.find_project("nope").is_none());
    }

    #[test]
    fn unknown_ids_are_errors() {
        let (mut ws, _) = ws_with_project();
        let now = Now::on(d(2024, 3, 8));
        assert!(matches!(ws.add_task("nope", NewTask::titled("x"), now), Err(Error::UnknownProject(_))));
        assert!(matches!(ws.delete_task("nope"), Err(Error::UnknownTask(_))));
        assert!(matches!(ws.rename_project("nope", "x"), Err(Error::UnknownProject(_))));
    }
}
