//! Cross-project views: what to touch today, and per-project summaries.

use chrono::NaiveDate;

use crate::project::Project;
use crate::task::{Task, TaskStatus};
use crate::time::days_between;

/// Shown when a task's project is missing from the list.
pub const UNKNOWN_PROJECT_NAME: &str = "Project";

#[derive(Debug, Clone, PartialEq)]
pub struct TodayItem<'a> {
    pub task: &'a Task,
    pub project_name: &'a str,
}

/// Tasks that are pinned, start today, or end today, across all projects.
/// Sorted by status name; ties keep their incoming order.
pub fn today_tasks<'a>(projects: &'a [Project], tasks: &'a [Task], today: NaiveDate) -> Vec<TodayItem<'a>> {
    let mut out: Vec<TodayItem<'a>> = tasks
        .iter()
        .filter(|t| t.pinned_to_today || t.planned_start == today || t.planned_end == today)
        .map(|t| TodayItem {
            task: t,
            project_name: projects
                .iter()
                .find(|p| p.id == t.project_id)
                .map(|p| p.name.as_str())
                .unwrap_or(UNKNOWN_PROJECT_NAME),
        })
        .collect();
    out.sort_by(|a, b| a.task.status.as_str().cmp(b.task.status.as_str()));
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary<'a> {
    pub total: usize,
    pub done: usize,
    pub blocked: usize,
    /// Earliest-starting task that is not done.
    pub next: Option<&'a Task>,
    /// Days from today to `next`'s planned start; negative if already started.
    pub days_to_next: Option<i64>,
}

pub fn project_summary<'a>(project_tasks: &[&'a Task], today: NaiveDate) -> ProjectSummary<'a> {
    let count = |status: TaskStatus| project_tasks.iter().filter(|t| t.status == status).count();

    let mut by_start: Vec<&'a Task> = project_tasks.to_vec();
    by_start.sort_by_key(|t| t.planned_start);
    let next = by_start.into_iter().find(|t| t.status != TaskStatus::Done);

    ProjectSummary {
        total: project_tasks.len(),
        done: count(TaskStatus::Done),
        blocked: count(TaskStatus::Blocked),
        next,
        days_to_next: next.map(|t| days_between(today, t.planned_start)),
    }
}
