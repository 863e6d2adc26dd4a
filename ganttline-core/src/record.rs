//! Wire shapes for projects and tasks, and the conversions that validate
//! them into domain values.
//!
//! Dates travel as "YYYY-MM-DD" strings and are parsed here, at the boundary,
//! so the calculus only ever sees well-formed `NaiveDate`s.

use chrono::{DateTime, Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::project::{DEFAULT_PROJECT_COLOR, Project, normalize_name};
use crate::task::{Task, TaskStatus};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Four-digit years only.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

/// Parse a calendar date. A full RFC 3339 timestamp is accepted too; its
/// date part (in its own offset) is used. Years outside 0000..=9999 are
/// rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .filter(|date| (MIN_YEAR..=MAX_YEAR).contains(&date.year()))
        .ok_or_else(|| Error::InvalidDate(value.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_date(v).map(Some),
    }
}

fn default_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

/// Stored colors are free text; only a blank one falls back to the default.
/// The hex check applies to colors a user enters, not to what is on disk.
fn stored_color(color: String) -> String {
    if color.trim().is_empty() { default_color() } else { color }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub project_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub planned_start: String,
    pub planned_end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_end: Option<String>,
    #[serde(default)]
    pub progress: i64,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub pinned_to_today: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wbs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Everything at once: the bootstrap payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub projects: Vec<ProjectRecord>,
    #[serde(default)]
    pub tasks: Vec<TaskRecord>,
}

impl TryFrom<ProjectRecord> for Project {
    type Error = Error;

    fn try_from(r: ProjectRecord) -> Result<Self> {
        if r.id.trim().is_empty() {
            return Err(Error::Missing("id"));
        }
        Ok(Project {
            id: r.id,
            name: normalize_name(&r.name)?,
            color: stored_color(r.color),
            created_at: r.created_at,
        })
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = Error;

    fn try_from(r: TaskRecord) -> Result<Self> {
        if r.id.trim().is_empty() {
            return Err(Error::Missing("id"));
        }
        if r.project_id.trim().is_empty() || r.title.trim().is_empty() {
            return Err(Error::Missing("projectId + title"));
        }
        if r.planned_start.trim().is_empty() || r.planned_end.trim().is_empty() {
            return Err(Error::Missing("plannedStart/plannedEnd"));
        }

        let planned_start = parse_date(&r.planned_start)?;
        let planned_end = parse_date(&r.planned_end)?;
        if planned_end < planned_start {
            return Err(Error::EndBeforeStart { start: planned_start, end: planned_end });
        }
        if !(0..=100).contains(&r.progress) {
            return Err(Error::ProgressOutOfRange(r.progress));
        }

        Ok(Task {
            id: r.id,
            project_id: r.project_id,
            title: r.title.trim().to_string(),
            description: r.description,
            planned_start,
            planned_end,
            actual_start: parse_optional_date(r.actual_start.as_deref())?,
            actual_end: parse_optional_date(r.actual_end.as_deref())?,
            progress: r.progress as u8,
            status: r.status,
            pinned_to_today: r.pinned_to_today,
            wbs: r.wbs,
            order: r.order,
            created_at: r.created_at,
        })
    }
}

impl From<&Project> for ProjectRecord {
    fn from(p: &Project) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            color: p.color.clone(),
            created_at: p.created_at.clone(),
        }
    }
}

impl From<&Task> for TaskRecord {
    fn from(t: &Task) -> Self {
        Self {
            id: t.id.clone(),
            project_id: t.project_id.clone(),
            title: t.title.clone(),
            description: t.description.clone(),
            planned_start: format_date(t.planned_start),
            planned_end: format_date(t.planned_end),
            actual_start: t.actual_start.map(format_date),
            actual_end: t.actual_end.map(format_date),
            progress: t.progress as i64,
            status: t.status,
            pinned_to_today: t.pinned_to_today,
            wbs: t.wbs.clone(),
            order: t.order,
            created_at: t.created_at.clone(),
        }
    }
}

impl Snapshot {
    pub fn from_domain(projects: &[Project], tasks: &[Task]) -> Self {
        Self {
            projects: projects.iter().map(ProjectRecord::from).collect(),
            tasks: tasks.iter().map(TaskRecord::from).collect(),
        }
    }

    /// All-or-nothing: one bad record rejects the whole snapshot.
    pub fn into_domain(self) -> Result<(Vec<Project>, Vec<Task>)> {
        let projects = self
            .projects
            .into_iter()
            .map(Project::try_from)
            .collect::<Result<Vec<_>>>()?;
        let tasks = self
            .tasks
            .into_iter()
            .map(Task::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((projects, tasks))
    }
}
