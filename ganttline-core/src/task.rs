//! Task model: one bar on a project's timeline.
//!
//! Status is derived from progress only by the progress-setting paths
//! (`with_progress`, the workspace update path). At rest the two fields are
//! independent, so a task can be `blocked` at 80%.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Todo,
    Doing,
    Blocked,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "blocked" => Ok(TaskStatus::Blocked),
            "done" => Ok(TaskStatus::Done),
            other => Err(Error::InvalidStatus(other.to_string())),
        }
    }
}

/// Clamp a raw progress value into 0..=100.
pub fn clamp_progress(progress: i64) -> u8 {
    progress.clamp(0, 100) as u8
}

/// The convenience derivation applied when progress is set.
pub fn status_for_progress(progress: u8) -> TaskStatus {
    match progress {
        p if p >= 100 => TaskStatus::Done,
        0 => TaskStatus::Todo,
        _ => TaskStatus::Doing,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,

    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub actual_start: Option<NaiveDate>,
    pub actual_end: Option<NaiveDate>,

    /// 0-100.
    pub progress: u8,
    pub status: TaskStatus,
    pub pinned_to_today: bool,

    /// Work-breakdown label, e.g. "1.2". Free text.
    pub wbs: Option<String>,

    /// Manual sort key within a project. Not unique, may be unset.
    pub order: Option<i64>,

    /// RFC 3339 timestamp, when known.
    pub created_at: Option<String>,
}

impl Task {
    pub fn new(
        id: impl Into<String>,
        project_id: impl Into<String>,
        title: impl Into<String>,
        planned_start: NaiveDate,
        planned_end: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            title: title.into(),
            description: None,
            planned_start,
            planned_end,
            actual_start: None,
            actual_end: None,
            progress: 0,
            status: TaskStatus::Todo,
            pinned_to_today: false,
            wbs: None,
            order: None,
            created_at: None,
        }
    }

    /// Set progress (clamped) and re-derive status from it.
    pub fn with_progress(mut self, progress: i64) -> Self {
        self.progress = clamp_progress(progress);
        self.status = status_for_progress(self.progress);
        self
    }

    /// Override status without touching progress.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_actual(mut self, start: NaiveDate, end: Option<NaiveDate>) -> Self {
        self.actual_start = Some(start);
        self.actual_end = end;
        self
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = Some(order);
        self
    }

    pub fn with_wbs(mut self, wbs: impl Into<String>) -> Self {
        self.wbs = Some(wbs.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn pinned(mut self) -> Self {
        self.pinned_to_today = true;
        self
    }

    /// Sort key used wherever tasks are ordered manually.
    pub fn sort_order(&self) -> i64 {
        self.order.unwrap_or(0)
    }
}

/// A partial update. `None` leaves a field untouched; for optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub planned_start: Option<NaiveDate>,
    pub planned_end: Option<NaiveDate>,
    pub actual_start: Option<Option<NaiveDate>>,
    pub actual_end: Option<Option<NaiveDate>>,
    pub progress: Option<i64>,
    pub status: Option<TaskStatus>,
    pub pinned_to_today: Option<bool>,
    pub wbs: Option<Option<String>>,
    pub order: Option<i64>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        *self == TaskPatch::default()
    }

    /// Field-level overwrite. No status derivation happens here; that belongs
    /// to the workspace update path.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(start) = self.planned_start {
            task.planned_start = start;
        }
        if let Some(end) = self.planned_end {
            task.planned_end = end;
        }
        if let Some(start) = self.actual_start {
            task.actual_start = start;
        }
        if let Some(end) = self.actual_end {
            task.actual_end = end;
        }
        if let Some(progress) = self.progress {
            task.progress = clamp_progress(progress);
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(pinned) = self.pinned_to_today {
            task.pinned_to_today = pinned;
        }
        if let Some(wbs) = &self.wbs {
            task.wbs = wbs.clone();
        }
        if let Some(order) = self.order {
            task.order = Some(order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn sample() -> Task {
        Task::new("t1", "p1", "Outline paper", d(2024, 1, 1), d(2024, 1, 4))
    }

    #[test]
    fn progress_derives_status() {
        assert_eq!(sample().with_progress(0).status, TaskStatus::Todo);
        assert_eq!(sample().with_progress(45).status, TaskStatus::Doing);
        assert_eq!(sample().with_progress(100).status, TaskStatus::Done);
    }

    #[test]
    fn progress_is_clamped() {
        let t = sample().with_progress(140);
        assert_eq!(t.progress, 100);
        assert_eq!(t.status, TaskStatus::Done);

        let t = sample().with_progress(-5);
        assert_eq!(t.progress, 0);
        assert_eq!(t.status, TaskStatus::Todo);
    }

    #[test]
    fn status_override_survives() {
        let t = sample().with_progress(80).with_status(TaskStatus::Blocked);
        assert_eq!(t.progress, 80);
        assert_eq!(t.status, TaskStatus::Blocked);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Blocked".parse::<TaskStatus>().unwrap(), TaskStatus::Blocked);
        assert!("paused".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn patch_overwrites_only_given_fields() {
        let mut t = sample().with_wbs("1.1").with_order(3);
        let patch = TaskPatch {
            title: Some("Outline paper v2".into()),
            wbs: Some(None),
            progress: Some(60),
            ..Default::default()
        };
        patch.apply_to(&mut t);

        assert_eq!(t.title, "Outline paper v2");
        assert_eq!(t.wbs, None);
        assert_eq!(t.order, Some(3));
        assert_eq!(t.progress, 60);
        // raw field set: status is left alone
        assert_eq!(t.status, TaskStatus::Todo);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(TaskPatch::default().is_empty());
        assert!(!TaskPatch { order: Some(1), ..Default::default() }.is_empty());
    }
}
