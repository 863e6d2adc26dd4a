//! View-ready timeline for one project: the viewport plus one row per task
//! with planned/actual bars and the progress judgment.

use chrono::NaiveDate;

use crate::chain::sort_by_order;
use crate::progress::{Drift, classify_drift, expected_progress_for};
use crate::task::Task;
use crate::time::{duration_days_inclusive, work_days_inclusive};
use crate::viewport::{Bar, Viewport, compute_viewport, today_left_px};

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub task_id: String,
    pub title: String,
    pub wbs: Option<String>,
    pub planned: Bar,
    /// Actual range, each missing end filled from the planned range, so the
    /// bar always stays inside the viewport.
    pub actual: Bar,
    /// Whether either actual date is set.
    pub actual_recorded: bool,
    pub progress: u8,
    pub expected: u8,
    pub drift: Drift,
    pub duration_days: i64,
    pub work_days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    pub viewport: Viewport,
    pub day_width: f64,
    pub today_left_px: f64,
    pub rows: Vec<TimelineRow>,
}

pub fn timeline_row(task: &Task, viewport: &Viewport, day_width: f64, today: NaiveDate) -> TimelineRow {
    let expected = expected_progress_for(task, today);
    let actual_start = task.actual_start.unwrap_or(task.planned_start);
    let actual_end = task.actual_end.unwrap_or(task.planned_end);

    TimelineRow {
        task_id: task.id.clone(),
        title: task.title.clone(),
        wbs: task.wbs.clone(),
        planned: Bar::span(task.planned_start, task.planned_end, viewport.start, day_width),
        actual: Bar::span(actual_start, actual_end, viewport.start, day_width),
        actual_recorded: task.actual_start.is_some() || task.actual_end.is_some(),
        progress: task.progress,
        expected,
        drift: classify_drift(task.progress, expected),
        duration_days: duration_days_inclusive(task.planned_start, task.planned_end),
        work_days: work_days_inclusive(task.planned_start, task.planned_end),
    }
}

/// Rows come out in manual order.
pub fn build_timeline<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    day_width: f64,
    today: NaiveDate,
) -> Timeline {
    let sorted = sort_by_order(tasks);
    let viewport = compute_viewport(sorted.iter().copied(), today);

    let rows = sorted
        .iter()
        .map(|t| timeline_row(t, &viewport, day_width, today))
        .collect();

    Timeline {
        viewport,
        day_width,
        today_left_px: today_left_px(viewport.start, today, day_width),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn rows_follow_manual_order() {
        let tasks = vec![
            Task::new("b", "p", "second", d(2024, 1, 8), d(2024, 1, 9)).with_order(2),
            Task::new("a", "p", "first", d(2024, 1, 1), d(2024, 1, 7)).with_order(1),
        ];
        let tl = build_timeline(&tasks, 20.0, d(2024, 1, 4));
        let ids: Vec<&str> = tl.rows.iter().map(|r| r.task_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(tl.viewport.start, d(2023, 12, 30));
        assert_eq!(tl.today_left_px, 100.0);
    }

    #[test]
    fn row_carries_geometry_and_drift() {
        let task = Task::new("a", "p", "first", d(2024, 1, 1), d(2024, 1, 11)).with_progress(30);
        let tl = build_timeline([&task], 10.0, d(2024, 1, 6));
        let row = &tl.rows[0];

        assert_eq!(row.planned, Bar { left_px: 20.0, width_px: 110.0 });
        assert_eq!(row.expected, 50);
        assert_eq!(row.drift, Drift::Behind(20));
        assert_eq!(row.duration_days, 11);
        // Mon 1st .. Thu 11th
        assert_eq!(row.work_days, 9);
        // nothing recorded: the actual bar mirrors the plan
        assert_eq!(row.actual, row.planned);
        assert!(!row.actual_recorded);
    }

    #[test]
    fn open_actual_range_ends_at_planned_end() {
        let task = Task::new("a", "p", "first", d(2024, 1, 1), d(2024, 1, 11))
            .with_actual(d(2024, 1, 2), None);
        let tl = build_timeline([&task], 10.0, d(2024, 1, 5));
        // 01-02..01-11
        assert_eq!(tl.rows[0].actual, Bar { left_px: 30.0, width_px: 100.0 });
        assert!(tl.rows[0].actual_recorded);
    }

    #[test]
    fn actual_bar_stays_in_viewport_long_after_plan() {
        let task = Task::new("a", "p", "late", d(2024, 3, 1), d(2024, 3, 5))
            .with_actual(d(2024, 3, 2), None);
        let tl = build_timeline([&task], 20.0, d(2024, 6, 1));
        let width = tl.viewport.width_px(20.0);
        let bar = tl.rows[0].actual;
        assert!(bar.left_px >= 0.0);
        assert!(bar.left_px + bar.width_px <= width);
    }
}
