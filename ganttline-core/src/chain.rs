//! Auto-chain scheduling: a new task without explicit dates goes right after
//! the last task of its project, by manual order, with no gap.
//!
//! Only planned end dates and order keys of prior tasks are read. Existing
//! tasks are never re-chained.

use chrono::NaiveDate;

use crate::task::Task;
use crate::time::add_days;

pub const DEFAULT_DURATION_DAYS: i64 = 2;

/// Derived placement for a new task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainedSlot {
    pub planned_start: NaiveDate,
    pub planned_end: NaiveDate,
    pub order: i64,
}

/// Stable sort by order key; unset orders sort as 0 and ties keep their
/// incoming (insertion) order.
pub fn sort_by_order<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Vec<&'a Task> {
    let mut sorted: Vec<&Task> = tasks.into_iter().collect();
    sorted.sort_by_key(|t| t.sort_order());
    sorted
}

/// End date for a task of `duration_days` starting on `start`. Both endpoints
/// count, and durations below 1 are raised to 1.
pub fn planned_end_for(start: NaiveDate, duration_days: i64) -> NaiveDate {
    add_days(start, duration_days.max(1) - 1)
}

/// Order key for the next task: last task's order (or the task count when
/// that is unset) plus one.
pub fn next_order(sorted: &[&Task]) -> i64 {
    sorted
        .last()
        .and_then(|t| t.order)
        .unwrap_or(sorted.len() as i64)
        + 1
}

/// Place a new task after the project's current last task.
pub fn chain_next<'a>(
    project_tasks: impl IntoIterator<Item = &'a Task>,
    duration_days: i64,
    today: NaiveDate,
) -> ChainedSlot {
    let sorted = sort_by_order(project_tasks);

    let planned_start = match sorted.last() {
        Some(last) => add_days(last.planned_end, 1),
        None => today,
    };

    ChainedSlot {
        planned_start,
        planned_end: planned_end_for(planned_start, duration_days),
        order: next_order(&sorted),
    }
}

/// Next "1.N" label: one past the largest minor number already used.
pub fn next_wbs<'a>(project_tasks: impl IntoIterator<Item = &'a Task>) -> String {
    let max_minor = project_tasks
        .into_iter()
        .filter_map(|t| t.wbs.as_deref())
        .filter_map(|w| w.split('.').nth(1))
        .filter_map(|minor| minor.trim().parse::<i64>().ok())
        .max()
        .unwrap_or(0);
    format!("1.{}", max_minor + 1)
}
