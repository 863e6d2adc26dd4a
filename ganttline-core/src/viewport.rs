//! Timeline viewport and date-to-pixel geometry.
//!
//! The viewport is the window of calendar days a timeline shows. Geometry
//! converts dates into horizontal offsets for a caller-chosen day width.
//! Zoom bounds are a presentation concern and are not enforced here.

use chrono::NaiveDate;

use crate::task::Task;
use crate::time::{add_days, days_between, duration_days_inclusive};

/// Days of padding before the earliest date.
pub const PAD_BEFORE_DAYS: i64 = 2;
/// Days of padding after the latest date.
pub const PAD_AFTER_DAYS: i64 = 3;
/// Span shown for an empty task list, before padding.
pub const EMPTY_SPAN_DAYS: i64 = 14;
/// Narrowest bar, as a fraction of one day.
pub const MIN_BAR_FRACTION: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Inclusive day count, at least 1.
    pub total_days: i64,
}

impl Viewport {
    /// Every calendar day in the window, in order.
    pub fn days(&self) -> Vec<NaiveDate> {
        (0..self.total_days).map(|i| add_days(self.start, i)).collect()
    }

    /// Full pixel width of the window.
    pub fn width_px(&self, day_width: f64) -> f64 {
        self.total_days as f64 * day_width
    }
}

/// Horizontal placement of one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub left_px: f64,
    pub width_px: f64,
}

impl Bar {
    pub fn span(start: NaiveDate, end: NaiveDate, viewport_start: NaiveDate, day_width: f64) -> Self {
        Self {
            left_px: bar_left_px(start, viewport_start, day_width),
            width_px: bar_width_px(start, end, day_width),
        }
    }
}

/// Window covering every planned and actual date, padded 2 days before and 3
/// after. An empty list shows today plus 14 days, padded the same way.
pub fn compute_viewport<'a>(
    tasks: impl IntoIterator<Item = &'a Task>,
    today: NaiveDate,
) -> Viewport {
    let dates = tasks.into_iter().flat_map(|t| {
        [Some(t.planned_start), Some(t.planned_end), t.actual_start, t.actual_end]
            .into_iter()
            .flatten()
    });

    let (min, max) = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
    })
    .unwrap_or((today, add_days(today, EMPTY_SPAN_DAYS)));

    let start = add_days(min, -PAD_BEFORE_DAYS);
    let end = add_days(max, PAD_AFTER_DAYS);
    let total_days = duration_days_inclusive(start, end).max(1);

    Viewport { start, end, total_days }
}

/// `(date - viewport_start) * day_width`, in whole calendar days.
pub fn bar_left_px(date: NaiveDate, viewport_start: NaiveDate, day_width: f64) -> f64 {
    days_between(viewport_start, date) as f64 * day_width
}

/// Inclusive day count times `day_width`, never narrower than three quarters
/// of a day so same-day and inverted bars still render.
pub fn bar_width_px(start: NaiveDate, end: NaiveDate, day_width: f64) -> f64 {
    let width = duration_days_inclusive(start, end) as f64 * day_width;
    width.max(day_width * MIN_BAR_FRACTION)
}

/// Offset of the "today" marker.
pub fn today_left_px(viewport_start: NaiveDate, today: NaiveDate, day_width: f64) -> f64 {
    bar_left_px(today, viewport_start, day_width)
}
