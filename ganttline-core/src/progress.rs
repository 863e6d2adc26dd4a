//! Expected progress (a linear ramp over the planned range) and drift
//! between actual and expected progress.

use chrono::NaiveDate;
use std::fmt;

use crate::task::Task;
use crate::time::days_between;

/// Points either side of expected that still count as on track.
pub const DRIFT_TOLERANCE: i16 = 4;

/// Percentage a task should have reached by `today`.
///
/// 0 on or before the planned start, 100 on or after the planned end, a
/// rounded linear ramp in between. A non-positive planned span yields 100.
pub fn expected_progress(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> u8 {
    if today <= start {
        return 0;
    }
    if today >= end {
        return 100;
    }

    let total = days_between(start, end);
    let done = days_between(start, today);
    let pct = if total <= 0 {
        100.0
    } else {
        done as f64 / total as f64 * 100.0
    };
    pct.round().clamp(0.0, 100.0) as u8
}

pub fn expected_progress_for(task: &Task, today: NaiveDate) -> u8 {
    expected_progress(task.planned_start, task.planned_end, today)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriftKind {
    Ok,
    Bad,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Drift {
    OnTrack,
    /// Points behind expected.
    Behind(u8),
    /// Points ahead of expected.
    Ahead(u8),
}

impl Drift {
    pub fn kind(&self) -> DriftKind {
        match self {
            Drift::OnTrack => DriftKind::Ok,
            Drift::Behind(_) => DriftKind::Bad,
            Drift::Ahead(_) => DriftKind::Good,
        }
    }

    /// Same-sized drift in the opposite direction.
    pub fn mirrored(&self) -> Drift {
        match *self {
            Drift::OnTrack => Drift::OnTrack,
            Drift::Behind(n) => Drift::Ahead(n),
            Drift::Ahead(n) => Drift::Behind(n),
        }
    }
}

impl fmt::Display for Drift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Drift::OnTrack => f.write_str("on track"),
            Drift::Behind(n) => write!(f, "{n}% behind"),
            Drift::Ahead(n) => write!(f, "{n}% ahead"),
        }
    }
}

/// Bucket `actual - expected` with a fixed tolerance of 4 points.
pub fn classify_drift(actual: u8, expected: u8) -> Drift {
    let delta = actual as i16 - expected as i16;
    if delta.abs() <= DRIFT_TOLERANCE {
        Drift::OnTrack
    } else if delta < 0 {
        Drift::Behind(delta.unsigned_abs() as u8)
    } else {
        Drift::Ahead(delta as u8)
    }
}
