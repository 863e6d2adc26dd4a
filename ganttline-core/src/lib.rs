//! ganttline-core: Planning and progress calculus for a Gantt-style tracker
//!
//! Pure, deterministic functions over calendar dates: viewport sizing, bar
//! geometry, expected progress and drift, plus the task/project model, wire
//! records, the store boundary and the optimistic local workspace. "Today" is
//! always passed in explicitly.

pub mod chain;
pub mod error;
pub mod overview;
pub mod progress;
pub mod project;
pub mod record;
pub mod store;
pub mod task;
pub mod time;
pub mod timeline;
pub mod viewport;
pub mod workspace;

pub use chain::{ChainedSlot, DEFAULT_DURATION_DAYS, chain_next, next_wbs, sort_by_order};
pub use error::{Error, Result};
pub use overview::{ProjectSummary, TodayItem, project_summary, today_tasks};
pub use progress::{Drift, DriftKind, classify_drift, expected_progress, expected_progress_for};
pub use project::{DEFAULT_PROJECT_COLOR, Project, ProjectPatch};
pub use record::{ProjectRecord, Snapshot, TaskRecord, format_date, parse_date};
pub use store::{Collections, MemoryStore, Store, StoreError};
pub use task::{Task, TaskPatch, TaskStatus};
pub use time::{Now, duration_days_inclusive, today_in_timezone, work_days_inclusive};
pub use timeline::{Timeline, TimelineRow, build_timeline};
pub use viewport::{Bar, Viewport, bar_left_px, bar_width_px, compute_viewport, today_left_px};
pub use workspace::{NewTask, Workspace};
