//! Boundary errors.
//!
//! The calculus itself never fails; these come from turning wire records into
//! domain values, from workspace lookups, and from the persistence service.

use chrono::NaiveDate;
use serde_json::{Value, json};

use crate::store::StoreError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("planned end {end} is before planned start {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },

    #[error("{0} required")]
    Missing(&'static str),

    #[error("progress {0} is outside 0..=100")]
    ProgressOutOfRange(i64),

    #[error("invalid color '{0}': expected #rgb or #rrggbb")]
    InvalidColor(String),

    #[error("invalid status '{0}': expected todo, doing, blocked or done")]
    InvalidStatus(String),

    #[error("invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// HTTP-style status for the failure: 400 for validation, 404 for
    /// unknown ids, 500 for the store.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::UnknownProject(_) | Error::UnknownTask(_) => 404,
            Error::Store(_) => 500,
            _ => 400,
        }
    }

    /// The `{"error": "..."}` envelope used for failed requests.
    pub fn envelope(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}
