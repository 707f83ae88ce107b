// status.rs — Task lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The lifecycle state of a task.
///
/// Variants are declared in lifecycle order so the derived `Ord` doubles as
/// "how far along" comparison.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl Status {
    pub fn is_not_started(self) -> bool {
        self == Status::NotStarted
    }

    pub fn is_in_progress(self) -> bool {
        self == Status::InProgress
    }

    pub fn is_completed(self) -> bool {
        self == Status::Completed
    }

    /// Whether an automatic update may move a task from `self` to `next`.
    ///
    /// Only forward moves are legal: NOT_STARTED → IN_PROGRESS → COMPLETED,
    /// with NOT_STARTED → COMPLETED allowed in one step.
    pub fn can_advance_to(self, next: Status) -> bool {
        next > self
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotStarted => write!(f, "not started"),
            Status::InProgress => write!(f, "in progress"),
            Status::Completed => write!(f, "completed"),
        }
    }
}
