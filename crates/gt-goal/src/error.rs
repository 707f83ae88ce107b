// error.rs — Error types for the goal subsystem.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while loading, saving or editing goals.
#[derive(Debug, Error)]
pub enum GoalError {
    /// The backing storage failed.
    #[error("goal storage error: {0}")]
    Storage(#[from] gt_storage::StorageError),

    /// Failed to serialize/deserialize the goals document.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The persisted document was written by an incompatible version.
    #[error("unsupported goals document version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    /// The requested goal was not found.
    #[error("goal not found: {0}")]
    GoalNotFound(Uuid),

    /// The requested task was not found in any goal.
    #[error("task not found: {0}")]
    TaskNotFound(Uuid),

    /// The operation only applies to manual tasks.
    #[error("task {0} is not a manual task")]
    NotManual(Uuid),
}
