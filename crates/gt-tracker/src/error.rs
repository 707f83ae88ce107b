// error.rs — Error types for the tracker engine.

use thiserror::Error;

/// Why the host could not answer a state query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The state exists but is not loaded yet (logging in, bank never
    /// opened, ...). The update is skipped and retried on the next event.
    #[error("host state not available: {0}")]
    Unavailable(String),

    /// The task points at something the host does not know. The task can
    /// never complete until it is edited.
    #[error("unknown {kind} {id}")]
    UnknownTarget { kind: &'static str, id: String },
}

/// Errors from tracker plumbing: configuration, sinks, persistence.
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A file I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize an event.
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The configuration file is not valid TOML for [`TrackerConfig`](crate::TrackerConfig).
    #[error("invalid configuration in {path}: {source}")]
    InvalidConfig {
        path: String,
        source: toml::de::Error,
    },

    /// A notification dispatch failed (non-fatal).
    #[error("notification error: {0}")]
    NotificationError(String),

    #[error(transparent)]
    Goal(#[from] gt_goal::GoalError),

    #[error(transparent)]
    ItemCache(#[from] gt_items::ItemCacheError),
}
