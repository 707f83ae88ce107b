//! # gt-tracker
//!
//! The task tracking and auto-update engine of Goal Tracker.
//!
//! The host game client delivers events on a single game thread; this crate
//! turns them into task status changes:
//!
//! ```text
//! host event → PluginController → TaskUpdateService (mutates a Task)
//!            → GoalManager (persists) → TaskUiStatusManager (notifies)
//! ```
//!
//! ## Key components
//!
//! - [`GameState`] / [`GameEvent`] — what the host exposes and emits
//! - [`SnapshotHost`] — a serializable host for headless runs and tests
//! - [`TaskUpdateService`] — per-variant completion detection
//! - [`TaskUiStatusManager`] — task status → UI badge/colour descriptor
//! - [`TrackerEvent`] / [`EventDispatcher`] — notification sinks
//! - [`TrackerConfig`] — TOML configuration
//! - [`PluginController`] — wires events, persistence and notifications
//!
//! Everything is synchronous and non-blocking except `load`/`save`, which
//! go through the host's storage. No locking is used: the host calls in
//! from one thread.

pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod host;
pub mod ui_status;
pub mod update;

pub use config::{Color, Notification, TrackerConfig};
pub use controller::{ChatSink, PluginController, UpdateReport};
pub use error::{HostError, TrackerError};
pub use events::{EventDispatcher, EventLog, NotificationSink, TrackerEvent};
pub use host::{GameEvent, GameState, SnapshotHost};
pub use ui_status::{Badge, StatusView, TaskUiStatusManager};
pub use update::TaskUpdateService;
