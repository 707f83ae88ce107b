//! # gt-goal
//!
//! Goals and their persistence for Goal Tracker.
//!
//! A [`Goal`] is a named, ordered list of [`Task`](gt_task::Task)s. Its
//! completion is always derived from its tasks; there is no stored flag to
//! fall out of sync.
//!
//! [`GoalManager`] exclusively owns every goal of the active profile. Other
//! components read through it and ask it to mutate; it loads and saves the
//! whole collection as one versioned JSON document.

pub mod error;
pub mod goal;
pub mod manager;

pub use error::GoalError;
pub use goal::Goal;
pub use manager::{GoalManager, GOALS_KEY};
