//! # gt-task
//!
//! The task model for Goal Tracker.
//!
//! A [`Task`] is one trackable objective inside a goal. Its variant lives in
//! [`TaskKind`], a tagged union that serializes with a `"type"`
//! discriminator, and its lifecycle lives in [`Status`]:
//!
//! - [`Status`] — NOT_STARTED → IN_PROGRESS → COMPLETED, forward only
//!   (manual tasks may be toggled back)
//! - [`TaskType`] — the discriminator alone, used to scope event passes
//! - [`Skill`], [`QuestState`], [`InventoryId`], [`ItemStack`] — the game
//!   vocabulary tasks are written in

pub mod game;
pub mod status;
pub mod task;

pub use game::{InventoryId, ItemStack, QuestState, Skill};
pub use status::Status;
pub use task::{Task, TaskKind, TaskType};
