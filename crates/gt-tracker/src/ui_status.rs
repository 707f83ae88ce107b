// ui_status.rs — TaskUiStatusManager: task status → what the UI draws.
//
// Pure reads of task state. The UI registers a listener per visible task
// row; `refresh` builds the descriptor and hands it to that listener.
// Repaint coalescing is the UI's business.

use std::collections::HashMap;

use gt_task::{Status, Task};
use uuid::Uuid;

use crate::config::Color;

pub const NOT_STARTED_COLOR: Color = Color::rgb(0xE6, 0x1E, 0x1E);
pub const IN_PROGRESS_COLOR: Color = Color::rgb(0xE6, 0x96, 0x17);
pub const COMPLETED_COLOR: Color = Color::rgb(0x37, 0xF0, 0x46);

/// Icon drawn next to a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Badge {
    Pending,
    InProgress,
    Done,
    /// Manual tasks render as a checkbox the player can click.
    Checkbox { checked: bool },
}

/// Everything the UI needs to draw one task's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub task_id: Uuid,
    pub status: Status,
    pub label: String,
    pub color: Color,
    pub badge: Badge,
}

type Listener = Box<dyn Fn(&StatusView)>;

/// Maps task state to UI status descriptors.
#[derive(Default)]
pub struct TaskUiStatusManager {
    listeners: HashMap<Uuid, Listener>,
}

impl TaskUiStatusManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the callback that repaints `task_id`'s row.
    pub fn register(&mut self, task_id: Uuid, listener: impl Fn(&StatusView) + 'static) {
        self.listeners.insert(task_id, Box::new(listener));
    }

    /// Drop the listener of a task that left the screen or was deleted.
    pub fn unregister(&mut self, task_id: Uuid) -> bool {
        self.listeners.remove(&task_id).is_some()
    }

    /// Build the status descriptor for `task` without touching it.
    pub fn view(task: &Task) -> StatusView {
        let color = match task.status {
            Status::NotStarted => NOT_STARTED_COLOR,
            Status::InProgress => IN_PROGRESS_COLOR,
            Status::Completed => COMPLETED_COLOR,
        };
        let badge = if task.is_manual() {
            Badge::Checkbox {
                checked: task.status.is_completed(),
            }
        } else {
            match task.status {
                Status::NotStarted => Badge::Pending,
                Status::InProgress => Badge::InProgress,
                Status::Completed => Badge::Done,
            }
        };
        StatusView {
            task_id: task.id,
            status: task.status,
            label: task.display_name(),
            color,
            badge,
        }
    }

    /// Build the descriptor and notify the task's listener, if any.
    pub fn refresh(&self, task: &Task) -> StatusView {
        let view = Self::view(task);
        if let Some(listener) = self.listeners.get(&task.id) {
            listener(&view);
        }
        view
    }
}
