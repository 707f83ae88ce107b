// goal.rs — Goal: a named, ordered collection of tasks.
//
// Task order is the order the player arranged them in and is preserved
// through persistence. Completion is computed from the tasks on demand.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gt_task::Task;

/// A player-defined goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier for this goal.
    pub id: Uuid,

    /// Name shown in the goal list (e.g., "Combat Goals").
    pub name: String,

    /// Tasks in display order.
    #[serde(default)]
    pub tasks: Vec<Task>,

    /// When this goal was created.
    pub created_at: DateTime<Utc>,

    /// When this goal or one of its tasks was last edited.
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    /// Create an empty goal.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Number of completed tasks.
    pub fn completed_count(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status.is_completed())
            .count()
    }

    /// Completed tasks as a whole-number percentage. An empty goal is at 0%.
    pub fn completion_percent(&self) -> u8 {
        if self.tasks.is_empty() {
            return 0;
        }
        // Bounded by 100, so the narrowing cast cannot truncate.
        (self.completed_count() * 100 / self.tasks.len()) as u8
    }

    /// A goal is complete when it has tasks and all of them are completed.
    pub fn is_completed(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.status.is_completed())
    }

    /// Append a task at the end of the list.
    pub fn add_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.touch();
    }

    /// Remove a task by id, returning it.
    pub fn remove_task(&mut self, task_id: Uuid) -> Option<Task> {
        let index = self.tasks.iter().position(|t| t.id == task_id)?;
        self.touch();
        Some(self.tasks.remove(index))
    }

    /// Move a task to `new_index` (clamped to the end of the list).
    /// Returns `false` if the task is not in this goal.
    pub fn move_task(&mut self, task_id: Uuid, new_index: usize) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == task_id) else {
            return false;
        };
        let task = self.tasks.remove(index);
        let new_index = new_index.min(self.tasks.len());
        self.tasks.insert(new_index, task);
        self.touch();
        true
    }

    pub fn task(&self, task_id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn task_mut(&mut self, task_id: Uuid) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == task_id)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
