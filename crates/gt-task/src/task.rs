// task.rs — Task: one trackable objective inside a goal.
//
// The variant-specific data lives in `TaskKind`, flattened into the task
// object on the wire:
//
//   {"id": "...", "status": "IN_PROGRESS", "type": "skill_level",
//    "skill": "ATTACK", "target_level": 50}
//
// Every place that needs per-variant behaviour (display names, update rules,
// serialization) matches on `TaskKind` exhaustively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::Skill;
use crate::status::Status;

/// The variant discriminator of a task, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Manual,
    SkillLevel,
    Quest,
    ItemCollection,
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskType::Manual => write!(f, "manual"),
            TaskType::SkillLevel => write!(f, "skill_level"),
            TaskType::Quest => write!(f, "quest"),
            TaskType::ItemCollection => write!(f, "item_collection"),
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(TaskType::Manual),
            "skill_level" => Ok(TaskType::SkillLevel),
            "quest" => Ok(TaskType::Quest),
            "item_collection" => Ok(TaskType::ItemCollection),
            other => Err(format!("unknown task type: {}", other)),
        }
    }
}

/// Variant-specific task data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskKind {
    /// Checklist entry toggled by the player.
    Manual { description: String },

    /// Reach `target_level` in `skill`.
    SkillLevel {
        skill: Skill,
        target_level: u32,
        /// Level observed the first time the task was evaluated. Progress is
        /// measured from here.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        baseline_level: Option<u32>,
    },

    /// Finish a quest.
    Quest { quest_id: u32, quest_name: String },

    /// Hold `quantity` of an item across the tracked inventories.
    ItemCollection {
        item_id: u32,
        quantity: u64,
        /// Resolved through the item cache; absent until first lookup.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        item_name: Option<String>,
    },
}

impl TaskKind {
    pub fn task_type(&self) -> TaskType {
        match self {
            TaskKind::Manual { .. } => TaskType::Manual,
            TaskKind::SkillLevel { .. } => TaskType::SkillLevel,
            TaskKind::Quest { .. } => TaskType::Quest,
            TaskKind::ItemCollection { .. } => TaskType::ItemCollection,
        }
    }
}

/// A single trackable objective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,

    #[serde(default)]
    pub status: Status,

    #[serde(flatten)]
    pub kind: TaskKind,

    /// Host icon reference (item id or skill sprite name), if the UI chose one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Task {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            status: Status::NotStarted,
            kind,
            icon: None,
        }
    }

    pub fn manual(description: impl Into<String>) -> Self {
        Self::new(TaskKind::Manual {
            description: description.into(),
        })
    }

    pub fn skill_level(skill: Skill, target_level: u32) -> Self {
        Self::new(TaskKind::SkillLevel {
            skill,
            target_level,
            baseline_level: None,
        })
    }

    pub fn quest(quest_id: u32, quest_name: impl Into<String>) -> Self {
        Self::new(TaskKind::Quest {
            quest_id,
            quest_name: quest_name.into(),
        })
    }

    pub fn item_collection(item_id: u32, quantity: u64) -> Self {
        Self::new(TaskKind::ItemCollection {
            item_id,
            quantity,
            item_name: None,
        })
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn task_type(&self) -> TaskType {
        self.kind.task_type()
    }

    pub fn is_manual(&self) -> bool {
        matches!(self.kind, TaskKind::Manual { .. })
    }

    /// The label shown to the player.
    pub fn display_name(&self) -> String {
        match &self.kind {
            TaskKind::Manual { description } => description.clone(),
            TaskKind::SkillLevel {
                skill,
                target_level,
                ..
            } => format!("{} {}", target_level, skill),
            TaskKind::Quest { quest_name, .. } => quest_name.clone(),
            TaskKind::ItemCollection {
                item_id,
                quantity,
                item_name,
            } => match item_name {
                Some(name) => format!("{} x {}", quantity, name),
                None => format!("{} x item #{}", quantity, item_id),
            },
        }
    }

    /// Move the status forward to `next`. Returns `true` if it changed.
    ///
    /// Backward or sideways moves are ignored, so a completed task stays
    /// completed no matter what an update computes.
    pub fn advance(&mut self, next: Status) -> bool {
        if self.status.can_advance_to(next) {
            self.status = next;
            true
        } else {
            false
        }
    }

    /// Flip a manual task: not started becomes completed, anything else
    /// goes back to not started.
    ///
    /// Returns `false` (and does nothing) for every other variant.
    pub fn toggle(&mut self) -> bool {
        if !self.is_manual() {
            return false;
        }
        self.status = if self.status.is_not_started() {
            Status::Completed
        } else {
            Status::NotStarted
        };
        true
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}
