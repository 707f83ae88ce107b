// task.rs — Task subcommands: add tasks of each type, toggle, move, remove.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use gt_task::{Skill, Task};
use uuid::Uuid;

use crate::context::{load_host, parse_id, TrackerContext};

#[derive(Subcommand)]
pub enum TaskCommands {
    /// Add a free-text task completed by hand.
    AddManual {
        #[command(flatten)]
        target: AddTarget,
        /// What needs doing.
        description: String,
    },
    /// Add a "reach level N in a skill" task.
    AddSkill {
        #[command(flatten)]
        target: AddTarget,
        /// Skill name, e.g. "attack".
        skill: Skill,
        /// Level to reach (1-99).
        level: u32,
    },
    /// Add a "finish this quest" task.
    AddQuest {
        #[command(flatten)]
        target: AddTarget,
        /// Host quest identifier.
        quest_id: u32,
        /// Quest name shown in the list.
        name: String,
    },
    /// Add a "hold N of an item" task.
    AddItem {
        #[command(flatten)]
        target: AddTarget,
        /// Item identifier.
        item_id: u32,
        /// Quantity to hold across tracked inventories.
        quantity: u64,
    },
    /// Toggle a manual task between done and not started.
    Toggle {
        /// Task ID.
        id: String,
    },
    /// Move a task within its goal.
    Move {
        /// Task ID.
        id: String,
        /// Zero-based target position (clamped to the end).
        index: usize,
    },
    /// Remove a task.
    Remove {
        /// Task ID.
        id: String,
    },
}

/// Where a new task goes, and optionally which host state to check it against.
#[derive(Args)]
pub struct AddTarget {
    /// Goal ID to add the task to.
    #[arg(long)]
    goal: String,
    /// Host snapshot to evaluate the new task against.
    #[arg(long)]
    host: Option<PathBuf>,
    /// Icon key shown next to the task.
    #[arg(long)]
    icon: Option<String>,
}

pub fn execute(cmd: &TaskCommands, ctx: &TrackerContext) -> anyhow::Result<()> {
    match cmd {
        TaskCommands::AddManual {
            target,
            description,
        } => add_task(ctx, target, Task::manual(description.as_str())),
        TaskCommands::AddSkill {
            target,
            skill,
            level,
        } => add_task(ctx, target, Task::skill_level(*skill, *level)),
        TaskCommands::AddQuest {
            target,
            quest_id,
            name,
        } => add_task(ctx, target, Task::quest(*quest_id, name.as_str())),
        TaskCommands::AddItem {
            target,
            item_id,
            quantity,
        } => add_task(ctx, target, Task::item_collection(*item_id, *quantity)),
        TaskCommands::Toggle { id } => {
            let task_id = parse_id(id)?;
            let mut controller = ctx.controller(load_host(None)?);
            let status = controller.toggle_manual_task(task_id)?;
            controller.shut_down();
            println!("Task {} is now {}", task_id, status);
            Ok(())
        }
        TaskCommands::Move { id, index } => {
            let task_id = parse_id(id)?;
            let mut controller = ctx.controller(load_host(None)?);
            controller.goals_mut().move_task(task_id, *index)?;
            controller.goals().save()?;
            println!("Moved task {}", task_id);
            Ok(())
        }
        TaskCommands::Remove { id } => {
            let task_id = parse_id(id)?;
            let mut controller = ctx.controller(load_host(None)?);
            let task = controller.goals_mut().remove_task(task_id)?;
            controller.goals().save()?;
            println!("Removed task: {}", task);
            Ok(())
        }
    }
}

fn add_task(ctx: &TrackerContext, target: &AddTarget, task: Task) -> anyhow::Result<()> {
    let goal_id = parse_id(&target.goal)?;
    let task = match &target.icon {
        Some(icon) => task.with_icon(icon.as_str()),
        None => task,
    };
    let task_id: Uuid = task.id;

    let mut controller = ctx.controller(load_host(target.host.as_deref())?);
    controller.on_task_added(goal_id, task)?;
    controller.shut_down();

    if let Some((goal, task)) = controller.goals().find_task(task_id) {
        println!("Added task to \"{}\": {}", goal.name, task);
        println!("  ID:     {}", task.id);
        println!("  Status: {}", task.status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_goal::GoalManager;
    use gt_task::Status;
    use gt_tracker::{SnapshotHost, TrackerConfig};
    use std::fs;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> TrackerContext {
        TrackerContext {
            data_dir: dir.path().to_path_buf(),
            profile: None,
            config: TrackerConfig::default(),
        }
    }

    fn load(ctx: &TrackerContext) -> GoalManager {
        let mut goals = GoalManager::new(ctx.storage());
        goals.set_profile(ctx.profile.clone());
        goals.load().unwrap();
        goals
    }

    fn seed_goal(ctx: &TrackerContext) -> Uuid {
        let mut goals = load(ctx);
        let goal_id = goals.add_goal("Combat");
        goals.save().unwrap();
        goal_id
    }

    fn target(goal_id: Uuid, host: Option<PathBuf>) -> AddTarget {
        AddTarget {
            goal: goal_id.to_string(),
            host,
            icon: None,
        }
    }

    #[test]
    fn add_skill_task_without_host_stays_not_started() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let goal_id = seed_goal(&ctx);

        execute(
            &TaskCommands::AddSkill {
                target: target(goal_id, None),
                skill: Skill::Attack,
                level: 50,
            },
            &ctx,
        )
        .unwrap();

        let goals = load(&ctx);
        let goal = goals.goal(goal_id).unwrap();
        assert_eq!(goal.tasks.len(), 1);
        assert_eq!(goal.tasks[0].status, Status::NotStarted);
    }

    #[test]
    fn add_skill_task_evaluates_against_host_snapshot() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let goal_id = seed_goal(&ctx);

        let snapshot = SnapshotHost::new().with_skill(Skill::Attack, 60);
        let host_path = dir.path().join("host.json");
        fs::write(&host_path, serde_json::to_string(&snapshot).unwrap()).unwrap();

        execute(
            &TaskCommands::AddSkill {
                target: target(goal_id, Some(host_path)),
                skill: Skill::Attack,
                level: 50,
            },
            &ctx,
        )
        .unwrap();

        let goals = load(&ctx);
        assert_eq!(goals.goal(goal_id).unwrap().tasks[0].status, Status::Completed);
    }

    #[test]
    fn toggle_manual_task_round_trip() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let goal_id = seed_goal(&ctx);
        execute(
            &TaskCommands::AddManual {
                target: target(goal_id, None),
                description: "Buy a rune scimitar".to_string(),
            },
            &ctx,
        )
        .unwrap();
        let task_id = load(&ctx).goal(goal_id).unwrap().tasks[0].id.to_string();

        execute(&TaskCommands::Toggle { id: task_id.clone() }, &ctx).unwrap();
        assert_eq!(
            load(&ctx).goal(goal_id).unwrap().tasks[0].status,
            Status::Completed
        );

        execute(&TaskCommands::Toggle { id: task_id }, &ctx).unwrap();
        assert_eq!(
            load(&ctx).goal(goal_id).unwrap().tasks[0].status,
            Status::NotStarted
        );
    }

    #[test]
    fn toggle_tracked_task_is_rejected() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let goal_id = seed_goal(&ctx);
        execute(
            &TaskCommands::AddQuest {
                target: target(goal_id, None),
                quest_id: 7,
                name: "Dragon Slayer".to_string(),
            },
            &ctx,
        )
        .unwrap();
        let task_id = load(&ctx).goal(goal_id).unwrap().tasks[0].id.to_string();

        assert!(execute(&TaskCommands::Toggle { id: task_id }, &ctx).is_err());
    }

    #[test]
    fn remove_task() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let goal_id = seed_goal(&ctx);
        execute(
            &TaskCommands::AddItem {
                target: target(goal_id, None),
                item_id: 995,
                quantity: 1000,
            },
            &ctx,
        )
        .unwrap();
        let task_id = load(&ctx).goal(goal_id).unwrap().tasks[0].id.to_string();

        execute(&TaskCommands::Remove { id: task_id }, &ctx).unwrap();
        assert!(load(&ctx).goal(goal_id).unwrap().tasks.is_empty());
    }

    #[test]
    fn add_to_missing_goal_fails() {
        let dir = TempDir::new().unwrap();
        let ctx = context(&dir);
        let result = execute(
            &TaskCommands::AddManual {
                target: target(Uuid::new_v4(), None),
                description: "x".to_string(),
            },
            &ctx,
        );
        assert!(result.is_err());
    }
}
