// goal.rs — Goal subcommands: add, list, rename, move, remove.

use clap::Subcommand;
use gt_goal::GoalManager;

use crate::context::{parse_id, TrackerContext};

#[derive(Subcommand)]
pub enum GoalCommands {
    /// Create a new, empty goal.
    Add {
        /// Goal name.
        name: String,
    },
    /// List goals with their progress.
    List {
        /// Also list each goal's tasks.
        #[arg(long)]
        tasks: bool,
    },
    /// Rename a goal.
    Rename {
        /// Goal ID.
        id: String,
        /// New name.
        name: String,
    },
    /// Move a goal to a new position in the list.
    Move {
        /// Goal ID.
        id: String,
        /// Zero-based target position (clamped to the end).
        index: usize,
    },
    /// Remove a goal and all of its tasks.
    Remove {
        /// Goal ID.
        id: String,
    },
}

pub fn execute(cmd: &GoalCommands, ctx: &TrackerContext) -> anyhow::Result<()> {
    let mut goals = GoalManager::new(ctx.storage());
    goals.set_profile(ctx.profile.clone());
    goals.load()?;

    match cmd {
        GoalCommands::Add { name } => add_goal(&mut goals, name),
        GoalCommands::List { tasks } => {
            list_goals(&goals, *tasks);
            Ok(())
        }
        GoalCommands::Rename { id, name } => {
            let goal_id = parse_id(id)?;
            goals.rename_goal(goal_id, name.as_str())?;
            goals.save()?;
            println!("Renamed goal {} to \"{}\"", goal_id, name);
            Ok(())
        }
        GoalCommands::Move { id, index } => {
            let goal_id = parse_id(id)?;
            goals.move_goal(goal_id, *index)?;
            goals.save()?;
            println!("Moved goal {}", goal_id);
            Ok(())
        }
        GoalCommands::Remove { id } => {
            let goal = goals.remove_goal(parse_id(id)?)?;
            goals.save()?;
            println!(
                "Removed goal \"{}\" ({} tasks)",
                goal.name,
                goal.tasks.len()
            );
            Ok(())
        }
    }
}

fn add_goal(goals: &mut GoalManager, name: &str) -> anyhow::Result<()> {
    let goal_id = goals.add_goal(name);
    goals.save()?;
    println!("Created goal: {}", name);
    println!("  ID: {}", goal_id);
    Ok(())
}

fn list_goals(goals: &GoalManager, with_tasks: bool) {
    if goals.goals().is_empty() {
        println!("No goals yet.");
        return;
    }

    println!("{:<38} {:<30} {:>7} {:>5}", "ID", "NAME", "TASKS", "DONE");
    println!("{}", "-".repeat(84));
    for goal in goals.goals() {
        println!(
            "{:<38} {:<30} {:>3}/{:<3} {:>4}%",
            goal.id,
            truncate(&goal.name, 28),
            goal.completed_count(),
            goal.tasks.len(),
            goal.completion_percent(),
        );
        if with_tasks {
            for task in &goal.tasks {
                println!(
                    "    {:<38} {:<12} {}",
                    task.id,
                    task.status.to_string(),
                    truncate(&task.display_name(), 40)
                );
            }
        }
    }
    println!("\n{} goal(s), {} task(s)", goals.goals().len(), goals.task_count());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
