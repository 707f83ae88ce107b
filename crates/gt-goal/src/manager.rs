// manager.rs — GoalManager: owner and persister of the goal collection.
//
// All goals of the active profile live in one JSON document stored under
// `<profile>.goals`:
//
//   {"version": 1, "goals": [{"id": ..., "name": ..., "tasks": [...]}, ...]}
//
// Every edit goes through the manager; nothing else holds an authoritative
// copy. `save()` is cheap enough to call after each mutation and relies on
// the storage backend to replace the previous snapshot atomically.

use std::sync::Arc;

use gt_storage::{profile_key, Storage};
use gt_task::{Status, Task, TaskType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::GoalError;
use crate::goal::Goal;

/// Storage name of the goals document (prefixed by the profile).
pub const GOALS_KEY: &str = "goals";

const DOCUMENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct GoalsDocumentRef<'a> {
    version: u32,
    goals: &'a [Goal],
}

#[derive(Deserialize)]
struct GoalsDocument {
    version: u32,
    #[serde(default)]
    goals: Vec<Goal>,
}

/// In-memory goal collection for one profile, backed by [`Storage`].
pub struct GoalManager {
    storage: Arc<dyn Storage>,
    profile: Option<String>,
    goals: Vec<Goal>,
}

impl GoalManager {
    /// Create a manager with no goals and no profile. Call
    /// [`load`](Self::load) to restore persisted goals.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            profile: None,
            goals: Vec::new(),
        }
    }

    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    /// Switch to another account profile.
    ///
    /// The in-memory goals are dropped so the previous account's goals can
    /// never be saved under the new key; call [`load`](Self::load) next.
    pub fn set_profile(&mut self, profile: Option<String>) {
        if self.profile != profile {
            tracing::info!(from = ?self.profile, to = ?profile, "switching goal profile");
            self.profile = profile;
            self.goals.clear();
        }
    }

    fn storage_key(&self) -> String {
        profile_key(self.profile.as_deref(), GOALS_KEY)
    }

    /// Replace the in-memory goals with the persisted ones.
    ///
    /// An absent document yields an empty collection and `Ok`. A document
    /// that cannot be read, parsed, or is from an unsupported version also
    /// yields an empty collection; the error is returned for the caller to
    /// log and is never fatal.
    pub fn load(&mut self) -> Result<(), GoalError> {
        self.goals.clear();

        let key = self.storage_key();
        let Some(bytes) = self.storage.load(&key)? else {
            tracing::debug!(key = %key, "no persisted goals, starting empty");
            return Ok(());
        };

        let document: GoalsDocument = serde_json::from_slice(&bytes)?;
        if document.version != DOCUMENT_VERSION {
            return Err(GoalError::UnsupportedVersion {
                found: document.version,
                expected: DOCUMENT_VERSION,
            });
        }

        self.goals = document.goals;
        tracing::info!(
            key = %key,
            goals = self.goals.len(),
            tasks = self.task_count(),
            "loaded goals"
        );
        Ok(())
    }

    /// Persist the full collection, replacing the previous snapshot.
    pub fn save(&self) -> Result<(), GoalError> {
        let document = GoalsDocumentRef {
            version: DOCUMENT_VERSION,
            goals: &self.goals,
        };
        let json = serde_json::to_vec_pretty(&document)?;
        self.storage.save(&self.storage_key(), &json)?;
        tracing::debug!(goals = self.goals.len(), "saved goals");
        Ok(())
    }

    /// Goals in display order.
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, goal_id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    fn goal_mut(&mut self, goal_id: Uuid) -> Result<&mut Goal, GoalError> {
        self.goals
            .iter_mut()
            .find(|g| g.id == goal_id)
            .ok_or(GoalError::GoalNotFound(goal_id))
    }

    pub fn task_count(&self) -> usize {
        self.goals.iter().map(|g| g.tasks.len()).sum()
    }

    /// Create an empty goal at the end of the list.
    pub fn add_goal(&mut self, name: impl Into<String>) -> Uuid {
        self.insert_goal(Goal::new(name))
    }

    /// Append an already built goal (e.g., an imported one).
    pub fn insert_goal(&mut self, goal: Goal) -> Uuid {
        let id = goal.id;
        self.goals.push(goal);
        id
    }

    /// Delete a goal and, with it, all of its tasks.
    pub fn remove_goal(&mut self, goal_id: Uuid) -> Result<Goal, GoalError> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or(GoalError::GoalNotFound(goal_id))?;
        Ok(self.goals.remove(index))
    }

    pub fn rename_goal(&mut self, goal_id: Uuid, name: impl Into<String>) -> Result<(), GoalError> {
        self.goal_mut(goal_id)?.rename(name);
        Ok(())
    }

    /// Move a goal to `new_index` (clamped to the end of the list).
    pub fn move_goal(&mut self, goal_id: Uuid, new_index: usize) -> Result<(), GoalError> {
        let index = self
            .goals
            .iter()
            .position(|g| g.id == goal_id)
            .ok_or(GoalError::GoalNotFound(goal_id))?;
        let goal = self.goals.remove(index);
        let new_index = new_index.min(self.goals.len());
        self.goals.insert(new_index, goal);
        Ok(())
    }

    /// Append a task to a goal. Returns the task id.
    pub fn add_task(&mut self, goal_id: Uuid, task: Task) -> Result<Uuid, GoalError> {
        let id = task.id;
        self.goal_mut(goal_id)?.add_task(task);
        Ok(id)
    }

    /// Remove a task from whichever goal holds it.
    pub fn remove_task(&mut self, task_id: Uuid) -> Result<Task, GoalError> {
        self.goals
            .iter_mut()
            .find_map(|g| g.remove_task(task_id))
            .ok_or(GoalError::TaskNotFound(task_id))
    }

    /// Move a task within its goal.
    pub fn move_task(&mut self, task_id: Uuid, new_index: usize) -> Result<(), GoalError> {
        if self.goals.iter_mut().any(|g| g.move_task(task_id, new_index)) {
            Ok(())
        } else {
            Err(GoalError::TaskNotFound(task_id))
        }
    }

    /// Find a task and the goal that owns it.
    pub fn find_task(&self, task_id: Uuid) -> Option<(&Goal, &Task)> {
        self.goals
            .iter()
            .find_map(|g| g.task(task_id).map(|t| (g, t)))
    }

    pub fn task_mut(&mut self, task_id: Uuid) -> Option<&mut Task> {
        self.goals.iter_mut().find_map(|g| g.task_mut(task_id))
    }

    /// Flip a manual task between completed and not started. Returns the
    /// new status.
    pub fn toggle_manual_task(&mut self, task_id: Uuid) -> Result<Status, GoalError> {
        let goal = self
            .goals
            .iter_mut()
            .find(|g| g.task(task_id).is_some())
            .ok_or(GoalError::TaskNotFound(task_id))?;
        let task = goal
            .task_mut(task_id)
            .ok_or(GoalError::TaskNotFound(task_id))?;
        if !task.toggle() {
            return Err(GoalError::NotManual(task_id));
        }
        let status = task.status;
        goal.touch();
        Ok(status)
    }

    /// Tasks of `task_type`, across all goals, that are not completed yet.
    ///
    /// Lazily filtered so an event pass only walks what it needs.
    pub fn incomplete_tasks_by_type(&self, task_type: TaskType) -> impl Iterator<Item = &Task> + '_ {
        self.goals
            .iter()
            .flat_map(|g| g.tasks.iter())
            .filter(move |t| t.task_type() == task_type && !t.status.is_completed())
    }

    /// Mutable counterpart of [`incomplete_tasks_by_type`](Self::incomplete_tasks_by_type),
    /// used by event passes that update tasks in place.
    pub fn incomplete_tasks_by_type_mut(
        &mut self,
        task_type: TaskType,
    ) -> impl Iterator<Item = &mut Task> + '_ {
        self.goals
            .iter_mut()
            .flat_map(|g| g.tasks.iter_mut())
            .filter(move |t| t.task_type() == task_type && !t.status.is_completed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_storage::{FileStorage, MemoryStorage};
    use gt_task::Skill;
    use tempfile::tempdir;

    fn memory_manager() -> (Arc<MemoryStorage>, GoalManager) {
        let storage = Arc::new(MemoryStorage::new());
        let manager = GoalManager::new(storage.clone());
        (storage, manager)
    }

    fn populated(manager: &mut GoalManager) -> (Uuid, Uuid) {
        let combat = manager.add_goal("Combat Goals");
        manager
            .add_task(combat, Task::skill_level(Skill::Attack, 50))
            .unwrap();
        manager
            .add_task(combat, Task::quest(1, "Waterfall Quest"))
            .unwrap();
        let skilling = manager.add_goal("Skilling");
        manager
            .add_task(skilling, Task::quest(2, "Fishing Contest"))
            .unwrap();
        manager.add_task(skilling, Task::manual("Get a pet")).unwrap();
        (combat, skilling)
    }

    #[test]
    fn load_with_no_document_is_empty() {
        let (_, mut manager) = memory_manager();
        manager.load().unwrap();
        assert!(manager.goals().is_empty());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(FileStorage::new(dir.path()));

        let mut manager = GoalManager::new(storage.clone());
        populated(&mut manager);
        let first_task = manager.goals()[0].tasks[0].id;
        manager.toggle_manual_task(manager.goals()[1].tasks[1].id).unwrap();
        manager.save().unwrap();

        let mut reopened = GoalManager::new(storage);
        reopened.load().unwrap();
        assert_eq!(reopened.goals(), manager.goals());
        assert_eq!(reopened.goals()[0].tasks[0].id, first_task);
        assert!(reopened.goals()[1].tasks[1].status.is_completed());
    }

    #[test]
    fn corrupt_document_leaves_empty_collection() {
        let (storage, mut manager) = memory_manager();
        populated(&mut manager);
        storage.insert(GOALS_KEY, "[[[ not a goals document");

        let result = manager.load();
        assert!(matches!(result, Err(GoalError::SerializationError(_))));
        assert!(manager.goals().is_empty());
    }

    #[test]
    fn incompatible_version_leaves_empty_collection() {
        let (storage, mut manager) = memory_manager();
        storage.insert(GOALS_KEY, r#"{"version": 2, "goals": []}"#);

        let result = manager.load();
        assert!(matches!(
            result,
            Err(GoalError::UnsupportedVersion { found: 2, expected: 1 })
        ));
        assert!(manager.goals().is_empty());
    }

    #[test]
    fn incomplete_tasks_by_type_spans_goals_and_skips_completed() {
        let (_, mut manager) = memory_manager();
        populated(&mut manager);

        let quests: Vec<_> = manager.incomplete_tasks_by_type(TaskType::Quest).collect();
        assert_eq!(quests.len(), 2);
        assert!(quests.iter().all(|t| t.task_type() == TaskType::Quest));

        let done = quests[0].id;
        manager.task_mut(done).unwrap().status = Status::Completed;
        let quests: Vec<_> = manager.incomplete_tasks_by_type(TaskType::Quest).collect();
        assert_eq!(quests.len(), 1);
        assert_ne!(quests[0].id, done);
    }

    #[test]
    fn profiles_keep_separate_goal_lists() {
        let (storage, mut manager) = memory_manager();
        manager.set_profile(Some("alice".to_string()));
        manager.add_goal("Alice's goal");
        manager.save().unwrap();
        assert!(storage.contains("alice.goals"));

        manager.set_profile(Some("bob".to_string()));
        assert!(manager.goals().is_empty());
        manager.load().unwrap();
        assert!(manager.goals().is_empty());

        manager.set_profile(Some("alice".to_string()));
        manager.load().unwrap();
        assert_eq!(manager.goals()[0].name, "Alice's goal");
    }

    #[test]
    fn toggle_rejects_tracked_tasks() {
        let (_, mut manager) = memory_manager();
        let (combat, _) = populated(&mut manager);
        let skill_task = manager.goal(combat).unwrap().tasks[0].id;

        let result = manager.toggle_manual_task(skill_task);
        assert!(matches!(result, Err(GoalError::NotManual(_))));
        let result = manager.toggle_manual_task(Uuid::new_v4());
        assert!(matches!(result, Err(GoalError::TaskNotFound(_))));
    }

    #[test]
    fn remove_goal_drops_its_tasks() {
        let (_, mut manager) = memory_manager();
        let (combat, _) = populated(&mut manager);
        assert_eq!(manager.task_count(), 4);

        let removed = manager.remove_goal(combat).unwrap();
        assert_eq!(removed.name, "Combat Goals");
        assert_eq!(manager.task_count(), 2);
        assert!(matches!(
            manager.remove_goal(combat),
            Err(GoalError::GoalNotFound(_))
        ));
    }

    #[test]
    fn rename_and_move_goal() {
        let (_, mut manager) = memory_manager();
        let (combat, skilling) = populated(&mut manager);

        manager.rename_goal(combat, "Melee").unwrap();
        manager.move_goal(skilling, 0).unwrap();
        assert_eq!(manager.goals()[0].id, skilling);
        assert_eq!(manager.goals()[1].name, "Melee");
    }

    #[test]
    fn remove_and_move_task_across_goals() {
        let (_, mut manager) = memory_manager();
        let (_, skilling) = populated(&mut manager);
        let pet = manager.goal(skilling).unwrap().tasks[1].id;

        manager.move_task(pet, 0).unwrap();
        assert_eq!(manager.goal(skilling).unwrap().tasks[0].id, pet);

        let (goal, task) = manager.find_task(pet).unwrap();
        assert_eq!(goal.id, skilling);
        assert_eq!(task.to_string(), "Get a pet");

        manager.remove_task(pet).unwrap();
        assert!(manager.find_task(pet).is_none());
        assert!(matches!(
            manager.remove_task(pet),
            Err(GoalError::TaskNotFound(_))
        ));
    }
}
