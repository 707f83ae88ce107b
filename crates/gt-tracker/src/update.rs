// update.rs — TaskUpdateService: decides whether a task's status changed.
//
// Rules per variant:
//   SkillLevel      COMPLETED at level >= target, IN_PROGRESS once the level
//                   rose above the baseline seen on first evaluation.
//   Quest           mirrors the host's quest state.
//   ItemCollection  COMPLETED when the tracked inventories hold the target
//                   quantity, IN_PROGRESS while holding some.
//   Manual          never touched here; the player toggles it.
//
// Status only moves forward (see `Task::advance`), so a completed task is a
// latch and further calls are cheap no-ops. A host query that is not ready
// skips the task for this pass; the next qualifying event retries it.

use std::collections::{HashMap, HashSet};

use gt_items::ItemCache;
use gt_task::{InventoryId, ItemStack, QuestState, Skill, Status, Task, TaskKind};
use uuid::Uuid;

use crate::error::HostError;
use crate::host::{GameEvent, GameState};

/// Evaluates tasks against host state and events.
///
/// Owns the process-wide [`ItemCache`] and the last seen contents of each
/// tracked inventory. Tasks are borrowed per call; the service never keeps
/// its own copy of one.
pub struct TaskUpdateService<H> {
    host: H,
    items: ItemCache,
    inventories: HashMap<InventoryId, Vec<ItemStack>>,
    /// Set when an update filled in task data without changing its status.
    touched: bool,
    /// Tasks whose target the host could not resolve, already warned about.
    unresolved: HashSet<Uuid>,
}

impl<H: GameState> TaskUpdateService<H> {
    pub fn new(host: H, items: ItemCache) -> Self {
        Self {
            host,
            items,
            inventories: HashMap::new(),
            touched: false,
            unresolved: HashSet::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn items(&self) -> &ItemCache {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut ItemCache {
        &mut self.items
    }

    /// Fold an event's state into the service before any task sees it.
    ///
    /// Tracked container contents are kept even when no open task cares
    /// about them yet, so a task added later can count them.
    pub fn observe(&mut self, event: &GameEvent) {
        if let GameEvent::ItemContainerChanged { inventory, items } = event {
            if InventoryId::TRACKED.contains(inventory) {
                self.record_inventory(*inventory, items);
            }
        }
    }

    /// Whether any update since the last call stored new task data (a skill
    /// baseline or a resolved item name) without a status change. Resets the
    /// flag.
    pub fn take_touched(&mut self) -> bool {
        std::mem::take(&mut self.touched)
    }

    /// Re-evaluate a task from current host state. Used when a task is
    /// created and for re-checks that have no triggering payload.
    ///
    /// Returns `true` if the status changed.
    pub fn update(&mut self, task: &mut Task) -> bool {
        if task.status.is_completed() {
            return false;
        }

        let observed = match &mut task.kind {
            TaskKind::Manual { .. } => return false,
            TaskKind::SkillLevel {
                skill,
                target_level,
                baseline_level,
            } => {
                let unset = baseline_level.is_none();
                let observed = self
                    .host
                    .skill_level(*skill)
                    .and_then(|level| skill_status(*skill, level, *target_level, baseline_level));
                self.touched |= unset && baseline_level.is_some();
                observed
            }
            TaskKind::Quest { quest_id, .. } => {
                self.host.quest_state(*quest_id).map(quest_status)
            }
            TaskKind::ItemCollection {
                item_id,
                quantity,
                item_name,
            } => {
                self.refresh_inventories();
                self.item_status(*item_id, *quantity, item_name)
            }
        };

        self.apply(task, observed)
    }

    /// Re-evaluate a task in response to `event`.
    ///
    /// Only tasks whose variant matches the event's domain are looked at:
    /// stat changes drive skill tasks of that skill, varbit changes and
    /// logins drive quest tasks, container changes drive item tasks.
    /// Returns `true` if the status changed.
    pub fn update_for_event(&mut self, task: &mut Task, event: &GameEvent) -> bool {
        if task.status.is_completed() {
            return false;
        }

        let observed = match (&mut task.kind, event) {
            (
                TaskKind::SkillLevel {
                    skill,
                    target_level,
                    baseline_level,
                },
                GameEvent::StatChanged {
                    skill: changed,
                    level,
                    ..
                },
            ) if *skill == *changed => {
                let unset = baseline_level.is_none();
                let observed = skill_status(*skill, *level, *target_level, baseline_level);
                self.touched |= unset && baseline_level.is_some();
                observed
            }
            (TaskKind::Quest { quest_id, .. }, GameEvent::VarbitChanged { .. } | GameEvent::LoggedIn) => {
                self.host.quest_state(*quest_id).map(quest_status)
            }
            (
                TaskKind::ItemCollection {
                    item_id,
                    quantity,
                    item_name,
                },
                GameEvent::ItemContainerChanged { inventory, items },
            ) if InventoryId::TRACKED.contains(inventory) => {
                self.record_inventory(*inventory, items);
                self.item_status(*item_id, *quantity, item_name)
            }
            _ => return false,
        };

        self.apply(task, observed)
    }

    /// Remember a container's contents. Idempotent, so recording the same
    /// event once per task in a pass is harmless.
    pub fn record_inventory(&mut self, inventory: InventoryId, items: &[ItemStack]) {
        self.inventories.insert(inventory, items.to_vec());
    }

    /// Total quantity of `item_id` across the last seen tracked inventories.
    pub fn held_quantity(&self, item_id: u32) -> u64 {
        self.inventories
            .values()
            .flatten()
            .filter(|stack| stack.item_id == item_id)
            .map(|stack| stack.quantity)
            .sum()
    }

    /// Pull every tracked inventory the host can report right now; keep the
    /// last snapshot for those it cannot (e.g. a bank not opened this session).
    fn refresh_inventories(&mut self) {
        for inventory in InventoryId::TRACKED {
            match self.host.inventory(inventory) {
                Ok(items) => {
                    self.inventories.insert(inventory, items);
                }
                Err(e) => tracing::trace!(?inventory, error = %e, "keeping cached inventory"),
            }
        }
    }

    fn item_status(
        &mut self,
        item_id: u32,
        target: u64,
        item_name: &mut Option<String>,
    ) -> Result<Status, HostError> {
        let entry = self
            .items
            .get(item_id, &self.host)
            .ok_or_else(|| HostError::UnknownTarget {
                kind: "item",
                id: item_id.to_string(),
            })?;
        if item_name.is_none() {
            *item_name = Some(entry.name.clone());
            self.touched = true;
        }

        let held = self.held_quantity(item_id);
        Ok(if held >= target {
            Status::Completed
        } else if held > 0 {
            Status::InProgress
        } else {
            Status::NotStarted
        })
    }

    fn apply(&mut self, task: &mut Task, observed: Result<Status, HostError>) -> bool {
        match observed {
            Ok(next) => {
                self.unresolved.remove(&task.id);
                let from = task.status;
                let changed = task.advance(next);
                if changed {
                    tracing::debug!(task_id = %task.id, task = %task, %from, to = %task.status, "task status changed");
                }
                changed
            }
            Err(HostError::Unavailable(what)) => {
                tracing::debug!(task_id = %task.id, %what, "host state unavailable, skipping update");
                false
            }
            Err(e @ HostError::UnknownTarget { .. }) => {
                // Quest tasks are re-checked on every varbit change.
                if self.unresolved.insert(task.id) {
                    tracing::warn!(task_id = %task.id, task = %task, error = %e, "task target cannot be resolved");
                } else {
                    tracing::debug!(task_id = %task.id, error = %e, "task target still unresolved");
                }
                false
            }
        }
    }
}

fn skill_status(
    skill: Skill,
    level: u32,
    target_level: u32,
    baseline_level: &mut Option<u32>,
) -> Result<Status, HostError> {
    if target_level == 0 || target_level > Skill::MAX_LEVEL {
        return Err(HostError::UnknownTarget {
            kind: "skill level",
            id: format!("{} {}", skill, target_level),
        });
    }

    let baseline = *baseline_level.get_or_insert(level);
    Ok(if level >= target_level {
        Status::Completed
    } else if level > baseline {
        Status::InProgress
    } else {
        Status::NotStarted
    })
}

fn quest_status(state: QuestState) -> Status {
    match state {
        QuestState::NotStarted => Status::NotStarted,
        QuestState::InProgress => Status::InProgress,
        QuestState::Finished => Status::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SnapshotHost;
    use gt_storage::MemoryStorage;
    use std::sync::Arc;

    fn service(host: SnapshotHost) -> TaskUpdateService<SnapshotHost> {
        TaskUpdateService::new(host, ItemCache::new(Arc::new(MemoryStorage::new())))
    }

    fn stat(skill: Skill, level: u32) -> GameEvent {
        GameEvent::StatChanged {
            skill,
            level,
            xp: 0,
        }
    }

    #[test]
    fn skill_event_at_target_completes() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::skill_level(Skill::Attack, 50);

        assert!(svc.update_for_event(&mut task, &stat(Skill::Attack, 50)));
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn skill_event_below_target_does_not_complete() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::skill_level(Skill::Attack, 50);

        assert!(!svc.update_for_event(&mut task, &stat(Skill::Attack, 40)));
        assert_eq!(task.status, Status::NotStarted);

        assert!(svc.update_for_event(&mut task, &stat(Skill::Attack, 49)));
        assert_eq!(task.status, Status::InProgress);
    }

    #[test]
    fn skill_event_for_other_skill_is_ignored() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::skill_level(Skill::Attack, 50);

        assert!(!svc.update_for_event(&mut task, &stat(Skill::Strength, 99)));
        assert_eq!(task.status, Status::NotStarted);
        assert!(matches!(
            task.kind,
            TaskKind::SkillLevel {
                baseline_level: None,
                ..
            }
        ));
    }

    #[test]
    fn skill_update_reads_host_and_records_baseline() {
        let mut svc = service(SnapshotHost::new().with_skill(Skill::Mining, 30));
        let mut task = Task::skill_level(Skill::Mining, 60);

        assert!(!svc.update(&mut task));
        assert!(matches!(
            task.kind,
            TaskKind::SkillLevel {
                baseline_level: Some(30),
                ..
            }
        ));

        svc.host_mut().skills.insert(Skill::Mining, 61);
        assert!(svc.update(&mut task));
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn completed_task_is_a_latch() {
        let mut svc = service(SnapshotHost::new().with_skill(Skill::Attack, 1));
        let mut task = Task::skill_level(Skill::Attack, 50);
        svc.update_for_event(&mut task, &stat(Skill::Attack, 50));
        assert!(task.status.is_completed());

        assert!(!svc.update_for_event(&mut task, &stat(Skill::Attack, 1)));
        assert!(!svc.update(&mut task));
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn unavailable_skill_is_skipped() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::skill_level(Skill::Agility, 70);
        assert!(!svc.update(&mut task));
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn invalid_target_level_never_completes() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::skill_level(Skill::Attack, 150);
        assert!(!svc.update_for_event(&mut task, &stat(Skill::Attack, 99)));
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn quest_mirrors_host_state() {
        let mut svc = service(SnapshotHost::new().with_quest(7, QuestState::NotStarted));
        let mut task = Task::quest(7, "Dragon Slayer I");
        let varbit = GameEvent::VarbitChanged {
            varbit_id: 176,
            value: 1,
        };

        assert!(!svc.update_for_event(&mut task, &varbit));

        svc.host_mut().quests.insert(7, QuestState::InProgress);
        assert!(svc.update_for_event(&mut task, &varbit));
        assert_eq!(task.status, Status::InProgress);
        assert!(!svc.update_for_event(&mut task, &varbit));

        svc.host_mut().quests.insert(7, QuestState::Finished);
        assert!(svc.update_for_event(&mut task, &GameEvent::LoggedIn));
        assert_eq!(task.status, Status::Completed);
    }

    #[test]
    fn quest_ignores_stat_events() {
        let mut svc = service(SnapshotHost::new().with_quest(7, QuestState::Finished));
        let mut task = Task::quest(7, "Dragon Slayer I");
        assert!(!svc.update_for_event(&mut task, &stat(Skill::Attack, 50)));
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn unknown_quest_stays_incomplete() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::quest(4242, "Not A Quest");
        assert!(!svc.update(&mut task));
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn manual_task_is_never_auto_updated() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::manual("Get a fire cape");
        assert!(!svc.update(&mut task));
        assert!(!svc.update_for_event(&mut task, &GameEvent::LoggedIn));
        assert_eq!(task.status, Status::NotStarted);
    }

    #[test]
    fn item_collection_sums_tracked_inventories() {
        let host = SnapshotHost::new()
            .with_item(1515, "Yew logs")
            .with_inventory(InventoryId::Bank, vec![ItemStack::new(1515, 60)]);
        let mut svc = service(host);
        let mut task = Task::item_collection(1515, 100);

        assert!(svc.update(&mut task));
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(task.to_string(), "100 x Yew logs");

        let event = GameEvent::ItemContainerChanged {
            inventory: InventoryId::Inventory,
            items: vec![ItemStack::new(1515, 28), ItemStack::new(1515, 12)],
        };
        assert!(svc.update_for_event(&mut task, &event));
        assert_eq!(task.status, Status::Completed);
        assert_eq!(svc.held_quantity(1515), 100);
    }

    #[test]
    fn observed_container_counts_for_tasks_created_later() {
        let mut svc = service(SnapshotHost::new().with_item(995, "Coins"));
        svc.observe(&GameEvent::ItemContainerChanged {
            inventory: InventoryId::Bank,
            items: vec![ItemStack::new(995, 1_000)],
        });
        svc.observe(&GameEvent::ItemContainerChanged {
            inventory: InventoryId::Inventory,
            items: vec![ItemStack::new(995, 5)],
        });

        let mut task = Task::item_collection(995, 500);
        assert!(svc.update(&mut task));
        assert_eq!(task.status, Status::Completed);
        assert_eq!(svc.held_quantity(995), 1_005);
    }

    #[test]
    fn baseline_and_item_name_mark_service_touched() {
        let host = SnapshotHost::new()
            .with_skill(Skill::Mining, 30)
            .with_item(995, "Coins");
        let mut svc = service(host);
        assert!(!svc.take_touched());

        let mut skill = Task::skill_level(Skill::Mining, 60);
        assert!(!svc.update(&mut skill));
        assert!(svc.take_touched());
        assert!(!svc.take_touched());

        // Baseline already recorded: nothing new to persist.
        assert!(!svc.update(&mut skill));
        assert!(!svc.take_touched());

        let mut item = Task::item_collection(995, 10);
        assert!(!svc.update(&mut item));
        assert!(svc.take_touched());
    }

    #[test]
    fn unresolved_quest_is_tracked_once_until_it_resolves() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::quest(4242, "Not A Quest");
        let varbit = GameEvent::VarbitChanged {
            varbit_id: 1,
            value: 2,
        };

        assert!(!svc.update_for_event(&mut task, &varbit));
        assert!(!svc.update_for_event(&mut task, &varbit));
        assert_eq!(svc.unresolved.len(), 1);

        svc.host_mut().quests.insert(4242, QuestState::InProgress);
        assert!(svc.update_for_event(&mut task, &varbit));
        assert!(svc.unresolved.is_empty());
    }

    #[test]
    fn item_collection_keeps_snapshot_when_host_cannot_report() {
        let host = SnapshotHost::new().with_item(995, "Coins");
        let mut svc = service(host);
        svc.record_inventory(InventoryId::Bank, &[ItemStack::new(995, 10)]);

        let mut task = Task::item_collection(995, 1_000);
        assert!(svc.update(&mut task));
        assert_eq!(task.status, Status::InProgress);
        assert_eq!(svc.held_quantity(995), 10);
    }

    #[test]
    fn unknown_item_stays_incomplete() {
        let mut svc = service(SnapshotHost::new());
        let mut task = Task::item_collection(31337, 1);
        let event = GameEvent::ItemContainerChanged {
            inventory: InventoryId::Inventory,
            items: vec![ItemStack::new(31337, 5)],
        };
        assert!(!svc.update_for_event(&mut task, &event));
        assert_eq!(task.status, Status::NotStarted);
        assert!(svc.items().is_empty());
    }

    #[test]
    fn tasks_in_one_pass_are_independent() {
        let host = SnapshotHost::new()
            .with_quest(1, QuestState::Finished)
            .with_quest(2, QuestState::InProgress);
        let mut svc = service(host);
        let mut tasks = vec![
            Task::quest(1, "Cook's Assistant"),
            Task::quest(999, "Unknown"),
            Task::quest(2, "Rune Mysteries"),
        ];

        let changed: Vec<bool> = tasks
            .iter_mut()
            .map(|t| svc.update_for_event(t, &GameEvent::LoggedIn))
            .collect();
        assert_eq!(changed, vec![true, false, true]);
        assert_eq!(tasks[0].status, Status::Completed);
        assert_eq!(tasks[2].status, Status::InProgress);
    }
}
