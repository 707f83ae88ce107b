// controller.rs — PluginController: host events in, task updates out.
//
// The host forwards its events here on the game thread. Each event is
// scoped to the incomplete tasks of one variant, every task is updated
// independently, and the results fan out: UI status refresh, a chat
// message per completed task, tracker events, and one save of the goals.

use std::collections::HashSet;

use gt_goal::{GoalError, GoalManager};
use gt_task::{Status, Task, TaskType};
use uuid::Uuid;

use crate::config::{Notification, TrackerConfig};
use crate::events::{EventDispatcher, EventLog, NotificationSink, TrackerEvent};
use crate::host::{GameEvent, GameState};
use crate::ui_status::TaskUiStatusManager;
use crate::update::TaskUpdateService;

/// The host's chat box.
pub trait ChatSink {
    fn send_message(&self, notification: &Notification);
}

/// What one event pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Tasks looked at.
    pub evaluated: usize,
    /// Tasks whose status changed, in pass order.
    pub changed: Vec<Uuid>,
    /// Tasks that became completed.
    pub completed: Vec<Uuid>,
    /// Goals whose last open task completed.
    pub goals_completed: Vec<Uuid>,
}

struct StatusChange {
    task_id: Uuid,
    from: Status,
}

/// Wires host events to the goal manager, update service and UI status.
pub struct PluginController<H> {
    config: TrackerConfig,
    goals: GoalManager,
    updater: TaskUpdateService<H>,
    ui: TaskUiStatusManager,
    dispatcher: EventDispatcher,
    chat: Box<dyn ChatSink>,
}

impl<H: GameState> PluginController<H> {
    /// Build a controller. A JSONL event log is attached when the config
    /// names one.
    pub fn new(
        config: TrackerConfig,
        goals: GoalManager,
        updater: TaskUpdateService<H>,
        chat: Box<dyn ChatSink>,
    ) -> Self {
        let mut dispatcher = EventDispatcher::new();
        if let Some(path) = &config.events_log {
            dispatcher.add_sink(Box::new(EventLog::new(path)));
        }
        Self {
            config,
            goals,
            updater,
            ui: TaskUiStatusManager::new(),
            dispatcher,
            chat,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn goals(&self) -> &GoalManager {
        &self.goals
    }

    /// Goal edits from the UI go through here; call [`save`](Self::save)
    /// afterwards.
    pub fn goals_mut(&mut self) -> &mut GoalManager {
        &mut self.goals
    }

    pub fn updater(&self) -> &TaskUpdateService<H> {
        &self.updater
    }

    pub fn updater_mut(&mut self) -> &mut TaskUpdateService<H> {
        &mut self.updater
    }

    pub fn ui_mut(&mut self) -> &mut TaskUiStatusManager {
        &mut self.ui
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.dispatcher.add_sink(sink);
    }

    /// Restore goals and the item cache. Failures are logged and leave the
    /// affected collection empty.
    pub fn start_up(&mut self) {
        if let Err(e) = self.goals.load() {
            tracing::error!(error = %e, "failed to load goals, starting empty");
        }
        if let Err(e) = self.updater.items_mut().load() {
            tracing::warn!(error = %e, "failed to load item cache, starting empty");
        }
        self.dispatcher.dispatch(&TrackerEvent::goals_loaded(
            self.goals.profile(),
            self.goals.goals().len(),
        ));
    }

    /// Persist goals and any new item cache entries.
    pub fn shut_down(&mut self) {
        self.save();
        self.flush_item_cache();
    }

    /// An account session opened: switch to its goals.
    pub fn on_session_open(&mut self, profile: Option<String>) {
        self.goals.set_profile(profile);
        if let Err(e) = self.goals.load() {
            tracing::error!(error = %e, profile = ?self.goals.profile(), "failed to load goals on session open");
        }
        self.dispatcher.dispatch(&TrackerEvent::goals_loaded(
            self.goals.profile(),
            self.goals.goals().len(),
        ));
    }

    /// Handle one host event.
    pub fn on_event(&mut self, event: &GameEvent) -> UpdateReport {
        let task_type = match event {
            GameEvent::StatChanged { .. } => TaskType::SkillLevel,
            GameEvent::VarbitChanged { .. } | GameEvent::LoggedIn => TaskType::Quest,
            GameEvent::ItemContainerChanged { .. } => TaskType::ItemCollection,
            GameEvent::SessionOpen { profile } => {
                self.on_session_open(profile.clone());
                return UpdateReport::default();
            }
        };

        self.updater.observe(event);

        let mut report = UpdateReport::default();
        let mut changes = Vec::new();
        for task in self.goals.incomplete_tasks_by_type_mut(task_type) {
            report.evaluated += 1;
            let from = task.status;
            if self.updater.update_for_event(task, event) {
                changes.push(StatusChange {
                    task_id: task.id,
                    from,
                });
            }
        }

        tracing::trace!(
            event = event.event_name(),
            evaluated = report.evaluated,
            changed = changes.len(),
            "event pass finished"
        );
        self.publish(changes, &mut report);
        report
    }

    /// Re-check every incomplete tracked task from current host state, e.g.
    /// once the client has settled after login.
    pub fn refresh_all(&mut self) -> UpdateReport {
        let mut report = UpdateReport::default();
        let mut changes = Vec::new();
        for task_type in [TaskType::SkillLevel, TaskType::Quest, TaskType::ItemCollection] {
            for task in self.goals.incomplete_tasks_by_type_mut(task_type) {
                report.evaluated += 1;
                let from = task.status;
                if self.updater.update(task) {
                    changes.push(StatusChange {
                        task_id: task.id,
                        from,
                    });
                }
            }
        }
        self.publish(changes, &mut report);
        report
    }

    /// Add a task the player just created and evaluate it immediately.
    pub fn on_task_added(&mut self, goal_id: Uuid, task: Task) -> Result<UpdateReport, GoalError> {
        let task_id = self.goals.add_task(goal_id, task)?;

        let mut report = UpdateReport::default();
        let mut changes = Vec::new();
        if let Some(task) = self.goals.task_mut(task_id) {
            report.evaluated = 1;
            let from = task.status;
            if self.updater.update(task) {
                changes.push(StatusChange { task_id, from });
            }
        }

        // A new task is always persisted, changed or not.
        if !self.publish(changes, &mut report) {
            self.save();
        }
        Ok(report)
    }

    /// Player clicked a manual task's checkbox.
    pub fn toggle_manual_task(&mut self, task_id: Uuid) -> Result<Status, GoalError> {
        let from = self
            .goals
            .find_task(task_id)
            .map(|(_, task)| task.status)
            .ok_or(GoalError::TaskNotFound(task_id))?;
        let status = self.goals.toggle_manual_task(task_id)?;
        if let Some((_, task)) = self.goals.find_task(task_id) {
            self.ui.refresh(task);
            self.dispatcher
                .dispatch(&TrackerEvent::task_status_changed(task, from));
        }
        self.save();
        Ok(status)
    }

    /// Save goals, logging failures.
    pub fn save(&self) {
        if let Err(e) = self.goals.save() {
            tracing::error!(error = %e, "failed to save goals");
        }
    }

    fn flush_item_cache(&mut self) {
        if let Err(e) = self.updater.items_mut().save_if_dirty() {
            tracing::warn!(error = %e, "failed to save item cache");
        }
    }

    /// Fan out a pass's status changes. Returns whether the goals were saved.
    fn publish(&mut self, changes: Vec<StatusChange>, report: &mut UpdateReport) -> bool {
        let mut finished_goals = HashSet::new();

        for change in &changes {
            let Some((goal, task)) = self.goals.find_task(change.task_id) else {
                continue;
            };
            report.changed.push(task.id);
            self.ui.refresh(task);
            self.dispatcher
                .dispatch(&TrackerEvent::task_status_changed(task, change.from));

            if task.status.is_completed() {
                report.completed.push(task.id);
                tracing::info!(task = %task, goal = %goal.name, "task completed");
                if self.config.notify_on_completion {
                    self.chat
                        .send_message(&self.config.completion_message(task));
                }
                self.dispatcher
                    .dispatch(&TrackerEvent::task_completed(goal.id, task));

                if goal.is_completed() && finished_goals.insert(goal.id) {
                    report.goals_completed.push(goal.id);
                    tracing::info!(goal = %goal.name, "goal completed");
                    self.dispatcher
                        .dispatch(&TrackerEvent::goal_completed(goal.id, &goal.name));
                }
            }
        }

        // Baselines and resolved item names change tasks without a status
        // change; they are persisted too.
        let touched = self.updater.take_touched();
        let save = !changes.is_empty() || touched;
        if save {
            self.save();
        }
        self.flush_item_cache();
        save
    }
}
