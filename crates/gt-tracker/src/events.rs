// events.rs — Tracker events and notification dispatch.
//
// The tracker emits an event whenever a task changes status, a task or goal
// completes, or a profile's goals are loaded. Sinks (a JSONL log, the
// host's UI bridge, tests) subscribe through `EventDispatcher`. Dispatch is
// synchronous and a failing sink never stops the others.

use std::fs::{self, File, OpenOptions};
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gt_task::{Status, Task};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TrackerError;

/// Events emitted by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A task moved between statuses (automatically or by toggle).
    TaskStatusChanged {
        task_id: Uuid,
        task: String,
        from_status: Status,
        to_status: Status,
        timestamp: DateTime<Utc>,
    },

    /// A tracked task was detected as completed.
    TaskCompleted {
        goal_id: Uuid,
        task_id: Uuid,
        task: String,
        timestamp: DateTime<Utc>,
    },

    /// The last open task of a goal completed.
    GoalCompleted {
        goal_id: Uuid,
        name: String,
        timestamp: DateTime<Utc>,
    },

    /// Goals were (re)loaded for a profile.
    GoalsLoaded {
        profile: Option<String>,
        goals: usize,
        timestamp: DateTime<Utc>,
    },
}

impl TrackerEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            TrackerEvent::TaskStatusChanged { .. } => "task_status_changed",
            TrackerEvent::TaskCompleted { .. } => "task_completed",
            TrackerEvent::GoalCompleted { .. } => "goal_completed",
            TrackerEvent::GoalsLoaded { .. } => "goals_loaded",
        }
    }

    pub fn task_status_changed(task: &Task, from: Status) -> Self {
        TrackerEvent::TaskStatusChanged {
            task_id: task.id,
            task: task.display_name(),
            from_status: from,
            to_status: task.status,
            timestamp: Utc::now(),
        }
    }

    pub fn task_completed(goal_id: Uuid, task: &Task) -> Self {
        TrackerEvent::TaskCompleted {
            goal_id,
            task_id: task.id,
            task: task.display_name(),
            timestamp: Utc::now(),
        }
    }

    pub fn goal_completed(goal_id: Uuid, name: &str) -> Self {
        TrackerEvent::GoalCompleted {
            goal_id,
            name: name.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn goals_loaded(profile: Option<&str>, goals: usize) -> Self {
        TrackerEvent::GoalsLoaded {
            profile: profile.map(str::to_string),
            goals,
            timestamp: Utc::now(),
        }
    }
}

/// Something that wants to hear about tracker events.
pub trait NotificationSink {
    fn notify(&mut self, event: &TrackerEvent) -> Result<(), TrackerError>;
}

/// Appends every event to a JSONL file.
///
/// The file is opened on the first event and kept open. After a write
/// error the handle is dropped and the next event reopens it.
pub struct EventLog {
    path: PathBuf,
    writer: Option<LineWriter<File>>,
}

impl EventLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> Result<LineWriter<File>, TrackerError> {
        let io_error = |source: std::io::Error| TrackerError::IoError {
            path: self.path.display().to_string(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_error)?;
        Ok(LineWriter::new(file))
    }
}

impl NotificationSink for EventLog {
    fn notify(&mut self, event: &TrackerEvent) -> Result<(), TrackerError> {
        let line = serde_json::to_string(event)?;
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => self.open()?,
        };
        let writer = self.writer.insert(writer);
        if let Err(source) = writeln!(writer, "{}", line) {
            self.writer = None;
            return Err(TrackerError::IoError {
                path: self.path.display().to_string(),
                source,
            });
        }
        Ok(())
    }
}

struct Subscriber {
    sink: Box<dyn NotificationSink>,
    failing: bool,
}

/// Fans tracker events out to every registered sink.
///
/// A sink error never reaches the caller. The first failure of a sink is a
/// warning; repeats are logged at debug until the sink succeeds again.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: Vec<Subscriber>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sink(&mut self, sink: Box<dyn NotificationSink>) {
        self.subscribers.push(Subscriber {
            sink,
            failing: false,
        });
    }

    /// Sinks whose last delivery failed.
    pub fn failing_sinks(&self) -> usize {
        self.subscribers.iter().filter(|s| s.failing).count()
    }

    pub fn dispatch(&mut self, event: &TrackerEvent) {
        for subscriber in &mut self.subscribers {
            match subscriber.sink.notify(event) {
                Ok(()) if subscriber.failing => {
                    subscriber.failing = false;
                    tracing::info!(event_type = event.event_type(), "notification sink recovered");
                }
                Ok(()) => {}
                Err(e) if subscriber.failing => {
                    tracing::debug!(event_type = event.event_type(), error = %e, "notification sink still failing");
                }
                Err(e) => {
                    subscriber.failing = true;
                    tracing::warn!(event_type = event.event_type(), error = %e, "notification sink failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gt_task::Skill;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::tempdir;

    /// Fails the first `failures` deliveries, then succeeds.
    struct FlakySink {
        failures: usize,
    }

    impl NotificationSink for FlakySink {
        fn notify(&mut self, _event: &TrackerEvent) -> Result<(), TrackerError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(TrackerError::NotificationError("overlay closed".to_string()));
            }
            Ok(())
        }
    }

    struct RecordingSink(Rc<RefCell<Vec<String>>>);

    impl NotificationSink for RecordingSink {
        fn notify(&mut self, event: &TrackerEvent) -> Result<(), TrackerError> {
            self.0.borrow_mut().push(event.event_type().to_string());
            Ok(())
        }
    }

    #[test]
    fn event_serialization_round_trip() {
        let task = Task::skill_level(Skill::Attack, 50);
        let event = TrackerEvent::task_completed(Uuid::new_v4(), &task);
        let json = serde_json::to_string(&event).unwrap();
        let restored: TrackerEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, event);
        assert!(json.contains("\"task_completed\""));
        assert!(json.contains("50 Attack"));
    }

    #[test]
    fn event_log_creates_directory_and_appends_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("events.jsonl");
        let mut log = EventLog::new(&path);

        log.notify(&TrackerEvent::goals_loaded(None, 2)).unwrap();
        log.notify(&TrackerEvent::goal_completed(Uuid::new_v4(), "Quest Cape"))
            .unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("goal_completed"));
    }

    #[test]
    fn event_log_reports_unopenable_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();
        let mut log = EventLog::new(blocker.join("events.jsonl"));

        let result = log.notify(&TrackerEvent::goals_loaded(None, 0));
        assert!(matches!(result, Err(TrackerError::IoError { .. })));
    }

    #[test]
    fn failing_sink_does_not_block_others() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_sink(Box::new(FlakySink { failures: 1 }));
        dispatcher.add_sink(Box::new(RecordingSink(seen.clone())));

        dispatcher.dispatch(&TrackerEvent::goals_loaded(Some("main"), 0));
        assert_eq!(*seen.borrow(), vec!["goals_loaded".to_string()]);
        assert_eq!(dispatcher.failing_sinks(), 1);
    }

    #[test]
    fn failing_sink_recovers_after_a_good_delivery() {
        let mut dispatcher = EventDispatcher::new();
        dispatcher.add_sink(Box::new(FlakySink { failures: 2 }));

        let event = TrackerEvent::goals_loaded(None, 0);
        dispatcher.dispatch(&event);
        dispatcher.dispatch(&event);
        assert_eq!(dispatcher.failing_sinks(), 1);

        dispatcher.dispatch(&event);
        assert_eq!(dispatcher.failing_sinks(), 0);
    }

    #[test]
    fn status_change_event_captures_transition() {
        let mut task = Task::quest(1, "Cook's Assistant");
        task.status = Status::InProgress;
        match TrackerEvent::task_status_changed(&task, Status::NotStarted) {
            TrackerEvent::TaskStatusChanged {
                from_status,
                to_status,
                task,
                ..
            } => {
                assert_eq!(from_status, Status::NotStarted);
                assert_eq!(to_status, Status::InProgress);
                assert_eq!(task, "Cook's Assistant");
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
