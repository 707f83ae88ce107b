// context.rs — Shared setup for every command: data dir, config, storage.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use gt_goal::GoalManager;
use gt_items::ItemCache;
use gt_storage::{FileStorage, Storage};
use gt_tracker::{
    ChatSink, Notification, PluginController, SnapshotHost, TaskUpdateService, TrackerConfig,
};

/// Prints completion messages to stdout.
pub struct TerminalChat;

impl ChatSink for TerminalChat {
    fn send_message(&self, notification: &Notification) {
        println!("[{}] {}", notification.color, notification.text);
    }
}

/// Resolved locations and configuration for one CLI invocation.
pub struct TrackerContext {
    pub data_dir: PathBuf,
    pub profile: Option<String>,
    pub config: TrackerConfig,
}

impl TrackerContext {
    /// Resolve the data directory and read `<data-dir>/config.toml`.
    pub fn resolve(data_dir: Option<PathBuf>, profile: Option<String>) -> anyhow::Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .context("no platform data directory; pass --data-dir")?
                .join("goal-tracker"),
        };
        let config = TrackerConfig::load(data_dir.join("config.toml"))?;
        tracing::debug!(data_dir = %data_dir.display(), profile = ?profile, "resolved tracker context");
        Ok(Self {
            data_dir,
            profile,
            config,
        })
    }

    pub fn storage(&self) -> Arc<dyn Storage> {
        Arc::new(FileStorage::new(&self.data_dir))
    }

    /// A started controller for this profile, talking to `host`.
    pub fn controller(&self, host: SnapshotHost) -> PluginController<SnapshotHost> {
        let storage = self.storage();
        let mut goals = GoalManager::new(storage.clone());
        goals.set_profile(self.profile.clone());
        let mut controller = PluginController::new(
            self.config.clone(),
            goals,
            TaskUpdateService::new(host, ItemCache::new(storage)),
            Box::new(TerminalChat),
        );
        controller.start_up();
        controller
    }
}

/// Read a host snapshot. Without one, the host reports nothing as loaded,
/// so tasks are stored without being evaluated.
pub fn load_host(path: Option<&Path>) -> anyhow::Result<SnapshotHost> {
    let Some(path) = path else {
        return Ok(SnapshotHost {
            loaded: false,
            ..SnapshotHost::new()
        });
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read host snapshot {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("invalid host snapshot {}", path.display()))
}

pub fn parse_id(id: &str) -> anyhow::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(id).with_context(|| format!("not a valid id: {}", id))
}
