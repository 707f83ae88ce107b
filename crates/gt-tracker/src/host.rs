// host.rs — The host seam: state queries and the events that drive updates.
//
// The engine never talks to a live game client directly. Whatever embeds it
// implements `GameState` and forwards `GameEvent`s; `SnapshotHost` is an
// in-memory implementation that can be loaded from JSON for headless use.

use std::collections::HashMap;

use gt_items::{ItemCacheEntry, ItemLookup};
use gt_task::{InventoryId, ItemStack, QuestState, Skill};
use serde::{Deserialize, Serialize};

use crate::error::HostError;

/// Live game state the update service reads.
///
/// Every query may fail with [`HostError::Unavailable`] while the client is
/// still loading, and with [`HostError::UnknownTarget`] for ids it does not
/// know.
pub trait GameState: ItemLookup {
    /// Current (real) level of a skill.
    fn skill_level(&self, skill: Skill) -> Result<u32, HostError>;

    /// Progress of a quest.
    fn quest_state(&self, quest_id: u32) -> Result<QuestState, HostError>;

    /// Current contents of an item container.
    fn inventory(&self, inventory: InventoryId) -> Result<Vec<ItemStack>, HostError>;
}

/// A host notification that some game state changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A skill's level or experience changed.
    StatChanged {
        skill: Skill,
        level: u32,
        #[serde(default)]
        xp: u64,
    },

    /// A varbit/varp changed. Quest progress is stored in these.
    VarbitChanged { varbit_id: u32, value: i32 },

    /// An item container's contents changed.
    ItemContainerChanged {
        inventory: InventoryId,
        items: Vec<ItemStack>,
    },

    /// The player reached the logged-in game state.
    LoggedIn,

    /// A client session opened, possibly for a different account profile.
    SessionOpen {
        #[serde(default)]
        profile: Option<String>,
    },
}

impl GameEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            GameEvent::StatChanged { .. } => "stat_changed",
            GameEvent::VarbitChanged { .. } => "varbit_changed",
            GameEvent::ItemContainerChanged { .. } => "item_container_changed",
            GameEvent::LoggedIn => "logged_in",
            GameEvent::SessionOpen { .. } => "session_open",
        }
    }
}

fn default_loaded() -> bool {
    true
}

/// An in-memory [`GameState`].
///
/// Skills or inventories absent from the snapshot are reported as not yet
/// loaded; quests and items absent from it are unknown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHost {
    /// When `false`, every query reports the host as unavailable.
    #[serde(default = "default_loaded")]
    pub loaded: bool,

    #[serde(default)]
    pub skills: HashMap<Skill, u32>,

    #[serde(default)]
    pub quests: HashMap<u32, QuestState>,

    #[serde(default)]
    pub inventories: HashMap<InventoryId, Vec<ItemStack>>,

    #[serde(default)]
    pub items: HashMap<u32, ItemCacheEntry>,
}

impl Default for SnapshotHost {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotHost {
    pub fn new() -> Self {
        Self {
            loaded: true,
            skills: HashMap::new(),
            quests: HashMap::new(),
            inventories: HashMap::new(),
            items: HashMap::new(),
        }
    }

    pub fn with_skill(mut self, skill: Skill, level: u32) -> Self {
        self.skills.insert(skill, level);
        self
    }

    pub fn with_quest(mut self, quest_id: u32, state: QuestState) -> Self {
        self.quests.insert(quest_id, state);
        self
    }

    pub fn with_inventory(mut self, inventory: InventoryId, items: Vec<ItemStack>) -> Self {
        self.inventories.insert(inventory, items);
        self
    }

    pub fn with_item(mut self, item_id: u32, name: impl Into<String>) -> Self {
        self.items.insert(
            item_id,
            ItemCacheEntry {
                name: name.into(),
                icon_id: item_id,
            },
        );
        self
    }

    /// Fold an event's payload into the snapshot, the way a live client's
    /// state would already reflect it.
    pub fn observe(&mut self, event: &GameEvent) {
        match event {
            GameEvent::StatChanged { skill, level, .. } => {
                self.skills.insert(*skill, *level);
            }
            GameEvent::ItemContainerChanged { inventory, items } => {
                self.inventories.insert(*inventory, items.clone());
            }
            GameEvent::LoggedIn => self.loaded = true,
            GameEvent::VarbitChanged { .. } | GameEvent::SessionOpen { .. } => {}
        }
    }

    fn ensure_loaded(&self) -> Result<(), HostError> {
        if self.loaded {
            Ok(())
        } else {
            Err(HostError::Unavailable("client not logged in".to_string()))
        }
    }
}

impl ItemLookup for SnapshotHost {
    fn lookup_item(&self, item_id: u32) -> Option<ItemCacheEntry> {
        self.items.get(&item_id).cloned()
    }
}

impl GameState for SnapshotHost {
    fn skill_level(&self, skill: Skill) -> Result<u32, HostError> {
        self.ensure_loaded()?;
        self.skills
            .get(&skill)
            .copied()
            .ok_or_else(|| HostError::Unavailable(format!("{} level not loaded", skill)))
    }

    fn quest_state(&self, quest_id: u32) -> Result<QuestState, HostError> {
        self.ensure_loaded()?;
        self.quests
            .get(&quest_id)
            .copied()
            .ok_or_else(|| HostError::UnknownTarget {
                kind: "quest",
                id: quest_id.to_string(),
            })
    }

    fn inventory(&self, inventory: InventoryId) -> Result<Vec<ItemStack>, HostError> {
        self.ensure_loaded()?;
        self.inventories
            .get(&inventory)
            .cloned()
            .ok_or_else(|| HostError::Unavailable(format!("{:?} not loaded", inventory)))
    }
}
