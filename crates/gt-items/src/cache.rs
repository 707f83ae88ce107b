// cache.rs — ItemCache: item id → name/icon, persisted between sessions.
//
// Misses fall through to the host's item database via `ItemLookup` and are
// stored. Persistence is periodic: inserts mark the cache dirty and the
// owner calls `save_if_dirty()` at a convenient point (end of an event pass,
// shutdown) instead of writing on every miss.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use gt_storage::Storage;
use serde::{Deserialize, Serialize};

use crate::error::ItemCacheError;

/// Storage key of the cache document. Item metadata is global, not per profile.
pub const ITEM_CACHE_KEY: &str = "item-cache";

const CACHE_VERSION: u32 = 1;

/// Cached metadata for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCacheEntry {
    pub name: String,
    /// Item id of the sprite to draw (noted/placeholder variants point at
    /// their base item).
    pub icon_id: u32,
}

/// The host's item database.
pub trait ItemLookup {
    /// Resolve an item id. `None` when the host knows no such item.
    fn lookup_item(&self, item_id: u32) -> Option<ItemCacheEntry>;
}

#[derive(Serialize, Deserialize)]
struct CacheDocument {
    version: u32,
    // BTreeMap keeps the persisted file stable across saves.
    items: BTreeMap<u32, ItemCacheEntry>,
}

/// Lazily populated, persisted item metadata cache.
pub struct ItemCache {
    storage: Arc<dyn Storage>,
    entries: HashMap<u32, ItemCacheEntry>,
    dirty: bool,
}

impl ItemCache {
    /// Create an empty cache backed by `storage`. Call [`load`](Self::load)
    /// to restore persisted entries.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            entries: HashMap::new(),
            dirty: false,
        }
    }

    /// Restore the persisted cache, replacing in-memory entries.
    ///
    /// Missing storage yields an empty cache. Unreadable, malformed or
    /// version-incompatible storage also leaves the cache empty, and the
    /// error is returned for the caller to log.
    pub fn load(&mut self) -> Result<(), ItemCacheError> {
        self.entries.clear();
        self.dirty = false;

        let Some(bytes) = self.storage.load(ITEM_CACHE_KEY)? else {
            tracing::debug!("no persisted item cache, starting empty");
            return Ok(());
        };

        let document: CacheDocument = serde_json::from_slice(&bytes)?;
        if document.version != CACHE_VERSION {
            return Err(ItemCacheError::UnsupportedVersion {
                found: document.version,
                expected: CACHE_VERSION,
            });
        }

        self.entries = document.items.into_iter().collect();
        tracing::info!(entries = self.entries.len(), "loaded item cache");
        Ok(())
    }

    /// Return the entry for `item_id`, consulting the host on a miss.
    ///
    /// A resolved miss is stored (and marks the cache dirty). `None` means
    /// the host does not know the item either.
    pub fn get<L>(&mut self, item_id: u32, lookup: &L) -> Option<&ItemCacheEntry>
    where
        L: ItemLookup + ?Sized,
    {
        match self.entries.entry(item_id) {
            Entry::Occupied(entry) => Some(entry.into_mut()),
            Entry::Vacant(slot) => {
                let resolved = lookup.lookup_item(item_id)?;
                tracing::debug!(item_id, name = %resolved.name, "item cache miss resolved");
                self.dirty = true;
                Some(slot.insert(resolved))
            }
        }
    }

    /// Cached entry without falling back to the host.
    pub fn peek(&self, item_id: u32) -> Option<&ItemCacheEntry> {
        self.entries.get(&item_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether entries were added since the last load or save.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Persist the full cache, replacing the previous snapshot.
    pub fn save(&mut self) -> Result<(), ItemCacheError> {
        let document = CacheDocument {
            version: CACHE_VERSION,
            items: self
                .entries
                .iter()
                .map(|(id, entry)| (*id, entry.clone()))
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&document)?;
        self.storage.save(ITEM_CACHE_KEY, &json)?;
        self.dirty = false;
        Ok(())
    }

    /// Persist only if something changed. Returns whether a save happened.
    pub fn save_if_dirty(&mut self) -> Result<bool, ItemCacheError> {
        if !self.dirty {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }
}
