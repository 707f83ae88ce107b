//! # gt-items
//!
//! Item identity cache for Goal Tracker.
//!
//! Looking an item up in the host's item database is comparatively
//! expensive, so [`ItemCache`] remembers the name and icon of every item it
//! has resolved and persists that map through a
//! [`Storage`](gt_storage::Storage). Entries are never evicted: the item
//! database is finite, so the cache is bounded by it.

pub mod cache;
pub mod error;

pub use cache::{ItemCache, ItemCacheEntry, ItemLookup, ITEM_CACHE_KEY};
pub use error::ItemCacheError;
