//! Last-known device state, keyed per module.
//!
//! The map is sharded (`DashMap`) and every key owns its own mutex. A
//! caller clones the key's `Arc` out of the map, releasing the shard, and
//! then holds only that key's lock for its whole read-modify-write. Work on
//! different keys never contends on a shared lock.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use serde::Serialize;

/// What a stored entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateKind {
    Rfid,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateKey {
    pub device_id: String,
    pub module_address: u8,
    pub kind: StateKind,
}

impl StateKey {
    pub fn rfid(device_id: impl Into<String>, module_address: u8) -> Self {
        Self {
            device_id: device_id.into(),
            module_address,
            kind: StateKind::Rfid,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagState {
    pub tag_id: String,
    pub alarm: u8,
}

/// Tags present on a module, by position.
pub type TagSnapshot = BTreeMap<u8, TagState>;

#[derive(Debug, Default)]
pub struct DeviceStateStore {
    entries: DashMap<StateKey, Arc<Mutex<TagSnapshot>>>,
}

impl DeviceStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the key's snapshot while holding the key's lock.
    ///
    /// Absent keys start from an empty snapshot and are kept afterwards.
    pub fn with_entry<R>(&self, key: &StateKey, f: impl FnOnce(&mut TagSnapshot) -> R) -> R {
        let entry = self.entry(key);
        let mut snapshot = entry.lock();
        f(&mut snapshot)
    }

    /// Copy of the stored snapshot, if the key has been seen.
    pub fn snapshot(&self, key: &StateKey) -> Option<TagSnapshot> {
        let entry = self.entries.get(key).map(|e| Arc::clone(e.value()))?;
        let snapshot = entry.lock().clone();
        Some(snapshot)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry(&self, key: &StateKey) -> Arc<Mutex<TagSnapshot>> {
        if let Some(existing) = self.entries.get(key) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.entries.entry(key.clone()).or_default().value())
    }
}
