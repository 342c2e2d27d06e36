//! Per-device connection cache.
//!
//! The device only reports connection names on read-back, so the cache is
//! the single record of the descriptors needed to answer reads and
//! deletions. A connection is present iff its device objects were created
//! and have not yet been torn down.
//!
//! Callers lock a device's cache for the whole check/write/update sequence;
//! see [`ConnectionCacheManager::cache_for`].

use crate::connection::Connection;
use dashmap::DashMap;
use roadm_types::DeviceId;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Live connections of one device, keyed by connection name.
#[derive(Debug, Default)]
pub struct ConnectionCache {
    connections: BTreeMap<String, Connection>,
}

impl ConnectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Connection> {
        self.connections.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Connection> {
        self.connections.get_mut(name)
    }

    /// Inserts `connection`, replacing an entry with the same name.
    pub fn add(&mut self, connection: Connection) -> Option<Connection> {
        self.connections.insert(connection.name.clone(), connection)
    }

    pub fn remove(&mut self, name: &str) -> Option<Connection> {
        self.connections.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.connections.contains_key(name)
    }

    pub fn size(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn names(&self) -> Vec<String> {
        self.connections.keys().cloned().collect()
    }

    /// Logs the cache contents at debug level.
    pub fn dump(&self, device: &DeviceId) {
        debug!(device = %device, size = self.size(), "connection cache");
        for conn in self.connections.values() {
            debug!(device = %device, connection = %conn.name, link_type = %conn.link_type);
        }
    }
}

/// Owns one [`ConnectionCache`] per device.
///
/// Caches are created lazily on first use and live until the manager is
/// dropped or the device is [`forget`](Self::forget)-ed. Nothing is persisted.
#[derive(Default)]
pub struct ConnectionCacheManager {
    caches: DashMap<DeviceId, Arc<Mutex<ConnectionCache>>>,
}

impl ConnectionCacheManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cache of `device`, creating an empty one if needed.
    pub fn cache_for(&self, device: &DeviceId) -> Arc<Mutex<ConnectionCache>> {
        let entry = self
            .caches
            .entry(device.clone())
            .or_insert_with(|| Arc::new(Mutex::new(ConnectionCache::new())));
        Arc::clone(entry.value())
    }

    /// Returns the cache of `device` without creating it.
    pub fn get(&self, device: &DeviceId) -> Option<Arc<Mutex<ConnectionCache>>> {
        self.caches.get(device).map(|c| Arc::clone(c.value()))
    }

    /// Drops the cache of `device`.
    pub fn forget(&self, device: &DeviceId) -> bool {
        self.caches.remove(device).is_some()
    }

    pub fn device_count(&self) -> usize {
        self.caches.len()
    }

    /// Number of cached connections for `device` (0 when unknown).
    pub fn size(&self, device: &DeviceId) -> usize {
        self.get(device)
            .map(|c| lock_cache(&c).size())
            .unwrap_or(0)
    }
}

impl fmt::Debug for ConnectionCacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionCacheManager")
            .field("devices", &self.caches.len())
            .finish()
    }
}

/// Locks a cache, recovering the data if a previous holder panicked.
pub fn lock_cache(cache: &Mutex<ConnectionCache>) -> MutexGuard<'_, ConnectionCache> {
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
