//! Item metadata storage seam.
//!
//! The extension only ever talks to a [`MetaStore`]. The server wires in
//! [`DbMetaStore`] (SQLite through the connection pool); tests and embedders
//! can use [`MemoryMetaStore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use serde_json::Value;
use videometa_common::{ItemId, Result};
use videometa_db::pool::{get_conn, DbPool};
use videometa_db::queries::meta;

/// Single-valued key-value metadata keyed by (item, key).
///
/// Implementations arbitrate their own concurrency; callers get no
/// transactional grouping across calls.
pub trait MetaStore: Send + Sync {
    /// The stored value, or `None` if the key was never written.
    fn get_meta(&self, item: ItemId, key: &str) -> Result<Option<Value>>;

    /// Write a value, replacing any existing one.
    fn update_meta(&self, item: ItemId, key: &str, value: Value) -> Result<()>;

    /// Remove a key. Returns `true` if it existed.
    fn delete_meta(&self, item: ItemId, key: &str) -> Result<bool>;
}

/// [`MetaStore`] backed by the SQLite `item_meta` table.
#[derive(Clone)]
pub struct DbMetaStore {
    pool: DbPool,
}

impl DbMetaStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl MetaStore for DbMetaStore {
    fn get_meta(&self, item: ItemId, key: &str) -> Result<Option<Value>> {
        let conn = get_conn(&self.pool)?;
        meta::get_meta(&conn, item, key)
    }

    fn update_meta(&self, item: ItemId, key: &str, value: Value) -> Result<()> {
        let conn = get_conn(&self.pool)?;
        meta::update_meta(&conn, item, key, &value)
    }

    fn delete_meta(&self, item: ItemId, key: &str) -> Result<bool> {
        let conn = get_conn(&self.pool)?;
        meta::delete_meta(&conn, item, key)
    }
}

/// In-process [`MetaStore`] that also counts reads and writes.
#[derive(Default)]
pub struct MemoryMetaStore {
    entries: RwLock<HashMap<(ItemId, String), Value>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `get_meta` calls so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Number of `update_meta`/`delete_meta` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// Snapshot of one item's entries, without touching the counters.
    pub fn entries_for(&self, item: ItemId) -> HashMap<String, Value> {
        self.entries
            .read()
            .iter()
            .filter(|((id, _), _)| *id == item)
            .map(|((_, key), value)| (key.clone(), value.clone()))
            .collect()
    }
}

impl MetaStore for MemoryMetaStore {
    fn get_meta(&self, item: ItemId, key: &str) -> Result<Option<Value>> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.read().get(&(item, key.to_string())).cloned())
    }

    fn update_meta(&self, item: ItemId, key: &str, value: Value) -> Result<()> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.entries.write().insert((item, key.to_string()), value);
        Ok(())
    }

    fn delete_meta(&self, item: ItemId, key: &str) -> Result<bool> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(self.entries.write().remove(&(item, key.to_string())).is_some())
    }
}
