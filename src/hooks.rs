//! Extension points of the item REST lifecycle.
//!
//! Two kinds of callbacks can be registered per item type:
//!
//! - [`InsertHook`]: runs after an item was created or updated through the
//!   API, before the response is built. Receives the item and the request.
//! - [`PrepareFilter`]: runs while the REST representation of an item is
//!   built. Receives the response, the item and the request, and returns the
//!   (possibly modified) response.
//!
//! Callbacks run in ascending priority; equal priorities keep registration
//! order. Errors propagate to the caller unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use videometa_common::{ItemType, Result};
use videometa_db::models::Item;

use crate::rest::{RestRequest, RestResponse};

/// Default priority used by the host platform.
pub const DEFAULT_PRIORITY: i32 = 10;

/// Callback fired after an item is inserted or updated via the API.
pub trait InsertHook: Send + Sync {
    fn name(&self) -> &'static str;

    fn on_insert(&self, item: &Item, request: &RestRequest) -> Result<()>;
}

/// Callback that shapes an item's REST representation.
pub trait PrepareFilter: Send + Sync {
    fn name(&self) -> &'static str;

    fn prepare(
        &self,
        response: RestResponse,
        item: &Item,
        request: &RestRequest,
    ) -> Result<RestResponse>;
}

/// Which extension point a registration targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookPoint {
    Insert,
    Prepare,
}

/// Introspection record of one registered callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookRegistration {
    pub point: HookPoint,
    pub item_type: ItemType,
    pub name: &'static str,
    pub priority: i32,
    pub accepted_args: usize,
}

struct Entry<T: ?Sized> {
    priority: i32,
    accepted_args: usize,
    callback: Arc<T>,
}

/// Registry of insert hooks and prepare filters, keyed by item type.
#[derive(Default)]
pub struct HookRegistry {
    insert: HashMap<ItemType, Vec<Entry<dyn InsertHook>>>,
    prepare: HashMap<ItemType, Vec<Entry<dyn PrepareFilter>>>,
}

fn insert_sorted<T: ?Sized>(entries: &mut Vec<Entry<T>>, entry: Entry<T>) {
    // After every existing entry with priority <= the new one.
    let pos = entries.partition_point(|e| e.priority <= entry.priority);
    entries.insert(pos, entry);
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for the insert/update extension point of `item_type`.
    pub fn add_insert_hook(
        &mut self,
        item_type: ItemType,
        priority: i32,
        accepted_args: usize,
        hook: Arc<dyn InsertHook>,
    ) {
        tracing::debug!(
            hook = hook.name(),
            %item_type,
            priority,
            accepted_args,
            "Registered insert hook"
        );
        insert_sorted(
            self.insert.entry(item_type).or_default(),
            Entry {
                priority,
                accepted_args,
                callback: hook,
            },
        );
    }

    /// Register a filter for the REST-representation extension point of
    /// `item_type`.
    pub fn add_prepare_filter(
        &mut self,
        item_type: ItemType,
        priority: i32,
        accepted_args: usize,
        filter: Arc<dyn PrepareFilter>,
    ) {
        tracing::debug!(
            filter = filter.name(),
            %item_type,
            priority,
            accepted_args,
            "Registered prepare filter"
        );
        insert_sorted(
            self.prepare.entry(item_type).or_default(),
            Entry {
                priority,
                accepted_args,
                callback: filter,
            },
        );
    }

    /// Fire all insert hooks registered for the item's type.
    pub fn run_insert(&self, item: &Item, request: &RestRequest) -> Result<()> {
        let Some(hooks) = self.insert.get(&item.item_type) else {
            return Ok(());
        };
        for entry in hooks {
            tracing::trace!(
                hook = entry.callback.name(),
                item_id = %item.id,
                "Running insert hook"
            );
            entry.callback.on_insert(item, request)?;
        }
        Ok(())
    }

    /// Pass the response through every prepare filter of the item's type.
    pub fn apply_prepare(
        &self,
        mut response: RestResponse,
        item: &Item,
        request: &RestRequest,
    ) -> Result<RestResponse> {
        let Some(filters) = self.prepare.get(&item.item_type) else {
            return Ok(response);
        };
        for entry in filters {
            tracing::trace!(
                filter = entry.callback.name(),
                item_id = %item.id,
                "Applying prepare filter"
            );
            response = entry.callback.prepare(response, item, request)?;
        }
        Ok(response)
    }

    /// Every registration, insert hooks first, each group in dispatch order.
    pub fn registrations(&self) -> Vec<HookRegistration> {
        let mut out = Vec::new();
        for item_type in ItemType::ALL {
            if let Some(entries) = self.insert.get(&item_type) {
                out.extend(entries.iter().map(|e| HookRegistration {
                    point: HookPoint::Insert,
                    item_type,
                    name: e.callback.name(),
                    priority: e.priority,
                    accepted_args: e.accepted_args,
                }));
            }
        }
        for item_type in ItemType::ALL {
            if let Some(entries) = self.prepare.get(&item_type) {
                out.extend(entries.iter().map(|e| HookRegistration {
                    point: HookPoint::Prepare,
                    item_type,
                    name: e.callback.name(),
                    priority: e.priority,
                    accepted_args: e.accepted_args,
                }));
            }
        }
        out
    }
}
