use std::sync::Arc;

use serde_json::Value;
use videometa_common::{ItemId, Result};
use videometa_db::models::Item;

use super::{LENGTH, LENGTH_MIRRORS, TEXT_TRACKS, VIDEO_URL};
use crate::hooks::{InsertHook, PrepareFilter};
use crate::rest::{RestRequest, RestResponse};
use crate::sanitize::sanitize_text_value;
use crate::store::MetaStore;

fn empty() -> Value {
    Value::String(String::new())
}

/// Values the host platform treats as unset: null, `false`, zero, `""`,
/// `"0"` and empty collections.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// First non-empty length among the mirrors, in fallback order. Empty string
/// if none is set.
pub fn resolve_length(store: &dyn MetaStore, item: ItemId) -> Result<Value> {
    for key in LENGTH_MIRRORS {
        if let Some(value) = store.get_meta(item, key)? {
            if !is_empty(&value) {
                return Ok(value);
            }
        }
    }
    Ok(empty())
}

/// Writes `meta` values from an API request into the item's metadata.
pub struct InboundSync {
    store: Arc<dyn MetaStore>,
}

impl InboundSync {
    pub fn new(store: Arc<dyn MetaStore>) -> Self {
        Self { store }
    }
}

impl InsertHook for InboundSync {
    fn name(&self) -> &'static str {
        "video_meta_inbound"
    }

    fn on_insert(&self, item: &Item, request: &RestRequest) -> Result<()> {
        if !item.item_type.is_video() {
            return Ok(());
        }

        if let Some(url) = request.meta_value(VIDEO_URL) {
            let url = sanitize_text_value(url);
            self.store.update_meta(item.id, VIDEO_URL, Value::String(url))?;
        }

        if let Some(length) = request.meta_value(LENGTH) {
            let length = sanitize_text_value(length);
            for key in LENGTH_MIRRORS {
                self.store
                    .update_meta(item.id, key, Value::String(length.clone()))?;
            }
        }

        if let Some(tracks) = request.meta_value(TEXT_TRACKS) {
            self.store.update_meta(item.id, TEXT_TRACKS, tracks.clone())?;
        }

        tracing::debug!(item_id = %item.id, "Synced video metadata from request");
        Ok(())
    }
}

/// Injects stored video metadata into an item's REST representation.
pub struct OutboundSync {
    store: Arc<dyn MetaStore>,
}

impl OutboundSync {
    pub fn new(store: Arc<dyn MetaStore>) -> Self {
        Self { store }
    }
}

impl PrepareFilter for OutboundSync {
    fn name(&self) -> &'static str {
        "video_meta_outbound"
    }

    fn prepare(
        &self,
        mut response: RestResponse,
        item: &Item,
        _request: &RestRequest,
    ) -> Result<RestResponse> {
        if !item.item_type.is_video() {
            return Ok(response);
        }

        let store = self.store.as_ref();
        let video_url = store.get_meta(item.id, VIDEO_URL)?.unwrap_or_else(empty);
        let length = resolve_length(store, item.id)?;
        let text_tracks = store.get_meta(item.id, TEXT_TRACKS)?.unwrap_or_else(empty);

        let meta = response.meta_mut();
        meta.insert(VIDEO_URL.to_string(), video_url);
        meta.insert(LENGTH.to_string(), length);
        meta.insert(TEXT_TRACKS.to_string(), text_tracks);

        Ok(response)
    }
}
