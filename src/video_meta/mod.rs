//! Video metadata extension.
//!
//! Adds three pieces of metadata to `video` items and keeps them in sync with
//! the REST API:
//!
//! - `video_url`: media URL or identifier, stored as sanitized plain text.
//! - `length`: stored under `length` and mirrored to the legacy keys
//!   `_length` and `video_length`. Reads fall back through the three keys in
//!   that order.
//! - `text_tracks`: subtitle track object, stored verbatim.
//!
//! [`register`] wires [`InboundSync`] and [`OutboundSync`] into a
//! [`HookRegistry`]; [`field_descriptors`] returns the fields the host should
//! expose. Both are called once by the composition root.

mod sync;

pub use sync::{resolve_length, InboundSync, OutboundSync};

use std::sync::Arc;

use videometa_common::ItemType;

use crate::auth::CAN_EDIT_CONTENT;
use crate::fields::{FieldDescriptor, MetaType, Sanitizer};
use crate::hooks::{HookRegistry, DEFAULT_PRIORITY};
use crate::store::MetaStore;

pub const VIDEO_URL: &str = "video_url";
pub const LENGTH: &str = "length";
pub const LEGACY_LENGTH: &str = "_length";
pub const VIDEO_LENGTH: &str = "video_length";
pub const TEXT_TRACKS: &str = "text_tracks";

/// Length keys in read-fallback order. Every write goes to all of them.
pub const LENGTH_MIRRORS: [&str; 3] = [LENGTH, LEGACY_LENGTH, VIDEO_LENGTH];

/// Arguments the insert hook consumes: item, request.
pub const INBOUND_ACCEPTED_ARGS: usize = 2;
/// Arguments the prepare filter consumes: response, item, request.
pub const OUTBOUND_ACCEPTED_ARGS: usize = 3;

/// Field declarations for the `video` subtype.
pub fn field_descriptors() -> Vec<FieldDescriptor> {
    let text_tracks =
        FieldDescriptor::post_meta(TEXT_TRACKS, ItemType::Video, MetaType::Object, CAN_EDIT_CONTENT)
            .with_sanitizer(Sanitizer::Unslash)
            .with_description("Text tracks for subtitles");

    std::iter::once(VIDEO_URL)
        .chain(LENGTH_MIRRORS)
        .map(|key| {
            FieldDescriptor::post_meta(key, ItemType::Video, MetaType::String, CAN_EDIT_CONTENT)
        })
        .chain(std::iter::once(text_tracks))
        .collect()
}

/// Attach both sync callbacks to the `video` extension points.
pub fn register(hooks: &mut HookRegistry, store: Arc<dyn MetaStore>) {
    hooks.add_insert_hook(
        ItemType::Video,
        DEFAULT_PRIORITY,
        INBOUND_ACCEPTED_ARGS,
        Arc::new(InboundSync::new(store.clone())),
    );
    hooks.add_prepare_filter(
        ItemType::Video,
        DEFAULT_PRIORITY,
        OUTBOUND_ACCEPTED_ARGS,
        Arc::new(OutboundSync::new(store)),
    );
    tracing::info!("Video metadata sync registered");
}
