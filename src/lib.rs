//! Videometa - video metadata for a content REST API
//!
//! The library exposes the host pieces (items, registered meta fields,
//! extension hooks, authentication, REST server) and the video metadata
//! extension that plugs into them.

use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod fields;
pub mod hooks;
pub mod maintenance;
pub mod rest;
pub mod sanitize;
pub mod server;
pub mod store;
pub mod video_meta;

use fields::FieldRegistry;
use hooks::HookRegistry;
use store::MetaStore;

/// Registries populated by every built-in extension.
pub struct Extensions {
    pub hooks: HookRegistry,
    pub fields: FieldRegistry,
}

/// Run the registration phase once: declare fields and attach hooks.
pub fn init_extensions(store: Arc<dyn MetaStore>) -> Extensions {
    let mut hooks = HookRegistry::new();
    let mut fields = FieldRegistry::new();

    fields.register_all(video_meta::field_descriptors());
    video_meta::register(&mut hooks, store);

    Extensions { hooks, fields }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::ObjectKind;
    use videometa_common::ItemType;

    #[test]
    fn registers_video_extension() {
        let ext = init_extensions(Arc::new(store::MemoryMetaStore::new()));
        assert_eq!(ext.fields.fields_for(ObjectKind::Post, ItemType::Video).count(), 5);
        assert_eq!(ext.hooks.registrations().len(), 2);
    }
}
