//! Registered meta fields and the host's default REST meta handling.
//!
//! A [`FieldDescriptor`] declares that a meta key exists for an object kind
//! and subtype, whether it appears in REST representations, its value type,
//! an optional input normalization and the [`Authorizer`] gating it.
//! [`FieldRegistry`] collects descriptors and applies them to requests:
//! writes are authorized and type-checked before anything is stored, and
//! reads project the registered keys into `data.meta`.

use serde::Serialize;
use serde_json::{Map, Value};
use videometa_common::{Error, ItemId, ItemType, Result};

use crate::auth::{Authorizer, Principal};
use crate::rest::RestRequest;
use crate::sanitize;
use crate::store::MetaStore;

/// Kind of object a meta field attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Post,
}

/// Declared value type of a meta field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MetaType {
    String,
    Object,
}

impl MetaType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Object => "object",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Object => value.is_object(),
        }
    }

    /// What a never-written field reads as.
    fn empty_value(self) -> Value {
        match self {
            Self::String => Value::String(String::new()),
            Self::Object => Value::Null,
        }
    }
}

/// Normalization applied to incoming values before storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sanitizer {
    /// Undo the host's default input escaping.
    Unslash,
}

impl Sanitizer {
    pub fn apply(self, value: Value) -> Value {
        match self {
            Self::Unslash => sanitize::unslash(value),
        }
    }
}

/// Declarative description of one registered meta field.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDescriptor {
    pub object_kind: ObjectKind,
    pub key: &'static str,
    pub object_subtype: ItemType,
    pub show_in_rest: bool,
    pub single: bool,
    #[serde(rename = "type")]
    pub meta_type: MetaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<Sanitizer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    pub auth: Authorizer,
}

impl FieldDescriptor {
    /// A REST-visible, single-valued post field.
    pub fn post_meta(
        key: &'static str,
        object_subtype: ItemType,
        meta_type: MetaType,
        auth: Authorizer,
    ) -> Self {
        Self {
            object_kind: ObjectKind::Post,
            key,
            object_subtype,
            show_in_rest: true,
            single: true,
            meta_type,
            sanitize: None,
            description: None,
            auth,
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitize = Some(sanitizer);
        self
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }
}

/// Registry of meta fields, in registration order.
#[derive(Debug, Default)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field. Registering the same (kind, subtype, key) again
    /// replaces the earlier descriptor in place.
    pub fn register(&mut self, descriptor: FieldDescriptor) {
        let existing = self.fields.iter_mut().find(|f| {
            f.object_kind == descriptor.object_kind
                && f.object_subtype == descriptor.object_subtype
                && f.key == descriptor.key
        });

        if let Some(existing) = existing {
            tracing::debug!(key = descriptor.key, "Replacing registered meta field");
            *existing = descriptor;
        } else {
            tracing::debug!(
                key = descriptor.key,
                subtype = %descriptor.object_subtype,
                "Registered meta field"
            );
            self.fields.push(descriptor);
        }
    }

    pub fn register_all(&mut self, descriptors: impl IntoIterator<Item = FieldDescriptor>) {
        for descriptor in descriptors {
            self.register(descriptor);
        }
    }

    /// Fields of one object kind and subtype, in registration order.
    pub fn fields_for(
        &self,
        kind: ObjectKind,
        subtype: ItemType,
    ) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields
            .iter()
            .filter(move |f| f.object_kind == kind && f.object_subtype == subtype)
    }

    pub fn get(&self, kind: ObjectKind, subtype: ItemType, key: &str) -> Option<&FieldDescriptor> {
        self.fields_for(kind, subtype).find(|f| f.key == key)
    }

    /// Every registered descriptor.
    pub fn all(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Registered fields present in the request's `meta`, after checking
    /// the principal against each field's predicate and the value against
    /// its declared type.
    fn checked_request_meta<'a>(
        &'a self,
        subtype: ItemType,
        request: &'a RestRequest,
    ) -> Result<Vec<(&'a FieldDescriptor, &'a Value)>> {
        let Some(meta) = request.meta() else {
            return Ok(Vec::new());
        };

        let mut present = Vec::new();
        for field in self.fields_for(ObjectKind::Post, subtype) {
            if !field.show_in_rest {
                continue;
            }
            let Some(value) = meta.get(field.key) else {
                continue;
            };

            if !field.auth.allows(request.principal()) {
                return Err(Error::forbidden(format!(
                    "Sorry, you are not allowed to edit the {} custom field.",
                    field.key
                )));
            }

            if !value.is_null() && !field.meta_type.accepts(value) {
                return Err(Error::invalid_input(format!(
                    "meta.{} is not of type {}.",
                    field.key,
                    field.meta_type.as_str()
                )));
            }

            present.push((field, value));
        }
        Ok(present)
    }

    /// Check the request's `meta` without writing anything.
    pub fn validate_request_meta(&self, subtype: ItemType, request: &RestRequest) -> Result<()> {
        self.checked_request_meta(subtype, request).map(|_| ())
    }

    /// Write the registered, REST-visible fields present in the request's
    /// `meta` for a post of the given subtype.
    ///
    /// Every present field is authorized and type-checked first; nothing is
    /// written unless all of them pass. A `null` value deletes the key.
    /// Keys that are not registered are ignored.
    pub fn apply_request_meta(
        &self,
        store: &dyn MetaStore,
        item_id: ItemId,
        subtype: ItemType,
        request: &RestRequest,
    ) -> Result<()> {
        for (field, value) in self.checked_request_meta(subtype, request)? {
            if value.is_null() {
                store.delete_meta(item_id, field.key)?;
                continue;
            }
            let value = match field.sanitize {
                Some(sanitizer) => sanitizer.apply(value.clone()),
                None => value.clone(),
            };
            store.update_meta(item_id, field.key, value)?;
        }

        Ok(())
    }

    /// Build the `meta` mapping of a REST representation from the registered
    /// fields the principal is allowed to see.
    pub fn project_meta(
        &self,
        store: &dyn MetaStore,
        item_id: ItemId,
        subtype: ItemType,
        principal: &Principal,
    ) -> Result<Map<String, Value>> {
        let mut meta = Map::new();
        for field in self.fields_for(ObjectKind::Post, subtype) {
            if !field.show_in_rest || !field.auth.allows(principal) {
                continue;
            }
            let value = store
                .get_meta(item_id, field.key)?
                .unwrap_or_else(|| field.meta_type.empty_value());
            meta.insert(field.key.to_string(), value);
        }
        Ok(meta)
    }
}
