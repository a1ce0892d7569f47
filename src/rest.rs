//! Request and response objects handed to extension hooks.
//!
//! [`RestRequest`] exposes the decoded JSON parameters of an API call (most
//! importantly the `meta` sub-mapping). [`RestResponse`] is the in-progress
//! representation of an item; filters mutate its `data` before it is sent.

use serde_json::{Map, Value};

use crate::auth::Principal;

/// An incoming REST API request as seen by hooks.
#[derive(Debug, Clone)]
pub struct RestRequest {
    params: Value,
    principal: Principal,
}

impl RestRequest {
    /// Wrap decoded request parameters. Non-object bodies are treated as empty.
    pub fn new(params: Value, principal: Principal) -> Self {
        let params = if params.is_object() {
            params
        } else {
            Value::Object(Map::new())
        };
        Self { params, principal }
    }

    /// A request with no parameters, e.g. a plain GET.
    pub fn empty(principal: Principal) -> Self {
        Self::new(Value::Object(Map::new()), principal)
    }

    pub fn params(&self) -> &Value {
        &self.params
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Top-level parameter, with JSON `null` treated as not set.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key).filter(|v| !v.is_null())
    }

    /// The `meta` sub-mapping, if the request carries one.
    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.params.get("meta").and_then(Value::as_object)
    }

    /// A value under `meta`, with JSON `null` treated as not set.
    pub fn meta_value(&self, key: &str) -> Option<&Value> {
        self.meta()
            .and_then(|meta| meta.get(key))
            .filter(|v| !v.is_null())
    }
}

/// The REST representation of an item, under construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RestResponse {
    pub status: u16,
    pub data: Value,
}

impl RestResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// The `data.meta` mapping, created (or replaced, if it is not an object)
    /// on first access.
    pub fn meta_mut(&mut self) -> &mut Map<String, Value> {
        let data = object_mut(&mut self.data);
        object_mut(data.entry("meta").or_insert(Value::Null))
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.data.get("meta").and_then(Value::as_object)
    }
}

/// Turn `value` into an empty object unless it already is one.
fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => {
            *other = Value::Object(Map::new());
            object_mut(other)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_meta_lookup_skips_null() {
        let req = RestRequest::new(
            json!({"meta": {"video_url": "abc", "length": null}}),
            Principal::anonymous(),
        );
        assert_eq!(req.meta_value("video_url"), Some(&json!("abc")));
        assert_eq!(req.meta_value("length"), None);
        assert_eq!(req.meta_value("text_tracks"), None);
    }

    #[test]
    fn request_without_meta() {
        let req = RestRequest::new(json!({"title": "x"}), Principal::anonymous());
        assert!(req.meta().is_none());
        assert_eq!(req.param("title"), Some(&json!("x")));
    }

    #[test]
    fn non_object_params_become_empty() {
        let req = RestRequest::new(json!([1, 2]), Principal::anonymous());
        assert_eq!(req.params(), &json!({}));
    }

    #[test]
    fn meta_mut_creates_section() {
        let mut resp = RestResponse::new(200, json!({"id": 1}));
        assert!(resp.meta().is_none());
        resp.meta_mut().insert("k".into(), json!("v"));
        assert_eq!(resp.data, json!({"id": 1, "meta": {"k": "v"}}));
    }

    #[test]
    fn meta_mut_replaces_non_object_meta() {
        let mut resp = RestResponse::new(200, json!({"meta": []}));
        assert!(resp.meta_mut().is_empty());
        assert_eq!(resp.data, json!({"meta": {}}));
    }

    #[test]
    fn meta_mut_keeps_existing_entries() {
        let mut resp = RestResponse::new(200, json!({"meta": {"other": 1}}));
        resp.meta_mut().insert("k".into(), json!("v"));
        assert_eq!(resp.meta().unwrap().len(), 2);
    }

    #[test]
    fn meta_mut_replaces_non_object_data() {
        let mut resp = RestResponse::new(200, json!("oops"));
        resp.meta_mut().insert("k".into(), json!("v"));
        assert_eq!(resp.data, json!({"meta": {"k": "v"}}));
    }
}
