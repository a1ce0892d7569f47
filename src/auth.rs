//! Principals, capabilities and the content-editing predicate.
//!
//! Registered meta fields carry an [`Authorizer`]; the host evaluates it
//! against the request's [`Principal`] every time the field is read or
//! written. Nothing is cached between requests.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A permission a principal may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Read,
    EditPosts,
    PublishPosts,
    DeletePosts,
    ManageOptions,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Self::Read,
        Self::EditPosts,
        Self::PublishPosts,
        Self::DeletePosts,
        Self::ManageOptions,
    ];
}

/// The acting identity of a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    user: Option<String>,
    capabilities: BTreeSet<Capability>,
}

impl Principal {
    /// Unauthenticated caller with no capabilities.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(
        name: impl Into<String>,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            user: Some(name.into()),
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// A user holding every capability.
    pub fn administrator(name: impl Into<String>) -> Self {
        Self::user(name, Capability::ALL)
    }

    pub fn name(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

/// Whether the principal may edit content items.
pub fn can_edit_content(principal: &Principal) -> bool {
    principal.has(Capability::EditPosts)
}

/// A named authorization predicate attached to a registered field.
#[derive(Clone, Copy)]
pub struct Authorizer {
    name: &'static str,
    check: fn(&Principal) -> bool,
}

impl Authorizer {
    pub const fn new(name: &'static str, check: fn(&Principal) -> bool) -> Self {
        Self { name, check }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn allows(&self, principal: &Principal) -> bool {
        (self.check)(principal)
    }
}

/// [`can_edit_content`] as an [`Authorizer`].
pub const CAN_EDIT_CONTENT: Authorizer = Authorizer::new("can_edit_content", can_edit_content);

impl fmt::Debug for Authorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Authorizer").field(&self.name).finish()
    }
}

impl Serialize for Authorizer {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}
