//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use videometa_common::{ItemId, ItemStatus, ItemType};

/// Content item model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: ItemId,
    pub item_type: ItemType,
    pub title: String,
    pub content: String,
    pub status: ItemStatus,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// Fields for inserting a new item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub item_type: ItemType,
    pub title: String,
    pub content: String,
    pub status: ItemStatus,
}

impl NewItem {
    /// A draft item with the given title and empty content.
    pub fn new(item_type: ItemType, title: impl Into<String>) -> Self {
        Self {
            item_type,
            title: title.into(),
            content: String::new(),
            status: ItemStatus::Draft,
        }
    }
}

/// Partial update of an item's core fields; `None` leaves the column as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<ItemStatus>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.status.is_none()
    }
}
