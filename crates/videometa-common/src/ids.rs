//! Typed ID wrapper for host items.
//!
//! The host platform identifies content items with positive integers, so the
//! wrapper is a thin newtype over `i64` rather than a UUID.

use serde::{Deserialize, Serialize};

/// Unique identifier for a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Wrap a raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for ItemId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<ItemId> for i64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ItemId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>().map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display_and_parse() {
        let id = ItemId::new(10);
        assert_eq!(id.to_string(), "10");
        assert_eq!("10".parse::<ItemId>().unwrap(), id);
        assert!("abc".parse::<ItemId>().is_err());
    }

    #[test]
    fn test_item_id_serialization() {
        let id = ItemId::new(42);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "42");

        let back: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_item_id_conversions() {
        let id: ItemId = 7.into();
        let raw: i64 = id.into();
        assert_eq!(raw, 7);
        assert_eq!(id.get(), 7);
    }
}
