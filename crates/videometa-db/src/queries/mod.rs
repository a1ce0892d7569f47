//! Database query modules.
//!
//! - items: Content item CRUD, listing and title search
//! - meta: Per-item key-value metadata (single value per key)

pub mod items;
pub mod meta;
