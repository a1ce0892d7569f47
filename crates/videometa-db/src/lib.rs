//! Videometa-DB: Database schema, migrations, and query operations
//!
//! SQLite storage for content items and their key-value metadata, using
//! rusqlite with r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Item and item-meta query operations
//!
//! # Example
//!
//! ```
//! use videometa_common::ItemType;
//! use videometa_db::models::NewItem;
//! use videometa_db::pool::{get_conn, init_memory_pool};
//! use videometa_db::queries::{items, meta};
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let item = items::create_item(&conn, &NewItem::new(ItemType::Video, "Intro")).unwrap();
//! meta::update_meta(&conn, item.id, "length", &serde_json::json!("120")).unwrap();
//! assert_eq!(meta::get_meta(&conn, item.id, "length").unwrap(), Some(serde_json::json!("120")));
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
