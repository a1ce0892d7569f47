//! Item metadata queries.
//!
//! Metadata is single-valued: each (item, key) pair holds at most one JSON
//! value and writes replace it (last write wins).

use rusqlite::{Connection, OptionalExtension};
use videometa_common::{Error, ItemId, Result};

fn decode_value(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).map_err(|e| Error::database(format!("Corrupt meta value: {e}")))
}

/// Read a single meta value. `None` when the key was never written.
pub fn get_meta(
    conn: &Connection,
    item_id: ItemId,
    key: &str,
) -> Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT meta_value FROM item_meta WHERE item_id = ? AND meta_key = ?",
            rusqlite::params![item_id.get(), key],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| Error::database(e.to_string()))?;

    raw.as_deref().map(decode_value).transpose()
}

/// Write a meta value, replacing any existing one.
pub fn update_meta(
    conn: &Connection,
    item_id: ItemId,
    key: &str,
    value: &serde_json::Value,
) -> Result<()> {
    let encoded = serde_json::to_string(value)?;
    conn.execute(
        "INSERT INTO item_meta (item_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
         ON CONFLICT(item_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value",
        rusqlite::params![item_id.get(), key, encoded],
    )
    .map_err(|e| Error::database(e.to_string()))?;
    Ok(())
}

/// Remove a meta key. Returns `true` if it existed.
pub fn delete_meta(conn: &Connection, item_id: ItemId, key: &str) -> Result<bool> {
    let deleted = conn
        .execute(
            "DELETE FROM item_meta WHERE item_id = ? AND meta_key = ?",
            rusqlite::params![item_id.get(), key],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewItem;
    use crate::pool::{get_conn, init_memory_pool};
    use crate::queries::items;
    use serde_json::json;
    use videometa_common::ItemType;

    #[test]
    fn test_get_unset_meta() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let item = items::create_item(&conn, &NewItem::new(ItemType::Video, "v")).unwrap();

        assert_eq!(get_meta(&conn, item.id, "video_url").unwrap(), None);
    }

    #[test]
    fn test_update_meta_overwrites() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let item = items::create_item(&conn, &NewItem::new(ItemType::Video, "v")).unwrap();

        update_meta(&conn, item.id, "length", &json!("60")).unwrap();
        update_meta(&conn, item.id, "length", &json!("90")).unwrap();

        assert_eq!(get_meta(&conn, item.id, "length").unwrap(), Some(json!("90")));
    }

    #[test]
    fn test_structured_values_preserved() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let item = items::create_item(&conn, &NewItem::new(ItemType::Video, "v")).unwrap();

        let tracks = json!({"languages": ["en"], "sources": ["https://x/a-en.vtt"], "action": ""});
        update_meta(&conn, item.id, "text_tracks", &tracks).unwrap();

        assert_eq!(get_meta(&conn, item.id, "text_tracks").unwrap(), Some(tracks));
    }

    #[test]
    fn test_delete_meta() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let item = items::create_item(&conn, &NewItem::new(ItemType::Video, "v")).unwrap();

        update_meta(&conn, item.id, "video_url", &json!("abc")).unwrap();
        assert!(delete_meta(&conn, item.id, "video_url").unwrap());
        assert!(!delete_meta(&conn, item.id, "video_url").unwrap());
        assert_eq!(get_meta(&conn, item.id, "video_url").unwrap(), None);
    }

    #[test]
    fn test_meta_on_missing_item_fails() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let err = update_meta(&conn, ItemId::new(404), "length", &json!("1")).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
    }
}
