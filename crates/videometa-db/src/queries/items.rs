//! Item database queries.
//!
//! CRUD operations for content items plus the filtered listing used by the
//! REST collection endpoint (type filter, title search, pagination).

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};
use videometa_common::{Error, ItemId, ItemStatus, ItemType, Result};

use crate::models::{Item, ItemUpdate, NewItem};

/// Filter options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemFilter {
    pub item_type: Option<ItemType>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
}

/// Page-based pagination, 1-indexed like the host's `page`/`per_page` params.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

impl Pagination {
    fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }
}

const ITEM_COLUMNS: &str = "id, item_type, title, content, status, created_at, modified_at";

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    let item_type: String = row.get(1)?;
    let status: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let modified_at: String = row.get(6)?;

    let item_type = item_type.parse::<ItemType>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, e.into())
    })?;
    let status = status.parse::<ItemStatus>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, e.into())
    })?;

    Ok(Item {
        id: ItemId::new(row.get(0)?),
        item_type,
        title: row.get(2)?,
        content: row.get(3)?,
        status,
        created_at: parse_timestamp(&created_at),
        modified_at: parse_timestamp(&modified_at),
    })
}

/// Insert a new item and return it with its assigned id.
pub fn create_item(conn: &Connection, new: &NewItem) -> Result<Item> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO items (item_type, title, content, status, created_at, modified_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        rusqlite::params![
            new.item_type.to_string(),
            &new.title,
            &new.content,
            new.status.to_string(),
            now,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    let id = ItemId::new(conn.last_insert_rowid());
    get_item(conn, id)?.ok_or_else(|| Error::internal(format!("Item {id} vanished after insert")))
}

/// Get an item by id.
pub fn get_item(conn: &Connection, id: ItemId) -> Result<Option<Item>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = ?"),
        [id.get()],
        parse_item_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Apply a partial update and bump `modified_at`.
///
/// Returns `Error::NotFound` when no item has the given id.
pub fn update_item(conn: &Connection, id: ItemId, update: &ItemUpdate) -> Result<Item> {
    let changed = conn
        .execute(
            "UPDATE items SET
                title = COALESCE(?2, title),
                content = COALESCE(?3, content),
                status = COALESCE(?4, status),
                modified_at = ?5
             WHERE id = ?1",
            rusqlite::params![
                id.get(),
                update.title.as_deref(),
                update.content.as_deref(),
                update.status.map(|s| s.to_string()),
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| Error::database(e.to_string()))?;

    if changed == 0 {
        return Err(Error::not_found(format!("item {id}")));
    }

    get_item(conn, id)?.ok_or_else(|| Error::not_found(format!("item {id}")))
}

/// Delete an item. Its metadata goes with it via the foreign-key cascade.
///
/// Returns `true` if a row was deleted.
pub fn delete_item(conn: &Connection, id: ItemId) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM items WHERE id = ?", [id.get()])
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(deleted > 0)
}

/// List items matching the filter, newest first.
pub fn list_items(conn: &Connection, filter: &ItemFilter, page: Pagination) -> Result<Vec<Item>> {
    let search = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()));

    let mut stmt = conn
        .prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items
             WHERE (?1 IS NULL OR item_type = ?1)
               AND (?2 IS NULL OR LOWER(title) LIKE ?2)
             ORDER BY id DESC
             LIMIT ?3 OFFSET ?4"
        ))
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(
            rusqlite::params![
                filter.item_type.map(|t| t.to_string()),
                search,
                page.per_page,
                page.offset(),
            ],
            parse_item_row,
        )
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Ids of all items of one type, ascending.
pub fn list_ids_by_type(conn: &Connection, item_type: ItemType) -> Result<Vec<ItemId>> {
    let mut stmt = conn
        .prepare("SELECT id FROM items WHERE item_type = ? ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;

    let ids = stmt
        .query_map([item_type.to_string()], |row| row.get::<_, i64>(0))
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(ids.into_iter().map(ItemId::new).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    #[test]
    fn test_create_and_get_item() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        let item = create_item(&conn, &NewItem::new(ItemType::Video, "Episode 1")).unwrap();
        assert_eq!(item.item_type, ItemType::Video);
        assert_eq!(item.title, "Episode 1");
        assert_eq!(item.status, ItemStatus::Draft);

        let fetched = get_item(&conn, item.id).unwrap().unwrap();
        assert_eq!(fetched, item);
    }

    #[test]
    fn test_get_missing_item() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        assert!(get_item(&conn, ItemId::new(999)).unwrap().is_none());
    }

    #[test]
    fn test_update_item_partial() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let item = create_item(&conn, &NewItem::new(ItemType::Video, "Old")).unwrap();

        let updated = update_item(
            &conn,
            item.id,
            &ItemUpdate {
                status: Some(ItemStatus::Publish),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.title, "Old");
        assert_eq!(updated.status, ItemStatus::Publish);
        assert!(updated.modified_at >= item.modified_at);
    }

    #[test]
    fn test_update_missing_item() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let err = update_item(&conn, ItemId::new(5), &ItemUpdate::default()).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_delete_item() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let item = create_item(&conn, &NewItem::new(ItemType::Post, "Bye")).unwrap();

        assert!(delete_item(&conn, item.id).unwrap());
        assert!(!delete_item(&conn, item.id).unwrap());
        assert!(get_item(&conn, item.id).unwrap().is_none());
    }

    #[test]
    fn test_list_items_filters_and_paginates() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        create_item(&conn, &NewItem::new(ItemType::Video, "Cooking Basics")).unwrap();
        create_item(&conn, &NewItem::new(ItemType::Video, "Advanced Cooking")).unwrap();
        create_item(&conn, &NewItem::new(ItemType::Post, "Cooking News")).unwrap();

        let videos = list_items(
            &conn,
            &ItemFilter {
                item_type: Some(ItemType::Video),
                search: None,
            },
            Pagination::default(),
        )
        .unwrap();
        assert_eq!(videos.len(), 2);
        // Newest first.
        assert_eq!(videos[0].title, "Advanced Cooking");

        let searched = list_items(
            &conn,
            &ItemFilter {
                item_type: None,
                search: Some("cooking".into()),
            },
            Pagination {
                page: 1,
                per_page: 1,
            },
        )
        .unwrap();
        assert_eq!(searched.len(), 1);
        assert_eq!(searched[0].title, "Cooking News");

        let second_page = list_items(
            &conn,
            &ItemFilter::default(),
            Pagination {
                page: 2,
                per_page: 2,
            },
        )
        .unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].title, "Cooking Basics");
    }

    #[test]
    fn test_list_ids_by_type() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        let a = create_item(&conn, &NewItem::new(ItemType::Video, "a")).unwrap();
        create_item(&conn, &NewItem::new(ItemType::Post, "b")).unwrap();
        let c = create_item(&conn, &NewItem::new(ItemType::Video, "c")).unwrap();

        assert_eq!(
            list_ids_by_type(&conn, ItemType::Video).unwrap(),
            vec![a.id, c.id]
        );
    }
}
