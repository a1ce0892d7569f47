//! One-off maintenance over stored video metadata.
//!
//! Records written before length mirroring may carry only one of the three
//! length keys. [`consolidate_lengths`] resolves each video's length with the
//! same fallback the REST output uses and writes it to every mirror. No key is
//! removed.

use serde::Serialize;
use serde_json::Value;
use videometa_common::{ItemId, ItemType, Result};
use videometa_db::pool::{get_conn, DbPool};
use videometa_db::queries::items;

use crate::store::MetaStore;
use crate::video_meta::{resolve_length, LENGTH_MIRRORS};

/// Outcome of a consolidation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidationReport {
    /// Video items inspected.
    pub scanned: usize,
    /// Items whose mirrors disagreed or were incomplete.
    pub updated: Vec<ItemId>,
    /// Items with no length under any key.
    pub without_length: usize,
    pub dry_run: bool,
}

fn needs_update(store: &dyn MetaStore, item: ItemId, resolved: &Value) -> Result<bool> {
    for key in LENGTH_MIRRORS {
        if store.get_meta(item, key)?.as_ref() != Some(resolved) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Bring the length mirrors of every video item into agreement.
pub fn consolidate_lengths(
    pool: &DbPool,
    store: &dyn MetaStore,
    dry_run: bool,
) -> Result<ConsolidationReport> {
    let ids = {
        let conn = get_conn(pool)?;
        items::list_ids_by_type(&conn, ItemType::Video)?
    };

    let mut report = ConsolidationReport {
        scanned: ids.len(),
        dry_run,
        ..Default::default()
    };

    for id in ids {
        let resolved = resolve_length(store, id)?;
        if resolved.as_str() == Some("") {
            report.without_length += 1;
            continue;
        }
        if !needs_update(store, id, &resolved)? {
            continue;
        }

        tracing::debug!(item_id = %id, length = %resolved, dry_run, "Consolidating length mirrors");
        if !dry_run {
            for key in LENGTH_MIRRORS {
                store.update_meta(id, key, resolved.clone())?;
            }
        }
        report.updated.push(id);
    }

    tracing::info!(
        scanned = report.scanned,
        updated = report.updated.len(),
        dry_run,
        "Length consolidation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DbMetaStore;
    use crate::video_meta::{LEGACY_LENGTH, LENGTH, VIDEO_LENGTH};
    use serde_json::json;
    use videometa_db::models::NewItem;
    use videometa_db::pool::init_memory_pool;

    fn setup() -> (DbPool, DbMetaStore) {
        let pool = init_memory_pool().unwrap();
        let store = DbMetaStore::new(pool.clone());
        (pool, store)
    }

    fn create(pool: &DbPool, item_type: ItemType) -> ItemId {
        let conn = get_conn(pool).unwrap();
        items::create_item(&conn, &NewItem::new(item_type, "x")).unwrap().id
    }

    #[test]
    fn fills_missing_mirrors() {
        let (pool, store) = setup();
        let legacy = create(&pool, ItemType::Video);
        store.update_meta(legacy, VIDEO_LENGTH, json!("7")).unwrap();

        let report = consolidate_lengths(&pool, &store, false).unwrap();
        assert_eq!(report.scanned, 1);
        assert_eq!(report.updated, vec![legacy]);

        for key in [LENGTH, LEGACY_LENGTH, VIDEO_LENGTH] {
            assert_eq!(store.get_meta(legacy, key).unwrap(), Some(json!("7")));
        }
    }

    #[test]
    fn priority_order_wins_on_disagreement() {
        let (pool, store) = setup();
        let id = create(&pool, ItemType::Video);
        store.update_meta(id, LENGTH, json!("")).unwrap();
        store.update_meta(id, LEGACY_LENGTH, json!("42")).unwrap();
        store.update_meta(id, VIDEO_LENGTH, json!("99")).unwrap();

        consolidate_lengths(&pool, &store, false).unwrap();
        assert_eq!(store.get_meta(id, VIDEO_LENGTH).unwrap(), Some(json!("42")));
    }

    #[test]
    fn zero_length_is_replaced_by_legacy_value() {
        let (pool, store) = setup();
        let id = create(&pool, ItemType::Video);
        store.update_meta(id, LENGTH, json!("0")).unwrap();
        store.update_meta(id, LEGACY_LENGTH, json!("42")).unwrap();

        let report = consolidate_lengths(&pool, &store, false).unwrap();
        assert_eq!(report.updated, vec![id]);
        for key in LENGTH_MIRRORS {
            assert_eq!(store.get_meta(id, key).unwrap(), Some(json!("42")));
        }
    }

    #[test]
    fn consistent_and_empty_items_are_skipped() {
        let (pool, store) = setup();
        let consistent = create(&pool, ItemType::Video);
        for key in LENGTH_MIRRORS {
            store.update_meta(consistent, key, json!("5")).unwrap();
        }
        create(&pool, ItemType::Video);
        let post = create(&pool, ItemType::Post);
        store.update_meta(post, LENGTH, json!("3")).unwrap();

        let report = consolidate_lengths(&pool, &store, false).unwrap();
        assert_eq!(report.scanned, 2);
        assert!(report.updated.is_empty());
        assert_eq!(report.without_length, 1);
        assert_eq!(store.get_meta(post, VIDEO_LENGTH).unwrap(), None);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let (pool, store) = setup();
        let id = create(&pool, ItemType::Video);
        store.update_meta(id, LENGTH, json!("12")).unwrap();

        let report = consolidate_lengths(&pool, &store, true).unwrap();
        assert!(report.dry_run);
        assert_eq!(report.updated, vec![id]);
        assert_eq!(store.get_meta(id, LEGACY_LENGTH).unwrap(), None);
    }
}
