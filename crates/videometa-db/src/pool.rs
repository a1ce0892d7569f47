//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2: pool initialization, per-connection
//! pragmas, and running migrations.

use std::sync::atomic::{AtomicUsize, Ordering};

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use videometa_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

static MEMORY_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    let manager = manager.with_init(|conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
    });

    let pool = Pool::builder()
        .max_size(4)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Initialize a new database pool with the given file path.
///
/// Creates the SQLite file if needed, enables foreign keys on every
/// connection and runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use videometa_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/videometa/videometa.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: &str) -> Result<DbPool> {
    build_pool(SqliteConnectionManager::file(db_path))
}

/// Initialize an in-memory database pool for testing.
///
/// Every pool gets its own named shared-cache database so that all pooled
/// connections see the same tables. The data is lost when the pool is dropped.
///
/// ```
/// use videometa_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    let n = MEMORY_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!(
        "file:videometa-mem-{}-{}?mode=memory&cache=shared",
        std::process::id(),
        n
    );
    let manager = SqliteConnectionManager::file(uri).with_flags(
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI,
    );
    build_pool(manager)
}

/// Get a connection from the pool, converting the r2d2 error into the
/// common error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
