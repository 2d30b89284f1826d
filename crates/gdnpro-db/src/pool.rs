//! Database connection pool management.
//!
//! Connection pooling for SQLite using r2d2. Migrations run when the pool is
//! created.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use gdnpro_common::{Error, Result};
use std::path::Path;

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initialize a new database pool with the given file path.
///
/// Creates the parent directory and the database file when missing, then
/// runs pending migrations.
///
/// # Example
///
/// ```no_run
/// use gdnpro_db::pool::init_pool;
///
/// let pool = init_pool("/tmp/gdnpro.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool(db_path: impl AsRef<Path>) -> Result<DbPool> {
    let db_path = db_path.as_ref();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(db_path);
    build_pool(manager, 4)
}

/// Initialize an in-memory database pool for testing.
///
/// Every SQLite in-memory connection is its own database, so the pool holds
/// a single connection.
///
/// ```
/// use gdnpro_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    build_pool(SqliteConnectionManager::memory(), 1)
}

fn build_pool(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::database(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::run_migrations(&conn)
        .map_err(|e| Error::database(format!("Failed to run migrations: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool.
///
/// Converts the r2d2 error into the common Error type.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {}", e)))
}
