//! Schema setup for the settings database.
//!
//! The schema version lives in SQLite's `user_version` header field. Each
//! entry of [`STEPS`] moves the database one version forward inside its own
//! transaction, so an interrupted upgrade leaves the previous version intact.

use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Upgrading settings to version {0} failed: {1}")]
    Failed(u32, String),

    /// The file was written by a later gdnpro; refusing to touch it.
    #[error("Settings database is version {found}, this build supports up to {supported}")]
    TooNew { found: u32, supported: u32 },
}

/// Version `n` is reached by running `STEPS[n - 1]`.
const STEPS: &[&str] = &[include_str!("001_initial.sql")];

/// Schema version recorded in the database file.
pub fn schema_version(conn: &Connection) -> Result<u32, MigrationError> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}

/// Version a fully upgraded database has.
pub fn latest_version() -> u32 {
    STEPS.len() as u32
}

/// Bring the settings and renamer pattern tables up to date.
///
/// Returns the number of steps applied.
pub fn run_migrations(conn: &Connection) -> Result<u32, MigrationError> {
    apply_steps(conn, STEPS)
}

fn apply_steps(conn: &Connection, steps: &[&str]) -> Result<u32, MigrationError> {
    let supported = steps.len() as u32;
    let found = schema_version(conn)?;
    if found > supported {
        return Err(MigrationError::TooNew { found, supported });
    }

    for (version, sql) in (found + 1..).zip(&steps[found as usize..]) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)
            .map_err(|e| MigrationError::Failed(version, e.to_string()))?;
        // PRAGMA does not take bound parameters
        tx.execute_batch(&format!("PRAGMA user_version = {version}"))?;
        tx.commit()
            .map_err(|e| MigrationError::Failed(version, e.to_string()))?;

        tracing::debug!("Settings database upgraded to version {}", version);
    }

    Ok(supported - found)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_exists(conn: &Connection, table: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn test_fresh_database_gets_settings_and_patterns() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);

        assert_eq!(run_migrations(&conn).unwrap(), latest_version());
        assert_eq!(schema_version(&conn).unwrap(), latest_version());
        assert!(table_exists(&conn, "settings"));
        assert!(table_exists(&conn, "renamer_patterns"));
    }

    #[test]
    fn test_rerun_keeps_saved_settings() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO settings (key, value, updated_at) VALUES ('gif_frames', '4', 'now')",
            [],
        )
        .unwrap();

        assert_eq!(run_migrations(&conn).unwrap(), 0);
        let frames: String = conn
            .query_row("SELECT value FROM settings WHERE key = 'gif_frames'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(frames, "4");
    }

    #[test]
    fn test_newer_database_is_refused() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99").unwrap();

        let err = run_migrations(&conn).unwrap_err();
        assert!(matches!(err, MigrationError::TooNew { found: 99, .. }), "unexpected: {err}");
    }

    #[test]
    fn test_failed_step_keeps_previous_version() {
        let conn = Connection::open_in_memory().unwrap();
        let steps = [STEPS[0], "ALTER TABLE settings ADD COLUMN note TEXT; SELECT * FROM missing;"];

        let err = apply_steps(&conn, &steps).unwrap_err();
        assert!(matches!(err, MigrationError::Failed(2, _)), "unexpected: {err}");
        assert_eq!(schema_version(&conn).unwrap(), 1);

        let columns: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('settings') WHERE name = 'note'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(columns, 0);
    }
}
