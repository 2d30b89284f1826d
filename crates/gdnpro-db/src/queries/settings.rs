//! Settings database queries.

use chrono::{DateTime, Utc};
use gdnpro_common::{Error, Result};
use rusqlite::Connection;

use crate::models::Setting;

/// Insert or overwrite a setting.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_input("setting key cannot be empty"));
    }

    conn.execute(
        "INSERT INTO settings (key, value, updated_at) VALUES (:key, :value, :updated_at)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        rusqlite::named_params! {
            ":key": key,
            ":value": value,
            ":updated_at": Utc::now().to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(())
}

/// Get a setting's value.
///
/// # Returns
///
/// * `Ok(Some(value))` - The stored value
/// * `Ok(None)` - If the key was never set
/// * `Err(Error)` - If a database error occurs
pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let result = conn.query_row(
        "SELECT value FROM settings WHERE key = :key",
        rusqlite::named_params! { ":key": key },
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(value) => Ok(Some(value)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// Delete a setting. Returns whether a row was removed.
pub fn delete(conn: &Connection, key: &str) -> Result<bool> {
    let changed = conn
        .execute(
            "DELETE FROM settings WHERE key = :key",
            rusqlite::named_params! { ":key": key },
        )
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(changed > 0)
}

/// List settings whose key starts with `prefix`, ordered by key.
///
/// An empty prefix lists everything.
pub fn list_prefix(conn: &Connection, prefix: &str) -> Result<Vec<Setting>> {
    let mut stmt = conn
        .prepare(
            "SELECT key, value, updated_at FROM settings
             WHERE substr(key, 1, length(:prefix)) = :prefix
             ORDER BY key",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map(rusqlite::named_params! { ":prefix": prefix }, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })
        .map_err(|e| Error::database(e.to_string()))?;

    let mut settings = Vec::new();
    for row in rows {
        let (key, value, updated_at) = row.map_err(|e| Error::database(e.to_string()))?;
        let updated_at = DateTime::parse_from_rfc3339(&updated_at)
            .map_err(|e| Error::database(format!("bad timestamp for {}: {}", key, e)))?
            .with_timezone(&Utc);
        settings.push(Setting {
            key,
            value,
            updated_at,
        });
    }

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{get_conn, init_memory_pool};

    #[test]
    fn test_set_and_get() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        assert_eq!(get(&conn, "gif_frames").unwrap(), None);
        set(&conn, "gif_frames", "Loop").unwrap();
        assert_eq!(get(&conn, "gif_frames").unwrap().as_deref(), Some("Loop"));
    }

    #[test]
    fn test_last_write_wins() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        set(&conn, "renamer_case", "Title").unwrap();
        set(&conn, "renamer_case", "Lowercase").unwrap();
        assert_eq!(get(&conn, "renamer_case").unwrap().as_deref(), Some("Lowercase"));
        assert_eq!(list_prefix(&conn, "").unwrap().len(), 1);
    }

    #[test]
    fn test_empty_key_rejected() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();
        assert!(matches!(set(&conn, "", "x"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_delete() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        set(&conn, "qr_border", "4").unwrap();
        assert!(delete(&conn, "qr_border").unwrap());
        assert!(!delete(&conn, "qr_border").unwrap());
        assert_eq!(get(&conn, "qr_border").unwrap(), None);
    }

    #[test]
    fn test_list_prefix() {
        let pool = init_memory_pool().unwrap();
        let conn = get_conn(&pool).unwrap();

        set(&conn, "qr_size", "10").unwrap();
        set(&conn, "qr_format", "png").unwrap();
        set(&conn, "renamer_case", "Title").unwrap();

        let qr = list_prefix(&conn, "qr_").unwrap();
        let keys: Vec<_> = qr.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(keys, ["qr_format", "qr_size"]);

        // `_` must not act as a LIKE wildcard
        set(&conn, "qrXsize", "1").unwrap();
        assert_eq!(list_prefix(&conn, "qr_").unwrap().len(), 2);
    }
}
