//! Renamer pattern queries.
//!
//! Patterns are applied in insertion order. An empty table means "use the
//! defaults", so a fresh database behaves like one that was reset.

use gdnpro_common::{Error, Result};
use rusqlite::Connection;

use crate::models::Pattern;

/// Built-in substitutions.
pub const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("_x_", "x"),
    ("_X_", "x"),
    ("_~", "~"),
    ("~_", "~"),
    ("_px", "px"),
    ("_-_", "_"),
    (" - ", "_"),
    (" ", "_"),
    ("--_", "_"),
    ("_--", "_"),
    ("%", "pct"),
    ("__+", "_"),
    ("--+", "-"),
    ("_mm", "mm"),
];

/// The built-in patterns as owned rows.
pub fn default_patterns() -> Vec<Pattern> {
    DEFAULT_PATTERNS
        .iter()
        .map(|(p, r)| Pattern::new(*p, *r))
        .collect()
}

/// Stored patterns in order, or the defaults when none are stored.
pub fn load_patterns(conn: &Connection) -> Result<Vec<Pattern>> {
    let stored = stored_patterns(conn)?;
    if stored.is_empty() {
        Ok(default_patterns())
    } else {
        Ok(stored)
    }
}

fn stored_patterns(conn: &Connection) -> Result<Vec<Pattern>> {
    let mut stmt = conn
        .prepare("SELECT pattern, replacement FROM renamer_patterns ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;

    let rows = stmt
        .query_map([], |row| Ok(Pattern::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
        .map_err(|e| Error::database(e.to_string()))?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))
}

/// Replace every stored pattern with `patterns`.
pub fn replace_patterns(conn: &Connection, patterns: &[Pattern]) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;

    tx.execute("DELETE FROM renamer_patterns", [])
        .map_err(|e| Error::database(e.to_string()))?;

    for p in patterns {
        tx.execute(
            "INSERT INTO renamer_patterns (pattern, replacement) VALUES (?1, ?2)",
            rusqlite::params![p.pattern, p.replacement],
        )
        .map_err(|e| Error::database(e.to_string()))?;
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))
}

/// Append a pattern to the current list.
///
/// When nothing is stored yet the defaults are materialized first, so the
/// new pattern extends them instead of replacing them.
pub fn add_pattern(conn: &Connection, pattern: Pattern) -> Result<Vec<Pattern>> {
    if pattern.pattern.is_empty() {
        return Err(Error::invalid_input("pattern cannot be empty"));
    }

    let mut patterns = load_patterns(conn)?;
    patterns.push(pattern);
    replace_patterns(conn, &patterns)?;
    Ok(patterns)
}

/// Remove the pattern at `index` (0-based) from the current list.
pub fn remove_pattern(conn: &Connection, index: usize) -> Result<Pattern> {
    let mut patterns = load_patterns(conn)?;
    if index >= patterns.len() {
        return Err(Error::not_found(format!(
            "pattern #{} (have {})",
            index,
            patterns.len()
        )));
    }

    let removed = patterns.remove(index);
    replace_patterns(conn, &patterns)?;
    Ok(removed)
}

/// Drop stored patterns so the defaults apply again.
pub fn reset_patterns(conn: &Connection) -> Result<()> {
    replace_patterns(conn, &[])
}
