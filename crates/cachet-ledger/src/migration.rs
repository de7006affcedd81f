//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL
//! string that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{LedgerError, Result};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    // Create migrations table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    // Get current version
    let current: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    // Apply migrations
    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

/// Apply a specific migration version.
fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(LedgerError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- The message arena. id is the sequential protocol id.
        CREATE TABLE messages (
            id INTEGER PRIMARY KEY,           -- sequential from 0, never reused
            protected_sender BLOB NOT NULL,   -- 32 bytes, runtime handle
            recipient BLOB NOT NULL,          -- 20 bytes, plaintext address
            content_locator TEXT NOT NULL,    -- locator in the content store
            protected_key BLOB NOT NULL,      -- 32 bytes, runtime handle
            created_at INTEGER NOT NULL,      -- commit timestamp (Unix ms)
            is_deleted INTEGER NOT NULL DEFAULT 0
        );

        -- Per-address received index, append-only
        CREATE TABLE received_index (
            address BLOB NOT NULL,            -- 20 bytes
            message_id INTEGER NOT NULL,
            PRIMARY KEY (address, message_id)
        );

        -- Per-signer sent index, append-only
        CREATE TABLE sent_index (
            address BLOB NOT NULL,            -- 20 bytes
            message_id INTEGER NOT NULL,
            PRIMARY KEY (address, message_id)
        );

        -- Append-only event log
        CREATE TABLE events (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            kind TEXT NOT NULL,               -- 'sent' or 'deleted'
            message_id INTEGER NOT NULL,
            recipient BLOB,                   -- sent events only
            actor BLOB NOT NULL,              -- signer or deleter
            content_locator TEXT,             -- sent events only
            created_at INTEGER                -- sent events only
        );

        -- Indexes for common queries
        CREATE INDEX idx_messages_recipient ON messages(recipient);
        CREATE INDEX idx_received_address ON received_index(address);
        CREATE INDEX idx_sent_address ON sent_index(address);
        "#,
    )?;

    Ok(())
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        // Verify tables exist
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"messages".to_string()));
        assert!(tables.contains(&"received_index".to_string()));
        assert!(tables.contains(&"sent_index".to_string()));
        assert!(tables.contains(&"events".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap(); // Should not error
        migrate(&mut conn).unwrap(); // Still should not error

        // Verify version is 1
        let version: u32 = conn
            .query_row(
                "SELECT MAX(version) FROM schema_migrations",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(version, 1);
    }
}
