//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

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
        tracing::info!(from = current, to = CURRENT_VERSION, "migrating schema");
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
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Documents: one row per aggregate, signer slots live in `signers`
        CREATE TABLE documents (
            id BLOB PRIMARY KEY,              -- 16 bytes
            title TEXT NOT NULL,
            template_id BLOB NOT NULL,        -- 16 bytes
            content BLOB NOT NULL,            -- CBOR map of field values
            status TEXT NOT NULL,             -- draft | pending | signed | rejected
            created_by BLOB NOT NULL,         -- 16 bytes
            fingerprint BLOB,                 -- 32 bytes, SHA-256 creation digest
            created_at INTEGER NOT NULL,      -- Unix ms, immutable
            completed_at INTEGER,             -- Unix ms, set once on completion
            revision INTEGER NOT NULL         -- bumped on every conditional update
        );

        -- Signer slots, ordered within each document
        CREATE TABLE signers (
            document_id BLOB NOT NULL,
            position INTEGER NOT NULL,        -- list order, stable across rewrites
            user_id BLOB NOT NULL,
            status TEXT NOT NULL,             -- pending | signed | rejected
            signed_at INTEGER,
            signature BLOB,                   -- 32 bytes, SHA-256 signature digest
            notes TEXT,
            added_at INTEGER,                 -- NULL for creation-listed signers
            added_by BLOB,                    -- NULL for creation-listed signers
            PRIMARY KEY (document_id, position)
        );

        -- Reusable document templates; `active = 0` means retired
        CREATE TABLE templates (
            id BLOB PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            fields BLOB NOT NULL,             -- CBOR array of field definitions
            category TEXT NOT NULL,
            created_by BLOB NOT NULL,
            active INTEGER NOT NULL DEFAULT 1,
            created_at INTEGER NOT NULL
        );

        -- Directory of registered users
        CREATE TABLE users (
            id BLOB PRIMARY KEY,
            username TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            role TEXT NOT NULL,               -- admin | member
            created_at INTEGER NOT NULL
        );

        -- Append-only activity trail
        CREATE TABLE activity_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            actor BLOB NOT NULL,
            action TEXT NOT NULL,
            document_id BLOB,
            detail TEXT NOT NULL,
            at INTEGER NOT NULL
        );

        -- Indexes for common queries
        CREATE INDEX idx_documents_creator ON documents(created_by);
        CREATE INDEX idx_documents_status ON documents(status);
        CREATE INDEX idx_signers_user ON signers(user_id);
        CREATE INDEX idx_users_role ON users(role);
        CREATE INDEX idx_activity_actor ON activity_log(actor);
        CREATE INDEX idx_activity_at ON activity_log(at);
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
