//! Database schema migrations for rollcall.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
}

/// Create the schema_version table if it doesn't exist.
fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

/// Set the schema version in the database.
fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration v1: roster and points ledger.
///
/// The UNIQUE index on `(member_id, date_str)` is the storage-level guard
/// against two concurrent check-ins for the same member and meeting.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS members (
            id                 TEXT PRIMARY KEY,
            position           INTEGER NOT NULL,
            name               TEXT NOT NULL,
            phone              TEXT NOT NULL DEFAULT '',
            birth_date         TEXT,
            address            TEXT,
            college            TEXT,
            year               TEXT,
            confession_father  TEXT,
            responsible_servant TEXT,
            has_face_id        INTEGER NOT NULL DEFAULT 0,
            fingerprint_count  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS attendance (
            seq        INTEGER PRIMARY KEY AUTOINCREMENT,
            id         TEXT NOT NULL UNIQUE,
            member_id  TEXT NOT NULL,
            timestamp  INTEGER NOT NULL,
            date_str   TEXT NOT NULL,
            points     INTEGER NOT NULL,
            method     TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_attendance_member_date
            ON attendance(member_id, date_str);
        CREATE INDEX IF NOT EXISTS idx_attendance_date ON attendance(date_str);

        CREATE TABLE IF NOT EXISTS redemptions (
            seq          INTEGER PRIMARY KEY AUTOINCREMENT,
            id           TEXT NOT NULL UNIQUE,
            member_id    TEXT NOT NULL,
            gift_name    TEXT NOT NULL,
            points_cost  INTEGER NOT NULL CHECK (points_cost > 0),
            timestamp    INTEGER NOT NULL,
            servant_name TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_redemptions_member ON redemptions(member_id);

        CREATE TABLE IF NOT EXISTS gifts (
            seq   INTEGER PRIMARY KEY AUTOINCREMENT,
            id    TEXT NOT NULL UNIQUE,
            name  TEXT NOT NULL,
            cost  INTEGER NOT NULL
        );",
    )?;
    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: agenda segments and follow-up log.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS segments (
            id           TEXT PRIMARY KEY,
            date_str     TEXT NOT NULL,
            title        TEXT NOT NULL,
            start_time   TEXT NOT NULL,
            end_time     TEXT NOT NULL,
            servant_name TEXT,
            notes        TEXT,
            icon         TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_segments_date ON segments(date_str, start_time);

        CREATE TABLE IF NOT EXISTS follow_ups (
            seq          INTEGER PRIMARY KEY AUTOINCREMENT,
            id           TEXT NOT NULL UNIQUE,
            member_id    TEXT NOT NULL,
            timestamp    INTEGER NOT NULL,
            note         TEXT NOT NULL,
            servant_name TEXT NOT NULL,
            kind         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_follow_ups_member ON follow_ups(member_id);",
    )?;
    set_schema_version(&tx, 2)?;
    tx.commit()
}
