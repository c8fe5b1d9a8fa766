//! Database migrations
//!
//! Every handle, live or backup, goes through the same pipeline. The version a
//! file reported before upgrading is returned to the caller so the merge
//! engine can pick its duplicate-matching rules.

use crate::error::{Error, Result};
use crate::models::new_uuid;
use rusqlite::{params, Connection};

/// Oldest schema this build can upgrade from
pub const BASELINE_VERSION: i32 = 18;

/// First schema version whose rows carry stable UUIDs
pub const DATABASE_VERSION_WITH_UUIDS: i32 = 19;

/// Current schema version
pub const CURRENT_VERSION: i32 = 20;

/// Tables that gained uuid/sync columns in v19
const ENTITY_TABLES: [&str; 7] = [
    "csv_columns",
    "pdf_columns",
    "payment_methods",
    "categories",
    "trips",
    "distances",
    "receipts",
];

/// Run all pending migrations, returning the version found before upgrading
pub fn run(conn: &Connection) -> Result<i32> {
    let original = get_version(conn)?;
    migrate(conn, original, CURRENT_VERSION)?;
    Ok(original)
}

fn migrate(conn: &Connection, from: i32, to: i32) -> Result<()> {
    if from > CURRENT_VERSION || (from > 0 && from < BASELINE_VERSION) {
        return Err(Error::UnsupportedSchemaVersion(from));
    }

    if from < 18 && to >= 18 {
        migrate_v18(conn)?;
    }
    if from < 19 && to >= 19 {
        migrate_v19(conn)?;
    }
    if from < 20 && to >= 20 {
        migrate_v20(conn)?;
    }

    Ok(())
}

/// Get the current schema version (0 for an empty database)
pub fn get_version(conn: &Connection) -> Result<i32> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Migration to version 18: baseline schema without stable identities
fn migrate_v18(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );
        CREATE TABLE IF NOT EXISTS csv_columns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            column_type TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS pdf_columns (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            column_type TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS payment_methods (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            method TEXT NOT NULL,
            reimbursable INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            custom_order_id INTEGER NOT NULL DEFAULT 0
        );
        CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            start_date INTEGER NOT NULL,
            start_timezone TEXT NOT NULL,
            end_date INTEGER NOT NULL,
            end_timezone TEXT NOT NULL,
            directory TEXT NOT NULL,
            default_currency TEXT NOT NULL,
            comment TEXT NOT NULL DEFAULT '',
            cost_center TEXT NOT NULL DEFAULT ''
        );
        CREATE TABLE IF NOT EXISTS distances (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            location TEXT NOT NULL,
            distance INTEGER NOT NULL,
            date INTEGER NOT NULL,
            timezone TEXT NOT NULL,
            rate INTEGER NOT NULL,
            rate_currency TEXT NOT NULL,
            comment TEXT NOT NULL DEFAULT '',
            payment_method_id INTEGER REFERENCES payment_methods(id) ON DELETE SET NULL
        );
        CREATE INDEX IF NOT EXISTS idx_distances_trip ON distances(trip_id);
        CREATE TABLE IF NOT EXISTS receipts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            date INTEGER NOT NULL,
            timezone TEXT NOT NULL,
            price INTEGER NOT NULL,
            tax INTEGER NOT NULL DEFAULT 0,
            currency TEXT NOT NULL,
            category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
            payment_method_id INTEGER REFERENCES payment_methods(id) ON DELETE SET NULL,
            comment TEXT NOT NULL DEFAULT '',
            reimbursable INTEGER NOT NULL DEFAULT 1,
            file TEXT,
            custom_order_id INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_receipts_trip ON receipts(trip_id);
        INSERT INTO schema_version (version) VALUES (18);",
    )?;
    tx.commit()?;

    tracing::info!("Migrated database to version 18");
    Ok(())
}

/// Migration to version 19: stable UUIDs and sync state on every entity
fn migrate_v19(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;

    for table in ENTITY_TABLES {
        tx.execute_batch(&format!(
            "ALTER TABLE {table} ADD COLUMN uuid TEXT;
             ALTER TABLE {table} ADD COLUMN last_local_modification_time INTEGER NOT NULL DEFAULT 0;
             CREATE INDEX IF NOT EXISTS idx_{table}_uuid ON {table}(uuid);"
        ))?;

        let ids = {
            let mut stmt = tx.prepare(&format!("SELECT id FROM {table} WHERE uuid IS NULL"))?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            ids
        };
        for id in ids {
            tx.execute(
                &format!("UPDATE {table} SET uuid = ? WHERE id = ?"),
                params![new_uuid().to_string(), id],
            )?;
        }
    }

    tx.execute("INSERT INTO schema_version (version) VALUES (19)", [])?;
    tx.commit()?;

    tracing::info!("Migrated database to version 19");
    Ok(())
}

/// Migration to version 20: user ordering for payment methods and columns
fn migrate_v20(conn: &Connection) -> Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(
        "ALTER TABLE payment_methods ADD COLUMN custom_order_id INTEGER NOT NULL DEFAULT 0;
         ALTER TABLE csv_columns ADD COLUMN custom_order_id INTEGER NOT NULL DEFAULT 0;
         ALTER TABLE pdf_columns ADD COLUMN custom_order_id INTEGER NOT NULL DEFAULT 0;
         UPDATE payment_methods SET custom_order_id = id;
         UPDATE csv_columns SET custom_order_id = id;
         UPDATE pdf_columns SET custom_order_id = id;
         INSERT INTO schema_version (version) VALUES (20);",
    )?;
    tx.commit()?;

    tracing::info!("Migrated database to version {CURRENT_VERSION}");
    Ok(())
}

/// Bring an empty connection up to `target` only; used to build old-format fixtures.
#[cfg(test)]
pub(crate) fn run_to(conn: &Connection, target: i32) -> Result<()> {
    let from = get_version(conn)?;
    migrate(conn, from, target)
}
