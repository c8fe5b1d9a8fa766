//! Backup fixtures shared by the merge tests

use std::path::Path;

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::db::migrations::{self, BASELINE_VERSION};
use crate::db::{Database, TableEvent};
use crate::models::new_uuid;

/// A backup written by a current build, reopened so it reports its version
pub(super) fn current_backup(dir: &Path, populate: impl FnOnce(&Database)) -> Database {
    let path = dir.join(format!("current-{}.db", new_uuid()));
    let db = Database::open(&path).unwrap();
    populate(&db);
    db.close().unwrap();
    Database::open_existing(&path).unwrap()
}

/// A backup written before rows carried UUIDs, populated with raw SQL
pub(super) fn legacy_backup(dir: &Path, sql: &str) -> Database {
    let path = dir.join(format!("legacy-{}.db", new_uuid()));
    {
        let conn = Connection::open(&path).unwrap();
        migrations::run_to(&conn, BASELINE_VERSION).unwrap();
        conn.execute_batch(sql).unwrap();
    }
    Database::open_existing(&path).unwrap()
}

pub(super) fn drain(events: &mut broadcast::Receiver<TableEvent>) -> Vec<TableEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}
