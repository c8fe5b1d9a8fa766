//! Database connection management

use std::path::Path;

use rusqlite::{Connection, OpenFlags};
use tokio::sync::broadcast;

use super::event::TableEvent;
use super::migrations;
use super::tables::{
    CategoryTable, ColumnTable, DistanceTable, PaymentMethodTable, ReceiptTable, TripTable,
};
use crate::error::{Error, Result};
use crate::models::ColumnFormat;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Database wrapper for a `SQLite` connection
///
/// Owns the connection and the broadcast channel every table publishes its
/// writes to.
pub struct Database {
    conn: Connection,
    original_schema_version: i32,
    events: broadcast::Sender<TableEvent>,
}

impl Database {
    /// Open a database at the given path, creating it if it doesn't exist
    ///
    /// Runs migrations automatically.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::from_connection(conn, Some(path))
    }

    /// Open an existing database file; fails instead of creating a new one
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::from_connection(conn, Some(path))
    }

    /// Open an in-memory database (useful for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, None)
    }

    fn from_connection(conn: Connection, path: Option<&Path>) -> Result<Self> {
        Self::configure(&conn)?;
        let original_schema_version = migrations::run(&conn)?;
        if original_schema_version != migrations::CURRENT_VERSION {
            tracing::debug!(
                "Upgraded {} from schema version {original_schema_version}",
                path.map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
            );
        }

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            conn,
            original_schema_version,
            events,
        })
    }

    /// Configure `SQLite` pragmas
    fn configure(conn: &Connection) -> Result<()> {
        // WAL is unavailable for in-memory databases; ignore the refusal
        conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))
            .ok();
        conn.execute_batch("PRAGMA synchronous = NORMAL;").ok();
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    /// Schema version the file reported before migrations ran
    ///
    /// Only meaningful for backup handles; a live database is normally
    /// already current.
    pub const fn original_schema_version(&self) -> i32 {
        self.original_schema_version
    }

    /// Schema version after migrations
    pub fn schema_version(&self) -> Result<i32> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Receive every write committed through this handle's tables
    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: TableEvent) {
        // No receivers is the common case outside of UI/sync observers
        let _ = self.events.send(event);
    }

    pub const fn payment_methods(&self) -> PaymentMethodTable<'_> {
        PaymentMethodTable::new(self)
    }

    pub const fn categories(&self) -> CategoryTable<'_> {
        CategoryTable::new(self)
    }

    pub const fn trips(&self) -> TripTable<'_> {
        TripTable::new(self)
    }

    pub const fn distances(&self) -> DistanceTable<'_> {
        DistanceTable::new(self)
    }

    pub const fn receipts(&self) -> ReceiptTable<'_> {
        ReceiptTable::new(self)
    }

    /// Column list for the given report format
    pub const fn columns(&self, format: ColumnFormat) -> ColumnTable<'_> {
        ColumnTable::new(self, format)
    }

    /// Write a consistent copy of this database to `destination`
    pub fn export_to(&self, destination: impl AsRef<Path>) -> Result<()> {
        let destination = destination.as_ref();
        if destination.exists() {
            return Err(Error::InvalidInput(format!(
                "Export target already exists: {}",
                destination.display()
            )));
        }
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }

        self.conn.execute(
            "VACUUM INTO ?",
            [destination.to_string_lossy().to_string()],
        )?;
        tracing::info!("Exported database to {}", destination.display());
        Ok(())
    }

    /// Close the connection, surfacing any error `SQLite` reports
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, error)| Error::Sqlite(error))
    }
}
