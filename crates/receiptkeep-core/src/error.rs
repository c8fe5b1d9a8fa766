//! Error types for receiptkeep-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using receiptkeep-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in receiptkeep-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// `SQLite` error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The database reports a schema version the migration pipeline cannot upgrade
    #[error("Unsupported schema version {0}")]
    UnsupportedSchemaVersion(i32),

    /// Backup file missing or not a regular file
    #[error("Backup file not found: {}", .0.display())]
    BackupNotFound(PathBuf),

    /// An imported row points at a parent that was never merged
    #[error("Unresolved {entity} reference (imported id {imported_id})")]
    UnresolvedReference {
        /// Entity type of the missing parent
        entity: &'static str,
        /// Local id of the parent in the imported database
        imported_id: i64,
    },

    /// Background merge task failed to complete
    #[error("Background task failed: {0}")]
    Task(String),
}
