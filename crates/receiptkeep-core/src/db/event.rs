//! Write notifications emitted by every table

use serde::{Deserialize, Serialize};

/// Origin of a write, so observers can tell bulk imports from interactive edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationFamily {
    /// Interactive edit made by the user
    User,
    /// Write applied by cloud sync
    Sync,
    /// Write applied while merging a backup
    Import,
}

/// Kind of write that produced an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteAction {
    Insert,
    Update,
    DeleteAll,
}

/// A committed write against one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEvent {
    /// Table name (e.g. `receipts`)
    pub table: &'static str,
    pub action: WriteAction,
    /// Affected row; `None` for bulk deletes
    pub row_id: Option<i64>,
    pub family: OperationFamily,
}
