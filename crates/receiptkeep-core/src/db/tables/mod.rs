//! Row-level table access for each entity type

mod categories;
mod columns;
mod distances;
mod payment_methods;
mod receipts;
mod trips;

pub use categories::CategoryTable;
pub use columns::ColumnTable;
pub use distances::DistanceTable;
pub use payment_methods::PaymentMethodTable;
pub use receipts::ReceiptTable;
pub use trips::TripTable;

use uuid::Uuid;

use super::event::{OperationFamily, TableEvent, WriteAction};
use super::Database;
use crate::error::Result;
use crate::models::{new_uuid, Entity, MISSING_UUID};

/// Blocking CRUD surface shared by every entity table
pub trait Table {
    /// Row type stored in this table
    type Entity: Entity;

    /// Table name, as used in SQL and write events
    fn name(&self) -> &'static str;

    /// All rows, in primary key order
    fn get_all(&self) -> Result<Vec<Self::Entity>>;

    /// Get a row by local primary key
    fn find_by_id(&self, id: i64) -> Result<Option<Self::Entity>>;

    /// Insert a row, returning it with its newly assigned key (and UUID if it had none)
    fn insert(&self, entity: &Self::Entity, family: OperationFamily) -> Result<Self::Entity>;

    /// Overwrite the row identified by `old` with the values of `new`
    fn update(
        &self,
        old: &Self::Entity,
        new: &Self::Entity,
        family: OperationFamily,
    ) -> Result<Self::Entity>;

    /// Delete every row, returning how many were removed
    fn delete_all(&self, family: OperationFamily) -> Result<usize>;
}

/// Parse a stored UUID; NULL or garbage maps to [`MISSING_UUID`]
fn parse_uuid(value: Option<String>) -> Uuid {
    value
        .and_then(|value| value.parse().ok())
        .unwrap_or(MISSING_UUID)
}

/// UUID to persist for a new row
fn uuid_for_insert(uuid: Uuid) -> Uuid {
    if uuid.is_nil() {
        new_uuid()
    } else {
        uuid
    }
}

/// UUID to persist when `new` replaces `old`
fn uuid_for_update(old: Uuid, new: Uuid) -> Uuid {
    if new.is_nil() {
        old
    } else {
        new
    }
}

fn emit(
    db: &Database,
    table: &'static str,
    action: WriteAction,
    row_id: Option<i64>,
    family: OperationFamily,
) {
    db.emit(TableEvent {
        table,
        action,
        row_id,
        family,
    });
}

/// Shared `DELETE FROM` for tables without extra bookkeeping
fn delete_all_rows(db: &Database, table: &'static str, family: OperationFamily) -> Result<usize> {
    let deleted = db.connection().execute(&format!("DELETE FROM {table}"), [])?;
    emit(db, table, WriteAction::DeleteAll, None, family);
    Ok(deleted)
}
