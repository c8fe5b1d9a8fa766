//! Payment method table

use rusqlite::{params, OptionalExtension};

use super::{delete_all_rows, emit, parse_uuid, uuid_for_insert, uuid_for_update, Table};
use crate::db::event::{OperationFamily, WriteAction};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{PaymentMethod, SyncState};

const TABLE: &str = "payment_methods";
const SELECT: &str = "SELECT id, uuid, method, reimbursable, custom_order_id, last_local_modification_time
     FROM payment_methods";

/// `SQLite` table of payment methods
pub struct PaymentMethodTable<'a> {
    db: &'a Database,
}

impl<'a> PaymentMethodTable<'a> {
    /// Create a new table view over the given database
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PaymentMethod> {
        Ok(PaymentMethod {
            id: row.get(0)?,
            uuid: parse_uuid(row.get(1)?),
            method: row.get(2)?,
            reimbursable: row.get::<_, i32>(3)? != 0,
            custom_order_id: row.get(4)?,
            sync_state: SyncState::at(row.get(5)?),
        })
    }
}

impl Table for PaymentMethodTable<'_> {
    type Entity = PaymentMethod;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn get_all(&self) -> Result<Vec<PaymentMethod>> {
        let mut stmt = self
            .db
            .connection()
            .prepare(&format!("{SELECT} ORDER BY id"))?;
        let methods = stmt
            .query_map([], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(methods)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<PaymentMethod>> {
        let method = self
            .db
            .connection()
            .query_row(&format!("{SELECT} WHERE id = ?"), [id], Self::parse_row)
            .optional()?;
        Ok(method)
    }

    fn insert(&self, entity: &PaymentMethod, family: OperationFamily) -> Result<PaymentMethod> {
        let uuid = uuid_for_insert(entity.uuid);
        self.db.connection().execute(
            "INSERT INTO payment_methods
                (uuid, method, reimbursable, custom_order_id, last_local_modification_time)
             VALUES (?, ?, ?, ?, ?)",
            params![
                uuid.to_string(),
                entity.method,
                i32::from(entity.reimbursable),
                entity.custom_order_id,
                entity.sync_state.last_local_modification_time,
            ],
        )?;
        let id = self.db.connection().last_insert_rowid();
        emit(self.db, TABLE, WriteAction::Insert, Some(id), family);

        Ok(PaymentMethod {
            id,
            uuid,
            ..entity.clone()
        })
    }

    fn update(
        &self,
        old: &PaymentMethod,
        new: &PaymentMethod,
        family: OperationFamily,
    ) -> Result<PaymentMethod> {
        let rows = self.db.connection().execute(
            "UPDATE payment_methods
             SET uuid = ?, method = ?, reimbursable = ?, custom_order_id = ?,
                 last_local_modification_time = ?
             WHERE id = ?",
            params![
                uuid_for_update(old.uuid, new.uuid).to_string(),
                new.method,
                i32::from(new.reimbursable),
                new.custom_order_id,
                new.sync_state.last_local_modification_time,
                old.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("payment method {}", old.id)));
        }
        emit(self.db, TABLE, WriteAction::Update, Some(old.id), family);

        self.find_by_id(old.id)?
            .ok_or_else(|| Error::NotFound(format!("payment method {}", old.id)))
    }

    fn delete_all(&self, family: OperationFamily) -> Result<usize> {
        delete_all_rows(self.db, TABLE, family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_assigns_id_and_keeps_uuid() {
        let db = setup();
        let table = db.payment_methods();
        let method = PaymentMethod::new("Cash");

        let inserted = table.insert(&method, OperationFamily::User).unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.uuid, method.uuid);

        let fetched = table.find_by_id(inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
    }

    #[test]
    fn test_insert_mints_missing_uuid() {
        let db = setup();
        let method = PaymentMethod {
            uuid: crate::models::MISSING_UUID,
            ..PaymentMethod::new("Cash")
        };

        let inserted = db
            .payment_methods()
            .insert(&method, OperationFamily::User)
            .unwrap();
        assert!(!inserted.uuid.is_nil());
    }

    #[test]
    fn test_update() {
        let db = setup();
        let table = db.payment_methods();
        let inserted = table
            .insert(&PaymentMethod::new("Cash"), OperationFamily::User)
            .unwrap();

        let changed = PaymentMethod {
            method: "Petty Cash".to_string(),
            reimbursable: true,
            ..inserted.clone()
        };
        let updated = table
            .update(&inserted, &changed, OperationFamily::User)
            .unwrap();

        assert_eq!(updated.id, inserted.id);
        assert_eq!(updated.method, "Petty Cash");
        assert!(updated.reimbursable);
    }

    #[test]
    fn test_update_missing_row() {
        let db = setup();
        let ghost = PaymentMethod {
            id: 42,
            ..PaymentMethod::new("Ghost")
        };

        let result = db
            .payment_methods()
            .update(&ghost, &ghost, OperationFamily::User);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_writes_emit_events() {
        let db = setup();
        let mut events = db.subscribe();
        let table = db.payment_methods();

        let inserted = table
            .insert(&PaymentMethod::new("Cash"), OperationFamily::Import)
            .unwrap();
        table.delete_all(OperationFamily::User).unwrap();

        let first = events.try_recv().unwrap();
        assert_eq!(first.table, "payment_methods");
        assert_eq!(first.action, WriteAction::Insert);
        assert_eq!(first.row_id, Some(inserted.id));
        assert_eq!(first.family, OperationFamily::Import);

        let second = events.try_recv().unwrap();
        assert_eq!(second.action, WriteAction::DeleteAll);
        assert_eq!(second.family, OperationFamily::User);
    }
}
