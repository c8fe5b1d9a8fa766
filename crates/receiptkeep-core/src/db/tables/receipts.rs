//! Receipt table

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};

use super::{delete_all_rows, emit, parse_uuid, uuid_for_insert, uuid_for_update, Table};
use crate::db::event::{OperationFamily, WriteAction};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Amount, Category, PaymentMethod, Receipt, SyncState, Trip};

const TABLE: &str = "receipts";
const SELECT: &str = "SELECT id, uuid, trip_id, name, date, timezone, price, tax, currency,
            category_id, payment_method_id, comment, reimbursable, file, custom_order_id,
            last_local_modification_time
     FROM receipts";

/// Receipt row before its trip, category and payment method are attached
struct ReceiptRow {
    id: i64,
    uuid: Option<String>,
    trip_id: i64,
    name: String,
    date: i64,
    timezone: String,
    price: i64,
    tax: i64,
    currency: String,
    category_id: Option<i64>,
    payment_method_id: Option<i64>,
    comment: String,
    reimbursable: bool,
    file: Option<String>,
    custom_order_id: i64,
    last_local_modification_time: i64,
}

struct Lookups {
    trips: HashMap<i64, Trip>,
    categories: HashMap<i64, Category>,
    methods: HashMap<i64, PaymentMethod>,
}

/// `SQLite` table of receipts; rows are returned with their referenced entities
pub struct ReceiptTable<'a> {
    db: &'a Database,
}

impl<'a> ReceiptTable<'a> {
    /// Create a new table view over the given database
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReceiptRow> {
        Ok(ReceiptRow {
            id: row.get(0)?,
            uuid: row.get(1)?,
            trip_id: row.get(2)?,
            name: row.get(3)?,
            date: row.get(4)?,
            timezone: row.get(5)?,
            price: row.get(6)?,
            tax: row.get(7)?,
            currency: row.get(8)?,
            category_id: row.get(9)?,
            payment_method_id: row.get(10)?,
            comment: row.get(11)?,
            reimbursable: row.get::<_, i32>(12)? != 0,
            file: row.get(13)?,
            custom_order_id: row.get(14)?,
            last_local_modification_time: row.get(15)?,
        })
    }

    fn lookups(&self) -> Result<Lookups> {
        Ok(Lookups {
            trips: self
                .db
                .trips()
                .get_all()?
                .into_iter()
                .map(|trip| (trip.id, trip))
                .collect(),
            categories: self
                .db
                .categories()
                .get_all()?
                .into_iter()
                .map(|category| (category.id, category))
                .collect(),
            methods: self
                .db
                .payment_methods()
                .get_all()?
                .into_iter()
                .map(|method| (method.id, method))
                .collect(),
        })
    }

    fn assemble(row: ReceiptRow, lookups: &Lookups) -> Result<Receipt> {
        let trip = lookups
            .trips
            .get(&row.trip_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("trip {} for receipt {}", row.trip_id, row.id)))?;

        Ok(Receipt {
            id: row.id,
            uuid: parse_uuid(row.uuid),
            trip,
            name: row.name,
            date: row.date,
            timezone: row.timezone,
            price: Amount::from_raw(row.price),
            tax: Amount::from_raw(row.tax),
            currency: row.currency,
            category: row
                .category_id
                .and_then(|id| lookups.categories.get(&id).cloned()),
            payment_method: row
                .payment_method_id
                .and_then(|id| lookups.methods.get(&id).cloned()),
            comment: row.comment,
            reimbursable: row.reimbursable,
            file: row.file,
            custom_order_id: row.custom_order_id,
            sync_state: SyncState::at(row.last_local_modification_time),
        })
    }
}

impl Table for ReceiptTable<'_> {
    type Entity = Receipt;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn get_all(&self) -> Result<Vec<Receipt>> {
        let rows = {
            let mut stmt = self
                .db
                .connection()
                .prepare(&format!("{SELECT} ORDER BY id"))?;
            let rows = stmt
                .query_map([], Self::parse_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            rows
        };

        let lookups = self.lookups()?;
        rows.into_iter()
            .map(|row| Self::assemble(row, &lookups))
            .collect()
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Receipt>> {
        let row = self
            .db
            .connection()
            .query_row(&format!("{SELECT} WHERE id = ?"), [id], Self::parse_row)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };

        let lookups = self.lookups()?;
        Self::assemble(row, &lookups).map(Some)
    }

    fn insert(&self, entity: &Receipt, family: OperationFamily) -> Result<Receipt> {
        let uuid = uuid_for_insert(entity.uuid);
        self.db.connection().execute(
            "INSERT INTO receipts (
                uuid, trip_id, name, date, timezone, price, tax, currency, category_id,
                payment_method_id, comment, reimbursable, file, custom_order_id,
                last_local_modification_time
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                uuid.to_string(),
                entity.trip.id,
                entity.name,
                entity.date,
                entity.timezone,
                entity.price.raw(),
                entity.tax.raw(),
                entity.currency,
                entity.category.as_ref().map(|category| category.id),
                entity.payment_method.as_ref().map(|method| method.id),
                entity.comment,
                i32::from(entity.reimbursable),
                entity.file,
                entity.custom_order_id,
                entity.sync_state.last_local_modification_time,
            ],
        )?;
        let id = self.db.connection().last_insert_rowid();
        emit(self.db, TABLE, WriteAction::Insert, Some(id), family);

        Ok(Receipt {
            id,
            uuid,
            ..entity.clone()
        })
    }

    fn update(&self, old: &Receipt, new: &Receipt, family: OperationFamily) -> Result<Receipt> {
        let rows = self.db.connection().execute(
            "UPDATE receipts
             SET uuid = ?, trip_id = ?, name = ?, date = ?, timezone = ?, price = ?, tax = ?,
                 currency = ?, category_id = ?, payment_method_id = ?, comment = ?,
                 reimbursable = ?, file = ?, custom_order_id = ?, last_local_modification_time = ?
             WHERE id = ?",
            params![
                uuid_for_update(old.uuid, new.uuid).to_string(),
                new.trip.id,
                new.name,
                new.date,
                new.timezone,
                new.price.raw(),
                new.tax.raw(),
                new.currency,
                new.category.as_ref().map(|category| category.id),
                new.payment_method.as_ref().map(|method| method.id),
                new.comment,
                i32::from(new.reimbursable),
                new.file,
                new.custom_order_id,
                new.sync_state.last_local_modification_time,
                old.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("receipt {}", old.id)));
        }
        emit(self.db, TABLE, WriteAction::Update, Some(old.id), family);

        self.find_by_id(old.id)?
            .ok_or_else(|| Error::NotFound(format!("receipt {}", old.id)))
    }

    fn delete_all(&self, family: OperationFamily) -> Result<usize> {
        delete_all_rows(self.db, TABLE, family)
    }
}
