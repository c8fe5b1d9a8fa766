//! CSV/PDF column tables

use rusqlite::{params, OptionalExtension};

use super::{delete_all_rows, emit, parse_uuid, uuid_for_insert, uuid_for_update, Table};
use crate::db::event::{OperationFamily, WriteAction};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Column, ColumnFormat, SyncState};

/// `SQLite` table holding the column list of one report format
pub struct ColumnTable<'a> {
    db: &'a Database,
    format: ColumnFormat,
}

impl<'a> ColumnTable<'a> {
    /// Create a new table view for `format`
    pub const fn new(db: &'a Database, format: ColumnFormat) -> Self {
        Self { db, format }
    }

    fn select(&self) -> String {
        format!(
            "SELECT id, uuid, column_type, custom_order_id, last_local_modification_time FROM {}",
            self.format.table_name()
        )
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Column> {
        Ok(Column {
            id: row.get(0)?,
            uuid: parse_uuid(row.get(1)?),
            column_type: row.get(2)?,
            custom_order_id: row.get(3)?,
            sync_state: SyncState::at(row.get(4)?),
        })
    }
}

impl Table for ColumnTable<'_> {
    type Entity = Column;

    fn name(&self) -> &'static str {
        self.format.table_name()
    }

    fn get_all(&self) -> Result<Vec<Column>> {
        let mut stmt = self
            .db
            .connection()
            .prepare(&format!("{} ORDER BY custom_order_id, id", self.select()))?;
        let columns = stmt
            .query_map([], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(columns)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Column>> {
        let column = self
            .db
            .connection()
            .query_row(
                &format!("{} WHERE id = ?", self.select()),
                [id],
                Self::parse_row,
            )
            .optional()?;
        Ok(column)
    }

    fn insert(&self, entity: &Column, family: OperationFamily) -> Result<Column> {
        let uuid = uuid_for_insert(entity.uuid);
        self.db.connection().execute(
            &format!(
                "INSERT INTO {} (uuid, column_type, custom_order_id, last_local_modification_time)
                 VALUES (?, ?, ?, ?)",
                self.name()
            ),
            params![
                uuid.to_string(),
                entity.column_type,
                entity.custom_order_id,
                entity.sync_state.last_local_modification_time,
            ],
        )?;
        let id = self.db.connection().last_insert_rowid();
        emit(self.db, self.name(), WriteAction::Insert, Some(id), family);

        Ok(Column {
            id,
            uuid,
            ..entity.clone()
        })
    }

    fn update(&self, old: &Column, new: &Column, family: OperationFamily) -> Result<Column> {
        let rows = self.db.connection().execute(
            &format!(
                "UPDATE {}
                 SET uuid = ?, column_type = ?, custom_order_id = ?, last_local_modification_time = ?
                 WHERE id = ?",
                self.name()
            ),
            params![
                uuid_for_update(old.uuid, new.uuid).to_string(),
                new.column_type,
                new.custom_order_id,
                new.sync_state.last_local_modification_time,
                old.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("{} column {}", self.name(), old.id)));
        }
        emit(self.db, self.name(), WriteAction::Update, Some(old.id), family);

        self.find_by_id(old.id)?
            .ok_or_else(|| Error::NotFound(format!("{} column {}", self.name(), old.id)))
    }

    fn delete_all(&self, family: OperationFamily) -> Result<usize> {
        delete_all_rows(self.db, self.name(), family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats_are_separate_tables() {
        let db = Database::open_in_memory().unwrap();

        db.columns(ColumnFormat::Csv)
            .insert(&Column::new("Name", 1), OperationFamily::User)
            .unwrap();
        db.columns(ColumnFormat::Pdf)
            .insert(&Column::new("Price", 1), OperationFamily::User)
            .unwrap();
        db.columns(ColumnFormat::Pdf)
            .insert(&Column::new("Date", 2), OperationFamily::User)
            .unwrap();

        assert_eq!(db.columns(ColumnFormat::Csv).get_all().unwrap().len(), 1);
        let pdf = db.columns(ColumnFormat::Pdf).get_all().unwrap();
        assert_eq!(
            pdf.iter().map(|c| c.column_type.as_str()).collect::<Vec<_>>(),
            vec!["Price", "Date"]
        );
    }

    #[test]
    fn test_get_all_orders_by_custom_order() {
        let db = Database::open_in_memory().unwrap();
        let table = db.columns(ColumnFormat::Csv);

        table
            .insert(&Column::new("Tax", 3), OperationFamily::User)
            .unwrap();
        table
            .insert(&Column::new("Name", 1), OperationFamily::User)
            .unwrap();

        let columns = table.get_all().unwrap();
        assert_eq!(columns[0].column_type, "Name");
        assert_eq!(columns[1].column_type, "Tax");
    }
}
