//! Category table

use rusqlite::{params, OptionalExtension};

use super::{delete_all_rows, emit, parse_uuid, uuid_for_insert, uuid_for_update, Table};
use crate::db::event::{OperationFamily, WriteAction};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Category, SyncState};

const TABLE: &str = "categories";
const SELECT: &str =
    "SELECT id, uuid, name, code, custom_order_id, last_local_modification_time FROM categories";

/// `SQLite` table of receipt categories
pub struct CategoryTable<'a> {
    db: &'a Database,
}

impl<'a> CategoryTable<'a> {
    /// Create a new table view over the given database
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
        Ok(Category {
            id: row.get(0)?,
            uuid: parse_uuid(row.get(1)?),
            name: row.get(2)?,
            code: row.get(3)?,
            custom_order_id: row.get(4)?,
            sync_state: SyncState::at(row.get(5)?),
        })
    }
}

impl Table for CategoryTable<'_> {
    type Entity = Category;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn get_all(&self) -> Result<Vec<Category>> {
        let mut stmt = self
            .db
            .connection()
            .prepare(&format!("{SELECT} ORDER BY id"))?;
        let categories = stmt
            .query_map([], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(categories)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Category>> {
        let category = self
            .db
            .connection()
            .query_row(&format!("{SELECT} WHERE id = ?"), [id], Self::parse_row)
            .optional()?;
        Ok(category)
    }

    fn insert(&self, entity: &Category, family: OperationFamily) -> Result<Category> {
        let uuid = uuid_for_insert(entity.uuid);
        self.db.connection().execute(
            "INSERT INTO categories (uuid, name, code, custom_order_id, last_local_modification_time)
             VALUES (?, ?, ?, ?, ?)",
            params![
                uuid.to_string(),
                entity.name,
                entity.code,
                entity.custom_order_id,
                entity.sync_state.last_local_modification_time,
            ],
        )?;
        let id = self.db.connection().last_insert_rowid();
        emit(self.db, TABLE, WriteAction::Insert, Some(id), family);

        Ok(Category {
            id,
            uuid,
            ..entity.clone()
        })
    }

    fn update(&self, old: &Category, new: &Category, family: OperationFamily) -> Result<Category> {
        let rows = self.db.connection().execute(
            "UPDATE categories
             SET uuid = ?, name = ?, code = ?, custom_order_id = ?, last_local_modification_time = ?
             WHERE id = ?",
            params![
                uuid_for_update(old.uuid, new.uuid).to_string(),
                new.name,
                new.code,
                new.custom_order_id,
                new.sync_state.last_local_modification_time,
                old.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("category {}", old.id)));
        }
        emit(self.db, TABLE, WriteAction::Update, Some(old.id), family);

        self.find_by_id(old.id)?
            .ok_or_else(|| Error::NotFound(format!("category {}", old.id)))
    }

    fn delete_all(&self, family: OperationFamily) -> Result<usize> {
        delete_all_rows(self.db, TABLE, family)
    }
}
