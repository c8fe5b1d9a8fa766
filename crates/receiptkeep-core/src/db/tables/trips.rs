//! Trip table

use rusqlite::{params, OptionalExtension};

use super::{delete_all_rows, emit, parse_uuid, uuid_for_insert, uuid_for_update, Table};
use crate::db::event::{OperationFamily, WriteAction};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{SyncState, Trip};

const TABLE: &str = "trips";
const SELECT: &str = "SELECT id, uuid, name, start_date, start_timezone, end_date, end_timezone,
            directory, default_currency, comment, cost_center, last_local_modification_time
     FROM trips";

/// `SQLite` table of trips
pub struct TripTable<'a> {
    db: &'a Database,
}

impl<'a> TripTable<'a> {
    /// Create a new table view over the given database
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Trip> {
        Ok(Trip {
            id: row.get(0)?,
            uuid: parse_uuid(row.get(1)?),
            name: row.get(2)?,
            start_date: row.get(3)?,
            start_timezone: row.get(4)?,
            end_date: row.get(5)?,
            end_timezone: row.get(6)?,
            directory: row.get(7)?,
            default_currency: row.get(8)?,
            comment: row.get(9)?,
            cost_center: row.get(10)?,
            sync_state: SyncState::at(row.get(11)?),
        })
    }
}

impl Table for TripTable<'_> {
    type Entity = Trip;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn get_all(&self) -> Result<Vec<Trip>> {
        let mut stmt = self
            .db
            .connection()
            .prepare(&format!("{SELECT} ORDER BY id"))?;
        let trips = stmt
            .query_map([], Self::parse_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(trips)
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Trip>> {
        let trip = self
            .db
            .connection()
            .query_row(&format!("{SELECT} WHERE id = ?"), [id], Self::parse_row)
            .optional()?;
        Ok(trip)
    }

    fn insert(&self, entity: &Trip, family: OperationFamily) -> Result<Trip> {
        let uuid = uuid_for_insert(entity.uuid);
        self.db.connection().execute(
            "INSERT INTO trips (
                uuid, name, start_date, start_timezone, end_date, end_timezone,
                directory, default_currency, comment, cost_center, last_local_modification_time
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                uuid.to_string(),
                entity.name,
                entity.start_date,
                entity.start_timezone,
                entity.end_date,
                entity.end_timezone,
                entity.directory,
                entity.default_currency,
                entity.comment,
                entity.cost_center,
                entity.sync_state.last_local_modification_time,
            ],
        )?;
        let id = self.db.connection().last_insert_rowid();
        emit(self.db, TABLE, WriteAction::Insert, Some(id), family);

        Ok(Trip {
            id,
            uuid,
            ..entity.clone()
        })
    }

    fn update(&self, old: &Trip, new: &Trip, family: OperationFamily) -> Result<Trip> {
        let rows = self.db.connection().execute(
            "UPDATE trips
             SET uuid = ?, name = ?, start_date = ?, start_timezone = ?, end_date = ?,
                 end_timezone = ?, directory = ?, default_currency = ?, comment = ?,
                 cost_center = ?, last_local_modification_time = ?
             WHERE id = ?",
            params![
                uuid_for_update(old.uuid, new.uuid).to_string(),
                new.name,
                new.start_date,
                new.start_timezone,
                new.end_date,
                new.end_timezone,
                new.directory,
                new.default_currency,
                new.comment,
                new.cost_center,
                new.sync_state.last_local_modification_time,
                old.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("trip {}", old.id)));
        }
        emit(self.db, TABLE, WriteAction::Update, Some(old.id), family);

        self.find_by_id(old.id)?
            .ok_or_else(|| Error::NotFound(format!("trip {}", old.id)))
    }

    fn delete_all(&self, family: OperationFamily) -> Result<usize> {
        delete_all_rows(self.db, TABLE, family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_names_are_unique() {
        let db = Database::open_in_memory().unwrap();
        let table = db.trips();

        table
            .insert(&Trip::new("Paris", 0, 1), OperationFamily::User)
            .unwrap();
        let duplicate = table.insert(&Trip::new("Paris", 2, 3), OperationFamily::User);

        assert!(matches!(duplicate, Err(Error::Sqlite(_))));
        assert_eq!(table.get_all().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_all_cascades_to_children() {
        let db = Database::open_in_memory().unwrap();
        let trip = db
            .trips()
            .insert(&Trip::new("Paris", 0, 1), OperationFamily::User)
            .unwrap();
        db.receipts()
            .insert(
                &crate::models::Receipt::new(&trip, "Taxi", crate::models::Amount::from_raw(1), 0),
                OperationFamily::User,
            )
            .unwrap();

        db.trips().delete_all(OperationFamily::User).unwrap();

        assert!(db.receipts().get_all().unwrap().is_empty());
    }
}
