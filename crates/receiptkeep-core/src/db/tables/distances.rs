//! Distance table

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};

use super::{delete_all_rows, emit, parse_uuid, uuid_for_insert, uuid_for_update, Table};
use crate::db::event::{OperationFamily, WriteAction};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{Amount, Distance, PaymentMethod, SyncState, Trip};

const TABLE: &str = "distances";
const SELECT: &str = "SELECT id, uuid, trip_id, location, distance, date, timezone, rate,
            rate_currency, comment, payment_method_id, last_local_modification_time
     FROM distances";

/// Distance row before its trip and payment method are attached
struct DistanceRow {
    id: i64,
    uuid: Option<String>,
    trip_id: i64,
    location: String,
    distance: i64,
    date: i64,
    timezone: String,
    rate: i64,
    rate_currency: String,
    comment: String,
    payment_method_id: Option<i64>,
    last_local_modification_time: i64,
}

/// `SQLite` table of distances; rows are returned with their trip and payment method
pub struct DistanceTable<'a> {
    db: &'a Database,
}

impl<'a> DistanceTable<'a> {
    /// Create a new table view over the given database
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DistanceRow> {
        Ok(DistanceRow {
            id: row.get(0)?,
            uuid: row.get(1)?,
            trip_id: row.get(2)?,
            location: row.get(3)?,
            distance: row.get(4)?,
            date: row.get(5)?,
            timezone: row.get(6)?,
            rate: row.get(7)?,
            rate_currency: row.get(8)?,
            comment: row.get(9)?,
            payment_method_id: row.get(10)?,
            last_local_modification_time: row.get(11)?,
        })
    }

    fn assemble(
        row: DistanceRow,
        trips: &HashMap<i64, Trip>,
        methods: &HashMap<i64, PaymentMethod>,
    ) -> Result<Distance> {
        let trip = trips
            .get(&row.trip_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("trip {} for distance {}", row.trip_id, row.id)))?;
        let payment_method = row
            .payment_method_id
            .and_then(|id| methods.get(&id).cloned());

        Ok(Distance {
            id: row.id,
            uuid: parse_uuid(row.uuid),
            trip,
            location: row.location,
            distance: Amount::from_raw(row.distance),
            date: row.date,
            timezone: row.timezone,
            rate: Amount::from_raw(row.rate),
            rate_currency: row.rate_currency,
            comment: row.comment,
            payment_method,
            sync_state: SyncState::at(row.last_local_modification_time),
        })
    }

    fn lookups(&self) -> Result<(HashMap<i64, Trip>, HashMap<i64, PaymentMethod>)> {
        let trips = self
            .db
            .trips()
            .get_all()?
            .into_iter()
            .map(|trip| (trip.id, trip))
            .collect();
        let methods = self
            .db
            .payment_methods()
            .get_all()?
            .into_iter()
            .map(|method| (method.id, method))
            .collect();
        Ok((trips, methods))
    }
}

impl Table for DistanceTable<'_> {
    type Entity = Distance;

    fn name(&self) -> &'static str {
        TABLE
    }

    fn get_all(&self) -> Result<Vec<Distance>> {
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

        let (trips, methods) = self.lookups()?;
        rows.into_iter()
            .map(|row| Self::assemble(row, &trips, &methods))
            .collect()
    }

    fn find_by_id(&self, id: i64) -> Result<Option<Distance>> {
        let row = self
            .db
            .connection()
            .query_row(&format!("{SELECT} WHERE id = ?"), [id], Self::parse_row)
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };

        let (trips, methods) = self.lookups()?;
        Self::assemble(row, &trips, &methods).map(Some)
    }

    fn insert(&self, entity: &Distance, family: OperationFamily) -> Result<Distance> {
        let uuid = uuid_for_insert(entity.uuid);
        self.db.connection().execute(
            "INSERT INTO distances (
                uuid, trip_id, location, distance, date, timezone, rate, rate_currency,
                comment, payment_method_id, last_local_modification_time
             ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                uuid.to_string(),
                entity.trip.id,
                entity.location,
                entity.distance.raw(),
                entity.date,
                entity.timezone,
                entity.rate.raw(),
                entity.rate_currency,
                entity.comment,
                entity.payment_method.as_ref().map(|method| method.id),
                entity.sync_state.last_local_modification_time,
            ],
        )?;
        let id = self.db.connection().last_insert_rowid();
        emit(self.db, TABLE, WriteAction::Insert, Some(id), family);

        Ok(Distance {
            id,
            uuid,
            ..entity.clone()
        })
    }

    fn update(&self, old: &Distance, new: &Distance, family: OperationFamily) -> Result<Distance> {
        let rows = self.db.connection().execute(
            "UPDATE distances
             SET uuid = ?, trip_id = ?, location = ?, distance = ?, date = ?, timezone = ?,
                 rate = ?, rate_currency = ?, comment = ?, payment_method_id = ?,
                 last_local_modification_time = ?
             WHERE id = ?",
            params![
                uuid_for_update(old.uuid, new.uuid).to_string(),
                new.trip.id,
                new.location,
                new.distance.raw(),
                new.date,
                new.timezone,
                new.rate.raw(),
                new.rate_currency,
                new.comment,
                new.payment_method.as_ref().map(|method| method.id),
                new.sync_state.last_local_modification_time,
                old.id,
            ],
        )?;
        if rows == 0 {
            return Err(Error::NotFound(format!("distance {}", old.id)));
        }
        emit(self.db, TABLE, WriteAction::Update, Some(old.id), family);

        self.find_by_id(old.id)?
            .ok_or_else(|| Error::NotFound(format!("distance {}", old.id)))
    }

    fn delete_all(&self, family: OperationFamily) -> Result<usize> {
        delete_all_rows(self.db, TABLE, family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_with_references() {
        let db = Database::open_in_memory().unwrap();
        let trip = db
            .trips()
            .insert(&Trip::new("Berlin", 0, 10), OperationFamily::User)
            .unwrap();
        let card = db
            .payment_methods()
            .insert(&PaymentMethod::new("Card"), OperationFamily::User)
            .unwrap();

        let mut distance = Distance::new(&trip, "Airport", Amount::from_units_cents(42, 0), 5);
        distance.rate = Amount::from_raw(6_550);
        distance.payment_method = Some(card.clone());
        let inserted = db
            .distances()
            .insert(&distance, OperationFamily::User)
            .unwrap();

        let fetched = db.distances().find_by_id(inserted.id).unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.trip.name, "Berlin");
        assert_eq!(fetched.payment_method, Some(card));
        assert_eq!(fetched.rate, Amount::from_raw(6_550));
    }

    #[test]
    fn test_unknown_trip_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let orphan_trip = Trip {
            id: 99,
            ..Trip::new("Nowhere", 0, 1)
        };

        let result = db.distances().insert(
            &Distance::new(&orphan_trip, "Somewhere", Amount::default(), 0),
            OperationFamily::User,
        );
        assert!(matches!(result, Err(Error::Sqlite(_))));
    }
}
