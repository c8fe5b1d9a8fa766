//! Duplicate detection between imported and destination rows

use serde::{Deserialize, Serialize};

use crate::db::DATABASE_VERSION_WITH_UUIDS;
use crate::models::{Distance, Entity, Receipt};

/// Identity rules used to decide whether an imported child row already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// Backup predates stable UUIDs; match on natural keys and never update
    Legacy,
    /// Match on (trip name, uuid); newer imported rows replace existing ones
    Uuid,
}

impl MatchPolicy {
    /// Pick the policy from the backup's pre-migration schema version
    pub const fn for_schema_version(original_schema_version: i32) -> Self {
        if original_schema_version < DATABASE_VERSION_WITH_UUIDS {
            Self::Legacy
        } else {
            Self::Uuid
        }
    }

    /// Legacy key is (trip name, location, date)
    pub fn is_duplicate_distance(self, existing: &Distance, imported: &Distance) -> bool {
        if existing.trip.name != imported.trip.name {
            return false;
        }
        match self {
            Self::Legacy => {
                existing.location == imported.location && existing.date == imported.date
            }
            Self::Uuid => same_uuid(existing, imported),
        }
    }

    /// Legacy key is (trip name, date)
    pub fn is_duplicate_receipt(self, existing: &Receipt, imported: &Receipt) -> bool {
        if existing.trip.name != imported.trip.name {
            return false;
        }
        match self {
            Self::Legacy => existing.date == imported.date,
            Self::Uuid => same_uuid(existing, imported),
        }
    }

    /// Whether a matched imported row replaces the destination row
    ///
    /// Legacy rows never do; otherwise the strictly newer modification wins.
    pub fn should_update<E: Entity>(self, existing: &E, imported: &E) -> bool {
        match self {
            Self::Legacy => false,
            Self::Uuid => imported.sync_state().is_newer_than(existing.sync_state()),
        }
    }
}

fn same_uuid<E: Entity>(existing: &E, imported: &E) -> bool {
    existing.uuid() == imported.uuid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Amount, SyncState, Trip};

    #[test]
    fn test_policy_boundary() {
        assert_eq!(MatchPolicy::for_schema_version(0), MatchPolicy::Legacy);
        assert_eq!(MatchPolicy::for_schema_version(18), MatchPolicy::Legacy);
        assert_eq!(MatchPolicy::for_schema_version(19), MatchPolicy::Uuid);
        assert_eq!(MatchPolicy::for_schema_version(20), MatchPolicy::Uuid);
    }

    #[test]
    fn test_distance_rules_differ_by_policy() {
        let trip = Trip::new("Denver", 0, 10);
        let existing = Distance::new(&trip, "Office", Amount::from_units_cents(10, 0), 5);
        let same_place_new_uuid = Distance::new(&trip, "Office", Amount::from_units_cents(12, 0), 5);
        let same_uuid_moved = Distance {
            location: "Client site".to_string(),
            ..existing.clone()
        };

        assert!(MatchPolicy::Legacy.is_duplicate_distance(&existing, &same_place_new_uuid));
        assert!(!MatchPolicy::Uuid.is_duplicate_distance(&existing, &same_place_new_uuid));
        assert!(!MatchPolicy::Legacy.is_duplicate_distance(&existing, &same_uuid_moved));
        assert!(MatchPolicy::Uuid.is_duplicate_distance(&existing, &same_uuid_moved));
    }

    #[test]
    fn test_receipt_requires_same_trip_name() {
        let denver = Trip::new("Denver", 0, 10);
        let boston = Trip::new("Boston", 0, 10);
        let existing = Receipt::new(&denver, "Lunch", Amount::from_units_cents(9, 0), 5);
        let elsewhere = Receipt {
            trip: boston,
            ..existing.clone()
        };

        assert!(!MatchPolicy::Legacy.is_duplicate_receipt(&existing, &elsewhere));
        assert!(!MatchPolicy::Uuid.is_duplicate_receipt(&existing, &elsewhere));
    }

    #[test]
    fn test_only_strictly_newer_rows_update() {
        let trip = Trip::new("Denver", 0, 10);
        let mut existing = Receipt::new(&trip, "Lunch", Amount::from_units_cents(9, 0), 5);
        existing.sync_state = SyncState::at(2_000);
        let at = |millis| Receipt {
            sync_state: SyncState::at(millis),
            ..existing.clone()
        };

        assert!(MatchPolicy::Uuid.should_update(&existing, &at(3_000)));
        assert!(!MatchPolicy::Uuid.should_update(&existing, &at(2_000)));
        assert!(!MatchPolicy::Uuid.should_update(&existing, &at(1_000)));
        assert!(!MatchPolicy::Legacy.should_update(&existing, &at(3_000)));
    }
}
