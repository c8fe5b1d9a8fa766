//! Trip model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_uuid, Entity, SyncState};

/// A report period that owns receipts and distances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub uuid: Uuid,
    /// Trip name; unique per user and the legacy natural key
    pub name: String,
    /// Start date (Unix ms)
    pub start_date: i64,
    /// IANA timezone the start date was recorded in
    pub start_timezone: String,
    /// End date (Unix ms)
    pub end_date: i64,
    pub end_timezone: String,
    /// Directory holding the trip's attachments, relative to the data dir
    pub directory: String,
    /// ISO 4217 code used for new receipts
    pub default_currency: String,
    pub comment: String,
    pub cost_center: String,
    pub sync_state: SyncState,
}

impl Trip {
    /// Create an unsaved trip spanning `start_date..=end_date` (Unix ms, UTC)
    #[must_use]
    pub fn new(name: impl Into<String>, start_date: i64, end_date: i64) -> Self {
        let name = name.into();
        Self {
            id: 0,
            uuid: new_uuid(),
            directory: name.clone(),
            name,
            start_date,
            start_timezone: "UTC".to_string(),
            end_date,
            end_timezone: "UTC".to_string(),
            default_currency: "USD".to_string(),
            comment: String::new(),
            cost_center: String::new(),
            sync_state: SyncState::now(),
        }
    }
}

impl Entity for Trip {
    const KIND: &'static str = "trip";

    fn local_id(&self) -> i64 {
        self.id
    }

    fn uuid(&self) -> Uuid {
        self.uuid
    }

    fn sync_state(&self) -> &SyncState {
        &self.sync_state
    }
}
