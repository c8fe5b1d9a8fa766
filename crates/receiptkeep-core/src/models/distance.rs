//! Distance (mileage) model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_uuid, Amount, Entity, PaymentMethod, SyncState, Trip};

/// A mileage entry belonging to a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distance {
    pub id: i64,
    pub uuid: Uuid,
    /// Owning trip, as stored in the same database as this distance
    pub trip: Trip,
    pub location: String,
    /// Distance travelled
    pub distance: Amount,
    /// Date travelled (Unix ms)
    pub date: i64,
    pub timezone: String,
    /// Reimbursement rate per unit of distance
    pub rate: Amount,
    pub rate_currency: String,
    pub comment: String,
    pub payment_method: Option<PaymentMethod>,
    pub sync_state: SyncState,
}

impl Distance {
    /// Create an unsaved distance for `trip`
    #[must_use]
    pub fn new(trip: &Trip, location: impl Into<String>, distance: Amount, date: i64) -> Self {
        Self {
            id: 0,
            uuid: new_uuid(),
            trip: trip.clone(),
            location: location.into(),
            distance,
            date,
            timezone: trip.start_timezone.clone(),
            rate: Amount::default(),
            rate_currency: trip.default_currency.clone(),
            comment: String::new(),
            payment_method: None,
            sync_state: SyncState::now(),
        }
    }
}

impl Entity for Distance {
    const KIND: &'static str = "distance";

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
