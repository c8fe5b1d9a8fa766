//! Receipt model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_uuid, Amount, Category, Entity, PaymentMethod, SyncState, Trip};

/// An expense receipt belonging to a trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub id: i64,
    pub uuid: Uuid,
    /// Owning trip, as stored in the same database as this receipt
    pub trip: Trip,
    pub name: String,
    /// Purchase date (Unix ms)
    pub date: i64,
    pub timezone: String,
    pub price: Amount,
    pub tax: Amount,
    /// ISO 4217 code of `price` and `tax`
    pub currency: String,
    pub category: Option<Category>,
    pub payment_method: Option<PaymentMethod>,
    pub comment: String,
    pub reimbursable: bool,
    /// Attached image/PDF file name inside the trip directory
    pub file: Option<String>,
    /// Position within the trip's receipt list; local UI state
    pub custom_order_id: i64,
    pub sync_state: SyncState,
}

impl Receipt {
    /// Create an unsaved receipt for `trip`
    #[must_use]
    pub fn new(trip: &Trip, name: impl Into<String>, price: Amount, date: i64) -> Self {
        Self {
            id: 0,
            uuid: new_uuid(),
            trip: trip.clone(),
            name: name.into(),
            date,
            timezone: trip.start_timezone.clone(),
            price,
            tax: Amount::default(),
            currency: trip.default_currency.clone(),
            category: None,
            payment_method: None,
            comment: String::new(),
            reimbursable: true,
            file: None,
            custom_order_id: 0,
            sync_state: SyncState::now(),
        }
    }
}

impl Entity for Receipt {
    const KIND: &'static str = "receipt";

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
