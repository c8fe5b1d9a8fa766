//! Data models for receiptkeep

mod amount;
mod category;
mod column;
mod distance;
mod payment_method;
mod receipt;
mod sync_state;
mod trip;

pub use amount::Amount;
pub use category::Category;
pub use column::{Column, ColumnFormat};
pub use distance::Distance;
pub use payment_method::PaymentMethod;
pub use receipt::Receipt;
pub use sync_state::SyncState;
pub use trip::Trip;

use uuid::Uuid;

/// UUID value carried by rows that predate stable identities
pub const MISSING_UUID: Uuid = Uuid::nil();

/// Identity shared by every persisted record
pub trait Entity: Clone {
    /// Human-readable entity type name, used in logs and errors
    const KIND: &'static str;

    /// Local primary key; only meaningful within the database the row was read from
    fn local_id(&self) -> i64;

    /// Stable cross-database identity
    fn uuid(&self) -> Uuid;

    /// Sync bookkeeping for conflict resolution
    fn sync_state(&self) -> &SyncState;
}

/// Mint a new time-ordered UUID
#[must_use]
pub fn new_uuid() -> Uuid {
    Uuid::now_v7()
}
