//! Payment method model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_uuid, Entity, SyncState};

/// A way of paying for an expense (e.g. "Corporate Card")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    /// Local primary key
    pub id: i64,
    /// Stable identity
    pub uuid: Uuid,
    /// Display label; the natural key used when merging backups
    pub method: String,
    /// Whether expenses paid this way are reimbursable by default
    pub reimbursable: bool,
    /// Position in the user's ordering
    pub custom_order_id: i64,
    pub sync_state: SyncState,
}

impl PaymentMethod {
    /// Create an unsaved payment method
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            id: 0,
            uuid: new_uuid(),
            method: method.into(),
            reimbursable: false,
            custom_order_id: 0,
            sync_state: SyncState::now(),
        }
    }

    /// Same label, which is what a backup merge treats as a duplicate
    #[must_use]
    pub fn is_same_method(&self, other: &Self) -> bool {
        self.method == other.method
    }
}

impl Entity for PaymentMethod {
    const KIND: &'static str = "payment method";

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_method_is_exact_label_match() {
        let card = PaymentMethod::new("Corporate Card");

        assert!(card.is_same_method(&PaymentMethod::new("Corporate Card")));
        assert!(!card.is_same_method(&PaymentMethod::new("corporate card")));
    }
}
