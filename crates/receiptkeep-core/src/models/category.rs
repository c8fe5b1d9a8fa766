//! Category model

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_uuid, Entity, SyncState};

/// Expense category with a short accounting code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub uuid: Uuid,
    /// Display name (e.g. "Meals")
    pub name: String,
    /// Accounting code (e.g. "MEAL")
    pub code: String,
    pub custom_order_id: i64,
    pub sync_state: SyncState,
}

impl Category {
    /// Create an unsaved category
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: 0,
            uuid: new_uuid(),
            name: name.into(),
            code: code.into(),
            custom_order_id: 0,
            sync_state: SyncState::now(),
        }
    }

    /// Duplicate iff both name and code match
    #[must_use]
    pub fn is_same_category(&self, other: &Self) -> bool {
        self.code == other.code && self.name == other.name
    }
}

impl Entity for Category {
    const KIND: &'static str = "category";

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
