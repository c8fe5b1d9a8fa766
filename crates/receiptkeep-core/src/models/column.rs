//! Export column configuration

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{new_uuid, Entity, SyncState};

/// Report format a column list belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnFormat {
    Csv,
    Pdf,
}

impl ColumnFormat {
    /// Backing table name
    #[must_use]
    pub const fn table_name(self) -> &'static str {
        match self {
            Self::Csv => "csv_columns",
            Self::Pdf => "pdf_columns",
        }
    }
}

/// One column of a CSV or PDF receipt report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: i64,
    pub uuid: Uuid,
    /// Column kind identifier (e.g. "Name", "Price", "Category Code")
    pub column_type: String,
    pub custom_order_id: i64,
    pub sync_state: SyncState,
}

impl Column {
    /// Create an unsaved column at position `custom_order_id`
    #[must_use]
    pub fn new(column_type: impl Into<String>, custom_order_id: i64) -> Self {
        Self {
            id: 0,
            uuid: new_uuid(),
            column_type: column_type.into(),
            custom_order_id,
            sync_state: SyncState::now(),
        }
    }
}

impl Entity for Column {
    const KIND: &'static str = "column";

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
