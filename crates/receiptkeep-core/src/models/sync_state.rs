//! Sync bookkeeping attached to every entity

use serde::{Deserialize, Serialize};

/// Sync metadata used to resolve import conflicts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    /// Last time the row was modified on this device (Unix ms)
    pub last_local_modification_time: i64,
}

impl SyncState {
    /// Sync state stamped with the current time
    #[must_use]
    pub fn now() -> Self {
        Self {
            last_local_modification_time: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Sync state stamped with the given Unix ms timestamp
    #[must_use]
    pub const fn at(last_local_modification_time: i64) -> Self {
        Self {
            last_local_modification_time,
        }
    }

    /// Strictly later than `other`; equal timestamps are not newer.
    #[must_use]
    pub const fn is_newer_than(&self, other: &Self) -> bool {
        self.last_local_modification_time > other.last_local_modification_time
    }
}
