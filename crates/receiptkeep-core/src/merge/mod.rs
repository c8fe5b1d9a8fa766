//! Merging a backup database into the live database
//!
//! Entity types are processed strictly in dependency order: columns, payment
//! methods, categories, trips, distances, receipts. Each phase returns the
//! remap table later phases use to point foreign keys at destination rows.
//!
//! There is no global transaction. A failed write aborts the merge and every
//! write committed before it stays committed.

mod matching;
mod overwrite;
mod reconcile;
mod remap;
#[cfg(test)]
mod test_support;

pub use matching::MatchPolicy;
pub use overwrite::FullOverwriteMerge;
pub use reconcile::RowReconcilingMerge;
pub use remap::RemapTable;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::backup::BackupDatabase;
use crate::db::Database;
use crate::error::{Error, Result};

/// Which merge strategy to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Keep existing data, add what is missing, apply newer imported rows
    #[default]
    Reconcile,
    /// Replace the destination with the backup's contents
    Overwrite,
}

impl MergeMode {
    /// Strategy implementing this mode
    pub fn strategy(self) -> Arc<dyn MergeStrategy> {
        match self {
            Self::Reconcile => Arc::new(RowReconcilingMerge),
            Self::Overwrite => Arc::new(FullOverwriteMerge),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reconcile => "reconcile",
            Self::Overwrite => "overwrite",
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reconcile" | "merge" => Ok(Self::Reconcile),
            "overwrite" | "replace" => Ok(Self::Overwrite),
            other => Err(Error::InvalidInput(format!("Unknown merge mode: {other}"))),
        }
    }
}

/// Outcome counts for one entity type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PhaseCounts {
    /// Imported rows written as new destination rows
    pub inserted: usize,
    /// Existing destination rows overwritten with newer imported values
    pub updated: usize,
    /// Imported rows discarded in favor of an existing match
    pub skipped: usize,
    /// Destination rows removed before importing
    pub deleted: usize,
}

/// Summary of a completed merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub mode: MergeMode,
    /// Schema version the backup reported before it was upgraded
    pub original_schema_version: i32,
    /// Duplicate-matching rules used; `None` when nothing was matched
    pub match_policy: Option<MatchPolicy>,
    pub columns: PhaseCounts,
    pub payment_methods: PhaseCounts,
    pub categories: PhaseCounts,
    pub trips: PhaseCounts,
    pub distances: PhaseCounts,
    pub receipts: PhaseCounts,
}

impl MergeReport {
    fn new(mode: MergeMode, original_schema_version: i32, match_policy: Option<MatchPolicy>) -> Self {
        Self {
            mode,
            original_schema_version,
            match_policy,
            columns: PhaseCounts::default(),
            payment_methods: PhaseCounts::default(),
            categories: PhaseCounts::default(),
            trips: PhaseCounts::default(),
            distances: PhaseCounts::default(),
            receipts: PhaseCounts::default(),
        }
    }

    fn phases(&self) -> [&PhaseCounts; 6] {
        [
            &self.columns,
            &self.payment_methods,
            &self.categories,
            &self.trips,
            &self.distances,
            &self.receipts,
        ]
    }

    pub fn total_inserted(&self) -> usize {
        self.phases().iter().map(|phase| phase.inserted).sum()
    }

    pub fn total_updated(&self) -> usize {
        self.phases().iter().map(|phase| phase.updated).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.phases().iter().map(|phase| phase.skipped).sum()
    }
}

/// A way of folding an imported database into a destination database
///
/// `merge` is blocking; use [`merge_in_background`] from async code.
pub trait MergeStrategy: Send + Sync {
    fn mode(&self) -> MergeMode;

    /// Merge `imported` into `destination`, tagging every write as an import
    fn merge(&self, destination: &Database, imported: &Database) -> Result<MergeReport>;
}

/// Run `strategy` on the blocking pool, then close the backup handle
///
/// The destination stays locked for the whole merge. The backup is closed
/// whether or not the merge succeeded; a failure to clean it up is only logged.
/// If the strategy panics, dropping the backup still removes its working copy.
pub async fn merge_in_background(
    strategy: Arc<dyn MergeStrategy>,
    destination: Arc<Mutex<Database>>,
    imported: BackupDatabase,
) -> Result<MergeReport> {
    tokio::task::spawn_blocking(move || {
        let result = {
            let destination = destination.blocking_lock();
            strategy.merge(&destination, imported.database())
        };

        if let Err(error) = imported.close() {
            tracing::warn!("Failed to close backup after merge: {}", error);
        }
        result
    })
    .await
    .map_err(|error| Error::Task(error.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::BackupOpener;
    use crate::db::{OperationFamily, Table};
    use crate::models::Trip;
    use tempfile::tempdir;

    #[test]
    fn test_merge_mode_parse() {
        assert_eq!("reconcile".parse::<MergeMode>().unwrap(), MergeMode::Reconcile);
        assert_eq!(" Overwrite ".parse::<MergeMode>().unwrap(), MergeMode::Overwrite);
        assert!("sideways".parse::<MergeMode>().is_err());
    }

    #[test]
    fn test_strategy_matches_mode() {
        assert_eq!(MergeMode::Reconcile.strategy().mode(), MergeMode::Reconcile);
        assert_eq!(MergeMode::Overwrite.strategy().mode(), MergeMode::Overwrite);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_merge_in_background_closes_backup() {
        let tmp = tempdir().unwrap();
        let source = Database::open(tmp.path().join("source.db")).unwrap();
        source
            .trips()
            .insert(&Trip::new("Lisbon", 0, 1), OperationFamily::User)
            .unwrap();
        let backup_path = tmp.path().join("backup.db");
        source.export_to(&backup_path).unwrap();

        let backup = BackupOpener::new(tmp.path().join("work"))
            .open(&backup_path)
            .unwrap();
        let working_copy = backup.working_copy().to_path_buf();
        let destination = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));

        let report = merge_in_background(
            MergeMode::Reconcile.strategy(),
            Arc::clone(&destination),
            backup,
        )
        .await
        .unwrap();

        assert_eq!(report.trips.inserted, 1);
        assert!(!working_copy.exists());
        let trips = destination.lock().await.trips().get_all().unwrap();
        assert_eq!(trips[0].name, "Lisbon");
    }

    struct PanickingMerge;

    impl MergeStrategy for PanickingMerge {
        fn mode(&self) -> MergeMode {
            MergeMode::Reconcile
        }

        fn merge(&self, _destination: &Database, _imported: &Database) -> Result<MergeReport> {
            panic!("merge aborted");
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_panicking_merge_still_removes_working_copy() {
        let tmp = tempdir().unwrap();
        let source = Database::open(tmp.path().join("source.db")).unwrap();
        let backup_path = tmp.path().join("backup.db");
        source.export_to(&backup_path).unwrap();

        let work_dir = tmp.path().join("work");
        let backup = BackupOpener::new(&work_dir).open(&backup_path).unwrap();
        let working_copy = backup.working_copy().to_path_buf();
        let destination = Arc::new(Mutex::new(Database::open_in_memory().unwrap()));

        let result =
            merge_in_background(Arc::new(PanickingMerge), Arc::clone(&destination), backup).await;

        assert!(matches!(result, Err(Error::Task(_))));
        assert!(!working_copy.exists());
        assert_eq!(std::fs::read_dir(&work_dir).unwrap().count(), 0);
        assert!(destination.lock().await.trips().get_all().unwrap().is_empty());
    }
}
