//! Shared database service wrapper used across clients.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, Mutex};

use crate::backup::BackupOpener;
use crate::db::{Database, Table, TableEvent};
use crate::merge::{merge_in_background, MergeMode, MergeReport};
use crate::models::ColumnFormat;
use crate::{Error, Result};

/// Row counts for every entity table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub schema_version: i32,
    pub payment_methods: usize,
    pub categories: usize,
    pub trips: usize,
    pub distances: usize,
    pub receipts: usize,
    pub csv_columns: usize,
    pub pdf_columns: usize,
}

/// Thread-safe service for DB and import operations.
#[derive(Clone)]
pub struct DatabaseService {
    db: Arc<Mutex<Database>>,
    opener: BackupOpener,
}

impl DatabaseService {
    /// Open a database service at the given filesystem path.
    ///
    /// Backups are staged under `work_dir` while they are imported.
    pub async fn open_path(
        db_path: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let path = db_path.clone();
        let db = run_blocking(move || Database::open(&path)).await?;
        tracing::info!("Opened database at {}", db_path.display());

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            opener: BackupOpener::new(work_dir),
        })
    }

    /// Open an in-memory database service (primarily for tests).
    pub async fn open_in_memory(work_dir: impl Into<PathBuf>) -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            opener: BackupOpener::new(work_dir),
        })
    }

    /// Merge the backup at `backup_path` into the live database.
    pub async fn import_backup(
        &self,
        backup_path: impl Into<PathBuf>,
        mode: MergeMode,
    ) -> Result<MergeReport> {
        let backup_path = backup_path.into();
        tracing::info!("Importing {} ({mode})", backup_path.display());

        let opener = self.opener.clone();
        let backup = run_blocking(move || opener.open(&backup_path)).await?;

        merge_in_background(mode.strategy(), Arc::clone(&self.db), backup).await
    }

    /// Write a backup of the live database to `destination`.
    pub async fn export_backup(&self, destination: impl Into<PathBuf>) -> Result<()> {
        let destination = destination.into();
        let db = Arc::clone(&self.db);
        run_blocking(move || db.blocking_lock().export_to(&destination)).await
    }

    /// Count rows in every entity table.
    pub async fn summary(&self) -> Result<TableSummary> {
        let db = self.db.lock().await;
        Ok(TableSummary {
            schema_version: db.schema_version()?,
            payment_methods: count_rows(&db, &db.payment_methods())?,
            categories: count_rows(&db, &db.categories())?,
            trips: count_rows(&db, &db.trips())?,
            distances: count_rows(&db, &db.distances())?,
            receipts: count_rows(&db, &db.receipts())?,
            csv_columns: count_rows(&db, &db.columns(ColumnFormat::Csv))?,
            pdf_columns: count_rows(&db, &db.columns(ColumnFormat::Pdf))?,
        })
    }

    /// Receive write events from the live database.
    pub async fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.db.lock().await.subscribe()
    }
}

fn count_rows(db: &Database, table: &impl Table) -> Result<usize> {
    let count: i64 = db.connection().query_row(
        &format!("SELECT COUNT(*) FROM {}", table.name()),
        [],
        |row| row.get(0),
    )?;
    usize::try_from(count).map_err(|error| Error::Database(error.to_string()))
}

async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|error| Error::Task(error.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::OperationFamily;
    use crate::models::{Amount, Receipt, Trip};
    use std::path::Path;
    use tempfile::tempdir;

    async fn seeded_backup(dir: &Path) -> PathBuf {
        let source = DatabaseService::open_path(dir.join("source.db"), dir.join("work"))
            .await
            .unwrap();
        {
            let db = source.db.lock().await;
            let trip = db
                .trips()
                .insert(&Trip::new("Chicago", 0, 10), OperationFamily::User)
                .unwrap();
            db.receipts()
                .insert(
                    &Receipt::new(&trip, "Hotel", Amount::from_units_cents(210, 0), 2),
                    OperationFamily::User,
                )
                .unwrap();
        }

        let backup_path = dir.join("exports").join("backup.db");
        source.export_backup(&backup_path).await.unwrap();
        backup_path
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_backup_reconciles_into_live_database() {
        let tmp = tempdir().unwrap();
        let backup_path = seeded_backup(tmp.path()).await;
        let service = DatabaseService::open_path(tmp.path().join("live.db"), tmp.path().join("work"))
            .await
            .unwrap();

        let first = service
            .import_backup(&backup_path, MergeMode::Reconcile)
            .await
            .unwrap();
        let second = service
            .import_backup(&backup_path, MergeMode::Reconcile)
            .await
            .unwrap();

        assert_eq!(first.receipts.inserted, 1);
        assert_eq!(second.receipts.skipped, 1);
        let summary = service.summary().await.unwrap();
        assert_eq!(summary.trips, 1);
        assert_eq!(summary.receipts, 1);
        assert_eq!(summary.schema_version, crate::db::CURRENT_VERSION);
        assert!(backup_path.exists());
        assert_eq!(
            std::fs::read_dir(tmp.path().join("work")).unwrap().count(),
            0
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_backup_overwrite_replaces_rows() {
        let tmp = tempdir().unwrap();
        let backup_path = seeded_backup(tmp.path()).await;
        let service = DatabaseService::open_in_memory(tmp.path().join("work"))
            .await
            .unwrap();
        {
            let db = service.db.lock().await;
            db.trips()
                .insert(&Trip::new("Seattle", 0, 10), OperationFamily::User)
                .unwrap();
        }

        let report = service
            .import_backup(&backup_path, MergeMode::Overwrite)
            .await
            .unwrap();

        assert_eq!(report.trips.deleted, 1);
        let summary = service.summary().await.unwrap();
        assert_eq!(summary.trips, 1);
        assert_eq!(summary.receipts, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn import_missing_backup_fails() {
        let tmp = tempdir().unwrap();
        let service = DatabaseService::open_in_memory(tmp.path()).await.unwrap();

        let result = service
            .import_backup(tmp.path().join("missing.db"), MergeMode::Reconcile)
            .await;

        assert!(matches!(result, Err(Error::BackupNotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn subscribers_see_import_writes() {
        let tmp = tempdir().unwrap();
        let backup_path = seeded_backup(tmp.path()).await;
        let service = DatabaseService::open_in_memory(tmp.path().join("work"))
            .await
            .unwrap();
        let mut events = service.subscribe().await;

        service
            .import_backup(&backup_path, MergeMode::Reconcile)
            .await
            .unwrap();

        let event = events.try_recv().unwrap();
        assert_eq!(event.family, OperationFamily::Import);
    }
}
