//! Opening backup files as independent database handles
//!
//! A backup is snapshotted into a working directory before the migration
//! pipeline touches it, so the file the user picked keeps its original schema.

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::new_uuid;

/// Opens backup files through the same migration pipeline as the live database
#[derive(Debug, Clone)]
pub struct BackupOpener {
    work_dir: PathBuf,
}

impl BackupOpener {
    /// Create an opener that stages working copies under `work_dir`
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    /// Snapshot `backup_path` into the working directory and open the copy
    ///
    /// The snapshot is taken through a read-only connection, so pages still
    /// sitting in the source's write-ahead log are included.
    pub fn open(&self, backup_path: impl AsRef<Path>) -> Result<BackupDatabase> {
        let backup_path = backup_path.as_ref();
        if !backup_path.is_file() {
            return Err(Error::BackupNotFound(backup_path.to_path_buf()));
        }

        fs::create_dir_all(&self.work_dir)?;
        let working_copy = WorkingCopy(self.work_dir.join(format!("import-{}.db", new_uuid())));
        snapshot(backup_path, working_copy.path())?;

        let db = Database::open_existing(working_copy.path())?;
        tracing::info!(
            "Opened backup {} (schema version {})",
            backup_path.display(),
            db.original_schema_version()
        );
        Ok(BackupDatabase { db, working_copy })
    }
}

fn snapshot(source: &Path, target: &Path) -> Result<()> {
    let conn = Connection::open_with_flags(
        source,
        OpenFlags::SQLITE_OPEN_READ_ONLY
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.execute("VACUUM INTO ?", [target.to_string_lossy().to_string()])?;
    conn.close().map_err(|(_, error)| Error::Sqlite(error))
}

/// An opened, fully migrated backup
///
/// Dropping it without calling [`BackupDatabase::close`] still deletes the
/// staged copy.
pub struct BackupDatabase {
    // Declared before the guard so the connection is gone when files are removed
    db: Database,
    working_copy: WorkingCopy,
}

impl BackupDatabase {
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Schema version the backup file reported before it was upgraded
    pub const fn original_schema_version(&self) -> i32 {
        self.db.original_schema_version()
    }

    /// Path of the staged copy being read
    pub fn working_copy(&self) -> &Path {
        self.working_copy.path()
    }

    /// Close the handle and delete the staged copy
    pub fn close(self) -> Result<()> {
        let Self { db, working_copy } = self;
        db.close()?;
        drop(working_copy);
        Ok(())
    }
}

/// Staged file that is removed, with its sidecars, when dropped
struct WorkingCopy(PathBuf);

impl WorkingCopy {
    fn path(&self) -> &Path {
        &self.0
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        remove_working_files(&self.0);
    }
}

fn remove_working_files(working_copy: &Path) {
    let Some(base_name) = working_copy.file_name().and_then(|name| name.to_str()) else {
        return;
    };

    for suffix in ["", "-wal", "-shm", "-journal"] {
        let path = working_copy.with_file_name(format!("{base_name}{suffix}"));
        if path.exists() {
            if let Err(error) = fs::remove_file(&path) {
                tracing::warn!("Failed to remove {}: {}", path.display(), error);
            }
        }
    }
}
