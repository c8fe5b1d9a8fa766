//! receiptkeep-core - Core library for receiptkeep
//!
//! This crate contains the entity models, the `SQLite` store and its
//! migrations, and the engine that merges a backup database into the live one.

pub mod backup;
pub mod db;
pub mod error;
pub mod merge;
pub mod models;
pub mod services;

pub use backup::{BackupDatabase, BackupOpener};
pub use db::{Database, OperationFamily};
pub use error::{Error, Result};
pub use merge::{MergeMode, MergeReport, MergeStrategy};
pub use services::{DatabaseService, TableSummary};
