//! Replacing the live database with a backup's contents

use super::{MergeMode, MergeReport, MergeStrategy, PhaseCounts, RemapTable};
use crate::db::{Database, OperationFamily, Table};
use crate::error::Result;
use crate::models::{ColumnFormat, Distance, Entity, Receipt};

const FAMILY: OperationFamily = OperationFamily::Import;

/// Truncates every destination table, then copies the backup in
///
/// Inserted parents get fresh local ids, so children are remapped exactly as
/// in a reconciling merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullOverwriteMerge;

impl MergeStrategy for FullOverwriteMerge {
    fn mode(&self) -> MergeMode {
        MergeMode::Overwrite
    }

    fn merge(&self, destination: &Database, imported: &Database) -> Result<MergeReport> {
        let original_version = imported.original_schema_version();
        tracing::info!("Overwriting database from backup (schema version {original_version})");

        let mut report = MergeReport::new(MergeMode::Overwrite, original_version, None);

        report.receipts.deleted = destination.receipts().delete_all(FAMILY)?;
        report.distances.deleted = destination.distances().delete_all(FAMILY)?;
        report.trips.deleted = destination.trips().delete_all(FAMILY)?;
        report.categories.deleted = destination.categories().delete_all(FAMILY)?;
        report.payment_methods.deleted = destination.payment_methods().delete_all(FAMILY)?;
        for format in [ColumnFormat::Pdf, ColumnFormat::Csv] {
            report.columns.deleted += destination.columns(format).delete_all(FAMILY)?;
        }

        for format in [ColumnFormat::Csv, ColumnFormat::Pdf] {
            let (_, counts) = copy_all(
                &destination.columns(format),
                imported.columns(format).get_all()?,
            )?;
            report.columns.inserted += counts.inserted;
        }

        let (methods, counts) = copy_all(
            &destination.payment_methods(),
            imported.payment_methods().get_all()?,
        )?;
        report.payment_methods.inserted = counts.inserted;

        let (categories, counts) =
            copy_all(&destination.categories(), imported.categories().get_all()?)?;
        report.categories.inserted = counts.inserted;

        let (trips, counts) = copy_all(&destination.trips(), imported.trips().get_all()?)?;
        report.trips.inserted = counts.inserted;

        let distances = destination.distances();
        for distance in imported.distances().get_all()? {
            let remapped = Distance {
                trip: trips.resolve(&distance.trip)?,
                payment_method: methods.resolve_optional(distance.payment_method.as_ref())?,
                ..distance
            };
            distances.insert(&remapped, FAMILY)?;
            report.distances.inserted += 1;
        }

        let receipts = destination.receipts();
        for receipt in imported.receipts().get_all()? {
            let remapped = Receipt {
                trip: trips.resolve(&receipt.trip)?,
                category: categories.resolve_optional(receipt.category.as_ref())?,
                payment_method: methods.resolve_optional(receipt.payment_method.as_ref())?,
                ..receipt
            };
            receipts.insert(&remapped, FAMILY)?;
            report.receipts.inserted += 1;
        }

        tracing::info!(
            "Overwrite finished: {} rows removed, {} rows imported",
            report.phases().iter().map(|phase| phase.deleted).sum::<usize>(),
            report.total_inserted()
        );
        Ok(report)
    }
}

/// Insert every row, remembering where each imported row landed
fn copy_all<T: Table>(
    table: &T,
    rows: Vec<T::Entity>,
) -> Result<(RemapTable<T::Entity>, PhaseCounts)> {
    let mut remap = RemapTable::new();
    let mut counts = PhaseCounts::default();

    for row in rows {
        let inserted = table.insert(&row, FAMILY)?;
        remap.record(&row, inserted);
        counts.inserted += 1;
    }

    tracing::debug!(
        "Copied {} {} rows",
        counts.inserted,
        <T::Entity as Entity>::KIND
    );
    Ok((remap, counts))
}
