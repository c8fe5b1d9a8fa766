//! Row-by-row reconciliation of a backup against the live database

use super::{MatchPolicy, MergeMode, MergeReport, MergeStrategy, PhaseCounts, RemapTable};
use crate::db::{Database, OperationFamily, Table};
use crate::error::Result;
use crate::models::{Category, ColumnFormat, Distance, Entity, PaymentMethod, Receipt, Trip};

const FAMILY: OperationFamily = OperationFamily::Import;

/// Keeps existing rows, inserts what is missing, and applies imported rows
/// that were modified more recently than their destination counterpart.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowReconcilingMerge;

impl MergeStrategy for RowReconcilingMerge {
    fn mode(&self) -> MergeMode {
        MergeMode::Reconcile
    }

    fn merge(&self, destination: &Database, imported: &Database) -> Result<MergeReport> {
        let original_version = imported.original_schema_version();
        let policy = MatchPolicy::for_schema_version(original_version);
        tracing::info!(
            "Reconciling backup (schema version {original_version}, {policy:?} matching)"
        );

        let mut report = MergeReport::new(MergeMode::Reconcile, original_version, Some(policy));

        report.columns = replace_columns(destination, imported)?;

        let (methods, counts) = merge_by_natural_key(
            &destination.payment_methods(),
            imported.payment_methods().get_all()?,
            PaymentMethod::is_same_method,
        )?;
        report.payment_methods = counts;

        let (categories, counts) = merge_by_natural_key(
            &destination.categories(),
            imported.categories().get_all()?,
            Category::is_same_category,
        )?;
        report.categories = counts;

        let (trips, counts) = merge_by_natural_key(
            &destination.trips(),
            imported.trips().get_all()?,
            |existing: &Trip, imported: &Trip| existing.name == imported.name,
        )?;
        report.trips = counts;

        report.distances = merge_distances(destination, imported, policy, &trips, &methods)?;
        report.receipts =
            merge_receipts(destination, imported, policy, &trips, &categories, &methods)?;

        tracing::info!(
            "Reconcile finished: {} inserted, {} updated, {} skipped",
            report.total_inserted(),
            report.total_updated(),
            report.total_skipped()
        );
        Ok(report)
    }
}

/// Column lists have no cross-database identity; they are always replaced
fn replace_columns(destination: &Database, imported: &Database) -> Result<PhaseCounts> {
    let mut counts = PhaseCounts::default();

    for format in [ColumnFormat::Csv, ColumnFormat::Pdf] {
        let table = destination.columns(format);
        counts.deleted += table.delete_all(FAMILY)?;
        for column in imported.columns(format).get_all()? {
            table.insert(&column, FAMILY)?;
            counts.inserted += 1;
        }
    }

    tracing::info!(
        "Replaced report columns: {} removed, {} imported",
        counts.deleted,
        counts.inserted
    );
    Ok(counts)
}

/// Match parents by a natural key against a snapshot of the destination
///
/// A match remaps the imported row onto the existing one without writing.
/// Anything unmatched is inserted and remapped onto the inserted copy.
fn merge_by_natural_key<T, F>(
    table: &T,
    imported: Vec<T::Entity>,
    is_same: F,
) -> Result<(RemapTable<T::Entity>, PhaseCounts)>
where
    T: Table,
    F: Fn(&T::Entity, &T::Entity) -> bool,
{
    let kind = <T::Entity as Entity>::KIND;
    let existing = table.get_all()?;
    let mut remap = RemapTable::new();
    let mut counts = PhaseCounts::default();

    for row in imported {
        if let Some(found) = existing.iter().find(|&candidate| is_same(candidate, &row)) {
            tracing::debug!(
                "Imported {kind} {} matches existing {}",
                row.local_id(),
                found.local_id()
            );
            remap.record(&row, found.clone());
            counts.skipped += 1;
        } else {
            let inserted = table.insert(&row, FAMILY)?;
            tracing::debug!(
                "Inserted imported {kind} {} as {}",
                row.local_id(),
                inserted.local_id()
            );
            remap.record(&row, inserted);
            counts.inserted += 1;
        }
    }

    tracing::info!(
        "Merged {} table: {} inserted, {} matched",
        table.name(),
        counts.inserted,
        counts.skipped
    );
    Ok((remap, counts))
}

fn merge_distances(
    destination: &Database,
    imported: &Database,
    policy: MatchPolicy,
    trips: &RemapTable<Trip>,
    methods: &RemapTable<PaymentMethod>,
) -> Result<PhaseCounts> {
    let table = destination.distances();
    let existing = table.get_all()?;
    let mut counts = PhaseCounts::default();

    for distance in imported.distances().get_all()? {
        let remapped = Distance {
            trip: trips.resolve(&distance.trip)?,
            payment_method: methods.resolve_optional(distance.payment_method.as_ref())?,
            ..distance.clone()
        };

        match existing
            .iter()
            .find(|candidate| policy.is_duplicate_distance(candidate, &distance))
        {
            Some(found) if policy.should_update(found, &distance) =>
            {
                table.update(found, &remapped, FAMILY)?;
                tracing::debug!("Updated distance {} from newer import", found.id);
                counts.updated += 1;
            }
            Some(found) => {
                tracing::debug!(
                    "Kept distance {} over imported {}",
                    found.id,
                    distance.id
                );
                counts.skipped += 1;
            }
            None => {
                let inserted = table.insert(&remapped, FAMILY)?;
                tracing::debug!("Inserted imported distance {} as {}", distance.id, inserted.id);
                counts.inserted += 1;
            }
        }
    }

    tracing::info!(
        "Merged distances: {} inserted, {} updated, {} skipped",
        counts.inserted,
        counts.updated,
        counts.skipped
    );
    Ok(counts)
}

fn merge_receipts(
    destination: &Database,
    imported: &Database,
    policy: MatchPolicy,
    trips: &RemapTable<Trip>,
    categories: &RemapTable<Category>,
    methods: &RemapTable<PaymentMethod>,
) -> Result<PhaseCounts> {
    let table = destination.receipts();
    let existing = table.get_all()?;
    let mut counts = PhaseCounts::default();

    for receipt in imported.receipts().get_all()? {
        let remapped = Receipt {
            trip: trips.resolve(&receipt.trip)?,
            category: categories.resolve_optional(receipt.category.as_ref())?,
            payment_method: methods.resolve_optional(receipt.payment_method.as_ref())?,
            ..receipt.clone()
        };

        match existing
            .iter()
            .find(|candidate| policy.is_duplicate_receipt(candidate, &receipt))
        {
            Some(found) if policy.should_update(found, &receipt) =>
            {
                // Ordering is local to this device
                let updated = Receipt {
                    custom_order_id: found.custom_order_id,
                    ..remapped
                };
                table.update(found, &updated, FAMILY)?;
                tracing::debug!("Updated receipt {} from newer import", found.id);
                counts.updated += 1;
            }
            Some(found) => {
                tracing::debug!("Kept receipt {} over imported {}", found.id, receipt.id);
                counts.skipped += 1;
            }
            None => {
                let inserted = table.insert(&remapped, FAMILY)?;
                tracing::debug!("Inserted imported receipt {} as {}", receipt.id, inserted.id);
                counts.inserted += 1;
            }
        }
    }

    tracing::info!(
        "Merged receipts: {} inserted, {} updated, {} skipped",
        counts.inserted,
        counts.updated,
        counts.skipped
    );
    Ok(counts)
}
