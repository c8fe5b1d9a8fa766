//! Imported-to-destination entity mapping built while merging

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::Entity;

/// Maps an imported row (by its local id in the backup) to the authoritative
/// row in the destination: either the existing match or the newly inserted copy.
#[derive(Debug, Clone)]
pub struct RemapTable<E: Entity> {
    entries: HashMap<i64, E>,
}

impl<E: Entity> Default for RemapTable<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<E: Entity> RemapTable<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `imported` is represented by `authoritative` in the destination
    pub fn record(&mut self, imported: &E, authoritative: E) {
        self.entries
            .entry(imported.local_id())
            .or_insert(authoritative);
    }

    pub fn get(&self, imported: &E) -> Option<&E> {
        self.entries.get(&imported.local_id())
    }

    /// Destination row for a required reference
    pub fn resolve(&self, imported: &E) -> Result<E> {
        self.get(imported)
            .cloned()
            .ok_or_else(|| Error::UnresolvedReference {
                entity: E::KIND,
                imported_id: imported.local_id(),
            })
    }

    /// Destination row for an optional reference; `None` stays `None`
    pub fn resolve_optional(&self, imported: Option<&E>) -> Result<Option<E>> {
        imported.map(|entity| self.resolve(entity)).transpose()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
