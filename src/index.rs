use std::collections::HashMap;
use std::collections::hash_map::Entry;

use tracing::{debug, warn};

use crate::domain::{Resolved, TaxonId, normalize_name};
use crate::dump::NameRecord;
use crate::error::TaxaError;
use crate::tree::TaxonomyTree;

/// Scientific name to taxon id. When NCBI reuses a scientific name across
/// ids, the first record seen owns the name and the others are kept in
/// `ambiguous` so callers can report them.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    ids: HashMap<String, TaxonId>,
    ambiguous: HashMap<String, Vec<TaxonId>>,
    dropped: usize,
}

impl NameIndex {
    pub fn build(tree: &TaxonomyTree, name_records: &[NameRecord]) -> Self {
        let mut index = Self::default();
        for record in name_records {
            if !tree.contains(record.id) {
                index.dropped += 1;
                continue;
            }
            let name = normalize_name(&record.name);
            if name.is_empty() {
                continue;
            }
            match index.ids.entry(name.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(record.id);
                }
                Entry::Occupied(slot) if *slot.get() != record.id => {
                    index
                        .ambiguous
                        .entry(name.to_string())
                        .or_default()
                        .push(record.id);
                }
                Entry::Occupied(_) => {}
            }
        }

        if index.dropped > 0 {
            warn!(
                dropped = index.dropped,
                "name records reference taxa missing from the node dump"
            );
        }
        for (name, losers) in &index.ambiguous {
            warn!(
                name = %name,
                kept = %index.ids[name],
                ignored = ?losers,
                "scientific name shared by several taxa"
            );
        }
        debug!(names = index.ids.len(), "name index built");
        index
    }

    pub fn resolve(&self, name: &str) -> Result<TaxonId, TaxaError> {
        self.ids
            .get(normalize_name(name))
            .copied()
            .ok_or_else(|| TaxaError::UnknownTaxonName(normalize_name(name).to_string()))
    }

    pub fn resolve_or(&self, name: &str, default: TaxonId) -> Resolved<TaxonId, TaxonId> {
        match self.ids.get(normalize_name(name)) {
            Some(&id) => Resolved::Found(id),
            None => Resolved::Defaulted(default),
        }
    }

    pub fn ambiguous(&self, name: &str) -> &[TaxonId] {
        self.ambiguous
            .get(normalize_name(name))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
