use std::collections::HashMap;

use tracing::{debug, warn};

use crate::domain::{Rank, TaxonId};
use crate::dump::{NameRecord, NodeRecord};
use crate::error::TaxaError;

#[derive(Debug, Clone)]
pub struct Taxon {
    pub id: TaxonId,
    pub scientific_name: String,
    pub rank: Rank,
    pub parent_id: Option<TaxonId>,
    parent: Option<usize>,
}

impl Taxon {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Arena of taxa. Parents are stored as indices into `taxa`, so the graph
/// holds no references and is immutable once `build` returns.
#[derive(Debug, Clone)]
pub struct TaxonomyTree {
    taxa: Vec<Taxon>,
    positions: HashMap<TaxonId, usize>,
    root: usize,
}

impl TaxonomyTree {
    pub fn build<N>(node_records: N, name_records: &[NameRecord]) -> Result<Self, TaxaError>
    where
        N: IntoIterator<Item = Result<NodeRecord, TaxaError>>,
    {
        let mut taxa = Vec::new();
        let mut positions = HashMap::new();
        for record in node_records {
            let record = record?;
            if positions.insert(record.id, taxa.len()).is_some() {
                return Err(TaxaError::DuplicateTaxonId(record.id));
            }
            taxa.push(Taxon {
                id: record.id,
                scientific_name: String::new(),
                rank: record.rank,
                parent_id: record.parent_id,
                parent: None,
            });
        }
        debug!(nodes = taxa.len(), "parsed node records");

        let mut named = vec![false; taxa.len()];
        for record in name_records {
            if let Some(&pos) = positions.get(&record.id) {
                if !named[pos] {
                    taxa[pos].scientific_name = record.name.trim().to_string();
                    named[pos] = true;
                }
            }
        }
        let unnamed = named.iter().filter(|has_name| !**has_name).count();
        if unnamed > 0 {
            warn!(unnamed, "taxa without a scientific name");
        }

        let mut roots = Vec::new();
        for taxon in taxa.iter_mut() {
            let Some(parent_id) = taxon.parent_id else {
                roots.push(positions[&taxon.id]);
                continue;
            };
            let parent = positions
                .get(&parent_id)
                .copied()
                .ok_or(TaxaError::OrphanReference {
                    id: taxon.id,
                    parent: parent_id,
                })?;
            taxon.parent = Some(parent);
        }
        if roots.len() != 1 {
            return Err(TaxaError::MultipleRoots { count: roots.len() });
        }

        let tree = Self {
            taxa,
            positions,
            root: roots[0],
        };
        tree.check_acyclic()?;
        debug!(root = %tree.root().id, "taxonomy tree validated");
        Ok(tree)
    }

    // Every walk must reach the root within `len` steps; nodes already known
    // to reach it end the walk early.
    fn check_acyclic(&self) -> Result<(), TaxaError> {
        let bound = self.taxa.len();
        let mut reaches_root = vec![false; bound];
        reaches_root[self.root] = true;
        let mut path = Vec::new();

        for start in 0..bound {
            path.clear();
            let mut current = start;
            while !reaches_root[current] {
                if path.len() >= bound {
                    return Err(TaxaError::Cycle {
                        id: self.taxa[start].id,
                    });
                }
                path.push(current);
                match self.taxa[current].parent {
                    Some(parent) => current = parent,
                    None => break,
                }
            }
            for &pos in &path {
                reaches_root[pos] = true;
            }
        }
        Ok(())
    }

    pub fn get(&self, id: TaxonId) -> Result<&Taxon, TaxaError> {
        self.find(id).ok_or(TaxaError::UnknownTaxonId(id))
    }

    pub fn find(&self, id: TaxonId) -> Option<&Taxon> {
        self.positions.get(&id).map(|&pos| &self.taxa[pos])
    }

    pub fn contains(&self, id: TaxonId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn root(&self) -> &Taxon {
        &self.taxa[self.root]
    }

    pub fn parent(&self, taxon: &Taxon) -> Option<&Taxon> {
        let parent_id = taxon.parent_id?;
        match taxon.parent.and_then(|pos| self.taxa.get(pos)) {
            Some(parent) if parent.id == parent_id => Some(parent),
            _ => self.find(parent_id),
        }
    }

    pub fn len(&self) -> usize {
        self.taxa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taxa.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Taxon> {
        self.taxa.iter()
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn node(id: u32, parent: Option<u32>, rank: &str) -> Result<NodeRecord, TaxaError> {
        Ok(NodeRecord {
            id: TaxonId::new(id),
            parent_id: parent.map(TaxonId::new),
            rank: Rank::parse_label(rank),
        })
    }

    fn name(id: u32, name: &str) -> NameRecord {
        NameRecord {
            id: TaxonId::new(id),
            name: name.to_string(),
        }
    }

    #[test]
    fn builds_and_links_parents() {
        let nodes = vec![
            node(1, None, "no rank"),
            node(2, Some(1), "superkingdom"),
            node(3, Some(2), "genus"),
        ];
        let names = vec![name(1, "root"), name(2, "Bacteria"), name(3, " Escherichia ")];
        let tree = TaxonomyTree::build(nodes, &names).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.root().id, TaxonId::new(1));
        let genus = tree.get(TaxonId::new(3)).unwrap();
        assert_eq!(genus.scientific_name, "Escherichia");
        assert_eq!(tree.parent(genus).unwrap().scientific_name, "Bacteria");
    }

    #[test]
    fn first_name_record_wins() {
        let nodes = vec![node(1, None, "no rank")];
        let names = vec![name(1, "root"), name(1, "other root")];
        let tree = TaxonomyTree::build(nodes, &names).unwrap();
        assert_eq!(tree.root().scientific_name, "root");
    }

    #[test]
    fn detects_cycle_detached_from_root() {
        let nodes = vec![
            node(1, None, "no rank"),
            node(2, Some(3), "genus"),
            node(3, Some(2), "family"),
        ];
        let err = TaxonomyTree::build(nodes, &[]).unwrap_err();
        assert_matches!(err, TaxaError::Cycle { .. });
    }

    #[test]
    fn rejects_two_roots() {
        let nodes = vec![node(1, None, "no rank"), node(2, None, "no rank")];
        let err = TaxonomyTree::build(nodes, &[]).unwrap_err();
        assert_matches!(err, TaxaError::MultipleRoots { count: 2 });
    }

    #[test]
    fn rejects_empty_dump() {
        let err = TaxonomyTree::build(Vec::new(), &[]).unwrap_err();
        assert_matches!(err, TaxaError::MultipleRoots { count: 0 });
    }

    #[test]
    fn rejects_duplicate_ids() {
        let nodes = vec![node(1, None, "no rank"), node(1, None, "no rank")];
        let err = TaxonomyTree::build(nodes, &[]).unwrap_err();
        assert_matches!(err, TaxaError::DuplicateTaxonId(id) if id == TaxonId::new(1));
    }

    #[test]
    fn unknown_id_lookup_fails() {
        let tree = TaxonomyTree::build(vec![node(1, None, "no rank")], &[]).unwrap();
        assert_matches!(tree.get(TaxonId::new(9)), Err(TaxaError::UnknownTaxonId(_)));
    }

    #[test]
    fn parse_error_aborts_build() {
        let nodes = vec![
            node(1, None, "no rank"),
            Err(TaxaError::MalformedRecord {
                source_name: "nodes.dmp".to_string(),
                line: 2,
                content: "2".to_string(),
            }),
        ];
        let err = TaxonomyTree::build(nodes, &[]).unwrap_err();
        assert_matches!(err, TaxaError::MalformedRecord { line: 2, .. });
    }
}
