use crate::domain::Rank;
use crate::tree::{Taxon, TaxonomyTree};

#[derive(Debug, Clone, Copy)]
pub struct LineageWalker<'a> {
    tree: &'a TaxonomyTree,
}

impl<'a> LineageWalker<'a> {
    pub fn new(tree: &'a TaxonomyTree) -> Self {
        Self { tree }
    }

    pub fn ancestors(&self, taxon: &'a Taxon) -> Ancestors<'a> {
        Ancestors {
            tree: self.tree,
            next: Some(taxon),
            remaining: self.tree.len(),
        }
    }

    pub fn lineage(&self, taxon: &'a Taxon) -> Vec<&'a Taxon> {
        self.ancestors(taxon).collect()
    }

    pub fn nearest_with_rank(&self, taxon: &'a Taxon, rank: &Rank) -> Option<&'a Taxon> {
        self.ancestors(taxon).find(|ancestor| &ancestor.rank == rank)
    }
}

pub struct Ancestors<'a> {
    tree: &'a TaxonomyTree,
    next: Option<&'a Taxon>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Taxon;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next?;
        self.remaining -= 1;
        self.next = self.tree.parent(current);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.next {
            Some(_) => (self.remaining.min(1), Some(self.remaining)),
            None => (0, Some(0)),
        }
    }
}
