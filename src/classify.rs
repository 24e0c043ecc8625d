use std::collections::HashSet;

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::domain::{LINEAGE_RANKS, MicrobeKingdom, Rank, Resolved, TaxonId, normalize_name};
use crate::error::TaxaError;
use crate::index::NameIndex;
use crate::lineage::LineageWalker;
use crate::tree::{Taxon, TaxonomyTree};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpeciesRank {
    pub scientific_name: String,
    pub taxonomic_id: TaxonId,
    pub rank: Rank,
}

impl SpeciesRank {
    fn of(taxon: &Taxon) -> Self {
        Self {
            scientific_name: taxon.scientific_name.clone(),
            taxonomic_id: taxon.id,
            rank: taxon.rank.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomicLineage {
    pub taxonomic_id: TaxonId,
    pub species: Option<String>,
    pub genus: Option<String>,
    pub family: Option<String>,
    pub order: Option<String>,
    pub class: Option<String>,
    pub phylum: Option<String>,
}

impl TaxonomicLineage {
    pub fn get(&self, rank: &Rank) -> Option<&str> {
        let slot = match rank {
            Rank::Species => &self.species,
            Rank::Genus => &self.genus,
            Rank::Family => &self.family,
            Rank::Order => &self.order,
            Rank::Class => &self.class,
            Rank::Phylum => &self.phylum,
            _ => return None,
        };
        slot.as_deref()
    }

    pub fn fields_or<'s>(&'s self, fill: &'s str) -> [&'s str; 6] {
        LINEAGE_RANKS
            .each_ref()
            .map(|rank| self.get(rank).unwrap_or(fill))
    }

    fn slot_mut(&mut self, rank: &Rank) -> Option<&mut Option<String>> {
        match rank {
            Rank::Species => Some(&mut self.species),
            Rank::Genus => Some(&mut self.genus),
            Rank::Family => Some(&mut self.family),
            Rank::Order => Some(&mut self.order),
            Rank::Class => Some(&mut self.class),
            Rank::Phylum => Some(&mut self.phylum),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MicrobeRank {
    #[serde(flatten)]
    pub rank: SpeciesRank,
    pub kingdom: Option<MicrobeKingdom>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MicrobeAnnotation {
    pub ranks: Vec<SpeciesRank>,
    pub bacteria: Vec<SpeciesRank>,
    pub viruses: Vec<SpeciesRank>,
    pub fungi: Vec<SpeciesRank>,
    pub unresolved: Vec<String>,
}

impl MicrobeAnnotation {
    pub fn bucket(&self, kingdom: MicrobeKingdom) -> &[SpeciesRank] {
        match kingdom {
            MicrobeKingdom::Bacteria => &self.bacteria,
            MicrobeKingdom::Viruses => &self.viruses,
            MicrobeKingdom::Fungi => &self.fungi,
        }
    }

    fn push(&mut self, result: MicrobeRank) {
        match result.kingdom {
            Some(MicrobeKingdom::Bacteria) => self.bacteria.push(result.rank.clone()),
            Some(MicrobeKingdom::Viruses) => self.viruses.push(result.rank.clone()),
            Some(MicrobeKingdom::Fungi) => self.fungi.push(result.rank.clone()),
            None => {}
        }
        self.ranks.push(result.rank);
    }
}

pub type BatchResult<T> = Vec<(String, Result<T, TaxaError>)>;

#[derive(Debug, Clone, Copy)]
pub struct RankClassifier<'a> {
    tree: &'a TaxonomyTree,
    index: &'a NameIndex,
    threads: Option<usize>,
}

impl<'a> RankClassifier<'a> {
    pub fn new(tree: &'a TaxonomyTree, index: &'a NameIndex) -> Self {
        Self {
            tree,
            index,
            threads: None,
        }
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }

    pub fn rank_of_species<D>(
        &self,
        name: &str,
        default: Option<D>,
    ) -> Result<Resolved<SpeciesRank, D>, TaxaError> {
        Resolved::from_lookup(self.taxon(name).map(SpeciesRank::of), default)
    }

    pub fn taxonomic_rank<D>(
        &self,
        name: &str,
        default: Option<D>,
    ) -> Result<Resolved<Rank, D>, TaxaError> {
        Resolved::from_lookup(self.taxon(name).map(|taxon| taxon.rank.clone()), default)
    }

    pub fn taxonomic_lineage<D>(
        &self,
        name: &str,
        default: Option<D>,
    ) -> Result<Resolved<TaxonomicLineage, D>, TaxaError> {
        Resolved::from_lookup(self.taxon(name).map(|taxon| self.lineage_of(taxon)), default)
    }

    pub fn rank_microbes<D>(
        &self,
        name: &str,
        default: Option<D>,
    ) -> Result<Resolved<MicrobeRank, D>, TaxaError> {
        Resolved::from_lookup(self.taxon(name).map(|taxon| self.microbe_of(taxon)), default)
    }

    pub fn classify_batch<S, T, F>(&self, names: &[S], query: F) -> Result<BatchResult<T>, TaxaError>
    where
        S: AsRef<str> + Sync,
        T: Send,
        F: Fn(&Self, &str) -> Result<T, TaxaError> + Sync,
    {
        let run = || {
            names
                .par_iter()
                .map(|name| {
                    let name = normalize_name(name.as_ref());
                    (name.to_string(), query(self, name))
                })
                .collect::<Vec<_>>()
        };
        let results = match self.threads {
            Some(threads) => ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|err| TaxaError::ThreadPool(err.to_string()))?
                .install(run),
            None => run(),
        };
        debug!(names = results.len(), "batch classified");
        Ok(results)
    }

    pub fn annotate_microbes<S>(&self, names: &[S]) -> Result<MicrobeAnnotation, TaxaError>
    where
        S: AsRef<str> + Sync,
    {
        let results = self.classify_batch(names, |classifier, name| {
            classifier
                .taxon(name)
                .map(|taxon| classifier.microbe_of(taxon))
        })?;

        let mut annotation = MicrobeAnnotation::default();
        for (name, result) in results {
            match result {
                Ok(microbe) => annotation.push(microbe),
                Err(err) => {
                    if err.is_fatal() {
                        return Err(err);
                    }
                    debug!(name = %name, "name not in taxonomy");
                    annotation.unresolved.push(name);
                }
            }
        }
        if !annotation.unresolved.is_empty() {
            warn!(
                unresolved = annotation.unresolved.len(),
                "names missing from the taxonomy"
            );
        }
        Ok(annotation)
    }

    pub fn filter_lineages<S>(&self, names: &[S]) -> Result<Vec<(String, TaxonomicLineage)>, TaxaError>
    where
        S: AsRef<str> + Sync,
    {
        let results = self.classify_batch(names, |classifier, name| {
            classifier
                .taxon(name)
                .map(|taxon| classifier.lineage_of(taxon))
        })?;

        let mut seen = HashSet::new();
        let mut lineages = Vec::new();
        for (name, result) in results {
            match result {
                Ok(lineage) => {
                    if seen.insert(name.clone()) {
                        lineages.push((name, lineage));
                    }
                }
                Err(err) if err.is_fatal() => return Err(err),
                Err(_) => {}
            }
        }
        Ok(lineages)
    }

    fn taxon(&self, name: &str) -> Result<&'a Taxon, TaxaError> {
        let id = self.index.resolve(name)?;
        self.tree.get(id)
    }

    fn lineage_of(&self, taxon: &'a Taxon) -> TaxonomicLineage {
        let mut lineage = TaxonomicLineage {
            taxonomic_id: taxon.id,
            species: None,
            genus: None,
            family: None,
            order: None,
            class: None,
            phylum: None,
        };
        for ancestor in LineageWalker::new(self.tree).ancestors(taxon) {
            if let Some(slot) = lineage.slot_mut(&ancestor.rank) {
                if slot.is_none() {
                    *slot = Some(ancestor.scientific_name.clone());
                }
            }
        }
        lineage
    }

    fn microbe_of(&self, taxon: &'a Taxon) -> MicrobeRank {
        let kingdom = LineageWalker::new(self.tree)
            .ancestors(taxon)
            .find_map(|ancestor| MicrobeKingdom::from_label(&ancestor.scientific_name));
        MicrobeRank {
            rank: SpeciesRank::of(taxon),
            kingdom,
        }
    }
}
