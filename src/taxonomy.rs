use std::io::BufRead;

use tracing::info;

use crate::classify::RankClassifier;
use crate::config::ResolvedConfig;
use crate::dump::{DumpParser, NameRecord, NodeRecord};
use crate::error::TaxaError;
use crate::index::NameIndex;
use crate::store::DumpPaths;
use crate::tree::TaxonomyTree;

#[derive(Debug, Clone)]
pub struct Taxonomy {
    tree: TaxonomyTree,
    index: NameIndex,
    threads: Option<usize>,
}

impl Taxonomy {
    pub fn from_records<N, M>(node_records: N, name_records: M) -> Result<Self, TaxaError>
    where
        N: IntoIterator<Item = Result<NodeRecord, TaxaError>>,
        M: IntoIterator<Item = Result<NameRecord, TaxaError>>,
    {
        let names = name_records.into_iter().collect::<Result<Vec<_>, _>>()?;
        let tree = TaxonomyTree::build(node_records, &names)?;
        let index = NameIndex::build(&tree, &names);
        info!(taxa = tree.len(), names = index.len(), "taxonomy loaded");
        Ok(Self {
            tree,
            index,
            threads: None,
        })
    }

    pub fn from_readers<N: BufRead, M: BufRead>(nodes: N, names: M) -> Result<Self, TaxaError> {
        Self::from_records(
            DumpParser::node_records(nodes, "nodes.dmp"),
            DumpParser::name_records(names, "names.dmp"),
        )
    }

    pub fn open(paths: &DumpPaths) -> Result<Self, TaxaError> {
        let nodes = DumpParser::open(paths.nodes.as_std_path())?;
        let names = DumpParser::open(paths.names.as_std_path())?;
        Self::from_records(
            DumpParser::node_records(nodes, paths.nodes.as_str()),
            DumpParser::name_records(names, paths.names.as_str()),
        )
    }

    pub fn from_config(config: &ResolvedConfig) -> Result<Self, TaxaError> {
        let mut taxonomy = Self::open(&config.dump)?;
        taxonomy.threads = config.threads;
        Ok(taxonomy)
    }

    pub fn tree(&self) -> &TaxonomyTree {
        &self.tree
    }

    pub fn index(&self) -> &NameIndex {
        &self.index
    }

    pub fn classifier(&self) -> RankClassifier<'_> {
        RankClassifier::new(&self.tree, &self.index).with_threads(self.threads)
    }
}
