use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::domain::TaxonId;

#[derive(Debug, Error, Diagnostic)]
pub enum TaxaError {
    #[error("malformed record in {source_name} at line {line}: {content:?}")]
    #[diagnostic(
        code(kira_taxa::malformed_record),
        help("taxdump lines are `\\t|\\t`-separated and end with `\\t|`")
    )]
    MalformedRecord {
        source_name: String,
        line: usize,
        content: String,
    },

    #[error("taxon {id} is part of a parent cycle")]
    #[diagnostic(code(kira_taxa::cycle))]
    Cycle { id: TaxonId },

    #[error("expected exactly one root taxon, found {count}")]
    #[diagnostic(
        code(kira_taxa::multiple_roots),
        help("the root is the single node listed as its own parent")
    )]
    MultipleRoots { count: usize },

    #[error("taxon {id} references missing parent {parent}")]
    #[diagnostic(
        code(kira_taxa::orphan_reference),
        help("nodes.dmp and names.dmp may come from different releases")
    )]
    OrphanReference { id: TaxonId, parent: TaxonId },

    #[error("taxon id {0} appears more than once in the node dump")]
    #[diagnostic(code(kira_taxa::duplicate_taxon_id))]
    DuplicateTaxonId(TaxonId),

    #[error("invalid taxon id: {0}")]
    InvalidTaxonId(String),

    #[error("unknown taxon id: {0}")]
    UnknownTaxonId(TaxonId),

    #[error("unknown scientific name: {0}")]
    UnknownTaxonName(String),

    #[error("taxonomy dump not found: {0}")]
    #[diagnostic(help("place nodes.dmp and names.dmp under ./taxdump or point kira-taxa.json at them"))]
    DumpNotFound(PathBuf),

    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("missing config file kira-taxa.json in current directory")]
    MissingConfig,

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

impl TaxaError {
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TaxaError::UnknownTaxonId(_) | TaxaError::UnknownTaxonName(_)
        )
    }
}
