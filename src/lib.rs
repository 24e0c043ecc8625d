pub mod classify;
pub mod config;
pub mod domain;
pub mod dump;
pub mod error;
pub mod index;
pub mod lineage;
pub mod logging;
pub mod store;
pub mod taxonomy;
pub mod tree;

pub use classify::{MicrobeAnnotation, MicrobeRank, RankClassifier, SpeciesRank, TaxonomicLineage};
pub use domain::{MicrobeKingdom, Rank, Resolved, TaxonId};
pub use error::TaxaError;
pub use taxonomy::Taxonomy;
