use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::TaxaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaxonId(u32);

impl TaxonId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for TaxonId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for TaxonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxonId {
    type Err = TaxaError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| TaxaError::InvalidTaxonId(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rank {
    Superkingdom,
    Domain,
    Realm,
    Kingdom,
    Subkingdom,
    Phylum,
    Subphylum,
    Class,
    Subclass,
    Order,
    Suborder,
    Family,
    Subfamily,
    Tribe,
    Genus,
    Subgenus,
    SpeciesGroup,
    Species,
    Subspecies,
    Strain,
    Clade,
    NoRank,
    Other(String),
}

impl Rank {
    pub fn as_str(&self) -> &str {
        match self {
            Rank::Superkingdom => "superkingdom",
            Rank::Domain => "domain",
            Rank::Realm => "realm",
            Rank::Kingdom => "kingdom",
            Rank::Subkingdom => "subkingdom",
            Rank::Phylum => "phylum",
            Rank::Subphylum => "subphylum",
            Rank::Class => "class",
            Rank::Subclass => "subclass",
            Rank::Order => "order",
            Rank::Suborder => "suborder",
            Rank::Family => "family",
            Rank::Subfamily => "subfamily",
            Rank::Tribe => "tribe",
            Rank::Genus => "genus",
            Rank::Subgenus => "subgenus",
            Rank::SpeciesGroup => "species group",
            Rank::Species => "species",
            Rank::Subspecies => "subspecies",
            Rank::Strain => "strain",
            Rank::Clade => "clade",
            Rank::NoRank => "no rank",
            Rank::Other(label) => label,
        }
    }

    pub fn parse_label(label: &str) -> Self {
        match label.trim() {
            "superkingdom" => Rank::Superkingdom,
            "domain" => Rank::Domain,
            "realm" => Rank::Realm,
            "kingdom" => Rank::Kingdom,
            "subkingdom" => Rank::Subkingdom,
            "phylum" => Rank::Phylum,
            "subphylum" => Rank::Subphylum,
            "class" => Rank::Class,
            "subclass" => Rank::Subclass,
            "order" => Rank::Order,
            "suborder" => Rank::Suborder,
            "family" => Rank::Family,
            "subfamily" => Rank::Subfamily,
            "tribe" => Rank::Tribe,
            "genus" => Rank::Genus,
            "subgenus" => Rank::Subgenus,
            "species group" => Rank::SpeciesGroup,
            "species" => Rank::Species,
            "subspecies" => Rank::Subspecies,
            "strain" => Rank::Strain,
            "clade" => Rank::Clade,
            "no rank" => Rank::NoRank,
            other => Rank::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

pub const LINEAGE_RANKS: [Rank; 6] = [
    Rank::Species,
    Rank::Genus,
    Rank::Family,
    Rank::Order,
    Rank::Class,
    Rank::Phylum,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MicrobeKingdom {
    Bacteria,
    Viruses,
    Fungi,
}

impl MicrobeKingdom {
    pub const ALL: [MicrobeKingdom; 3] = [
        MicrobeKingdom::Bacteria,
        MicrobeKingdom::Viruses,
        MicrobeKingdom::Fungi,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MicrobeKingdom::Bacteria => "Bacteria",
            MicrobeKingdom::Viruses => "Viruses",
            MicrobeKingdom::Fungi => "Fungi",
        }
    }

    pub fn from_label(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kingdom| kingdom.label() == name)
    }
}

impl fmt::Display for MicrobeKingdom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub fn normalize_name(name: &str) -> &str {
    name.trim()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T, D> {
    Found(T),
    Defaulted(D),
}

impl<T, D> Resolved<T, D> {
    pub fn from_lookup(result: Result<T, TaxaError>, default: Option<D>) -> Result<Self, TaxaError> {
        match (result, default) {
            (Ok(value), _) => Ok(Resolved::Found(value)),
            (Err(TaxaError::UnknownTaxonName(_)), Some(default)) => Ok(Resolved::Defaulted(default)),
            (Err(err), _) => Err(err),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Resolved::Found(value) => Some(value),
            Resolved::Defaulted(_) => None,
        }
    }

    pub fn as_found(&self) -> Option<&T> {
        match self {
            Resolved::Found(value) => Some(value),
            Resolved::Defaulted(_) => None,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Resolved::Defaulted(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U, D> {
        match self {
            Resolved::Found(value) => Resolved::Found(f(value)),
            Resolved::Defaulted(default) => Resolved::Defaulted(default),
        }
    }
}

impl<T> Resolved<T, T> {
    pub fn into_inner(self) -> T {
        match self {
            Resolved::Found(value) | Resolved::Defaulted(value) => value,
        }
    }
}
