use std::fs;
use std::io::Write;
use std::path::Path;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;
use flate2::Compression;
use flate2::write::GzEncoder;

use kira_taxa::domain::{MicrobeKingdom, Rank, Resolved, TaxonId};
use kira_taxa::error::TaxaError;
use kira_taxa::lineage::LineageWalker;
use kira_taxa::store::{DumpPaths, DumpStore};
use kira_taxa::taxonomy::Taxonomy;

const NODES: &str = include_str!("fixtures/nodes.dmp");
const NAMES: &str = include_str!("fixtures/names.dmp");

fn fixture() -> Taxonomy {
    Taxonomy::from_readers(NODES.as_bytes(), NAMES.as_bytes()).unwrap()
}

fn scenario() -> Taxonomy {
    let nodes = "1\t|\t1\t|\tno rank\t|\n\
                 2\t|\t1\t|\tsuperkingdom\t|\n\
                 3\t|\t2\t|\tgenus\t|\n\
                 4\t|\t3\t|\tspecies\t|\n";
    let names = "1\t|\troot\t|\t\t|\tscientific name\t|\n\
                 2\t|\tBacteria\t|\t\t|\tscientific name\t|\n\
                 3\t|\tEscherichia\t|\t\t|\tscientific name\t|\n\
                 4\t|\tEscherichia coli\t|\t\t|\tscientific name\t|\n";
    Taxonomy::from_readers(nodes.as_bytes(), names.as_bytes()).unwrap()
}

#[test]
fn escherichia_scenario() {
    let taxonomy = scenario();
    let classifier = taxonomy.classifier();

    let rank = classifier
        .rank_of_species("Escherichia coli", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(rank.scientific_name, "Escherichia coli");
    assert_eq!(rank.taxonomic_id, TaxonId::new(4));
    assert_eq!(rank.rank, Rank::Species);

    let lineage = classifier
        .taxonomic_lineage("Escherichia coli", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(lineage.taxonomic_id, TaxonId::new(4));
    assert_eq!(lineage.species.as_deref(), Some("Escherichia coli"));
    assert_eq!(lineage.genus.as_deref(), Some("Escherichia"));
    assert_eq!(lineage.family, None);
    assert_eq!(lineage.order, None);
    assert_eq!(lineage.class, None);
    assert_eq!(lineage.phylum, None);

    let microbe = classifier
        .rank_microbes("Escherichia coli", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(microbe.kingdom, Some(MicrobeKingdom::Bacteria));
    assert_eq!(microbe.rank, rank);
}

#[test]
fn full_lineage_matches_chain() {
    let taxonomy = fixture();
    let lineage = taxonomy
        .classifier()
        .taxonomic_lineage("Escherichia coli", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(
        lineage.fields_or(""),
        [
            "Escherichia coli",
            "Escherichia",
            "Enterobacteriaceae",
            "Enterobacterales",
            "Gammaproteobacteria",
            "Pseudomonadota",
        ]
    );
}

#[test]
fn lineage_is_idempotent() {
    let taxonomy = fixture();
    let classifier = taxonomy.classifier();
    let first = classifier.taxonomic_lineage("Homo sapiens", None::<()>).unwrap();
    let second = classifier.taxonomic_lineage("Homo sapiens", None::<()>).unwrap();
    assert_eq!(first, second);
}

#[test]
fn mammal_has_no_microbe_kingdom() {
    let taxonomy = fixture();
    let microbe = taxonomy
        .classifier()
        .rank_microbes("Homo sapiens", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(microbe.kingdom, None);
    assert_eq!(microbe.rank.rank, Rank::Species);
}

#[test]
fn viruses_and_fungi_are_recognized() {
    let taxonomy = fixture();
    let classifier = taxonomy.classifier();
    let virus = classifier
        .rank_microbes("Lymphocryptovirus", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(virus.kingdom, Some(MicrobeKingdom::Viruses));
    let yeast = classifier
        .rank_microbes("Saccharomyces cerevisiae", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(yeast.kingdom, Some(MicrobeKingdom::Fungi));
}

#[test]
fn unknown_names_use_default_or_fail() {
    let taxonomy = fixture();
    let classifier = taxonomy.classifier();
    let missing = "Nonexistus imaginarius";

    assert_eq!(
        classifier.rank_of_species(missing, Some("n/a")).unwrap(),
        Resolved::Defaulted("n/a")
    );
    assert_eq!(
        classifier.taxonomic_rank(missing, Some("n/a")).unwrap(),
        Resolved::Defaulted("n/a")
    );
    assert_eq!(
        classifier.taxonomic_lineage(missing, Some("n/a")).unwrap(),
        Resolved::Defaulted("n/a")
    );
    assert_eq!(
        classifier.rank_microbes(missing, Some("n/a")).unwrap(),
        Resolved::Defaulted("n/a")
    );

    assert_matches!(
        classifier.rank_of_species(missing, None::<()>),
        Err(TaxaError::UnknownTaxonName(_))
    );
    assert_matches!(
        classifier.taxonomic_rank(missing, None::<()>),
        Err(TaxaError::UnknownTaxonName(_))
    );
    assert_matches!(
        classifier.taxonomic_lineage(missing, None::<()>),
        Err(TaxaError::UnknownTaxonName(_))
    );
    assert_matches!(
        classifier.rank_microbes(missing, None::<()>),
        Err(TaxaError::UnknownTaxonName(_))
    );
}

#[test]
fn found_value_equal_to_default_is_still_found() {
    let taxonomy = fixture();
    let rank = taxonomy
        .classifier()
        .taxonomic_rank("Homo sapiens", Some(Rank::Species))
        .unwrap();
    assert_eq!(rank, Resolved::Found(Rank::Species));
}

#[test]
fn every_walk_ends_at_single_root() {
    let taxonomy = fixture();
    let tree = taxonomy.tree();
    let walker = LineageWalker::new(tree);
    let roots = tree.iter().filter(|taxon| taxon.is_root()).count();
    assert_eq!(roots, 1);

    for taxon in tree.iter() {
        let lineage = walker.lineage(taxon);
        assert!(lineage.len() <= tree.len());
        assert_eq!(lineage.last().unwrap().id, tree.root().id);
    }
}

#[test]
fn stray_names_are_dropped() {
    let taxonomy = fixture();
    assert_eq!(taxonomy.index().dropped(), 1);
    assert_matches!(
        taxonomy.index().resolve("Stray taxon"),
        Err(TaxaError::UnknownTaxonName(_))
    );
    assert_matches!(
        taxonomy.index().resolve("Proteobacteria"),
        Err(TaxaError::UnknownTaxonName(_))
    );
}

#[test]
fn orphan_parent_fails_build() {
    let nodes = "1\t|\t1\t|\tno rank\t|\n5\t|\t42\t|\tgenus\t|\n";
    let err = Taxonomy::from_readers(nodes.as_bytes(), "".as_bytes()).unwrap_err();
    assert_matches!(
        err,
        TaxaError::OrphanReference { id, parent } if id == TaxonId::new(5) && parent == TaxonId::new(42)
    );
    assert!(err.is_fatal());
}

#[test]
fn malformed_names_line_fails_build() {
    let names = "1\t|\troot\t|\tscientific name\n";
    let err = Taxonomy::from_readers(NODES.as_bytes(), names.as_bytes()).unwrap_err();
    assert_matches!(err, TaxaError::MalformedRecord { line: 1, .. });
}

#[test]
fn six_rank_chain_round_trips() {
    let ranks = ["phylum", "class", "order", "family", "genus", "species"];
    let labels = ["Phy", "Cla", "Ord", "Fam", "Gen", "Gen spe"];
    let mut nodes = String::from("1\t|\t1\t|\tno rank\t|\n");
    let mut names = String::from("1\t|\troot\t|\t\t|\tscientific name\t|\n");
    for (offset, (rank, label)) in ranks.iter().zip(labels).enumerate() {
        let id = offset + 2;
        nodes.push_str(&format!("{id}\t|\t{}\t|\t{rank}\t|\n", id - 1));
        names.push_str(&format!("{id}\t|\t{label}\t|\t\t|\tscientific name\t|\n"));
    }
    let taxonomy = Taxonomy::from_readers(nodes.as_bytes(), names.as_bytes()).unwrap();
    let lineage = taxonomy
        .classifier()
        .taxonomic_lineage("Gen spe", None::<()>)
        .unwrap()
        .found()
        .unwrap();
    assert_eq!(lineage.fields_or("?"), ["Gen spe", "Gen", "Fam", "Ord", "Cla", "Phy"]);
}

fn write_gz(path: &Path, content: &str) {
    let file = fs::File::create(path).unwrap();
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap();
}

#[test]
fn gzip_dumps_match_plain_dumps() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    write_gz(root.join("nodes.dmp.gz").as_std_path(), NODES);
    write_gz(root.join("names.dmp.gz").as_std_path(), NAMES);

    let store = DumpStore::new_with_paths(root.join("missing"), root.clone());
    let paths = store.locate().unwrap();
    assert_eq!(paths.nodes, root.join("nodes.dmp.gz"));

    let compressed = Taxonomy::open(&paths).unwrap();
    let plain = fixture();
    assert_eq!(compressed.tree().len(), plain.tree().len());
    assert_eq!(
        compressed
            .classifier()
            .taxonomic_lineage("Homo sapiens", None::<()>)
            .unwrap(),
        plain
            .classifier()
            .taxonomic_lineage("Homo sapiens", None::<()>)
            .unwrap()
    );
}

#[test]
fn missing_dump_files_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let err = Taxonomy::open(&DumpPaths::in_dir(&root)).unwrap_err();
    assert_matches!(err, TaxaError::Io { .. });

    let store = DumpStore::new_with_paths(root.join("a"), root.join("b"));
    assert_matches!(store.locate(), Err(TaxaError::DumpNotFound(_)));
}
