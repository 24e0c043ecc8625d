use std::fs;

use camino::Utf8PathBuf;

use kira_taxa::store::{DumpPaths, DumpStore, locate_in};

#[test]
fn layout_paths() {
    let store = DumpStore::new().unwrap();
    let paths = DumpPaths::in_dir(store.cache_root());
    assert!(paths.nodes.ends_with("kira-taxa/taxdump/nodes.dmp"));
    assert!(paths.names.ends_with("kira-taxa/taxdump/names.dmp"));
}

#[test]
fn project_dump_wins_over_cache() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let project = root.join("project");
    let cache = root.join("cache");
    for location in [&project, &cache] {
        fs::create_dir_all(location).unwrap();
        fs::write(location.join("nodes.dmp"), "").unwrap();
        fs::write(location.join("names.dmp"), "").unwrap();
    }

    let store = DumpStore::new_with_paths(project.clone(), cache);
    let paths = store.locate().unwrap();
    assert_eq!(paths, DumpPaths::in_dir(&project));
    assert!(paths.exists());
}

#[test]
fn half_present_dump_is_not_located() {
    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    fs::write(root.join("nodes.dmp"), "").unwrap();
    assert!(locate_in(&root).is_none());
}
