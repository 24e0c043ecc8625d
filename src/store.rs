use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use tracing::debug;

use crate::error::TaxaError;

pub const NODES_FILE: &str = "nodes.dmp";
pub const NAMES_FILE: &str = "names.dmp";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpPaths {
    pub nodes: Utf8PathBuf,
    pub names: Utf8PathBuf,
}

impl DumpPaths {
    pub fn in_dir(dir: &Utf8Path) -> Self {
        Self {
            nodes: dir.join(NODES_FILE),
            names: dir.join(NAMES_FILE),
        }
    }

    pub fn exists(&self) -> bool {
        self.nodes.as_std_path().is_file() && self.names.as_std_path().is_file()
    }
}

#[derive(Debug, Clone)]
pub struct DumpStore {
    project_root: Utf8PathBuf,
    cache_root: Utf8PathBuf,
}

impl DumpStore {
    pub fn new() -> Result<Self, TaxaError> {
        let cwd = std::env::current_dir().map_err(|err| TaxaError::Filesystem(err.to_string()))?;
        let project_root = Utf8PathBuf::from_path_buf(cwd.join("taxdump"))
            .map_err(|_| TaxaError::Filesystem("invalid project path".to_string()))?;

        let cache_root = BaseDirs::new()
            .and_then(|dirs| {
                Utf8PathBuf::from_path_buf(
                    dirs.home_dir()
                        .join(".cache")
                        .join("kira-taxa")
                        .join("taxdump"),
                )
                .ok()
            })
            .ok_or_else(|| {
                TaxaError::Filesystem("unable to resolve cache directory".to_string())
            })?;

        Ok(Self {
            project_root,
            cache_root,
        })
    }

    pub fn new_with_paths(project_root: Utf8PathBuf, cache_root: Utf8PathBuf) -> Self {
        Self {
            project_root,
            cache_root,
        }
    }

    pub fn project_root(&self) -> &Utf8Path {
        &self.project_root
    }

    pub fn cache_root(&self) -> &Utf8Path {
        &self.cache_root
    }

    pub fn locate(&self) -> Result<DumpPaths, TaxaError> {
        for root in [&self.project_root, &self.cache_root] {
            if let Some(paths) = locate_in(root) {
                debug!(nodes = %paths.nodes, names = %paths.names, "located taxonomy dump");
                return Ok(paths);
            }
        }
        Err(TaxaError::DumpNotFound(
            self.project_root.join(NODES_FILE).into_std_path_buf(),
        ))
    }
}

pub fn locate_in(dir: &Utf8Path) -> Option<DumpPaths> {
    Some(DumpPaths {
        nodes: find_file(dir, NODES_FILE)?,
        names: find_file(dir, NAMES_FILE)?,
    })
}

fn find_file(dir: &Utf8Path, name: &str) -> Option<Utf8PathBuf> {
    [dir.join(name), dir.join(format!("{name}.gz"))]
        .into_iter()
        .find(|path| path.as_std_path().is_file())
}
