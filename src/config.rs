use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::TaxaError;
use crate::store::{DumpPaths, DumpStore, locate_in};

pub const CONFIG_FILE: &str = "kira-taxa.json";

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub schema_version: Option<u32>,
    #[serde(default)]
    pub dump: Option<DumpEntry>,
    #[serde(default)]
    pub threads: Option<usize>,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(untagged)]
pub enum DumpEntry {
    Shorthand(String),
    Detailed(DumpEntryObject),
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DumpEntryObject {
    pub nodes: String,
    pub names: String,
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub schema_version: u32,
    pub dump: DumpPaths,
    pub threads: Option<usize>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, TaxaError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Err(TaxaError::MissingConfig);
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| TaxaError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| TaxaError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config, &DumpStore::new()?)
    }

    pub fn resolve_or_default(path: Option<&str>) -> Result<ResolvedConfig, TaxaError> {
        match Self::resolve(path) {
            Err(TaxaError::MissingConfig) => Self::resolve_config(
                Config {
                    schema_version: None,
                    dump: None,
                    threads: None,
                },
                &DumpStore::new()?,
            ),
            other => other,
        }
    }

    pub fn resolve_config(config: Config, store: &DumpStore) -> Result<ResolvedConfig, TaxaError> {
        let schema_version = config.schema_version.unwrap_or(1);
        if schema_version != 1 {
            return Err(TaxaError::InvalidConfig(format!(
                "unsupported schema_version {schema_version}"
            )));
        }
        if config.threads == Some(0) {
            return Err(TaxaError::InvalidConfig(
                "threads must be at least 1".to_string(),
            ));
        }

        let dump = match config.dump {
            None => store.locate()?,
            Some(DumpEntry::Shorthand(dir)) => {
                let dir = Utf8PathBuf::from(dir);
                locate_in(&dir).unwrap_or_else(|| DumpPaths::in_dir(&dir))
            }
            Some(DumpEntry::Detailed(obj)) => DumpPaths {
                nodes: Utf8PathBuf::from(obj.nodes),
                names: Utf8PathBuf::from(obj.names),
            },
        };

        Ok(ResolvedConfig {
            schema_version,
            dump,
            threads: config.threads,
        })
    }
}
