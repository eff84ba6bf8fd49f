//! Config and store path resolution.

use crate::constants;
use crate::util::path::{resolve_against, with_suffix};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CertmonPaths {
    pub config: PathBuf,
    pub store: PathBuf,
    pub run_lock: PathBuf,
}

impl CertmonPaths {
    /// Resolve paths from the config argument and the configured store path.
    /// A relative store path is taken relative to the config file's directory.
    pub fn resolve(config_arg: Option<PathBuf>, store_path: &str) -> Self {
        let config = config_arg.unwrap_or_else(|| PathBuf::from(constants::DEFAULT_CONFIG_PATH));
        let base = config
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let store = resolve_against(base, Path::new(store_path));
        Self::from_store(config, store)
    }

    /// Derive the run-lock path that sits next to a store document.
    pub fn from_store(config: PathBuf, store: PathBuf) -> Self {
        let run_lock = with_suffix(&store, ".run.lock");
        Self {
            config,
            store,
            run_lock,
        }
    }
}

impl std::fmt::Display for CertmonPaths {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "certmon@{}", self.store.display())
    }
}
