use std::path::PathBuf;

use crate::config::Config;
use color_eyre::Result;
use dirs::data_dir;
use tasklist_storage::file_store::FileKeyValueStore;
use tracing::debug;

/// Resolve the default data directory for tasklist.
pub fn default_data_dir() -> Result<PathBuf> {
    let base = data_dir().ok_or_else(|| color_eyre::eyre::eyre!("no data dir available"))?;
    Ok(base.join("tasklist"))
}

/// Build the file-backed store, honouring a configured data directory.
pub fn store_from_config(config: &Config) -> Result<FileKeyValueStore> {
    if let Some(root) = &config.data_dir {
        debug!(?root, "initializing file store (config override)");
        return Ok(FileKeyValueStore::new(root.clone()));
    }

    let root = default_data_dir()?;
    debug!(?root, "initializing file store");
    Ok(FileKeyValueStore::new(root))
}
