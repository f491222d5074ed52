//! Configuration storage.
//!
//! Thin wrappers around `confy`; the serde types live in `raidlens-types`.

use std::path::PathBuf;

use raidlens_types::ApiConfig;

use crate::error::Result;

const APP_NAME: &str = "raidlens";

/// Load the stored configuration, falling back to defaults on first run.
pub fn load() -> Result<ApiConfig> {
    Ok(confy::load(APP_NAME, None)?)
}

/// Persist the configuration to the user's config directory.
pub fn store(config: &ApiConfig) -> Result<()> {
    Ok(confy::store(APP_NAME, None, config)?)
}

/// Location of the config file, for display in `config --show`.
pub fn path() -> Option<PathBuf> {
    confy::get_configuration_file_path(APP_NAME, None).ok()
}
