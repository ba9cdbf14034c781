//! `parley config` -- print the effective configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use parley_types::{ParleyConfig, CONFIG_FILENAME};

/// Load the configuration for a CLI invocation.
///
/// An explicit path must exist. Without one, `./parley.toml` is used when
/// present and the defaults otherwise.
pub fn load(path: Option<&Path>) -> Result<ParleyConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let local = PathBuf::from(CONFIG_FILENAME);
            if !local.exists() {
                debug!("no {CONFIG_FILENAME} found, using defaults");
                return Ok(ParleyConfig::default());
            }
            local
        }
    };
    ParleyConfig::load(&path).with_context(|| format!("failed to load {}", path.display()))
}

/// Run `parley config`.
pub fn show(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;
    print!("{}", config.to_toml()?);
    Ok(())
}
