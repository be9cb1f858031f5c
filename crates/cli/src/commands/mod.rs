pub mod build;
pub mod init;
pub mod preview;
pub mod routes;
pub mod validate;

use anyhow::{Context, Result};
use prerender_kit_core::config::{CONFIG_FILE_NAME, Config, parse_config};
use std::path::Path;

/// Load `prerender.toml` from a project directory
pub(crate) fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Project directory does not exist: {}", path.display());
    }

    let config_path = path.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        anyhow::bail!(
            "{} not found in {}\nRun 'prerender-kit init {}' first",
            CONFIG_FILE_NAME,
            path.display(),
            path.display()
        );
    }

    parse_config(&config_path).with_context(|| format!("Failed to parse {}", CONFIG_FILE_NAME))
}
