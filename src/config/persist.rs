//! Writing configuration files.

use anyhow::{Context, Result};
use std::path::Path;

/// Write `config` as TOML to `path`, creating parent directories.
///
/// Refuses to overwrite an existing file.
pub fn save_config(path: &Path, config: &super::Config) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config file already exists: {:?}", path);
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
    }

    let content = toml::to_string_pretty(config).with_context(|| "Failed to serialize config")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    Ok(())
}
