pub mod persist;
mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_paths(&mut config);
    validate_config(&config)?;

    Ok(config)
}

/// The config file that would be loaded: `custom_path` if given, else the
/// first existing default location.
pub fn find_config(custom_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = custom_path {
        return Some(path.to_path_buf());
    }

    let default_paths = ["./gdnpro.toml", "~/.config/gdnpro/config.toml"];

    default_paths
        .iter()
        .map(|p| PathBuf::from(shellexpand::tilde(p).as_ref()))
        .find(|p| p.exists())
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    match find_config(custom_path) {
        Some(path) => load_config(&path),
        None => Ok(Config::default()),
    }
}

fn expand_paths(config: &mut Config) {
    let expand = |p: &Path| Path::new(shellexpand::tilde(&p.to_string_lossy()).as_ref()).to_path_buf();

    config.database.path = expand(&config.database.path);
    config.tools.magick_path = config.tools.magick_path.as_deref().map(expand);
    config.tools.bundle_dir = config.tools.bundle_dir.as_deref().map(expand);
    config.gif.output_dir = config.gif.output_dir.as_deref().map(expand);
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.database.path.as_os_str().is_empty() {
        anyhow::bail!("Database path cannot be empty");
    }

    if let Some(path) = &config.tools.magick_path {
        if !path.exists() {
            tracing::warn!("Configured magick_path does not exist: {:?}", path);
        }
    }

    if let Some(dir) = &config.tools.bundle_dir {
        if !dir.join("bin").is_dir() {
            tracing::warn!("Bundle directory has no bin/: {:?}", dir);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.gif.frame_control);
        assert_eq!(config.gif.frames, "Loop");
        assert!(!config.gif.optimize);
        assert!(config.tools.magick_path.is_none());
        assert!(config.database.path.ends_with("gdnpro.db"));
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[tools]
magick_path = "/opt/im/bin/magick"

[gif]
frames = "5"
optimize = true
"#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(
            config.tools.magick_path.as_deref(),
            Some(Path::new("/opt/im/bin/magick"))
        );
        assert_eq!(config.gif.frames, "5");
        assert!(config.gif.optimize);
        assert!(config.gif.frame_control);
    }

    #[test]
    fn test_tilde_is_expanded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\npath = \"~/gdn/settings.db\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(!config.database.path.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[gif\nframes = 3").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_custom_path_is_an_error() {
        assert!(load_config_or_default(Some(Path::new("/nonexistent/gdnpro.toml"))).is_err());
    }
}
