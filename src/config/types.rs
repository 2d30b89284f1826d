use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub gif: GifDefaults,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Explicit path to `magick` or `convert`
    #[serde(default)]
    pub magick_path: Option<PathBuf>,

    /// Portable ImageMagick bundle containing `bin/` and `lib/`
    #[serde(default)]
    pub bundle_dir: Option<PathBuf>,
}

/// Directory name of a bundle shipped next to the executable.
pub const BUNDLE_DIR_NAME: &str = "portable_magick";

impl ToolsConfig {
    /// Configured bundle, else `portable_magick` beside the running binary.
    pub fn effective_bundle_dir(&self) -> Option<PathBuf> {
        if let Some(dir) = &self.bundle_dir {
            return Some(dir.clone());
        }

        let exe = std::env::current_exe().ok()?;
        let candidate = exe.parent()?.join(BUNDLE_DIR_NAME);
        candidate.is_dir().then_some(candidate)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~/.config/gdnpro/gdnpro.db").as_ref())
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Batch options used when neither the command line nor the settings store
/// supplies a value.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GifDefaults {
    #[serde(default = "default_true")]
    pub frame_control: bool,

    #[serde(default = "default_frames")]
    pub frames: String,

    #[serde(default)]
    pub optimize: bool,

    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_frames() -> String {
    "Loop".to_string()
}

impl Default for GifDefaults {
    fn default() -> Self {
        Self {
            frame_control: default_true(),
            frames: default_frames(),
            optimize: false,
            output_dir: None,
        }
    }
}
