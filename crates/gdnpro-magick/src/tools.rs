//! External tool detection and the portable ImageMagick bundle.

use crate::command::ToolCommand;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Rasterizer executables, newest name first.
pub const RASTERIZER_NAMES: &[&str] = &["magick", "convert"];

/// Information about an external tool.
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool is available and get its information.
///
/// # Example
///
/// ```no_run
/// use gdnpro_magick::check_tool;
///
/// let info = check_tool("gifsicle");
/// if info.available {
///     println!("gifsicle version: {:?}", info.version);
/// }
/// ```
pub fn check_tool(name: &str) -> ToolInfo {
    check_tool_with_arg(name, "--version")
}

/// Check if a tool is available using a custom version argument.
pub fn check_tool_with_arg(name: &str, version_arg: &str) -> ToolInfo {
    let result = Command::new(name).arg(version_arg).output();

    match result {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string());

            let path = which::which(name).ok();

            ToolInfo {
                name: name.to_string(),
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        },
    }
}

/// Check all tools the converter may call.
///
/// Returns information about magick, convert, gifsicle and du.
pub fn check_tools() -> Vec<ToolInfo> {
    vec![
        check_tool_with_arg("magick", "-version"),
        check_tool_with_arg("convert", "-version"),
        check_tool("gifsicle"),
        check_tool("du"),
    ]
}

/// Require that a tool is available, returning its path.
///
/// # Errors
///
/// Returns an error if the tool is not found.
pub fn require_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| Error::tool_not_found(name))
}

/// A resolved rasterizer plus the environment it needs.
///
/// A portable bundle is laid out as `<bundle>/bin` and `<bundle>/lib`. When
/// the rasterizer comes from a bundle, children get its `bin` prepended to
/// `PATH` and its `lib` as the dynamic library path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    rasterizer: PathBuf,
    bundle: Option<PathBuf>,
}

impl Toolchain {
    /// Use an explicit rasterizer, optionally inside a bundle.
    pub fn new(rasterizer: impl Into<PathBuf>, bundle: Option<PathBuf>) -> Self {
        Self {
            rasterizer: rasterizer.into(),
            bundle,
        }
    }

    /// Locate the rasterizer.
    ///
    /// Order: `configured` (if it exists), `<bundle>/bin/magick`,
    /// `<bundle>/bin/convert`, then `magick` and `convert` on PATH.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolNotFound`] if none of these exist.
    pub fn discover(configured: Option<&Path>, bundle: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            if path.exists() {
                return Ok(Self::new(path, bundle.map(Path::to_path_buf)));
            }
            #[cfg(feature = "tracing")]
            tracing::warn!("Configured rasterizer {:?} does not exist, searching", path);
        }

        if let Some(dir) = bundle {
            for name in RASTERIZER_NAMES {
                let candidate = dir.join("bin").join(executable_name(name));
                if candidate.exists() {
                    return Ok(Self::new(candidate, Some(dir.to_path_buf())));
                }
            }
            #[cfg(feature = "tracing")]
            tracing::warn!("No rasterizer found in bundle {:?}", dir);
        }

        for name in RASTERIZER_NAMES {
            if let Ok(path) = require_tool(name) {
                return Ok(Self::new(path, None));
            }
        }

        Err(Error::tool_not_found(RASTERIZER_NAMES.join(" or ")))
    }

    /// Path of the rasterizer executable.
    pub fn rasterizer(&self) -> &Path {
        &self.rasterizer
    }

    /// Bundle directory, if one is in use.
    pub fn bundle(&self) -> Option<&Path> {
        self.bundle.as_deref()
    }

    /// Environment overrides for children of this toolchain.
    pub fn environment(&self) -> Vec<(String, OsString)> {
        let Some(bundle) = &self.bundle else {
            return Vec::new();
        };

        let bin = bundle.join("bin");
        let lib = bundle.join("lib");

        let mut paths = vec![bin];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        let path = std::env::join_paths(paths).unwrap_or_default();

        vec![
            ("PATH".to_string(), path),
            ("DYLD_LIBRARY_PATH".to_string(), lib.clone().into_os_string()),
            ("LD_LIBRARY_PATH".to_string(), lib.into_os_string()),
        ]
    }

    /// Apply [`Toolchain::environment`] to a command.
    pub fn prepare(&self, command: &mut ToolCommand) {
        for (key, value) in self.environment() {
            command.env(key, value);
        }
    }
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool("nonexistent_tool_12345");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_configured_path_wins() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let chain = Toolchain::discover(Some(file.path()), None).unwrap();
        assert_eq!(chain.rasterizer(), file.path());
        assert!(chain.environment().is_empty());
    }

    #[test]
    fn test_bundle_rasterizer_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let convert = bin.join(executable_name("convert"));
        std::fs::write(&convert, b"").unwrap();

        let chain = Toolchain::discover(None, Some(dir.path())).unwrap();
        assert_eq!(chain.rasterizer(), convert);
        assert_eq!(chain.bundle(), Some(dir.path()));
    }

    #[test]
    fn test_bundle_prefers_magick_over_convert() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(executable_name("convert")), b"").unwrap();
        std::fs::write(bin.join(executable_name("magick")), b"").unwrap();

        let chain = Toolchain::discover(None, Some(dir.path())).unwrap();
        assert_eq!(chain.rasterizer(), bin.join(executable_name("magick")));
    }

    #[test]
    fn test_bundle_environment() {
        let chain = Toolchain::new("/b/bin/magick", Some(PathBuf::from("/b")));
        let env = chain.environment();

        let path = env.iter().find(|(k, _)| k == "PATH").unwrap();
        let first = std::env::split_paths(&path.1).next().unwrap();
        assert_eq!(first, PathBuf::from("/b/bin"));

        let dyld = env.iter().find(|(k, _)| k == "DYLD_LIBRARY_PATH").unwrap();
        assert_eq!(PathBuf::from(&dyld.1), PathBuf::from("/b/lib"));
    }

    #[test]
    fn test_prepare_sets_env_on_command() {
        let chain = Toolchain::new("/b/bin/magick", Some(PathBuf::from("/b")));
        let mut cmd = ToolCommand::new(chain.rasterizer());
        chain.prepare(&mut cmd);
        assert_eq!(cmd.get_envs().len(), 3);
    }
}
