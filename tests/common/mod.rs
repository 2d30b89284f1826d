//! Shared helpers for integration tests.
//!
//! [`Workspace`] owns a scratch directory holding a settings database and a
//! config file, so CLI runs never touch the user's real settings.

#![allow(dead_code)]

use assert_cmd::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Output written by [`fake_rasterizer`] for every document.
pub const FAKE_GIF: &[u8] = b"GIF89a-fake";

/// Shell script standing in for `magick`.
///
/// Writes [`FAKE_GIF`] to its last argument, or exits 1 when any argument
/// contains "broken".
#[cfg(unix)]
pub fn fake_rasterizer(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("magick");
    fs::write(
        &path,
        concat!(
            "#!/bin/sh\n",
            "for last; do :; done\n",
            "case \"$*\" in *broken*) echo 'no decode delegate' >&2; exit 1;; esac\n",
            "printf 'GIF89a-fake' > \"$last\"\n",
        ),
    )
    .unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub struct Workspace {
    pub dir: TempDir,
    pub config: PathBuf,
    pub database: PathBuf,
}

impl Workspace {
    /// Scratch workspace whose config points at `magick_path`, if given.
    pub fn new(magick_path: Option<&Path>) -> Self {
        Self::in_dir(tempfile::tempdir().unwrap(), magick_path)
    }

    /// Scratch workspace using [`fake_rasterizer`] as its rasterizer.
    #[cfg(unix)]
    pub fn with_fake_rasterizer() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let tools = dir.path().join("tools");
        fs::create_dir_all(&tools).unwrap();
        let magick = fake_rasterizer(&tools);
        Self::in_dir(dir, Some(&magick))
    }

    fn in_dir(dir: TempDir, magick_path: Option<&Path>) -> Self {
        let database = dir.path().join("state").join("gdnpro.db");
        let config = dir.path().join("gdnpro.toml");

        let mut content = format!("[database]\npath = {:?}\n", database.to_string_lossy());
        if let Some(magick) = magick_path {
            content.push_str(&format!(
                "\n[tools]\nmagick_path = {:?}\n",
                magick.to_string_lossy()
            ));
        }
        fs::write(&config, content).unwrap();

        Self {
            dir,
            config,
            database,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create `name` (and parent directories) with `content`.
    pub fn file(&self, name: &str, content: &[u8]) -> PathBuf {
        let path = self.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// The gdnpro binary, wired to this workspace's config.
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("gdnpro").unwrap();
        cmd.arg("--config").arg(&self.config);
        cmd.env_remove("RUST_LOG");
        cmd
    }
}
