//! Exact byte size of rendered files.

use crate::command::{CommandRunner, ToolCommand};
use crate::{Error, Result};
use std::path::Path;

/// Disk usage tool queried before falling back to `stat`.
pub const DU: &str = "du";

/// Resolve the size of `path` in bytes.
///
/// Asks `du -b` through `runner` first; if the tool is missing, fails, or
/// prints something unparsable, falls back to filesystem metadata.
pub fn exact_file_size(runner: &dyn CommandRunner, path: &Path) -> Result<u64> {
    match du_size(runner, path) {
        Ok(size) => Ok(size),
        Err(e) => {
            #[cfg(feature = "tracing")]
            tracing::debug!("du failed for {:?}, falling back to stat: {}", path, e);
            let _ = e;
            stat_size(path)
        }
    }
}

fn du_size(runner: &dyn CommandRunner, path: &Path) -> Result<u64> {
    let mut cmd = ToolCommand::new(DU);
    cmd.arg("-b").arg(path.to_string_lossy());
    let output = runner.run(&cmd)?;
    parse_du_output(&output.stdout)
}

fn stat_size(path: &Path) -> Result<u64> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::OutputMissing {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Parse the first field of `du` output as a byte count.
pub fn parse_du_output(stdout: &str) -> Result<u64> {
    stdout
        .split_whitespace()
        .next()
        .and_then(|field| field.parse::<u64>().ok())
        .ok_or_else(|| Error::SizeOutput {
            output: stdout.trim().to_string(),
        })
}

/// Human readable size, e.g. `"2048 Bytes (2.00 KB)"`.
pub fn describe_size(bytes: u64) -> String {
    format!("{} Bytes ({:.2} KB)", bytes, bytes as f64 / 1024.0)
}
