//! Failures of the rasterizer, `du`, and output sizing.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Neither the configured path, the bundle, nor PATH has the tool.
    #[error("tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// The tool exists but the process could not be started.
    #[error("could not start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully.
    #[error("{tool} {}: {}", exit_text(.code), .stderr.trim())]
    ToolFailed {
        tool: String,
        /// `None` when the process was killed by a signal.
        code: Option<i32>,
        stderr: String,
    },

    /// `du` printed something other than a leading byte count.
    #[error("unrecognised du output: {output:?}")]
    SizeOutput { output: String },

    /// The rasterizer reported success but left no file behind.
    #[error("rendered file is missing: {}", path.display())]
    OutputMissing { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn tool_not_found(tool: impl Into<String>) -> Self {
        Self::ToolNotFound { tool: tool.into() }
    }

    pub fn tool_failed(tool: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            code,
            stderr: stderr.into(),
        }
    }
}

/// `"exited with status 3"`, or the signal case when there is no code.
pub fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    }
}

fn exit_text(code: &Option<i32>) -> String {
    describe_exit(*code)
}
