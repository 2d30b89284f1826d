//! Builder and runner for external tool invocations.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A fully described external tool invocation.
///
/// The argument order is kept exactly as appended; ImageMagick applies
/// settings in command-line order.
///
/// # Example
///
/// ```no_run
/// use gdnpro_magick::{CommandRunner, SystemRunner, ToolCommand};
///
/// let mut cmd = ToolCommand::new("du");
/// cmd.arg("-b").arg("/tmp/out.gif");
/// let output = SystemRunner.run(&cmd)?;
/// println!("{}", output.stdout);
/// # Ok::<(), gdnpro_magick::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    envs: Vec<(String, OsString)>,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the child process.
    pub fn env(&mut self, key: impl Into<String>, value: impl Into<OsString>) -> &mut Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Arguments in invocation order.
    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Environment overrides.
    pub fn get_envs(&self) -> &[(String, OsString)] {
        &self.envs
    }

    /// Short tool name for error messages.
    pub fn tool_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }
}

/// Executes [`ToolCommand`]s.
///
/// The batch worker only talks to external processes through this trait, so
/// tests can substitute a fake rasterizer.
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion.
    ///
    /// # Errors
    ///
    /// Implementations return [`Error::ToolNotFound`] when the program cannot
    /// be spawned because it does not exist, [`Error::Spawn`] for any other
    /// spawn failure, and [`Error::ToolFailed`] for a non-zero exit status.
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &ToolCommand) -> Result<ToolOutput> {
        let tool = command.tool_name();

        let mut cmd = Command::new(command.program());
        cmd.args(command.get_args());
        for (key, value) in command.get_envs() {
            cmd.env(key, value);
        }
        cmd.stdin(Stdio::null());

        #[cfg(feature = "tracing")]
        tracing::debug!("Running {:?} {:?}", command.program(), command.get_args());

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::tool_not_found(&tool)
            } else {
                Error::Spawn {
                    tool: tool.clone(),
                    source: e,
                }
            }
        })?;

        let tool_output = ToolOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !output.status.success() {
            return Err(Error::tool_failed(
                tool,
                output.status.code(),
                tool_output.stderr,
            ));
        }

        Ok(tool_output)
    }
}
