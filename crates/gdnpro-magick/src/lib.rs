//! # gdnpro-magick
//!
//! Drives ImageMagick to turn PDF documents into animated GIFs.
//!
//! This crate provides functionality for:
//! - Resolving frame delay and loop count from the user's animation options
//! - Building the exact rasterizer argument list
//! - Locating the rasterizer, including a portable bundle
//! - Running external tools through a replaceable [`CommandRunner`]
//! - Measuring rendered file sizes
//!
//! ## Features
//!
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use gdnpro_magick::{gif_command, resolve_parameters, CommandRunner, FrameSelector, SystemRunner, Toolchain};
//! use std::path::Path;
//!
//! let chain = Toolchain::discover(None, None)?;
//! let params = resolve_parameters(true, &FrameSelector::Loop);
//! let mut cmd = gif_command(chain.rasterizer(), Path::new("a.pdf"), Path::new("a.gif"), params, true);
//! chain.prepare(&mut cmd);
//! SystemRunner.run(&cmd)?;
//! # Ok::<(), gdnpro_magick::Error>(())
//! ```

pub mod args;
pub mod command;
mod error;
pub mod params;
pub mod size;
pub mod tools;

// Re-exports
pub use args::{build_gif_args, gif_command};
pub use command::{CommandRunner, SystemRunner, ToolCommand, ToolOutput};
pub use error::{describe_exit, Error, Result};
pub use params::{resolve_parameters, EncodingParameters, FrameSelector};
pub use size::{describe_size, exact_file_size};
pub use tools::{check_tool, check_tools, require_tool, ToolInfo, Toolchain};
