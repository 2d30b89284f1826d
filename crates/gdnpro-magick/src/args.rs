//! Argument list construction for PDF to animated GIF rendering.

use crate::command::ToolCommand;
use crate::params::EncodingParameters;
use std::path::Path;

/// Rasterization density in DPI.
pub const DENSITY: &str = "288";

/// Frame disposal flags applied to every render.
const FRAME_FLAGS: &[&str] = &[
    "-coalesce",
    "-dispose",
    "background",
    "-alpha",
    "background",
    "+dither",
];

/// Only added when optimization is requested.
const OPTIMIZE_FLAGS: &[&str] = &["-layers", "Optimize"];

/// Downscale and strip comments after rendering.
const FINISH_FLAGS: &[&str] = &["+map", "-scale", "25%", "+set", "comment"];

/// Build the rasterizer argument list for one document.
///
/// The token order is part of the tool contract and must not change.
///
/// # Example
///
/// ```
/// use gdnpro_magick::{build_gif_args, EncodingParameters};
/// use std::path::Path;
///
/// let params = EncodingParameters { delay: 300, loop_count: 0 };
/// let args = build_gif_args(Path::new("/a/doc1.pdf"), Path::new("/a/doc1.gif"), params, false);
/// assert_eq!(args[..4], ["-density", "288", "-delay", "300"]);
/// assert_eq!(args[args.len() - 2..], ["/a/doc1.pdf", "/a/doc1.gif"]);
/// ```
pub fn build_gif_args(
    source: &Path,
    destination: &Path,
    params: EncodingParameters,
    optimize: bool,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-density".to_string(),
        DENSITY.to_string(),
        "-delay".to_string(),
        params.delay.to_string(),
        "-loop".to_string(),
        params.loop_count.to_string(),
    ];

    args.extend(FRAME_FLAGS.iter().map(|s| s.to_string()));

    if optimize {
        args.extend(OPTIMIZE_FLAGS.iter().map(|s| s.to_string()));
    }

    args.extend(FINISH_FLAGS.iter().map(|s| s.to_string()));

    args.push(source.to_string_lossy().to_string());
    args.push(destination.to_string_lossy().to_string());

    args
}

/// Wrap [`build_gif_args`] into a runnable command for `program`.
pub fn gif_command(
    program: &Path,
    source: &Path,
    destination: &Path,
    params: EncodingParameters,
    optimize: bool,
) -> ToolCommand {
    let mut cmd = ToolCommand::new(program);
    cmd.args(build_gif_args(source, destination, params, optimize));
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOP: EncodingParameters = EncodingParameters {
        delay: 300,
        loop_count: 0,
    };

    #[test]
    fn test_exact_token_order_without_optimize() {
        let args = build_gif_args(Path::new("/a/doc1.pdf"), Path::new("/a/doc1.gif"), LOOP, false);
        assert_eq!(
            args,
            [
                "-density", "288", "-delay", "300", "-loop", "0", "-coalesce", "-dispose",
                "background", "-alpha", "background", "+dither", "+map", "-scale", "25%",
                "+set", "comment", "/a/doc1.pdf", "/a/doc1.gif",
            ]
        );
    }

    #[test]
    fn test_optimize_group_sits_between_frame_and_finish_flags() {
        let args = build_gif_args(Path::new("in.pdf"), Path::new("out.gif"), LOOP, true);
        let dither = args.iter().position(|a| a == "+dither").unwrap();
        assert_eq!(args[dither + 1], "-layers");
        assert_eq!(args[dither + 2], "Optimize");
        assert_eq!(args[dither + 3], "+map");
        assert_eq!(args.len(), 21);
    }

    #[test]
    fn test_negative_delay_is_passed_through() {
        let params = EncodingParameters {
            delay: -200,
            loop_count: 5,
        };
        let args = build_gif_args(Path::new("a.pdf"), Path::new("a.gif"), params, false);
        assert_eq!(args[2..6], ["-delay", "-200", "-loop", "5"]);
    }

    #[test]
    fn test_gif_command_uses_program() {
        let cmd = gif_command(
            Path::new("/bundle/bin/magick"),
            Path::new("x.pdf"),
            Path::new("x.gif"),
            LOOP,
            false,
        );
        assert_eq!(cmd.program(), Path::new("/bundle/bin/magick"));
        assert_eq!(cmd.get_args().last().map(String::as_str), Some("x.gif"));
    }
}
