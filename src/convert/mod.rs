//! Batch PDF to animated GIF conversion.
//!
//! A [`ConversionJob`] is handed to a [`ConversionWorker`], which renders each
//! document in input order on a dedicated thread. Every item ends in exactly
//! one outcome (converted or skipped) followed by one progress update, so
//! observers see contiguous progress `1..=N` whatever happens to individual
//! documents.

mod events;
mod worker;

pub use events::{
    channels, ChannelObserver, ConversionObserver, ConversionResult, ItemError, ItemOutcome,
    OutcomeReceiver, Progress, ProgressReceiver, SkippedItem,
};
pub use worker::{BatchSummary, ConversionWorker};

use gdnpro_magick::FrameSelector;
use std::path::PathBuf;

/// Extension of rendered files.
pub const OUTPUT_EXTENSION: &str = "gif";

/// User-facing animation options, constant across a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifOptions {
    /// Frame-control adjustment toggle.
    pub frame_control: bool,
    /// Animation frame mode.
    pub frames: FrameSelector,
    /// Add `-layers Optimize`.
    pub optimize: bool,
}

impl Default for GifOptions {
    fn default() -> Self {
        Self {
            frame_control: true,
            frames: FrameSelector::Loop,
            optimize: false,
        }
    }
}

/// One batch request.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Source documents, processed in this order.
    pub sources: Vec<PathBuf>,
    /// Where outputs go; `None` writes next to each source.
    pub output_dir: Option<PathBuf>,
    pub options: GifOptions,
}

impl ConversionJob {
    pub fn new(sources: Vec<PathBuf>, output_dir: Option<PathBuf>, options: GifOptions) -> Self {
        Self {
            sources,
            output_dir,
            options,
        }
    }
}
