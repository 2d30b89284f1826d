//! Sequential conversion worker.

use super::events::{ConversionObserver, ConversionResult, ItemError, Progress, SkippedItem};
use super::{ConversionJob, OUTPUT_EXTENSION};
use gdnpro_common::paths::{destination_path, display_name};
use gdnpro_magick::{
    describe_size, exact_file_size, gif_command, resolve_parameters, CommandRunner, Toolchain,
};
use std::path::Path;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// Totals for a finished batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub converted: Vec<ConversionResult>,
    pub skipped: Vec<SkippedItem>,
}

impl BatchSummary {
    pub fn all_succeeded(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Runs conversion jobs one document at a time.
#[derive(Clone)]
pub struct ConversionWorker {
    toolchain: Toolchain,
    runner: Arc<dyn CommandRunner>,
}

impl ConversionWorker {
    /// Create a worker that invokes `toolchain`'s rasterizer via `runner`.
    pub fn new(toolchain: Toolchain, runner: Arc<dyn CommandRunner>) -> Self {
        Self { toolchain, runner }
    }

    /// Run `job` on a dedicated thread.
    ///
    /// The observer moves to the worker thread and is dropped when the batch
    /// ends. There is no cancellation; the batch runs over every input.
    pub fn spawn<O>(self, job: ConversionJob, observer: O) -> std::io::Result<JoinHandle<BatchSummary>>
    where
        O: ConversionObserver + 'static,
    {
        std::thread::Builder::new()
            .name("gif-worker".to_string())
            .spawn(move || {
                let mut observer = observer;
                self.run(&job, &mut observer)
            })
    }

    /// Run `job` on the calling thread.
    pub fn run(&self, job: &ConversionJob, observer: &mut dyn ConversionObserver) -> BatchSummary {
        let total = job.sources.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        info!(
            "Converting {} document(s) (frame control: {}, frames: {}, optimize: {})",
            total, job.options.frame_control, job.options.frames, job.options.optimize
        );

        for (idx, source) in job.sources.iter().enumerate() {
            let name = display_name(source);

            match self.convert_one(job, source) {
                Ok(result) => {
                    info!("Created {:?} ({})", result.destination, result.size_description);
                    observer.on_converted(&result);
                    summary.converted.push(result);
                }
                Err(error) => {
                    warn!("Skipping {}: {}", name, error);
                    observer.on_skipped(source, &error);
                    summary.skipped.push(SkippedItem {
                        source: source.clone(),
                        error,
                    });
                }
            }

            observer.on_progress(&Progress {
                name,
                current: idx + 1,
                total,
            });
        }

        info!(
            "Batch finished: {} converted, {} skipped",
            summary.converted.len(),
            summary.skipped.len()
        );

        summary
    }

    fn convert_one(&self, job: &ConversionJob, source: &Path) -> Result<ConversionResult, ItemError> {
        let destination = destination_path(source, job.output_dir.as_deref(), OUTPUT_EXTENSION);
        let params = resolve_parameters(job.options.frame_control, &job.options.frames);

        let mut cmd = gif_command(
            self.toolchain.rasterizer(),
            source,
            &destination,
            params,
            job.options.optimize,
        );
        self.toolchain.prepare(&mut cmd);

        let output = self
            .runner
            .run(&cmd)
            .map_err(ItemError::from_run)?;
        debug!(
            "Rasterizer finished for {:?}: stdout={:?} stderr={:?}",
            source,
            output.stdout.trim(),
            output.stderr.trim()
        );

        let bytes = exact_file_size(self.runner.as_ref(), &destination)
            .map_err(|e| ItemError::Size(e.to_string()))?;

        Ok(ConversionResult {
            source: source.to_path_buf(),
            destination,
            size_description: describe_size(bytes),
            bytes,
        })
    }
}
