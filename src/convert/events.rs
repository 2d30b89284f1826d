//! Events emitted by the conversion worker.

use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

/// A successfully rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub bytes: u64,
    /// e.g. `"2048 Bytes (2.00 KB)"`
    pub size_description: String,
}

/// Why a document was dropped from the batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    /// The rasterizer could not be started.
    #[error("rasterizer unavailable: {0}")]
    Launch(String),

    /// The rasterizer ran and exited non-zero.
    #[error("rasterizer {}: {}", exit_text(.code), .stderr.trim())]
    Execution { code: Option<i32>, stderr: String },

    /// The output size could not be determined.
    #[error("could not size output: {0}")]
    Size(String),
}

impl ItemError {
    /// Classify a failed rasterizer run.
    pub fn from_run(error: gdnpro_magick::Error) -> Self {
        match error {
            gdnpro_magick::Error::ToolFailed { code, stderr, .. } => {
                ItemError::Execution { code, stderr }
            }
            other => ItemError::Launch(other.to_string()),
        }
    }
}

fn exit_text(code: &Option<i32>) -> String {
    gdnpro_magick::describe_exit(*code)
}

/// A document that was skipped, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub source: PathBuf,
    pub error: ItemError,
}

/// Per-item outcome as delivered on the outcome channel.
pub type ItemOutcome = Result<ConversionResult, SkippedItem>;

/// Batch progress after an item finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// File name of the item just finished.
    pub name: String,
    /// 1-based index of that item.
    pub current: usize,
    pub total: usize,
}

/// Receives worker notifications, in emission order.
///
/// Implementations must be cheap; the worker calls them inline between
/// documents.
pub trait ConversionObserver: Send {
    fn on_converted(&mut self, result: &ConversionResult);

    fn on_skipped(&mut self, source: &Path, error: &ItemError);

    fn on_progress(&mut self, progress: &Progress);
}

/// Receiver half of the progress channel.
pub type ProgressReceiver = mpsc::UnboundedReceiver<Progress>;

/// Receiver half of the outcome channel.
pub type OutcomeReceiver = mpsc::UnboundedReceiver<ItemOutcome>;

/// Forwards worker notifications into two unbounded channels.
///
/// Both channels close when the observer is dropped, which happens when the
/// worker thread finishes.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    progress_tx: mpsc::UnboundedSender<Progress>,
    outcome_tx: mpsc::UnboundedSender<ItemOutcome>,
}

/// Create a [`ChannelObserver`] and the receivers for its two channels.
pub fn channels() -> (ChannelObserver, ProgressReceiver, OutcomeReceiver) {
    let (progress_tx, progress_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    (
        ChannelObserver {
            progress_tx,
            outcome_tx,
        },
        progress_rx,
        outcome_rx,
    )
}

impl ConversionObserver for ChannelObserver {
    fn on_converted(&mut self, result: &ConversionResult) {
        if self.outcome_tx.send(Ok(result.clone())).is_err() {
            tracing::debug!("No receiver for conversion outcome");
        }
    }

    fn on_skipped(&mut self, source: &Path, error: &ItemError) {
        let skipped = SkippedItem {
            source: source.to_path_buf(),
            error: error.clone(),
        };
        if self.outcome_tx.send(Err(skipped)).is_err() {
            tracing::debug!("No receiver for conversion outcome");
        }
    }

    fn on_progress(&mut self, progress: &Progress) {
        if self.progress_tx.send(progress.clone()).is_err() {
            tracing::debug!("No receiver for conversion progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_delivers_in_order() {
        let (mut observer, mut progress_rx, mut outcome_rx) = channels();

        let result = ConversionResult {
            source: PathBuf::from("/a/x.pdf"),
            destination: PathBuf::from("/a/x.gif"),
            bytes: 10,
            size_description: "10 Bytes (0.01 KB)".to_string(),
        };
        observer.on_converted(&result);
        observer.on_skipped(
            Path::new("/a/y.pdf"),
            &ItemError::Execution {
                code: Some(1),
                stderr: "boom".into(),
            },
        );
        for current in 1..=2 {
            observer.on_progress(&Progress {
                name: format!("{current}.pdf"),
                current,
                total: 2,
            });
        }
        drop(observer);

        assert_eq!(outcome_rx.blocking_recv(), Some(Ok(result)));
        assert!(matches!(outcome_rx.blocking_recv(), Some(Err(SkippedItem { .. }))));
        assert_eq!(outcome_rx.blocking_recv(), None);

        assert_eq!(progress_rx.blocking_recv().map(|p| p.current), Some(1));
        assert_eq!(progress_rx.blocking_recv().map(|p| p.current), Some(2));
        assert_eq!(progress_rx.blocking_recv(), None);
    }

    #[test]
    fn run_errors_are_classified() {
        let failed = ItemError::from_run(gdnpro_magick::Error::tool_failed(
            "magick",
            Some(1),
            "no decode delegate\n",
        ));
        assert_eq!(
            failed,
            ItemError::Execution {
                code: Some(1),
                stderr: "no decode delegate\n".into(),
            }
        );
        assert_eq!(
            failed.to_string(),
            "rasterizer exited with status 1: no decode delegate"
        );

        let missing = ItemError::from_run(gdnpro_magick::Error::tool_not_found("magick"));
        assert_eq!(missing, ItemError::Launch("tool not found: magick".into()));
    }

    #[test]
    fn dropped_receivers_do_not_panic() {
        let (mut observer, progress_rx, outcome_rx) = channels();
        drop(progress_rx);
        drop(outcome_rx);
        observer.on_progress(&Progress {
            name: "a.pdf".into(),
            current: 1,
            total: 1,
        });
        observer.on_skipped(Path::new("a.pdf"), &ItemError::Size("gone".into()));
    }
}
