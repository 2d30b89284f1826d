//! Conversion pipeline integration tests
//!
//! Runs the batch worker against a real child process standing in for the
//! rasterizer.

#![cfg(unix)]

mod common;

use common::{fake_rasterizer, FAKE_GIF};
use gdnpro::convert::{channels, ConversionJob, ConversionWorker, GifOptions, ItemError};
use gdnpro_magick::{FrameSelector, SystemRunner, Toolchain};
use std::sync::Arc;

fn worker(dir: &std::path::Path) -> ConversionWorker {
    let magick = fake_rasterizer(dir);
    ConversionWorker::new(Toolchain::new(magick, None), Arc::new(SystemRunner))
}

#[test]
fn test_single_document_default_loop() {
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("doc1.pdf");
    std::fs::write(&pdf, b"%PDF").unwrap();

    let job = ConversionJob::new(vec![pdf], None, GifOptions::default());
    let (observer, mut progress_rx, mut outcome_rx) = channels();
    let summary = worker(dir.path())
        .spawn(job, observer)
        .unwrap()
        .join()
        .unwrap();

    assert!(summary.all_succeeded());
    let result = outcome_rx.blocking_recv().unwrap().unwrap();
    assert_eq!(result.destination, dir.path().join("doc1.gif"));
    assert_eq!(result.bytes, FAKE_GIF.len() as u64);
    assert_eq!(result.size_description, "11 Bytes (0.01 KB)");

    let progress = progress_rx.blocking_recv().unwrap();
    assert_eq!((progress.current, progress.total), (1, 1));
    assert_eq!(progress.name, "doc1.pdf");
    assert!(progress_rx.blocking_recv().is_none());
}

#[test]
fn test_second_document_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out");
    std::fs::create_dir(&out).unwrap();

    let sources = vec![dir.path().join("x.pdf"), dir.path().join("broken-y.pdf")];
    for source in &sources {
        std::fs::write(source, b"%PDF").unwrap();
    }

    let options = GifOptions {
        frame_control: false,
        frames: FrameSelector::Count(2),
        optimize: true,
    };
    let job = ConversionJob::new(sources, Some(out.clone()), options);
    let (observer, mut progress_rx, mut outcome_rx) = channels();
    let summary = worker(dir.path())
        .spawn(job, observer)
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(summary.converted.len(), 1);
    assert_eq!(summary.skipped.len(), 1);

    let first = outcome_rx.blocking_recv().unwrap().unwrap();
    assert_eq!(first.destination, out.join("x.gif"));
    let second = outcome_rx.blocking_recv().unwrap().unwrap_err();
    assert!(matches!(
        second.error,
        ItemError::Execution { code: Some(1), ref stderr } if stderr.contains("no decode delegate")
    ));
    assert!(outcome_rx.blocking_recv().is_none());

    let mut indices = Vec::new();
    while let Some(p) = progress_rx.blocking_recv() {
        indices.push(p.current);
    }
    assert_eq!(indices, [1, 2]);
    assert!(!out.join("broken-y.gif").exists());
}
