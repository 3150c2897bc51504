//! Tests for the extraction pipeline

use std::cell::{Cell, RefCell};
use std::fs;
use std::io;
use std::path::Path;

use image::{DynamicImage, GenericImageView};
use tempfile::tempdir;

use super::test_utils::{gradient_image, png_config};
use crate::config::Coordinate;
use crate::errors::TileError;
use crate::extractor::{ExtractionPipeline, PipelineState, ProgressSink, TileEncoding, TileWriter};
use crate::result::TileOutcome;

#[derive(Default)]
struct RecordingSink {
    started: RefCell<Vec<usize>>,
    finished: RefCell<Vec<bool>>,
}

impl ProgressSink for RecordingSink {
    fn tile_started(&self, index: usize, _coordinate: Coordinate) {
        self.started.borrow_mut().push(index);
    }

    fn tile_finished(&self, _index: usize, outcome: &TileOutcome) {
        self.finished.borrow_mut().push(outcome.is_success());
    }
}

/// Accepts every write except the one at `deny_at`, which is refused
/// with a permission error
struct DenyingWriter {
    deny_at: usize,
    calls: Cell<usize>,
}

impl DenyingWriter {
    fn new(deny_at: usize) -> Self {
        DenyingWriter { deny_at, calls: Cell::new(0) }
    }
}

impl TileWriter for DenyingWriter {
    fn write(&self, _encoding: &TileEncoding, _tile: &DynamicImage, path: &Path) -> Result<(), TileError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if call == self.deny_at {
            let denied = io::Error::from(io::ErrorKind::PermissionDenied);
            return Err(TileError::from_io(&format!("writing {}", path.display()), &denied));
        }
        Ok(())
    }
}

#[test]
fn test_all_tiles_succeed() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("tiles");
    let config = png_config(&out, 50, &[(0, 0), (100, 100), (250, 250)]);

    let mut pipeline = ExtractionPipeline::new(&config).unwrap();
    assert_eq!(pipeline.state(), PipelineState::Initialized);
    let result = pipeline.run(&gradient_image(300, 300));

    assert!(result.success, "{}", result.message);
    assert_eq!(result.error_code, None);
    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert_eq!(
        result.output_files,
        vec![out.join("source_0_0.png"), out.join("source_100_100.png"), out.join("source_250_250.png")]
    );
    for path in &result.output_files {
        assert_eq!(image::open(path).unwrap().dimensions(), (50, 50));
    }

    assert_eq!(result.metadata_u64("tile_count"), Some(3));
    assert_eq!(result.metadata_u64("failed_tiles"), Some(0));
    assert_eq!(result.metadata_u64("total_pixels_processed"), Some(3 * 50 * 50));
    assert_eq!(result.metadata["tile_size"], "50x50");
    assert_eq!(result.metadata["coordinates_processed"][1], serde_json::json!([100, 100]));
    assert_eq!(result.metadata["input_image_info"]["width"], 300);
}

#[test]
fn test_metadata_key_order() {
    let dir = tempdir().unwrap();
    let config = png_config(dir.path(), 10, &[(0, 0)]);
    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(20, 20));

    let keys: Vec<&str> = result.metadata.keys().map(String::as_str).collect();
    assert_eq!(
        &keys[..11],
        &[
            "tile_count",
            "tile_size",
            "overlap",
            "maintain_aspect",
            "total_pixels_processed",
            "pixels_per_second",
            "processing_time_ms",
            "failed_tiles",
            "coordinates_processed",
            "input_image_info",
            "tile_failures",
        ]
    );
}

#[test]
fn test_out_of_image_tile_is_partial_failure() {
    let dir = tempdir().unwrap();
    let config = png_config(dir.path(), 50, &[(0, 0), (100, 100), (500, 500)]);

    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(300, 300));

    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("PARTIAL_FAILURE"));
    assert_eq!(result.output_files.len(), 2);
    assert_eq!(result.metadata_u64("failed_tiles"), Some(1));
    assert_eq!(result.metadata_u64("tile_count"), Some(2));

    let failure = &result.metadata["tile_failures"][0];
    assert_eq!(failure["index"], 2);
    assert_eq!(failure["x"], 500);
    assert_eq!(failure["status"], "skipped");
    assert!(!dir.path().join("source_500_500.png").exists());
}

#[test]
fn test_no_tiles_produced_is_processing_error() {
    let dir = tempdir().unwrap();
    let config = png_config(dir.path(), 50, &[(400, 0), (0, 400)]);

    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(300, 300));

    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("PROCESSING_ERROR"));
    assert!(result.output_files.is_empty());
    assert_eq!(result.metadata_u64("failed_tiles"), Some(2));
}

#[test]
fn test_write_failures_are_recorded_and_skipped() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    fs::write(&blocker, b"occupied").unwrap();
    let config = png_config(&blocker, 10, &[(0, 0), (10, 10)]);

    let mut pipeline = ExtractionPipeline::new(&config).unwrap();
    let result = pipeline.run(&gradient_image(30, 30));

    assert_eq!(pipeline.state(), PipelineState::Completed);
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("PROCESSING_ERROR"));
    assert_eq!(result.metadata_u64("failed_tiles"), Some(2));
    assert_eq!(result.metadata["tile_failures"][0]["status"], "failed");
    assert!(result.metadata["tile_failures"][1]["reason"].is_string());
}

#[test]
fn test_overlap_grows_tiles() {
    let dir = tempdir().unwrap();
    let mut config = png_config(dir.path(), 50, &[(100, 100), (0, 0)]);
    config.overlap = 10;

    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(300, 300));

    assert!(result.success);
    assert_eq!(image::open(&result.output_files[0]).unwrap().dimensions(), (70, 70));
    assert_eq!(image::open(&result.output_files[1]).unwrap().dimensions(), (60, 60));

    // The interior tile starts 10 px before its coordinate
    let tile = image::open(&result.output_files[0]).unwrap().to_rgb8();
    assert_eq!(tile.get_pixel(0, 0).0, [90, 90, 180]);
}

#[test]
fn test_maintain_aspect_produces_exact_size() {
    let dir = tempdir().unwrap();
    let mut config = png_config(dir.path(), 50, &[(100, 100), (280, 0), (0, 0)]);
    config.overlap = 10;
    config.maintain_aspect = true;

    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(300, 300));

    assert!(result.success);
    for path in &result.output_files {
        assert_eq!(image::open(path).unwrap().dimensions(), (50, 50));
    }
    assert_eq!(result.metadata_u64("total_pixels_processed"), Some(3 * 2500));
}

#[test]
fn test_dry_run_creates_nothing() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never");
    let mut config = png_config(&out, 50, &[(0, 0), (50, 50)]);
    config.dry_run = true;

    let image = gradient_image(100, 100);
    let first = ExtractionPipeline::new(&config).unwrap().run(&image);
    let second = ExtractionPipeline::new(&config).unwrap().run(&image);

    assert!(first.success);
    assert_eq!(first.output_files, second.output_files);
    assert_eq!(first.output_files.len(), 2);
    assert!(!out.exists());
}

#[test]
fn test_runs_are_byte_identical() {
    let dir = tempdir().unwrap();
    let image = gradient_image(120, 80);
    let coords = [(0, 0), (40, 40), (100, 60)];

    let first = png_config(&dir.path().join("a"), 40, &coords);
    let second = png_config(&dir.path().join("b"), 40, &coords);
    let a = ExtractionPipeline::new(&first).unwrap().run(&image);
    let b = ExtractionPipeline::new(&second).unwrap().run(&image);

    for (pa, pb) in a.output_files.iter().zip(&b.output_files) {
        assert_eq!(fs::read(pa).unwrap(), fs::read(pb).unwrap());
    }
}

#[test]
fn test_custom_pattern() {
    let dir = tempdir().unwrap();
    let mut config = png_config(dir.path(), 10, &[(0, 20)]);
    config.output_pattern = "{base}-{x:04d}-{y:04d}.{ext}".to_string();

    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(40, 40));
    assert_eq!(result.output_files, vec![dir.path().join("source-0000-0020.png")]);
}

#[test]
fn test_progress_is_reported_per_tile() {
    let dir = tempdir().unwrap();
    let config = png_config(dir.path(), 10, &[(0, 0), (100, 100), (10, 10)]);
    let sink = RecordingSink::default();

    ExtractionPipeline::new(&config)
        .unwrap()
        .with_progress(&sink)
        .run(&gradient_image(30, 30));

    assert_eq!(*sink.started.borrow(), vec![0, 1, 2]);
    assert_eq!(*sink.finished.borrow(), vec![true, false, true]);
}

#[test]
fn test_invalid_pattern_is_rejected_up_front() {
    let dir = tempdir().unwrap();
    let mut config = png_config(dir.path(), 10, &[(0, 0)]);
    config.output_pattern = "{base}_{x".to_string();
    assert!(ExtractionPipeline::new(&config).is_err());
}

#[test]
fn test_permission_denied_aborts_run() {
    let dir = tempdir().unwrap();
    let config = png_config(dir.path(), 50, &[(0, 0), (100, 100), (200, 200)]);
    let writer = DenyingWriter::new(1);
    let sink = RecordingSink::default();

    let mut pipeline = ExtractionPipeline::new(&config)
        .unwrap()
        .with_writer(&writer)
        .with_progress(&sink);
    let result = pipeline.run(&gradient_image(300, 300));

    assert_eq!(pipeline.state(), PipelineState::Aborted);
    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("ACCESS_DENIED"));
    assert_eq!(result.output_files, vec![dir.path().join("source_0_0.png")]);

    // The third coordinate is never attempted
    assert_eq!(writer.calls.get(), 2);
    assert_eq!(*sink.started.borrow(), vec![0, 1]);
    assert_eq!(*sink.finished.borrow(), vec![true]);

    assert_eq!(result.metadata["error_type"], "Critical");
    assert_eq!(result.metadata_u64("tiles_completed"), Some(1));
    assert_eq!(result.metadata_u64("tiles_attempted"), Some(3));
    assert_eq!(result.metadata_u64("partial_results"), Some(1));
    assert_eq!(result.metadata_u64("aborted_at"), Some(1));
    assert!(result.metadata["error"].as_str().unwrap().contains("source_100_100.png"));
}

#[test]
fn test_pattern_escaping_output_dir_fails_tile() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("a").join("tiles");
    let mut config = png_config(&out, 10, &[(0, 0)]);
    config.output_pattern = "../../{base}_{x}_{y}.{ext}".to_string();

    let result = ExtractionPipeline::new(&config).unwrap().run(&gradient_image(20, 20));

    assert!(!result.success);
    assert!(result.output_files.is_empty());
    assert_eq!(result.metadata["tile_failures"][0]["status"], "failed");
    assert!(!dir.path().join("source_0_0.png").exists());
}
