//! Tests for the tiling tool

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use tempfile::tempdir;

use crate::config::{Coordinate, TilingConfig};
use crate::tools::{Tool, TilingTool};

fn write_source(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| Rgb([x as u8, y as u8, 0]))
        .save(&path)
        .unwrap();
    path
}

fn coords(list: &[(u32, u32)]) -> Vec<Coordinate> {
    list.iter().map(|&(x, y)| Coordinate::new(x, y)).collect()
}

#[test]
fn test_execute_writes_tiles() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "photo.png", 100, 100);
    let out = dir.path().join("out");
    let config = TilingConfig::new(&input, &out, 50, 50, coords(&[(0, 0), (50, 50)]));

    let result = TilingTool::new().execute(&config);

    assert!(result.success, "{}", result.message);
    assert_eq!(result.output_files, vec![out.join("photo_0_0.png"), out.join("photo_50_50.png")]);
    assert!(result.output_files.iter().all(|p| p.is_file()));
}

#[test]
fn test_validation_failure_is_reported() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "photo.png", 100, 100);
    let mut config = TilingConfig::new(&input, dir.path().join("out"), 50, 50, coords(&[(0, 0)]));
    config.overlap = 50;

    let result = TilingTool::new().execute(&config);

    assert!(!result.success);
    assert_eq!(result.error_code.as_deref(), Some("VALIDATION_ERROR"));
    assert_eq!(result.metadata["validation_errors"][0]["field"], "overlap");
    assert!(!dir.path().join("out").exists());
}

#[test]
fn test_bad_pattern_reports_all_problems() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "photo.png", 10, 10);
    let mut config = TilingConfig::new(&input, dir.path(), 0, 5, coords(&[(0, 0)]));
    config.output_pattern = "{name}.{ext}".to_string();

    let result = TilingTool::new().execute(&config);

    assert_eq!(result.error_code.as_deref(), Some("VALIDATION_ERROR"));
    let errors = result.metadata["validation_errors"].as_array().unwrap();
    assert!(errors.iter().any(|e| e["field"] == "tile_width"));
    assert!(errors.iter().any(|e| e["field"] == "output_pattern"));
}

#[test]
fn test_undecodable_input_fails_validation() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.png");
    fs::write(&input, b"definitely not a png").unwrap();
    let config = TilingConfig::new(&input, dir.path().join("out"), 5, 5, coords(&[(0, 0)]));

    let result = TilingTool::new().execute(&config);

    assert_eq!(result.error_code.as_deref(), Some("VALIDATION_ERROR"));
    assert_eq!(result.metadata["validation_errors"][0]["field"], "input_path");
}

#[test]
fn test_jpeg_source_produces_jpeg_tiles() {
    let dir = tempdir().unwrap();
    let input = write_source(dir.path(), "scan.JPG", 64, 64);
    let config = TilingConfig::new(&input, dir.path().join("out"), 32, 32, coords(&[(0, 0), (32, 32)]));

    let result = TilingTool::new().execute(&config);

    assert!(result.success, "{}", result.message);
    let first = &result.output_files[0];
    assert_eq!(first.extension().unwrap(), "jpg");
    assert_eq!(image::ImageFormat::from_path(first).unwrap(), image::ImageFormat::Jpeg);
    assert_eq!(image::open(first).unwrap().width(), 32);
}
