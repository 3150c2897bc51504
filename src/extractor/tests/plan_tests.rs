//! Tests for extraction previews

use std::path::Path;

use super::test_utils::png_config;
use crate::extractor::TilePlan;

#[test]
fn test_plan_marks_out_of_image_tiles() {
    let config = png_config(Path::new("out"), 50, &[(0, 0), (100, 100), (500, 500)]);
    let plan = TilePlan::build(&config, 300, 300).unwrap();

    assert_eq!(plan.tiles.len(), 3);
    assert_eq!(plan.valid_tile_count(), 2);
    assert!(!plan.tiles[2].valid);
    assert_eq!(plan.tiles[1].bounds.width(), 50);
    assert_eq!(plan.tiles[1].output_path, Path::new("out").join("source_100_100.png"));
    assert!(plan.processing_feasible);
}

#[test]
fn test_plan_flags_huge_images() {
    let config = png_config(Path::new("out"), 512, &[(0, 0)]);
    let plan = TilePlan::build(&config, 20_000, 20_000).unwrap();

    assert!(plan.memory.peak_memory_mb > 1024.0);
    assert!(!plan.processing_feasible);
}

#[test]
fn test_plan_serializes() {
    let config = png_config(Path::new("out"), 10, &[(0, 0)]);
    let plan = TilePlan::build(&config, 20, 20).unwrap();

    let json = serde_json::to_value(&plan).unwrap();
    assert_eq!(json["image_width"], 20);
    assert_eq!(json["tiles"][0]["bounds"]["right"], 10);
    assert_eq!(json["tiles"][0]["valid"], true);
}
