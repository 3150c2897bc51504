//! Tests for tiling configuration loading

use std::path::PathBuf;

use crate::config::{parse_coordinates, Coordinate, TilingConfig, TilingConfigBuilder};

#[test]
fn test_parse_coordinates() {
    let coords = parse_coordinates("0,0; 100,50;;200,300").unwrap();
    assert_eq!(
        coords,
        vec![Coordinate::new(0, 0), Coordinate::new(100, 50), Coordinate::new(200, 300)]
    );
}

#[test]
fn test_parse_coordinates_rejects_bad_input() {
    assert!(parse_coordinates("").is_err());
    assert!(parse_coordinates(" ; ").is_err());
    assert!(parse_coordinates("1,2;3").is_err());
    assert!(parse_coordinates("-1,2").is_err());
    assert!(parse_coordinates("99999999999,1").is_err());
}

#[test]
fn test_toml_config_with_defaults() {
    let config = TilingConfig::from_toml_str(
        r#"
        input_path = "images/photo.JPG"
        tile_width = 256
        tile_height = 128
        coordinates = [[0, 0], [256, 128]]
        "#,
    )
    .unwrap();

    assert_eq!(config.input_path, PathBuf::from("images/photo.JPG"));
    assert_eq!(config.output_dir, PathBuf::from("output"));
    assert_eq!(config.coordinates, vec![Coordinate::new(0, 0), Coordinate::new(256, 128)]);
    assert_eq!(config.output_pattern, "{base}_{x}_{y}.{ext}");
    assert_eq!(config.overlap, 0);
    assert!(!config.maintain_aspect && !config.dry_run && !config.verbose);
    assert_eq!(config.input_stem(), "photo");
    assert_eq!(config.input_extension(), "jpg");
}

#[test]
fn test_toml_config_rejects_unknown_fields() {
    let result = TilingConfig::from_toml_str(
        r#"
        input_path = "a.png"
        tile_width = 1
        tile_height = 1
        coordinates = [[0, 0]]
        tile_depth = 3
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_missing_required_field() {
    let err = TilingConfig::builder()
        .input_path("a.png")
        .tile_size(10, 10)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("coordinates"));
}

#[test]
fn test_merge_prefers_overrides() {
    let file = TilingConfigBuilder::from_toml_str(
        r#"
        input_path = "from_file.png"
        tile_width = 64
        tile_height = 64
        coordinates = [[1, 2]]
        overlap = 4
        "#,
    )
    .unwrap();

    let cli = TilingConfig::builder().tile_width(32).dry_run(true);
    let config = file.merge(cli).build().unwrap();

    assert_eq!(config.input_path, PathBuf::from("from_file.png"));
    assert_eq!(config.tile_width, 32);
    assert_eq!(config.tile_height, 64);
    assert_eq!(config.overlap, 4);
    assert!(config.dry_run);
}

#[test]
fn test_extension_fallback() {
    let config = TilingConfig::new("scan", "out", 8, 8, vec![Coordinate::new(0, 0)]);
    assert_eq!(config.input_extension(), "png");
    assert_eq!(config.input_stem(), "scan");
}
