//! Tests for aspect-ratio normalization

use image::GenericImageView;

use super::test_utils::{gradient_image, solid_image, transparent_image};
use crate::extractor::normalizer::{fit_within, BACKGROUND};
use crate::extractor::AspectRatioNormalizer;

#[test]
fn test_output_matches_target_for_any_ratio() {
    let normalizer = AspectRatioNormalizer::new();
    let sources = [(50, 50), (120, 30), (30, 120), (7, 200), (1, 1), (64, 40)];
    let targets = [(50, 50), (64, 32), (32, 64), (1, 1), (100, 10)];

    for &(sw, sh) in &sources {
        for &(tw, th) in &targets {
            let out = normalizer.normalize(&gradient_image(sw, sh), tw, th);
            assert_eq!(out.dimensions(), (tw, th), "source {}x{} target {}x{}", sw, sh, tw, th);
        }
    }
}

#[test]
fn test_exact_fit_is_untouched() {
    let tile = gradient_image(40, 30);
    let out = AspectRatioNormalizer::new().normalize(&tile, 40, 30);
    assert_eq!(out, tile);
}

#[test]
fn test_small_tile_is_centered_not_upscaled() {
    let tile = solid_image(20, 10, [10, 20, 30]);
    let out = AspectRatioNormalizer::new().normalize(&tile, 40, 30).to_rgb8();

    // 10 px padding left/right, 10 px top/bottom
    assert_eq!(out.get_pixel(0, 0), &BACKGROUND);
    assert_eq!(out.get_pixel(9, 15), &BACKGROUND);
    assert_eq!(out.get_pixel(10, 10).0, [10, 20, 30]);
    assert_eq!(out.get_pixel(29, 19).0, [10, 20, 30]);
    assert_eq!(out.get_pixel(30, 15), &BACKGROUND);
    assert_eq!(out.get_pixel(15, 20), &BACKGROUND);
}

#[test]
fn test_wide_tile_is_letterboxed() {
    let tile = solid_image(100, 50, [0, 0, 0]);
    let out = AspectRatioNormalizer::new().normalize(&tile, 50, 50).to_rgb8();

    // Scaled to 50x25 and centred vertically at y = 12
    assert_eq!(out.get_pixel(25, 0), &BACKGROUND);
    assert_eq!(out.get_pixel(25, 11), &BACKGROUND);
    assert_eq!(out.get_pixel(25, 25).0, [0, 0, 0]);
    assert_eq!(out.get_pixel(25, 49), &BACKGROUND);
}

#[test]
fn test_transparent_pixels_show_background() {
    let out = AspectRatioNormalizer::new()
        .normalize(&transparent_image(10, 10), 20, 20)
        .to_rgb8();
    assert!(out.pixels().all(|p| *p == BACKGROUND));
}

#[test]
fn test_fit_within() {
    assert_eq!(fit_within(10, 10, 20, 20), (10, 10));
    assert_eq!(fit_within(200, 100, 50, 50), (50, 25));
    assert_eq!(fit_within(100, 200, 50, 50), (25, 50));
    assert_eq!(fit_within(1000, 1, 10, 10), (10, 1));
}
