//! Aspect-ratio preserving tile normalization
//!
//! Tiles cut near the image border (or grown by overlap) rarely match the
//! nominal tile size. The normalizer fits such a tile into the target box
//! without distortion and pads the remainder, so every produced tile has
//! exactly the requested dimensions.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use log::debug;

/// Padding colour behind normalized tiles
pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Fits tiles into a fixed box, padding with a background colour
#[derive(Debug, Clone, Copy)]
pub struct AspectRatioNormalizer {
    filter: FilterType,
    background: Rgb<u8>,
}

impl Default for AspectRatioNormalizer {
    fn default() -> Self {
        AspectRatioNormalizer {
            filter: FilterType::Lanczos3,
            background: BACKGROUND,
        }
    }
}

impl AspectRatioNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `tile` to exactly `target_width x target_height`
    ///
    /// The tile is downscaled (never upscaled) until it fits the box with
    /// its ratio intact. If it does not fill the box, it is centred on a
    /// background canvas; an alpha channel, when present, masks the paste.
    ///
    /// # Arguments
    /// * `tile` - Cropped tile
    /// * `target_width` - Width of the output
    /// * `target_height` - Height of the output
    ///
    /// # Returns
    /// An image of exactly the target size
    pub fn normalize(&self, tile: &DynamicImage, target_width: u32, target_height: u32) -> DynamicImage {
        let (width, height) = (tile.width(), tile.height());
        let (scaled_width, scaled_height) = fit_within(width, height, target_width, target_height);

        let scaled = if (scaled_width, scaled_height) == (width, height) {
            tile.clone()
        } else {
            debug!("Scaling tile {}x{} to {}x{}", width, height, scaled_width, scaled_height);
            tile.resize_exact(scaled_width, scaled_height, self.filter)
        };

        if (scaled_width, scaled_height) == (target_width, target_height) {
            return scaled;
        }

        let pad_x = target_width.saturating_sub(scaled_width) / 2;
        let pad_y = target_height.saturating_sub(scaled_height) / 2;
        debug!("Padding tile onto {}x{} canvas at ({}, {})", target_width, target_height, pad_x, pad_y);

        if scaled.color().has_alpha() {
            let mut canvas = DynamicImage::ImageRgb8(RgbImage::from_pixel(
                target_width,
                target_height,
                self.background,
            ))
            .to_rgba8();
            imageops::overlay(&mut canvas, &scaled.to_rgba8(), pad_x as i64, pad_y as i64);
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
        } else {
            let mut canvas = RgbImage::from_pixel(target_width, target_height, self.background);
            imageops::replace(&mut canvas, &scaled.to_rgb8(), pad_x as i64, pad_y as i64);
            DynamicImage::ImageRgb8(canvas)
        }
    }
}

/// Largest size with the ratio of `width:height` that fits the target box
///
/// Sizes already inside the box are returned unchanged. Each side is at
/// least one pixel and never exceeds the box.
pub fn fit_within(width: u32, height: u32, target_width: u32, target_height: u32) -> (u32, u32) {
    if width <= target_width && height <= target_height {
        return (width, height);
    }

    let ratio = f64::min(
        target_width as f64 / width as f64,
        target_height as f64 / height as f64,
    );
    let fitted = |side: u32, limit: u32| ((side as f64 * ratio).round() as u32).clamp(1, limit.max(1));

    (fitted(width, target_width), fitted(height, target_height))
}
