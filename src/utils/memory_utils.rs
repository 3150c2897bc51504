//! Memory usage heuristics
//!
//! The estimate is an upper bound used to reject configurations that are
//! likely to exhaust memory before any pixel work starts. It does not
//! reflect actual allocations.

use serde::Serialize;

/// Bytes per pixel assumed for the decoded image (RGB)
pub const DEFAULT_BYTES_PER_PIXEL: u32 = 3;

/// Estimates above this many megabytes fail validation
pub const MEMORY_CEILING_MB: f64 = 1024.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Estimated memory use of one run, in megabytes
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MemoryEstimate {
    pub base_image_mb: f64,
    pub per_tile_mb: f64,
    pub peak_memory_mb: f64,
}

impl MemoryEstimate {
    pub fn exceeds(&self, limit_mb: f64) -> bool {
        self.peak_memory_mb > limit_mb
    }
}

pub struct MemoryEstimator;

impl MemoryEstimator {
    /// Estimate memory for tiling an image
    ///
    /// # Arguments
    /// * `image_width`, `image_height` - Source image size
    /// * `tile_count` - Number of tiles (treated as 1 when zero)
    /// * `bytes_per_pixel` - Bytes per decoded pixel
    pub fn estimate(image_width: u32, image_height: u32, tile_count: usize, bytes_per_pixel: u32) -> MemoryEstimate {
        let pixels = image_width as f64 * image_height as f64;
        let bytes_per_pixel = bytes_per_pixel as f64;

        let base_image_mb = pixels * bytes_per_pixel / BYTES_PER_MB;
        let avg_tile_pixels = pixels / tile_count.max(1) as f64;
        let per_tile_mb = avg_tile_pixels * bytes_per_pixel / BYTES_PER_MB;

        MemoryEstimate {
            base_image_mb,
            per_tile_mb,
            peak_memory_mb: base_image_mb * 1.5 + per_tile_mb * 2.0,
        }
    }

    /// Estimate with the default RGB pixel size
    pub fn estimate_rgb(image_width: u32, image_height: u32, tile_count: usize) -> MemoryEstimate {
        Self::estimate(image_width, image_height, tile_count, DEFAULT_BYTES_PER_PIXEL)
    }
}
