//! Crop geometry
//!
//! This module defines the rectangles used for tile extraction and the
//! bounds calculation that maps a tile coordinate to a clamped crop box.
//! Coordinates are in pixels with (0,0) at the top-left corner of the
//! image.

use serde::Serialize;

/// Region for image extraction (in pixel coordinates)
///
/// Represents a rectangular area defined by its top-left corner
/// coordinates and dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// X-coordinate of the top-left corner (pixels from left)
    pub x: u32,

    /// Y-coordinate of the top-left corner (pixels from top)
    pub y: u32,

    /// Width of the region in pixels
    pub width: u32,

    /// Height of the region in pixels
    pub height: u32,
}

impl Region {
    /// Create a new region
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Region { x, y, width, height }
    }

    /// Get the rightmost X coordinate (exclusive)
    pub fn end_x(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Get the bottommost Y coordinate (exclusive)
    pub fn end_y(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Number of pixels covered by the region
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Crop box as `(left, top, right, bottom)`, right/bottom exclusive
///
/// A box produced by [`BoundsCalculator`] may be empty when the tile lies
/// outside the image; check [`is_valid`](Self::is_valid) before cropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropBounds {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBounds {
    /// A box with positive width and height
    pub fn is_valid(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Convert to an origin + size region, `None` for empty boxes
    pub fn to_region(&self) -> Option<Region> {
        if self.is_valid() {
            Some(Region::new(self.left, self.top, self.width(), self.height()))
        } else {
            None
        }
    }
}

/// Maps tile coordinates to crop boxes clamped to the image
pub struct BoundsCalculator;

impl BoundsCalculator {
    /// Compute the crop box of one tile
    ///
    /// The nominal tile `[x, x + tile_width) x [y, y + tile_height)` is
    /// grown by `overlap` on every side and clamped to the image. The
    /// result always lies within `[0, image_width] x [0, image_height]`;
    /// a tile starting outside the image yields an empty box.
    ///
    /// # Arguments
    /// * `x`, `y` - Top-left corner of the nominal tile
    /// * `tile_width`, `tile_height` - Nominal tile size
    /// * `overlap` - Extra pixels around the tile
    /// * `image_width`, `image_height` - Source image extent
    pub fn compute(
        x: u32,
        y: u32,
        tile_width: u32,
        tile_height: u32,
        overlap: u32,
        image_width: u32,
        image_height: u32,
    ) -> CropBounds {
        let left = x.saturating_sub(overlap).min(image_width);
        let top = y.saturating_sub(overlap).min(image_height);
        let right = x
            .saturating_add(tile_width)
            .saturating_add(overlap)
            .min(image_width);
        let bottom = y
            .saturating_add(tile_height)
            .saturating_add(overlap)
            .min(image_height);

        CropBounds { left, top, right, bottom }
    }
}
