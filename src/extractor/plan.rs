//! Extraction preview
//!
//! A [`TilePlan`] describes what a run would do without decoding pixels:
//! the crop box and output path of every coordinate plus the memory
//! estimate for the source image.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{OutputPattern, TilingConfig};
use crate::errors::RetileResult;
use crate::utils::memory_utils::{MemoryEstimate, MemoryEstimator, MEMORY_CEILING_MB};

use super::pipeline::planned_paths;
use super::region::{BoundsCalculator, CropBounds};

/// Planned extraction of one coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTile {
    pub index: usize,
    pub x: u32,
    pub y: u32,
    pub bounds: CropBounds,
    /// The crop box is non-empty
    pub valid: bool,
    pub output_path: PathBuf,
}

/// Preview of a whole run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TilePlan {
    pub input_path: PathBuf,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub overlap: u32,
    pub tiles: Vec<PlannedTile>,
    pub memory: MemoryEstimate,
    /// Peak memory estimate stays under the ceiling
    pub processing_feasible: bool,
}

impl TilePlan {
    /// Plan `config` against an image of the given size
    ///
    /// # Arguments
    /// * `config` - Run configuration
    /// * `image_width`, `image_height` - Oriented source image size
    ///
    /// # Returns
    /// The plan, or an error if the output pattern is malformed
    pub fn build(config: &TilingConfig, image_width: u32, image_height: u32) -> RetileResult<Self> {
        let pattern = OutputPattern::parse(&config.output_pattern)?;
        let paths = planned_paths(config, &pattern);

        let tiles: Vec<PlannedTile> = config
            .coordinates
            .iter()
            .zip(paths)
            .enumerate()
            .map(|(index, (c, output_path))| {
                let bounds = BoundsCalculator::compute(
                    c.x,
                    c.y,
                    config.tile_width,
                    config.tile_height,
                    config.overlap,
                    image_width,
                    image_height,
                );
                PlannedTile {
                    index,
                    x: c.x,
                    y: c.y,
                    bounds,
                    valid: bounds.is_valid(),
                    output_path,
                }
            })
            .collect();

        let memory = MemoryEstimator::estimate_rgb(image_width, image_height, tiles.len());

        Ok(TilePlan {
            input_path: config.input_path.clone(),
            image_width,
            image_height,
            tile_width: config.tile_width,
            tile_height: config.tile_height,
            overlap: config.overlap,
            tiles,
            memory,
            processing_feasible: !memory.exceeds(MEMORY_CEILING_MB),
        })
    }

    /// Number of coordinates with a non-empty crop box
    pub fn valid_tile_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.valid).count()
    }
}
