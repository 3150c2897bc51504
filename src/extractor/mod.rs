//! Tile extraction
//!
//! Crop geometry, aspect normalization, format-aware encoding and the
//! pipeline that ties them together.

mod region;
pub mod normalizer;
pub mod encoder;
mod pipeline;
mod plan;
#[cfg(test)]
mod tests;

// Public exports
pub use region::{BoundsCalculator, CropBounds, Region};
pub use normalizer::AspectRatioNormalizer;
pub use encoder::TileEncoding;
pub use pipeline::{
    planned_paths, ExtractionPipeline, FileWriter, NoProgress, PipelineState, ProgressSink, TileWriter,
};
pub use plan::{PlannedTile, TilePlan};
