pub mod errors;
pub mod config;
pub mod utils;
pub mod extractor;
pub mod result;
pub mod validation;
pub mod tools;
pub mod commands;
pub mod api;

pub use crate::api::Retile;

pub use config::{Coordinate, OutputPattern, TilingConfig, TilingConfigBuilder};
pub use errors::{ErrorCode, RetileError, RetileResult, TileError, ValidationError};
pub use extractor::{
    AspectRatioNormalizer, BoundsCalculator, CropBounds, ExtractionPipeline, ProgressSink, Region,
    TileEncoding, TilePlan, TileWriter,
};
pub use result::{TileOutcome, TileRecord, ToolResult};
pub use tools::{TilingTool, Tool, ToolRegistry};
pub use utils::memory_utils::{MemoryEstimate, MemoryEstimator};
pub use validation::ConfigValidator;
