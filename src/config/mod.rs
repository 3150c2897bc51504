//! Run configuration
//!
//! This module holds the tiling configuration, its TOML loader and the
//! output filename pattern engine.

mod tiling_config;
pub mod pattern;
#[cfg(test)]
mod tests;

pub use tiling_config::{
    parse_coordinates, Coordinate, TilingConfig, TilingConfigBuilder, DEFAULT_OUTPUT_DIR,
    DEFAULT_OUTPUT_PATTERN, FALLBACK_EXTENSION,
};
pub use pattern::{is_plain_filename, OutputPattern, Placeholder};
