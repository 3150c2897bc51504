//! Tiling configuration
//!
//! [`TilingConfig`] is the immutable input of one extraction run. It is
//! usually assembled through [`TilingConfigBuilder`], which can be read
//! from a TOML file and merged with command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{RetileError, RetileResult};

/// Pattern used when none is configured
pub const DEFAULT_OUTPUT_PATTERN: &str = "{base}_{x}_{y}.{ext}";

/// Output directory used when none is configured
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Extension assumed for inputs without one
pub const FALLBACK_EXTENSION: &str = "png";

lazy_static! {
    static ref COORDINATE_PAIR: Regex = Regex::new(r"^(\d+),(\d+)$").expect("coordinate regex is valid");
}

/// Top-left corner of a tile, in source pixels
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct Coordinate {
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(x: u32, y: u32) -> Self {
        Coordinate { x, y }
    }
}

impl From<(u32, u32)> for Coordinate {
    fn from((x, y): (u32, u32)) -> Self {
        Coordinate { x, y }
    }
}

impl From<Coordinate> for (u32, u32) {
    fn from(c: Coordinate) -> Self {
        (c.x, c.y)
    }
}

/// Parse coordinates written as `"x1,y1;x2,y2;..."`
///
/// Empty entries between separators are ignored; at least one pair is
/// required.
pub fn parse_coordinates(input: &str) -> RetileResult<Vec<Coordinate>> {
    if input.trim().is_empty() {
        return Err(RetileError::config("coordinates string cannot be empty"));
    }

    let mut coordinates = Vec::new();
    for (i, pair) in input.split(';').enumerate() {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let caps = COORDINATE_PAIR.captures(pair).ok_or_else(|| {
            RetileError::config(format!(
                "invalid coordinate format at position {}: '{}', expected 'x,y'",
                i, pair
            ))
        })?;

        let parse = |s: &str| {
            s.parse::<u32>().map_err(|e| {
                RetileError::config(format!("invalid coordinate value at position {}: '{}' ({})", i, pair, e))
            })
        };
        coordinates.push(Coordinate::new(parse(&caps[1])?, parse(&caps[2])?));
    }

    if coordinates.is_empty() {
        return Err(RetileError::config("no valid coordinates found"));
    }

    Ok(coordinates)
}

/// Configuration of one tiling run
///
/// Range checks (tile size, overlap, pattern contents) are not enforced
/// on construction; they are the job of
/// [`ConfigValidator`](crate::validation::ConfigValidator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TilingConfig {
    /// Source image
    pub input_path: PathBuf,
    /// Directory receiving the tiles
    pub output_dir: PathBuf,
    /// Nominal tile width in pixels
    pub tile_width: u32,
    /// Nominal tile height in pixels
    pub tile_height: u32,
    /// Tile origins, in output order
    pub coordinates: Vec<Coordinate>,
    /// Filename template
    pub output_pattern: String,
    /// Extra pixels taken around each tile
    pub overlap: u32,
    /// Scale and pad each tile to exactly `tile_width x tile_height`
    pub maintain_aspect: bool,
    /// Report paths without writing files
    pub dry_run: bool,
    /// Log each produced tile
    pub verbose: bool,
}

impl TilingConfig {
    /// Create a configuration with default pattern, no overlap and all
    /// flags off
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        tile_width: u32,
        tile_height: u32,
        coordinates: Vec<Coordinate>,
    ) -> Self {
        TilingConfig {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            tile_width,
            tile_height,
            coordinates,
            output_pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
            overlap: 0,
            maintain_aspect: false,
            dry_run: false,
            verbose: false,
        }
    }

    pub fn builder() -> TilingConfigBuilder {
        TilingConfigBuilder::default()
    }

    /// Load a configuration from TOML text
    pub fn from_toml_str(content: &str) -> RetileResult<Self> {
        TilingConfigBuilder::from_toml_str(content)?.build()
    }

    /// Load a configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> RetileResult<Self> {
        TilingConfigBuilder::from_toml_file(path)?.build()
    }

    /// File stem of the input, used for `{base}`
    pub fn input_stem(&self) -> String {
        self.input_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Lower-cased input extension without the dot, used for `{ext}`
    ///
    /// Inputs without an extension are treated as PNG.
    pub fn input_extension(&self) -> String {
        self.input_path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
    }
}

/// Partial configuration, as found in a config file or on the command line
///
/// Every field is optional so sources can be layered with [`merge`](Self::merge);
/// [`build`](Self::build) fills defaults and rejects missing required fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TilingConfigBuilder {
    input_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    tile_width: Option<u32>,
    tile_height: Option<u32>,
    coordinates: Option<Vec<Coordinate>>,
    output_pattern: Option<String>,
    overlap: Option<u32>,
    maintain_aspect: Option<bool>,
    dry_run: Option<bool>,
    verbose: Option<bool>,
}

impl TilingConfigBuilder {
    pub fn from_toml_str(content: &str) -> RetileResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_toml_file(path: &Path) -> RetileResult<Self> {
        debug!("Loading tiling configuration from {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| {
            RetileError::config(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = Some(width);
        self.tile_height = Some(height);
        self
    }

    pub fn tile_width(mut self, width: u32) -> Self {
        self.tile_width = Some(width);
        self
    }

    pub fn tile_height(mut self, height: u32) -> Self {
        self.tile_height = Some(height);
        self
    }

    pub fn coordinates(mut self, coordinates: Vec<Coordinate>) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn output_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.output_pattern = Some(pattern.into());
        self
    }

    pub fn overlap(mut self, overlap: u32) -> Self {
        self.overlap = Some(overlap);
        self
    }

    pub fn maintain_aspect(mut self, on: bool) -> Self {
        self.maintain_aspect = Some(on);
        self
    }

    pub fn dry_run(mut self, on: bool) -> Self {
        self.dry_run = Some(on);
        self
    }

    pub fn verbose(mut self, on: bool) -> Self {
        self.verbose = Some(on);
        self
    }

    /// Layer `overrides` on top of `self`; fields set in `overrides` win
    pub fn merge(self, overrides: TilingConfigBuilder) -> Self {
        TilingConfigBuilder {
            input_path: overrides.input_path.or(self.input_path),
            output_dir: overrides.output_dir.or(self.output_dir),
            tile_width: overrides.tile_width.or(self.tile_width),
            tile_height: overrides.tile_height.or(self.tile_height),
            coordinates: overrides.coordinates.or(self.coordinates),
            output_pattern: overrides.output_pattern.or(self.output_pattern),
            overlap: overrides.overlap.or(self.overlap),
            maintain_aspect: overrides.maintain_aspect.or(self.maintain_aspect),
            dry_run: overrides.dry_run.or(self.dry_run),
            verbose: overrides.verbose.or(self.verbose),
        }
    }

    pub fn build(self) -> RetileResult<TilingConfig> {
        let missing = |field: &str| RetileError::config(format!("missing required field '{}'", field));

        Ok(TilingConfig {
            input_path: self.input_path.ok_or_else(|| missing("input_path"))?,
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            tile_width: self.tile_width.ok_or_else(|| missing("tile_width"))?,
            tile_height: self.tile_height.ok_or_else(|| missing("tile_height"))?,
            coordinates: self.coordinates.ok_or_else(|| missing("coordinates"))?,
            output_pattern: self
                .output_pattern
                .unwrap_or_else(|| DEFAULT_OUTPUT_PATTERN.to_string()),
            overlap: self.overlap.unwrap_or(0),
            maintain_aspect: self.maintain_aspect.unwrap_or(false),
            dry_run: self.dry_run.unwrap_or(false),
            verbose: self.verbose.unwrap_or(false),
        })
    }
}
