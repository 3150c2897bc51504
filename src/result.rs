//! Run reports
//!
//! A [`ToolResult`] is built while a run progresses and returned once. It
//! serializes to a flat JSON object for machine consumption.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::config::Coordinate;
use crate::errors::{ErrorCode, RetileResult};
use crate::extractor::CropBounds;

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    /// Produced (or, in dry-run, planned) tiles in coordinate order
    pub output_files: Vec<PathBuf>,
    pub metadata: Map<String, Value>,
    #[serde(serialize_with = "serialize_seconds")]
    pub execution_time: Duration,
    pub error_code: Option<String>,
}

impl ToolResult {
    /// Empty successful result
    pub fn new() -> Self {
        ToolResult {
            success: true,
            message: String::new(),
            output_files: Vec::new(),
            metadata: Map::new(),
            execution_time: Duration::ZERO,
            error_code: None,
        }
    }

    /// Failed result carrying `code`
    pub fn failure(message: impl Into<String>, code: ErrorCode) -> Self {
        ToolResult {
            success: false,
            message: message.into(),
            error_code: Some(code.as_str().to_string()),
            ..ToolResult::new()
        }
    }

    /// Insert a metadata entry, keeping insertion order
    pub fn insert_metadata(&mut self, key: &str, value: impl Into<Value>) {
        self.metadata.insert(key.to_string(), value.into());
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert_metadata(key, value);
        self
    }

    /// Metadata value as an unsigned integer, if present
    pub fn metadata_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(Value::as_u64)
    }

    pub fn to_json_pretty(&self) -> RetileResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Default for ToolResult {
    fn default() -> Self {
        Self::new()
    }
}

fn serialize_seconds<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

/// What happened to one coordinate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TileOutcome {
    /// Tile produced (or planned, in dry-run)
    Success { path: PathBuf, width: u32, height: u32 },
    /// Crop box was empty after clamping
    Skipped { bounds: CropBounds },
    /// Crop, normalization or encoding failed
    Failed { reason: String },
}

impl TileOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TileOutcome::Success { .. })
    }

    /// Pixels in the produced tile, zero for unsuccessful tiles
    pub fn pixels(&self) -> u64 {
        match self {
            TileOutcome::Success { width, height, .. } => *width as u64 * *height as u64,
            _ => 0,
        }
    }
}

/// Outcome of one coordinate together with its position in the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileRecord {
    pub index: usize,
    pub x: u32,
    pub y: u32,
    #[serde(flatten)]
    pub outcome: TileOutcome,
}

impl TileRecord {
    pub fn new(index: usize, coordinate: Coordinate, outcome: TileOutcome) -> Self {
        TileRecord {
            index,
            x: coordinate.x,
            y: coordinate.y,
            outcome,
        }
    }
}
