//! Tile extraction tool

use std::time::Instant;

use log::{error, info};
use serde_json::json;

use crate::config::TilingConfig;
use crate::errors::{ErrorCode, ValidationError};
use crate::extractor::{ExtractionPipeline, NoProgress, ProgressSink};
use crate::result::ToolResult;
use crate::utils::image_utils;
use crate::validation::ConfigValidator;

use super::tool_traits::Tool;

/// Extracts tiles at the configured coordinates
pub struct TilingTool;

impl TilingTool {
    pub const NAME: &'static str = "tile";

    pub fn new() -> Self {
        TilingTool
    }
}

impl Default for TilingTool {
    fn default() -> Self {
        Self::new()
    }
}

impl Tool for TilingTool {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn description(&self) -> &'static str {
        "Extract image tiles at given coordinates with optional overlap and aspect normalization"
    }

    fn version(&self) -> &'static str {
        "1.0.0"
    }

    fn validate(&self, config: &TilingConfig) -> Vec<ValidationError> {
        ConfigValidator::validate(config)
    }

    fn execute(&self, config: &TilingConfig) -> ToolResult {
        self.execute_with_progress(config, &NoProgress)
    }

    /// Validate, decode and extract
    ///
    /// Validation failures return `VALIDATION_ERROR` with the problems
    /// under `metadata.validation_errors`; a decode failure after
    /// successful validation returns `IMAGE_PROCESSING_ERROR`.
    fn execute_with_progress(&self, config: &TilingConfig, progress: &dyn ProgressSink) -> ToolResult {
        let started = Instant::now();
        info!("Tiling {} into {}", config.input_path.display(), config.output_dir.display());

        let mut pipeline = match ExtractionPipeline::new(config) {
            Ok(pipeline) => pipeline.with_progress(progress),
            Err(e) => {
                // Malformed pattern or unsupported format; still run the
                // validator so every problem is reported at once
                let errors = self.validate(config);
                if !errors.is_empty() {
                    return validation_failure(errors, started);
                }
                error!("Cannot prepare extraction: {}", e);
                let mut result = ToolResult::failure(e.to_string(), ErrorCode::InvalidConfig)
                    .with_metadata("error", e.to_string())
                    .with_metadata("error_type", e.kind_name());
                result.execution_time = started.elapsed();
                return result;
            }
        };

        pipeline.begin_validation();
        let errors = self.validate(config);
        if !errors.is_empty() {
            return validation_failure(errors, started);
        }

        let image = match image_utils::load_image(&config.input_path) {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to decode {}: {}", config.input_path.display(), e);
                let mut result = ToolResult::failure(
                    format!("Failed to load image {}: {}", config.input_path.display(), e),
                    ErrorCode::ImageProcessingError,
                )
                .with_metadata("error", e.to_string())
                .with_metadata("error_type", e.kind_name());
                result.execution_time = started.elapsed();
                return result;
            }
        };

        pipeline.run(&image)
    }
}

fn validation_failure(errors: Vec<ValidationError>, started: Instant) -> ToolResult {
    error!("Validation failed with {} error(s)", errors.len());
    for e in &errors {
        error!("  {}", e);
    }

    let summary = errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ");
    let mut result = ToolResult::failure(format!("Validation failed: {}", summary), ErrorCode::ValidationError)
        .with_metadata("validation_errors", json!(errors));
    result.execution_time = started.elapsed();
    result
}
