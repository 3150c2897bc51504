//! Tile extraction pipeline
//!
//! The pipeline walks the configured coordinates in order, crops each
//! tile, optionally normalizes it, encodes it and records the outcome.
//! Recoverable per-tile failures are recorded and skipped over; critical
//! ones (permission denied, out of memory) stop the run and return what
//! was produced so far.
//!
//! The pipeline only emits `log` records. Anything user-facing goes
//! through a [`ProgressSink`] supplied by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::DynamicImage;
use log::{debug, error, info, warn};
use serde_json::{json, Value};

use crate::config::{is_plain_filename, Coordinate, OutputPattern, TilingConfig};
use crate::errors::{ErrorCode, RetileResult, TileError};
use crate::result::{TileOutcome, TileRecord, ToolResult};
use crate::utils::image_utils::ImageInfo;

use super::encoder::TileEncoding;
use super::normalizer::AspectRatioNormalizer;
use super::region::BoundsCalculator;

/// Receives per-tile progress notifications
pub trait ProgressSink {
    fn tile_started(&self, _index: usize, _coordinate: Coordinate) {}
    fn tile_finished(&self, _index: usize, _outcome: &TileOutcome) {}
}

/// Progress sink that ignores every notification
pub struct NoProgress;

impl ProgressSink for NoProgress {}

/// Destination for encoded tiles
pub trait TileWriter {
    /// Encode `tile` and store it at `path`
    fn write(&self, encoding: &TileEncoding, tile: &DynamicImage, path: &Path) -> Result<(), TileError>;
}

/// Writes tiles to the filesystem
pub struct FileWriter;

impl TileWriter for FileWriter {
    fn write(&self, encoding: &TileEncoding, tile: &DynamicImage, path: &Path) -> Result<(), TileError> {
        encoding.write_to_path(tile, path)
    }
}

/// Lifecycle of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Initialized,
    Validating,
    Extracting,
    Completed,
    Aborted,
}

/// Extracts the tiles of one configuration from a decoded image
pub struct ExtractionPipeline<'a> {
    config: &'a TilingConfig,
    pattern: OutputPattern,
    encoding: TileEncoding,
    normalizer: AspectRatioNormalizer,
    progress: &'a dyn ProgressSink,
    writer: &'a dyn TileWriter,
    state: PipelineState,
    output_dir_ready: bool,
}

impl<'a> ExtractionPipeline<'a> {
    /// Prepare a pipeline for `config`
    ///
    /// Fails when the output pattern does not parse or no encoder exists
    /// for the input extension.
    pub fn new(config: &'a TilingConfig) -> RetileResult<Self> {
        let pattern = OutputPattern::parse(&config.output_pattern)?;
        let encoding = TileEncoding::for_extension(&config.input_extension())?;

        Ok(ExtractionPipeline {
            config,
            pattern,
            encoding,
            normalizer: AspectRatioNormalizer::default(),
            progress: &NoProgress,
            writer: &FileWriter,
            state: PipelineState::Initialized,
            output_dir_ready: false,
        })
    }

    /// Report progress to `sink`
    pub fn with_progress(mut self, sink: &'a dyn ProgressSink) -> Self {
        self.progress = sink;
        self
    }

    /// Store tiles through `writer` instead of the filesystem
    pub fn with_writer(mut self, writer: &'a dyn TileWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Mark the run as being validated by the caller
    pub fn begin_validation(&mut self) {
        self.transition(PipelineState::Validating);
    }

    fn transition(&mut self, next: PipelineState) {
        debug!("Pipeline state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Extract every configured tile from `image`
    ///
    /// # Returns
    /// A report with `success == true` only when every coordinate produced
    /// a tile
    pub fn run(&mut self, image: &DynamicImage) -> ToolResult {
        let started = Instant::now();
        self.transition(PipelineState::Extracting);

        let config = self.config;
        let coordinates = &config.coordinates;
        let base = config.input_stem();
        let ext = config.input_extension();

        info!(
            "Extracting {} tiles of {}x{} from {}x{} image",
            coordinates.len(),
            config.tile_width,
            config.tile_height,
            image.width(),
            image.height()
        );

        let mut result = ToolResult::new();
        let mut records = Vec::with_capacity(coordinates.len());
        let mut critical: Option<(usize, Coordinate, TileError)> = None;

        for (index, &coordinate) in coordinates.iter().enumerate() {
            self.progress.tile_started(index, coordinate);

            let outcome = match self.extract_tile(image, coordinate, &base, &ext) {
                Ok(outcome) => outcome,
                Err(err) if err.is_critical() => {
                    error!("Aborting at tile {} ({}, {}): {}", index, coordinate.x, coordinate.y, err);
                    critical = Some((index, coordinate, err));
                    break;
                }
                Err(err) => {
                    warn!("Failed to extract tile {} at ({}, {}): {}", index, coordinate.x, coordinate.y, err);
                    TileOutcome::Failed { reason: err.to_string() }
                }
            };

            match &outcome {
                TileOutcome::Success { path, .. } => {
                    if config.verbose {
                        info!("Created tile {}/{}: {}", index + 1, coordinates.len(), path.display());
                    }
                    result.output_files.push(path.clone());
                }
                TileOutcome::Skipped { bounds } => {
                    warn!(
                        "Invalid crop area for tile {} at ({}, {}): ({}, {}, {}, {})",
                        index, coordinate.x, coordinate.y, bounds.left, bounds.top, bounds.right, bounds.bottom
                    );
                }
                TileOutcome::Failed { .. } => {}
            }

            self.progress.tile_finished(index, &outcome);
            records.push(TileRecord::new(index, coordinate, outcome));
        }

        result.execution_time = started.elapsed();

        match critical {
            Some((index, coordinate, err)) => {
                self.transition(PipelineState::Aborted);
                self.finish_aborted(result, &records, index, coordinate, err)
            }
            None => {
                self.transition(PipelineState::Completed);
                self.finish_completed(result, &records, image)
            }
        }
    }

    /// Produce one tile
    ///
    /// # Returns
    /// `Skipped` for empty crop boxes, `Success` with the output path
    /// otherwise, or the classified error
    fn extract_tile(
        &mut self,
        image: &DynamicImage,
        coordinate: Coordinate,
        base: &str,
        ext: &str,
    ) -> Result<TileOutcome, TileError> {
        let config = self.config;
        let bounds = BoundsCalculator::compute(
            coordinate.x,
            coordinate.y,
            config.tile_width,
            config.tile_height,
            config.overlap,
            image.width(),
            image.height(),
        );

        let Some(region) = bounds.to_region() else {
            return Ok(TileOutcome::Skipped { bounds });
        };

        debug!(
            "Cropping tile at ({}, {}): x={}, y={}, width={}, height={}",
            coordinate.x, coordinate.y, region.x, region.y, region.width, region.height
        );
        let mut tile = image.crop_imm(region.x, region.y, region.width, region.height);

        if config.maintain_aspect {
            tile = self.normalizer.normalize(&tile, config.tile_width, config.tile_height);
        }

        let filename = self.pattern.expand(base, coordinate.x, coordinate.y, ext);
        if !is_plain_filename(&filename) {
            return Err(TileError::recoverable(format!(
                "output pattern produced '{}', which is not a plain filename",
                filename
            )));
        }
        let path = config.output_dir.join(&filename);

        if !config.dry_run {
            self.ensure_output_dir()?;
            self.writer.write(&self.encoding, &tile, &path)?;
        }

        Ok(TileOutcome::Success {
            path,
            width: tile.width(),
            height: tile.height(),
        })
    }

    /// Create the output directory before the first write
    fn ensure_output_dir(&mut self) -> Result<(), TileError> {
        if self.output_dir_ready {
            return Ok(());
        }

        let dir = &self.config.output_dir;
        fs::create_dir_all(dir)
            .map_err(|e| TileError::from_io(&format!("creating output directory {}", dir.display()), &e))?;

        debug!("Output directory ready: {}", dir.display());
        self.output_dir_ready = true;
        Ok(())
    }

    fn finish_completed(&self, mut result: ToolResult, records: &[TileRecord], image: &DynamicImage) -> ToolResult {
        let config = self.config;
        let attempted = records.len();
        let succeeded = records.iter().filter(|r| r.outcome.is_success()).count();
        let failed = attempted - succeeded;

        let total_pixels: u64 = records.iter().map(|r| r.outcome.pixels()).sum();
        let seconds = result.execution_time.as_secs_f64();
        let pixels_per_second = if seconds > 0.0 { total_pixels as f64 / seconds } else { 0.0 };

        let processed: Vec<Value> = records
            .iter()
            .filter(|r| r.outcome.is_success())
            .map(|r| json!([r.x, r.y]))
            .collect();
        let failures: Vec<&TileRecord> = records.iter().filter(|r| !r.outcome.is_success()).collect();

        result.insert_metadata("tile_count", succeeded);
        result.insert_metadata("tile_size", format!("{}x{}", config.tile_width, config.tile_height));
        result.insert_metadata("overlap", config.overlap);
        result.insert_metadata("maintain_aspect", config.maintain_aspect);
        result.insert_metadata("total_pixels_processed", total_pixels);
        result.insert_metadata("pixels_per_second", pixels_per_second);
        result.insert_metadata("processing_time_ms", seconds * 1000.0);
        result.insert_metadata("failed_tiles", failed);
        result.insert_metadata("coordinates_processed", processed);
        result.insert_metadata("input_image_info", json!(ImageInfo::from_image(image)));
        result.insert_metadata("tile_failures", json!(failures));
        result.insert_metadata("dry_run", config.dry_run);

        result.success = failed == 0;
        if result.success {
            result.message = format!(
                "Successfully extracted {} tiles in {:.2}s ({:.1}MP/s)",
                succeeded,
                seconds,
                pixels_per_second / 1_000_000.0
            );
            info!("{}", result.message);
        } else {
            let code = if succeeded > 0 {
                ErrorCode::PartialFailure
            } else {
                ErrorCode::ProcessingError
            };
            result.error_code = Some(code.as_str().to_string());
            result.message = format!(
                "Extracted {} of {} tiles; {} failed",
                succeeded, attempted, failed
            );
            warn!("{}", result.message);
        }

        result
    }

    fn finish_aborted(
        &self,
        mut result: ToolResult,
        records: &[TileRecord],
        index: usize,
        coordinate: Coordinate,
        err: TileError,
    ) -> ToolResult {
        let completed = records.iter().filter(|r| r.outcome.is_success()).count();
        let code = err.code().unwrap_or(ErrorCode::ProcessingError);

        result.success = false;
        result.error_code = Some(code.as_str().to_string());
        result.message = format!(
            "Failed to extract tile {} at ({}, {}): {}",
            index, coordinate.x, coordinate.y, err
        );
        result.insert_metadata("error", err.to_string());
        result.insert_metadata("error_type", "Critical");
        result.insert_metadata("tiles_completed", completed);
        result.insert_metadata("tiles_attempted", self.config.coordinates.len());
        result.insert_metadata("partial_results", result.output_files.len());
        result.insert_metadata("aborted_at", index);

        result
    }
}

/// Paths a run would produce, without touching pixels or the filesystem
///
/// Used for dry-run previews and duplicate detection.
pub fn planned_paths(config: &TilingConfig, pattern: &OutputPattern) -> Vec<PathBuf> {
    let base = config.input_stem();
    let ext = config.input_extension();
    config
        .coordinates
        .iter()
        .map(|c| config.output_dir.join(pattern.expand(&base, c.x, c.y, &ext)))
        .collect()
}
