//! Configuration validation
//!
//! All checks run before any pixel work. Problems are collected into a
//! list rather than failing on the first one, except for an unreadable
//! input image: without its dimensions the remaining checks are
//! meaningless.

use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::{is_plain_filename, OutputPattern, Placeholder, TilingConfig};
use crate::errors::{RetileError, RetileResult, ValidationError};
use crate::extractor::{BoundsCalculator, TileEncoding};
use crate::utils::image_utils;
use crate::utils::memory_utils::{MemoryEstimator, MEMORY_CEILING_MB};

/// Largest accepted tile side
pub const MAX_TILE_DIMENSION: u32 = 8192;

/// Smallest accepted tile side
pub const MIN_TILE_DIMENSION: u32 = 1;

/// Checks a [`TilingConfig`] against the filesystem and its input image
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a configuration
    ///
    /// # Arguments
    /// * `config` - Configuration to check
    ///
    /// # Returns
    /// Every problem found, in check order; empty when the configuration
    /// is valid
    pub fn validate(config: &TilingConfig) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        validate_range(config.tile_width, MIN_TILE_DIMENSION, MAX_TILE_DIMENSION, "tile_width", &mut errors);
        validate_range(config.tile_height, MIN_TILE_DIMENSION, MAX_TILE_DIMENSION, "tile_height", &mut errors);

        if config.coordinates.is_empty() {
            errors.push(ValidationError::new("coordinates", "at least one coordinate is required"));
        }

        let min_side = config.tile_width.min(config.tile_height);
        if config.overlap >= min_side {
            errors.push(ValidationError::new(
                "overlap",
                format!(
                    "overlap {} must be smaller than the smallest tile side ({})",
                    config.overlap, min_side
                ),
            ));
        }

        let pattern = check_pattern(config, &mut errors);

        // Input image; nothing else can be checked without its size
        let (image_width, image_height) = match check_input(&config.input_path) {
            Ok(size) => size,
            Err(error) => {
                errors.push(error);
                warn!("Validation stopped early: {} problem(s)", errors.len());
                return errors;
            }
        };

        if !config.dry_run {
            if let Err(error) = check_output_dir(&config.output_dir) {
                errors.push(error);
            }
        }

        for (index, c) in config.coordinates.iter().enumerate() {
            let field = format!("coordinates[{}]", index);

            if c.x as u64 + config.tile_width as u64 > image_width as u64 {
                errors.push(ValidationError::new(
                    field.as_str(),
                    format!(
                        "tile at x={} with width {} exceeds image width {}",
                        c.x, config.tile_width, image_width
                    ),
                ));
            }
            if c.y as u64 + config.tile_height as u64 > image_height as u64 {
                errors.push(ValidationError::new(
                    field.as_str(),
                    format!(
                        "tile at y={} with height {} exceeds image height {}",
                        c.y, config.tile_height, image_height
                    ),
                ));
            }

            let bounds = BoundsCalculator::compute(
                c.x,
                c.y,
                config.tile_width,
                config.tile_height,
                config.overlap,
                image_width,
                image_height,
            );
            if !bounds.is_valid() {
                errors.push(ValidationError::new(
                    field.as_str(),
                    format!(
                        "crop area ({}, {}, {}, {}) is empty",
                        bounds.left, bounds.top, bounds.right, bounds.bottom
                    ),
                ));
            }
        }

        let estimate = MemoryEstimator::estimate_rgb(image_width, image_height, config.coordinates.len());
        debug!(
            "Memory estimate for {}x{}: {:.2} MB peak",
            image_width, image_height, estimate.peak_memory_mb
        );
        if estimate.exceeds(MEMORY_CEILING_MB) {
            errors.push(ValidationError::new(
                "memory",
                format!(
                    "estimated peak memory {:.1} MB exceeds the {:.0} MB limit",
                    estimate.peak_memory_mb, MEMORY_CEILING_MB
                ),
            ));
        }

        if let Some(pattern) = &pattern {
            if let Some(error) = check_unique_names(config, pattern) {
                errors.push(error);
            }
        }

        let extension = config.input_extension();
        if let Err(e) = TileEncoding::for_extension(&extension) {
            errors.push(ValidationError::new("input_path", e.to_string()));
        }

        if errors.is_empty() {
            debug!("Configuration for {} is valid", config.input_path.display());
        } else {
            warn!("Configuration has {} problem(s)", errors.len());
        }
        errors
    }

    /// Validate and fold the problems into a single error
    pub fn validate_or_err(config: &TilingConfig) -> RetileResult<()> {
        let errors = Self::validate(config);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(RetileError::Validation(errors))
        }
    }
}

/// Push an error when `value` lies outside `[min, max]`
fn validate_range<T>(value: T, min: T, max: T, name: &str, errors: &mut Vec<ValidationError>)
where
    T: PartialOrd + Display,
{
    if value < min || value > max {
        errors.push(ValidationError::new(
            name,
            format!("{} must be between {} and {}", value, min, max),
        ));
    }
}

/// Parse the output pattern and check its required placeholders
fn check_pattern(config: &TilingConfig, errors: &mut Vec<ValidationError>) -> Option<OutputPattern> {
    let pattern = match OutputPattern::parse(&config.output_pattern) {
        Ok(pattern) => pattern,
        Err(e) => {
            errors.push(ValidationError::new("output_pattern", e.to_string()));
            return None;
        }
    };

    let mut complete = true;
    for (placeholder, name) in [(Placeholder::Base, "{base}"), (Placeholder::Ext, "{ext}")] {
        if !pattern.contains(placeholder) {
            errors.push(ValidationError::new(
                "output_pattern",
                format!("pattern '{}' must contain {}", pattern.as_str(), name),
            ));
            complete = false;
        }
    }

    let sample = pattern.expand(&config.input_stem(), 0, 0, &config.input_extension());
    if sample.trim().is_empty() {
        errors.push(ValidationError::new("output_pattern", "pattern expands to an empty filename"));
        complete = false;
    } else if !is_plain_filename(&sample) {
        errors.push(ValidationError::new(
            "output_pattern",
            format!("pattern expands to '{}', which is not a plain filename", sample),
        ));
        complete = false;
    }

    complete.then_some(pattern)
}

/// Probe the input image, returning its oriented dimensions
fn check_input(path: &Path) -> Result<(u32, u32), ValidationError> {
    let field = "input_path";
    if !path.exists() {
        return Err(ValidationError::new(field, format!("{} does not exist", path.display())));
    }
    if !path.is_file() {
        return Err(ValidationError::new(field, format!("{} is not a file", path.display())));
    }

    image_utils::probe_dimensions(path)
        .map_err(|e| ValidationError::new(field, format!("cannot read {}: {}", path.display(), e)))
}

/// Check that the output directory exists or could be created
///
/// Nothing is created here; a missing directory is accepted when its
/// nearest existing ancestor is a writable directory.
fn check_output_dir(dir: &Path) -> Result<(), ValidationError> {
    let field = "output_dir";

    if dir.exists() {
        if !dir.is_dir() {
            return Err(ValidationError::new(field, format!("{} is not a directory", dir.display())));
        }
        return check_writable(dir, field);
    }

    let ancestor = dir
        .ancestors()
        .skip(1)
        .map(|p| if p.as_os_str().is_empty() { PathBuf::from(".") } else { p.to_path_buf() })
        .find(|p| p.exists());

    match ancestor {
        Some(parent) if parent.is_dir() => check_writable(&parent, field),
        Some(parent) => Err(ValidationError::new(
            field,
            format!("cannot create {}: {} is not a directory", dir.display(), parent.display()),
        )),
        None => Err(ValidationError::new(
            field,
            format!("cannot create {}: no existing parent directory", dir.display()),
        )),
    }
}

fn check_writable(dir: &Path, field: &str) -> Result<(), ValidationError> {
    match fs::metadata(dir) {
        Ok(meta) if meta.permissions().readonly() => Err(ValidationError::new(
            field,
            format!("{} is not writable", dir.display()),
        )),
        Ok(_) => Ok(()),
        Err(e) => Err(ValidationError::new(field, format!("cannot access {}: {}", dir.display(), e))),
    }
}

/// Find the first pair of coordinates that expand to the same filename
fn check_unique_names(config: &TilingConfig, pattern: &OutputPattern) -> Option<ValidationError> {
    let base = config.input_stem();
    let ext = config.input_extension();
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(config.coordinates.len());

    for (index, c) in config.coordinates.iter().enumerate() {
        let name = pattern.expand(&base, c.x, c.y, &ext);
        if let Some(first) = seen.get(&name) {
            return Some(ValidationError::new(
                "output_pattern",
                format!(
                    "coordinates[{}] and coordinates[{}] both produce '{}'",
                    first, index, name
                ),
            ));
        }
        seen.insert(name, index);
    }
    None
}
