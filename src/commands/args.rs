//! Configuration from command-line arguments
//!
//! A `--config` file provides the base layer; values given on the command
//! line override it. Boolean flags can only switch options on.

use std::path::{Path, PathBuf};

use clap::ArgMatches;
use log::{debug, info};

use crate::config::{parse_coordinates, TilingConfig, TilingConfigBuilder};
use crate::errors::RetileResult;

/// Build the run configuration from parsed arguments
///
/// # Arguments
/// * `args` - CLI argument matches from clap
///
/// # Returns
/// The merged configuration, or an error for unreadable config files,
/// malformed coordinates or missing required values
pub fn config_from_args(args: &ArgMatches) -> RetileResult<TilingConfig> {
    let base = match args.get_one::<String>("config") {
        Some(path) => {
            info!("Loading configuration from {}", path);
            TilingConfigBuilder::from_toml_file(Path::new(path))?
        }
        None => TilingConfigBuilder::default(),
    };

    let overrides = builder_from_args(args)?;
    let config = base.merge(overrides).build()?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn builder_from_args(args: &ArgMatches) -> RetileResult<TilingConfigBuilder> {
    let mut builder = TilingConfigBuilder::default();

    if let Some(input) = args.get_one::<String>("input") {
        builder = builder.input_path(PathBuf::from(input));
    }
    if let Some(output) = args.get_one::<String>("output") {
        builder = builder.output_dir(PathBuf::from(output));
    }
    if let Some(&width) = args.get_one::<u32>("width") {
        builder = builder.tile_width(width);
    }
    if let Some(&height) = args.get_one::<u32>("height") {
        builder = builder.tile_height(height);
    }
    if let Some(coords) = args.get_one::<String>("coords") {
        builder = builder.coordinates(parse_coordinates(coords)?);
    }
    if let Some(pattern) = args.get_one::<String>("pattern") {
        builder = builder.output_pattern(pattern.clone());
    }
    if let Some(&overlap) = args.get_one::<u32>("overlap") {
        builder = builder.overlap(overlap);
    }

    if args.get_flag("maintain-aspect") {
        builder = builder.maintain_aspect(true);
    }
    if args.get_flag("dry-run") {
        builder = builder.dry_run(true);
    }
    if args.get_flag("verbose") {
        builder = builder.verbose(true);
    }

    Ok(builder)
}
