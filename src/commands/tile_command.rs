//! Tile extraction command
//!
//! Runs the tiling tool over the merged configuration and prints either a
//! summary or the full JSON report.

use clap::ArgMatches;
use log::info;

use crate::api::Retile;
use crate::commands::args::config_from_args;
use crate::commands::command_traits::Command;
use crate::config::TilingConfig;
use crate::errors::{ErrorCode, RetileError, RetileResult};
use crate::result::ToolResult;
use crate::utils::progress::ProgressTracker;

/// Command for extracting tiles
pub struct TileCommand {
    /// Effective run configuration
    config: TilingConfig,
    /// Print the report as JSON instead of a summary
    json: bool,
}

impl TileCommand {
    /// Create a new tile command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    ///
    /// # Returns
    /// A new TileCommand instance or an error
    pub fn new(args: &ArgMatches) -> RetileResult<Self> {
        let config = config_from_args(args)?;
        let json = args.get_flag("json");

        Ok(TileCommand { config, json })
    }

    fn print_summary(&self, result: &ToolResult) {
        println!("{}", result.message);

        if self.config.dry_run {
            println!("Dry run; planned tiles:");
            for path in &result.output_files {
                println!("  {}", path.display());
            }
        } else if self.config.verbose {
            for path in &result.output_files {
                println!("  {}", path.display());
            }
        }

        if let Some(failures) = result.metadata.get("tile_failures").and_then(|v| v.as_array()) {
            for failure in failures {
                let reason = failure
                    .get("reason")
                    .and_then(|r| r.as_str())
                    .unwrap_or("crop area outside the image");
                println!("  tile {} at ({}, {}): {}", failure["index"], failure["x"], failure["y"], reason);
            }
        }

        if let Some(errors) = result.metadata.get("validation_errors").and_then(|v| v.as_array()) {
            for error in errors {
                println!("  {}: {}", error["field"].as_str().unwrap_or(""), error["message"].as_str().unwrap_or(""));
            }
        }
    }
}

impl Command for TileCommand {
    fn execute(&self) -> RetileResult<()> {
        info!(
            "Tiling {} ({} coordinates)",
            self.config.input_path.display(),
            self.config.coordinates.len()
        );

        let retile = Retile::new();
        let result = if self.json {
            retile.tile(&self.config)
        } else {
            let tracker = ProgressTracker::new(self.config.coordinates.len() as u64, "Extracting tiles");
            let result = retile.tile_with_progress(&self.config, &tracker);
            tracker.finish();
            result
        };

        if self.json {
            println!("{}", result.to_json_pretty()?);
        } else {
            self.print_summary(&result);
        }

        if result.success {
            Ok(())
        } else {
            let code = result
                .error_code
                .as_deref()
                .and_then(ErrorCode::parse)
                .unwrap_or(ErrorCode::ProcessingError);
            Err(RetileError::Processing {
                code,
                message: result.message,
            })
        }
    }
}
