//! Tile plan command
//!
//! Prints where every tile would be cut and written, without decoding
//! pixels or touching the output directory.

use clap::ArgMatches;
use log::warn;

use crate::api::Retile;
use crate::commands::args::config_from_args;
use crate::commands::command_traits::Command;
use crate::config::TilingConfig;
use crate::errors::RetileResult;
use crate::extractor::TilePlan;

/// Command for previewing a run
pub struct PlanCommand {
    config: TilingConfig,
    json: bool,
}

impl PlanCommand {
    pub fn new(args: &ArgMatches) -> RetileResult<Self> {
        Ok(PlanCommand {
            config: config_from_args(args)?,
            json: args.get_flag("json"),
        })
    }

    fn print_plan(&self, plan: &TilePlan) {
        println!("Image: {} ({}x{})", plan.input_path.display(), plan.image_width, plan.image_height);
        println!(
            "Tiles: {}x{} with {} px overlap, {} of {} inside the image",
            plan.tile_width,
            plan.tile_height,
            plan.overlap,
            plan.valid_tile_count(),
            plan.tiles.len()
        );

        for tile in &plan.tiles {
            let b = &tile.bounds;
            if tile.valid {
                println!(
                    "  [{}] ({}, {}) -> crop ({}, {}, {}, {}) {}x{} -> {}",
                    tile.index,
                    tile.x,
                    tile.y,
                    b.left,
                    b.top,
                    b.right,
                    b.bottom,
                    b.width(),
                    b.height(),
                    tile.output_path.display()
                );
            } else {
                println!("  [{}] ({}, {}) -> outside the image", tile.index, tile.x, tile.y);
            }
        }

        println!(
            "Memory: {:.2} MB image, {:.2} MB per tile, {:.2} MB peak",
            plan.memory.base_image_mb, plan.memory.per_tile_mb, plan.memory.peak_memory_mb
        );
        if !plan.processing_feasible {
            println!("Warning: estimated memory exceeds the processing limit");
        }
    }
}

impl Command for PlanCommand {
    fn execute(&self) -> RetileResult<()> {
        let plan = Retile::new().plan(&self.config)?;
        if !plan.processing_feasible {
            warn!("Peak memory estimate {:.1} MB is above the limit", plan.memory.peak_memory_mb);
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&plan)?);
        } else {
            self.print_plan(&plan);
        }
        Ok(())
    }
}
