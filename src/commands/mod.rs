//! The `retile` command line: argument definitions, config layering and
//! the tile, plan and list-tools commands.

pub mod command_traits;
pub mod args;
pub mod cli;
pub mod tile_command;
pub mod plan_command;
pub mod list_tools_command;

pub use command_traits::{Command, CommandFactory};
pub use cli::build_cli;
pub use tile_command::TileCommand;
pub use plan_command::PlanCommand;
pub use list_tools_command::ListToolsCommand;

use clap::ArgMatches;
use crate::errors::RetileResult;

/// Factory for creating command instances based on CLI arguments
///
/// This factory examines the command-line arguments and creates
/// the appropriate command instance for execution.
pub struct RetileCommandFactory;

impl RetileCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        RetileCommandFactory
    }
}

impl Default for RetileCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for RetileCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> RetileResult<Box<dyn Command>> {
        if args.get_flag("list-tools") {
            Ok(Box::new(ListToolsCommand::new(args)?))
        } else if args.get_flag("plan") {
            Ok(Box::new(PlanCommand::new(args)?))
        } else {
            // Default to tile extraction
            Ok(Box::new(TileCommand::new(args)?))
        }
    }
}
