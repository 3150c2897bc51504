//! CLI command interfaces
//!
//! `retile` runs exactly one command per invocation: a tiling run, a
//! plan preview or the tool listing. Argument parsing picks the command;
//! the command owns its output.

use crate::errors::RetileResult;

/// One CLI action, ready to run with its arguments already resolved
pub trait Command {
    /// Run the action and print its output
    ///
    /// # Returns
    /// An error when the action failed; `main` turns it into exit code 1
    fn execute(&self) -> RetileResult<()>;
}

/// Chooses and builds the [`Command`] for a parsed command line
pub trait CommandFactory {
    /// Build the command selected by `args`
    ///
    /// # Arguments
    /// * `args` - Matches produced by [`build_cli`](super::cli::build_cli)
    ///
    /// # Returns
    /// The command, or a configuration error for unusable arguments
    fn create_command(&self, args: &clap::ArgMatches) -> RetileResult<Box<dyn Command>>;
}
