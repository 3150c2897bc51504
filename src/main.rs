use std::path::Path;
use std::process;

use log::{error, LevelFilter};

use retile::commands::{build_cli, CommandFactory, RetileCommandFactory};
use retile::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();

    let level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    match matches.get_one::<String>("log-file") {
        Some(log_file) => {
            if let Err(e) = Logger::init_global_logger(Path::new(log_file), level) {
                eprintln!("Error setting up global logger: {}", e);
                process::exit(1);
            }
        }
        // Without a log file only warnings reach the console unless
        // RUST_LOG or --verbose asks for more
        None => Logger::init_console_logger(if matches.get_flag("verbose") {
            LevelFilter::Info
        } else {
            LevelFilter::Warn
        }),
    }

    let factory = RetileCommandFactory::new();

    let command_result = factory.create_command(&matches);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
