//! Command-line interface definition

use clap::{value_parser, Arg, ArgAction, Command as ClapCommand};

/// Build the `retile` argument parser
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("retile")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract image tiles at given coordinates")
        .arg(
            Arg::new("input")
                .help("Input image file")
                .value_name("INPUT")
                .index(1),
        )
        .arg(
            Arg::new("width")
                .short('W')
                .long("width")
                .help("Tile width in pixels")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("height")
                .short('H')
                .long("height")
                .help("Tile height in pixels")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("coords")
                .short('c')
                .long("coords")
                .help("Tile coordinates as 'x1,y1;x2,y2;...'")
                .value_name("COORDS"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output directory (default: ./output)")
                .value_name("DIR"),
        )
        .arg(
            Arg::new("pattern")
                .long("pattern")
                .help("Output filename pattern, e.g. '{base}_{x:04d}_{y:04d}.{ext}'")
                .value_name("PATTERN"),
        )
        .arg(
            Arg::new("overlap")
                .long("overlap")
                .help("Extra pixels taken around each tile")
                .value_name("PIXELS")
                .value_parser(value_parser!(u32)),
        )
        .arg(
            Arg::new("maintain-aspect")
                .long("maintain-aspect")
                .help("Scale and pad every tile to exactly the tile size")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Report output paths without writing files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML configuration file; command-line values override it")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the result as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("plan")
                .long("plan")
                .help("Print the tile plan without extracting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-tools")
                .long("list-tools")
                .help("List the available tools")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Write log records to this file")
                .value_name("FILE"),
        )
}
