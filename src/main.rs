use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use usgs_topo::cli::{Cli, Commands};
use usgs_topo::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Mosaic(args) => commands::mosaic::run(args),
        #[cfg(feature = "download")]
        Commands::Metadata(args) => commands::metadata::run(args),
    }
}
