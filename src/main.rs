//! dataviz - year-over-year overlays and point-binned choropleths from CSV
//!
//! This is the main entry point for the dataviz command-line tool.

use anyhow::Context;
use tracing::info;

use dataviz::commands;
use dataviz::{init_tracing, log_error, Config};

fn main() -> anyhow::Result<()> {
    // Load configuration
    let (config, command) = Config::load().context("Failed to load configuration")?;

    // Validate configuration
    config.validate().context("Invalid configuration")?;

    init_tracing(&config.log_level);
    info!("Starting dataviz v{}", env!("CARGO_PKG_VERSION"));

    let output = commands::run(&config, &command).map_err(|e| {
        log_error(&e, "command");
        e
    })?;

    if output.written.is_empty() {
        // Nothing requested on disk: print the descriptor
        println!("{}", output.descriptor.to_json()?);
    } else {
        for path in &output.written {
            info!("Wrote {}", path.display());
        }
    }
    Ok(())
}
