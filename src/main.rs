//! partial - run partial page updates against fixture pages.

use anyhow::Result;
use clap::{ColorChoice, Parser};
use partial_update::cli::{self, Cli, Commands};
use partial_update::config::{Config, init_config};
use partial_update::logger;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let mut config = Config::load(&cli.config)?;
    cli.apply_overrides(&mut config);
    logger::set_verbose(config.log.verbose);
    let config = init_config(config);

    match &cli.command {
        Commands::Render { args } => cli::render::render_update(args, &config),
        Commands::Page { .. } => cli::render::print_page(&config),
        Commands::Serve { .. } => cli::serve::serve(config),
    }
}
