//! blogsync CLI
//!
//! Bidirectional synchronization of a directory of Markdown posts with a
//! Write.as collection and an image host.

mod cli;
mod clients;
mod commands;
mod error;
mod logging;
mod settings;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::Result;
use settings::Settings;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let cwd = std::env::current_dir()?;
    let settings = Settings::resolve(&cli, &cwd)?;

    commands::run_sync(&settings, cli.command.options())?;
    Ok(())
}
