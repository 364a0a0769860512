// ABOUTME: Entry point for the warship CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use std::env;
use tracing_subscriber::EnvFilter;
use warship::config::{self, Config};
use warship::error::Result;
use warship::output::{Output, OutputMode};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = if cli.json {
        OutputMode::Json
    } else if cli.quiet {
        OutputMode::Quiet
    } else {
        OutputMode::Normal
    };
    let output = Output::new(mode);

    if let Err(e) = run(cli.command, output).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(command: Commands, output: Output) -> Result<()> {
    let cwd = env::current_dir()?;

    match command {
        Commands::Init {
            target,
            artifact,
            force,
        } => {
            config::init_config(&cwd, target.as_deref(), artifact.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Deploy {
            destination,
            force_lock,
        } => {
            let config = load_config(&cwd, destination.as_deref())?;
            commands::deploy(config, &cwd, force_lock, output).await
        }
        Commands::Probe { destination } => {
            let config = load_config(&cwd, destination.as_deref())?;
            commands::probe(config, output).await
        }
        Commands::Inspect { entry, artifact } => {
            let path = match artifact {
                Some(path) => path,
                None => Config::discover(&cwd)?.artifact.path,
            };
            commands::inspect(&path, &entry, output)
        }
        Commands::Status { destination } => {
            let config = load_config(&cwd, destination.as_deref())?;
            commands::status(&config, output)
        }
    }
}

/// Discover the config and apply destination overrides if specified.
fn load_config(dir: &std::path::Path, destination: Option<&str>) -> Result<Config> {
    let config = Config::discover(dir)?;
    match destination {
        Some(dest) => config.for_destination(dest),
        None => Ok(config),
    }
}
