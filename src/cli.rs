// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "warship")]
#[command(about = "Roll out web archives to servlet containers and verify they come up")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print the final result
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print JSON lines instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new warship.yml configuration file
    Init {
        /// Target id (lowercase, DNS label)
        #[arg(long)]
        target: Option<String>,

        /// Path of the built artifact
        #[arg(long)]
        artifact: Option<String>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },

    /// Roll the artifact out to the target and verify it
    Deploy {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,

        /// Break an existing target lock, however fresh
        #[arg(long)]
        force_lock: bool,
    },

    /// Probe the target's health without deploying
    Probe {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },

    /// Print one entry from the artifact
    Inspect {
        /// Entry name inside the archive, e.g. WEB-INF/web.xml
        entry: String,

        /// Artifact path (defaults to the configured one)
        #[arg(long)]
        artifact: Option<PathBuf>,
    },

    /// Show the resolved configuration
    Status {
        /// Target destination (defined in config)
        #[arg(short, long)]
        destination: Option<String>,
    },
}
