use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Vehicle Wizard - multi-step configuration wizards from the command line
#[derive(Parser)]
#[command(name = "vehicle-wizard")]
#[command(about = "Run, export and validate multi-step configuration wizards")]
#[command(version)]
pub struct Cli {
    /// Verbose logging (debug level unless RUST_LOG says otherwise)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in presets
    Presets,
    /// Print or save a preset definition as JSON
    Export {
        /// Preset name (performance, rental, driver-onboarding)
        preset: String,
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a definition file
    Validate {
        /// Path to the definition JSON file
        definition: PathBuf,
    },
    /// Replay a scripted session and print the outcome
    Run {
        /// Definition JSON file or preset name
        #[arg(short, long)]
        definition: String,
        /// Path to the script (JSON array of actions)
        #[arg(short, long)]
        script: PathBuf,
        /// Write the outcome to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }
}
