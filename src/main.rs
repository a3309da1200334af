//! Vehicle Wizard - Main entry point
//!
//! Lists, exports and validates wizard definitions, and replays scripted
//! sessions against them.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use strum::IntoEnumIterator;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use vehicle_wizard::cli::{Cli, Commands};
use vehicle_wizard::clock::SystemClock;
use vehicle_wizard::definition::WizardDefinition;
use vehicle_wizard::presets::Preset;
use vehicle_wizard::replay::{self, load_script};
use vehicle_wizard::session::WizardSession;
use vehicle_wizard::submit::JsonSubmitter;

/// Initialize logging; RUST_LOG overrides the default level
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);
    debug!("CLI arguments parsed");

    match cli.command {
        Commands::Presets => {
            for preset in Preset::iter() {
                println!("{:<20} {}", preset.to_string(), preset.description());
            }
        }
        Commands::Export { preset, output } => {
            let preset = Preset::from_str(&preset)
                .with_context(|| format!("Unknown preset '{preset}'"))?;
            let definition = preset.definition();
            match output {
                Some(path) => {
                    definition.save_to_file(&path)?;
                    info!("Exported preset {} to {:?}", preset, path);
                    println!("✓ Wrote {} definition to {}", preset, path.display());
                }
                None => write_json(&definition, None)?,
            }
        }
        Commands::Validate { definition } => {
            info!("Validating definition file: {:?}", definition);
            let loaded = match WizardDefinition::load_from_file(&definition) {
                Ok(loaded) => loaded,
                Err(e) => {
                    error!("Failed to load definition: {:#}", e);
                    eprintln!("✗ Failed to load definition: {:#}", e);
                    std::process::exit(1);
                }
            };
            match loaded.validate() {
                Ok(()) => {
                    info!("Definition validation successful");
                    println!(
                        "✓ Definition '{}' is valid ({} slots, {} steps)",
                        loaded.name,
                        loaded.catalog.len(),
                        loaded.steps.len()
                    );
                }
                Err(e) => {
                    error!("Definition validation failed: {}", e);
                    eprintln!("✗ Definition validation failed: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Run {
            definition,
            script,
            output,
        } => run_script(&definition, &script, output.as_deref())?,
    }

    Ok(())
}

/// A preset name, or else a path to a definition file
fn resolve_definition(arg: &str) -> Result<WizardDefinition> {
    if let Ok(preset) = Preset::from_str(arg) {
        debug!("Using built-in preset {}", preset);
        return Ok(preset.definition());
    }
    WizardDefinition::load_from_file(arg)
}

/// Replay a script and print the summary, or the derived state if the
/// wizard did not complete
fn run_script(definition: &str, script: &Path, output: Option<&Path>) -> Result<()> {
    let definition = resolve_definition(definition)?;
    let actions = load_script(script)?;
    let mut session = WizardSession::new(definition, SystemClock)
        .context("Failed to open wizard session")?;
    info!("Replaying {} actions from {:?}", actions.len(), script);

    if let Err(e) = replay::replay(&mut session, &actions) {
        if e.source.unmet_requirements().is_none() {
            return Err(e.into());
        }
        error!("{}", e);
        eprintln!("✗ {}", e);
        for requirement in e.source.unmet_requirements().unwrap_or_default() {
            eprintln!("  - {}", requirement);
        }
        std::process::exit(1);
    }

    if !session.is_complete() {
        info!("Session stopped at {}", session.position());
        return write_json(session.derived(), output);
    }

    match output {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("Failed to create {:?}", path))?;
            session.submit(&mut JsonSubmitter::new(file))?;
            println!("✓ Summary written to {}", path.display());
        }
        None => {
            session.submit(&mut JsonSubmitter::new(std::io::stdout().lock()))?;
        }
    }
    Ok(())
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            println!("✓ Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{json}")?;
        }
    }
    Ok(())
}
