use std::io::{self, Write};
use std::path::Path;

use af_core::{FatigueConfig, Preset};
use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use af_cli::commands::replay::ReplayOptions;
use af_cli::commands::{demo, heatmap, presets, replay};
use af_cli::{Cli, Commands, config};

/// Loads the layered engine configuration for `preset`.
fn load_config(preset: Preset, config_path: Option<&Path>) -> Result<FatigueConfig> {
    if let Some(path) = config_path {
        if !path.exists() {
            bail!("config file not found: {}", path.display());
        }
    }
    let config = config::load_from(preset, config_path).context("failed to load configuration")?;
    tracing::debug!(%preset, ?config, "loaded configuration");
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init so a subscriber installed by a test harness is left alone
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Replay {
            file,
            json,
            query_at,
            category,
        }) => {
            let config = load_config(cli.preset, cli.config.as_deref())?;
            let options = ReplayOptions {
                json: *json,
                query_at: *query_at,
                category: *category,
            };
            replay::run(&mut out, config, file, &options)?;
        }
        Some(Commands::Demo { scenario }) => {
            let config = load_config(cli.preset, cli.config.as_deref())?;
            demo::run(&mut out, *scenario, &config)?;
        }
        Some(Commands::Presets) => {
            presets::run(&mut out)?;
        }
        Some(Commands::Heatmap { file, at }) => {
            let config = load_config(cli.preset, cli.config.as_deref())?;
            heatmap::run(&mut out, config, file, *at)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(out)?;
        }
    }

    out.flush()?;
    Ok(())
}
