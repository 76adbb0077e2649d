//! Command-line argument definitions.

use std::path::PathBuf;

use af_core::{Category, Preset};
use clap::{Parser, Subcommand};

use crate::commands::demo::Scenario;

/// Aesthetic fatigue scorer.
///
/// Replays streams of player actions through the fatigue engine and shows how
/// monotony, pace and rest turn into penalties.
#[derive(Debug, Parser)]
#[command(name = "af", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Difficulty preset the configuration starts from.
    #[arg(short, long, global = true, default_value_t = Preset::Default)]
    pub preset: Preset,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Record every event in a JSONL file and print each reading.
    Replay {
        /// File with one JSON event per line.
        file: PathBuf,

        /// Emit JSON lines instead of text.
        #[arg(long)]
        json: bool,

        /// After replaying, query the engine at this time.
        #[arg(long)]
        query_at: Option<f64>,

        /// Category to report per-category fatigue for in the final query.
        #[arg(long, requires = "query_at")]
        category: Option<Category>,
    },

    /// Run a built-in scenario.
    Demo {
        #[arg(value_enum)]
        scenario: Scenario,
    },

    /// List the difficulty presets.
    Presets,

    /// Replay a JSONL file and show per-category fatigue.
    Heatmap {
        /// File with one JSON event per line.
        file: PathBuf,

        /// Time to evaluate at. Defaults to the last event.
        #[arg(long)]
        at: Option<f64>,
    },
}
