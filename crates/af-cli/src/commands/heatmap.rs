//! Heatmap command: per-category fatigue after replaying a session.

use std::io::Write;
use std::path::Path;

use af_core::{ActionEvent, FatigueConfig, FatigueEngine};
use anyhow::{Context, Result};

use super::util::{format_heatmap, read_events};

pub fn run<W: Write>(
    writer: &mut W,
    config: FatigueConfig,
    input: &Path,
    at: Option<f64>,
) -> Result<()> {
    let events = read_events(input)?;
    render(writer, config, &events, at)
}

/// Records `events`, then writes the heat map at `at` (or the last event).
pub fn render<W: Write>(
    writer: &mut W,
    config: FatigueConfig,
    events: &[ActionEvent],
    at: Option<f64>,
) -> Result<()> {
    let mut engine = FatigueEngine::new(config).context("invalid fatigue configuration")?;
    for (index, event) in events.iter().enumerate() {
        engine
            .record(*event)
            .with_context(|| format!("failed to record event {}", index + 1))?;
    }

    let at = at
        .or_else(|| events.last().map(|e| e.timestamp))
        .unwrap_or(0.0);
    let map = engine
        .category_fatigue_map(at)
        .context("failed to evaluate heat map")?;

    writeln!(writer, "at t={at:.2}s ({} events retained)", engine.len())?;
    write!(writer, "{}", format_heatmap(&map))?;
    Ok(())
}
