//! Replay command: feeds a recorded session through the engine.

use std::io::Write;
use std::path::Path;

use af_core::{ActionEvent, Category, FatigueConfig, FatigueEngine, FatigueResult};
use anyhow::{Context, Result};
use serde::Serialize;

use super::util::{event_label, format_reading, read_events};

/// Options for `af replay`.
#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub json: bool,
    pub query_at: Option<f64>,
    pub category: Option<Category>,
}

/// One output record in JSON mode.
#[derive(Debug, Serialize)]
struct ReplayLine<'a> {
    /// `record` or `query`.
    kind: &'static str,
    timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<Category>,
    result: &'a FatigueResult,
}

pub fn run<W: Write>(
    writer: &mut W,
    config: FatigueConfig,
    input: &Path,
    options: &ReplayOptions,
) -> Result<()> {
    let events = read_events(input)?;
    replay(writer, config, &events, options)
}

/// Records `events` in order, writing one line per reading.
pub fn replay<W: Write>(
    writer: &mut W,
    config: FatigueConfig,
    events: &[ActionEvent],
    options: &ReplayOptions,
) -> Result<()> {
    let mut engine = FatigueEngine::new(config).context("invalid fatigue configuration")?;
    tracing::debug!(count = events.len(), "replaying events");

    for (index, event) in events.iter().enumerate() {
        let result = engine
            .record(*event)
            .with_context(|| format!("failed to record event {}", index + 1))?;
        if options.json {
            write_json(
                writer,
                &ReplayLine {
                    kind: "record",
                    timestamp: event.timestamp,
                    category: Some(event.category),
                    result: &result,
                },
            )?;
        } else {
            writeln!(writer, "{}", format_reading(event.timestamp, &event_label(event), &result))?;
        }
    }

    if let Some(at) = options.query_at {
        let result = engine
            .query(at, options.category)
            .context("failed to query engine")?;
        if options.json {
            write_json(
                writer,
                &ReplayLine {
                    kind: "query",
                    timestamp: at,
                    category: options.category,
                    result: &result,
                },
            )?;
        } else {
            let label = options
                .category
                .map_or_else(|| "(idle)".to_string(), |c| format!("(idle) {c}"));
            writeln!(writer, "{}", format_reading(at, &label, &result))?;
            if let Some(category) = options.category {
                writeln!(writer, "  {category} fatigue: {:.3}", result.category_fatigue)?;
            }
            for hint in &result.recovery_suggestions {
                writeln!(writer, "  hint: {hint}")?;
            }
        }
    }

    Ok(())
}

fn write_json<W: Write>(writer: &mut W, line: &ReplayLine<'_>) -> Result<()> {
    let json = serde_json::to_string(line)?;
    writeln!(writer, "{json}")?;
    Ok(())
}
