//! Shared helpers for CLI commands.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use af_core::{ActionEvent, Category, FatigueResult, GroupType};
use anyhow::{Context, Result};

/// Width of a full heat map bar.
const BAR_WIDTH: usize = 25;

/// Reads one JSON [`ActionEvent`] per line. Blank lines are skipped.
pub fn read_events(path: &Path) -> Result<Vec<ActionEvent>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_events(BufReader::new(file))
        .with_context(|| format!("failed to read events from {}", path.display()))
}

pub fn parse_events<R: BufRead>(reader: R) -> Result<Vec<ActionEvent>> {
    let mut events = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let event: ActionEvent = serde_json::from_str(line)
            .with_context(|| format!("invalid event on line {}", index + 1))?;
        events.push(event);
    }
    Ok(events)
}

/// Short label for an event: the category, plus the group kind if any.
pub fn event_label(event: &ActionEvent) -> String {
    if event.group_type == GroupType::None {
        event.category.to_string()
    } else {
        format!("{} [{}]", event.category, event.group_type)
    }
}

/// One summary line for a reading at `timestamp`.
pub fn format_reading(timestamp: f64, label: &str, result: &FatigueResult) -> String {
    let c = &result.components;
    let mut line = format!(
        "t={timestamp:6.2}s  {label:<18} index={:.3} {:<8} x{:.2} rate={:.2} silence={:.2} sustained={:.2}",
        result.fatigue_index,
        result.severity.as_str(),
        result.penalty.multiplier,
        c.rate_fatigue,
        c.silence_deficit_fatigue,
        c.sustained_fatigue,
    );
    if result.penalty.locked {
        line.push_str(" LOCKED");
    }
    line
}

/// Renders a per-category fatigue map as bars, one row per category.
pub fn format_heatmap(map: &BTreeMap<Category, f64>) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "cat   fatigue");
    let _ = writeln!(output, "----  -------  {}", "-".repeat(BAR_WIDTH));
    for (category, value) in map {
        let filled = ((value * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
        let _ = writeln!(
            output,
            "{:<4}  {value:.3}    {}{}",
            category.name(),
            "█".repeat(filled),
            "░".repeat(BAR_WIDTH - filled),
        );
    }
    output
}
