//! Built-in demonstration scenarios.

use std::io::Write;

use af_core::{
    ActionEvent, Category, FatigueConfig, FatigueEngine, GroupType, PenaltyMode,
};
use anyhow::{Context, Result};
use clap::ValueEnum;

use super::util::{event_label, format_heatmap, format_reading};

const RULE_WIDTH: usize = 78;

const WHITE: [Category; 7] = [
    Category::C,
    Category::D,
    Category::E,
    Category::F,
    Category::G,
    Category::A,
    Category::B,
];

/// The scenarios `af demo` can play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// The same category every half second.
    Monotonous,
    /// Varied categories, timing and groups.
    Diverse,
    /// Varied categories with no room to breathe.
    Barrage,
    /// Short phrases separated by rests.
    Breathe,
    /// A busy stretch followed by idle queries.
    Recovery,
    /// The same monotone run under each penalty mode.
    Penalties,
    /// Per-category fatigue after a lopsided session.
    Heatmap,
}

impl Scenario {
    const fn title(self) -> &'static str {
        match self {
            Self::Monotonous => "Monotonous: repeating C",
            Self::Diverse => "Diverse: varied categories and groups",
            Self::Barrage => "Barrage: varied but relentless",
            Self::Breathe => "Breathe: phrases with rests between them",
            Self::Recovery => "Recovery: resting after a busy stretch",
            Self::Penalties => "Penalties: one monotone run, three modes",
            Self::Heatmap => "Heat map: per-category fatigue",
        }
    }
}

pub fn run<W: Write>(writer: &mut W, scenario: Scenario, config: &FatigueConfig) -> Result<()> {
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;
    writeln!(writer, "{}", scenario.title())?;
    writeln!(writer, "{}", "=".repeat(RULE_WIDTH))?;

    match scenario {
        Scenario::Monotonous => {
            let events: Vec<_> = (0..12)
                .map(|i| ActionEvent::single(f64::from(i) * 0.5, Category::C))
                .collect();
            play(writer, config, &events, |_| true)
        }
        Scenario::Diverse => play(writer, config, &diverse_session(), |_| true),
        Scenario::Barrage => {
            let events: Vec<_> = (0..40)
                .map(|i| ActionEvent::single(f64::from(i) * 0.15, WHITE[i as usize % WHITE.len()]))
                .collect();
            play(writer, config, &events, |i| i % 5 == 0 || i >= 35)
        }
        Scenario::Breathe => play(writer, config, &breathing_session(), |_| true),
        Scenario::Recovery => recovery(writer, config),
        Scenario::Penalties => penalties(writer, config),
        Scenario::Heatmap => heatmap(writer, config),
    }
}

/// Records every event, printing the readings selected by `show`.
fn play<W: Write>(
    writer: &mut W,
    config: &FatigueConfig,
    events: &[ActionEvent],
    show: impl Fn(usize) -> bool,
) -> Result<()> {
    let mut engine = new_engine(config)?;
    for (index, event) in events.iter().enumerate() {
        let result = engine.record(*event)?;
        if show(index) {
            writeln!(writer, "{}", format_reading(event.timestamp, &event_label(event), &result))?;
        }
    }
    Ok(())
}

fn new_engine(config: &FatigueConfig) -> Result<FatigueEngine> {
    FatigueEngine::new(config.clone()).context("invalid fatigue configuration")
}

fn diverse_session() -> Vec<ActionEvent> {
    use Category::{A, B, C, D, E, F, G};
    vec![
        ActionEvent::single(0.0, C),
        ActionEvent::single(0.6, E),
        ActionEvent::single(1.0, G),
        ActionEvent::grouped(1.8, C, GroupType::MajorTriad),
        ActionEvent::single(2.5, D),
        ActionEvent::single(3.0, F),
        ActionEvent::single(3.7, A),
        ActionEvent::grouped(4.2, D, GroupType::MinorTriad),
        ActionEvent::single(5.0, B),
        ActionEvent::single(5.4, G),
        ActionEvent::single(6.2, E),
        ActionEvent::grouped(7.0, F, GroupType::MajorTriad),
    ]
}

/// Three phrases of four, with 1.5s and 2.0s rests between them.
fn breathing_session() -> Vec<ActionEvent> {
    use Category::{A, B, C, D, E, F, G};
    [
        (0.0, C),
        (0.4, E),
        (0.8, G),
        (1.2, B),
        (2.7, D),
        (3.1, F),
        (3.5, A),
        (3.9, C),
        (5.9, E),
        (6.3, G),
        (6.7, B),
        (7.1, D),
    ]
    .into_iter()
    .map(|(ts, category)| ActionEvent::single(ts, category))
    .collect()
}

fn recovery<W: Write>(writer: &mut W, config: &FatigueConfig) -> Result<()> {
    let mut engine = new_engine(config)?;
    let progression = [Category::C, Category::D, Category::E];

    writeln!(writer, "--- busy ---")?;
    for i in 0..15 {
        let event = ActionEvent::single(f64::from(i) * 0.3, progression[i as usize % 3]);
        let result = engine.record(event)?;
        if i % 3 == 0 {
            writeln!(writer, "{}", format_reading(event.timestamp, &event_label(&event), &result))?;
        }
    }

    writeln!(writer, "--- resting ---")?;
    for idle in [1.0, 2.0, 3.0, 5.0, 8.0, 12.0] {
        let at = 4.5 + idle;
        let result = engine.query(at, None)?;
        writeln!(
            writer,
            "{} quiet={:.0}%",
            format_reading(at, "(idle)", &result),
            result.components.silence_ratio * 100.0
        )?;
    }
    Ok(())
}

fn penalties<W: Write>(writer: &mut W, config: &FatigueConfig) -> Result<()> {
    for mode in PenaltyMode::ALL {
        let mut engine = new_engine(&FatigueConfig {
            penalty_mode: mode,
            ..config.clone()
        })?;
        for i in 0..10 {
            engine.record(ActionEvent::single(f64::from(i) * 0.4, Category::C))?;
        }
        let result = engine.query(4.0, Some(Category::C))?;
        writeln!(
            writer,
            "{:<14} index={:.3} {:<8} {}",
            mode.as_str(),
            result.fatigue_index,
            result.severity.as_str(),
            result.penalty.description
        )?;
    }
    Ok(())
}

fn heatmap<W: Write>(writer: &mut W, config: &FatigueConfig) -> Result<()> {
    use Category::{C, E, G};
    let mut engine = new_engine(config)?;
    for (i, category) in [C, C, E, C, E, C, G, C, E].into_iter().enumerate() {
        engine.record(ActionEvent::single(i as f64 * 0.5, category))?;
    }
    let map = engine.category_fatigue_map(4.5)?;
    write!(writer, "{}", format_heatmap(&map))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output_of(scenario: Scenario) -> String {
        let mut output = Vec::new();
        run(&mut output, scenario, &FatigueConfig::default()).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn every_scenario_runs() {
        for scenario in Scenario::value_variants() {
            let output = output_of(*scenario);
            assert!(output.contains(scenario.title()), "{scenario:?}");
        }
    }

    #[test]
    fn barrage_prints_selected_events_only() {
        let output = output_of(Scenario::Barrage);
        // Three header lines, every fifth event up to 30, then the last five.
        assert_eq!(output.lines().count(), 3 + 7 + 5);
    }

    #[test]
    fn penalties_cover_every_mode() {
        let output = output_of(Scenario::Penalties);
        let body: Vec<&str> = output.lines().skip(3).collect();
        assert_eq!(body.len(), 3);
        assert!(body[0].starts_with("weaken"));
        assert!(body[1].starts_with("lockout"));
        assert!(body[2].starts_with("global_debuff"));
        assert!(body[0].contains("Effect reduced to 55%"), "{}", body[0]);
    }

    #[test]
    fn heatmap_lists_all_twelve_categories() {
        let output = output_of(Scenario::Heatmap);
        assert_eq!(output.lines().count(), 3 + 2 + 12);
        assert!(output.contains("C#  "));
    }

    #[test]
    fn scenario_names_are_kebab_case() {
        let names: Vec<String> = Scenario::value_variants()
            .iter()
            .filter_map(|s| s.to_possible_value())
            .map(|v| v.get_name().to_string())
            .collect();
        assert_eq!(
            names,
            ["monotonous", "diverse", "barrage", "breathe", "recovery", "penalties", "heatmap"]
        );
    }
}
