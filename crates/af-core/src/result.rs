//! Snapshots returned by the engine.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Ordinal fatigue severity.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Actions behave normally.
    #[default]
    None,
    /// A cue is shown and effects dip slightly.
    Mild,
    /// Effects drop noticeably.
    Moderate,
    /// Effects are nearly nullified.
    Severe,
    /// Actions are suppressed until the player diversifies.
    Critical,
}

impl Severity {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dimension breakdown behind a fused index.
///
/// Each `*_fatigue` field is in \[0.0, 1.0\] and is what gets weighted into
/// the index. The remaining fields are the raw measurements they came from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FatigueComponents {
    pub choice_entropy: f64,
    pub choice_fatigue: f64,
    pub transition_entropy: f64,
    pub transition_fatigue: f64,
    pub rhythm_entropy: f64,
    pub rhythm_fatigue: f64,
    pub recurrence_rate: f64,
    pub group_diversity: f64,
    pub group_fatigue: f64,
    /// Events per second over the short rate window.
    pub event_rate: f64,
    pub rate_fatigue: f64,
    /// Fraction of the window spent in silence.
    pub silence_ratio: f64,
    pub silence_deficit_fatigue: f64,
    /// Seconds since the last sufficiently long pause.
    pub sustained_duration: f64,
    pub sustained_fatigue: f64,
}

impl Default for FatigueComponents {
    fn default() -> Self {
        Self {
            choice_entropy: 1.0,
            choice_fatigue: 0.0,
            transition_entropy: 1.0,
            transition_fatigue: 0.0,
            rhythm_entropy: 1.0,
            rhythm_fatigue: 0.0,
            recurrence_rate: 0.0,
            group_diversity: 1.0,
            group_fatigue: 0.0,
            event_rate: 0.0,
            rate_fatigue: 0.0,
            silence_ratio: 1.0,
            silence_deficit_fatigue: 0.0,
            sustained_duration: 0.0,
            sustained_fatigue: 0.0,
        }
    }
}

impl FatigueComponents {
    /// The eight weighted values, in fusion order.
    pub const fn dimensions(&self) -> [f64; 8] {
        [
            self.choice_fatigue,
            self.transition_fatigue,
            self.rhythm_fatigue,
            self.recurrence_rate,
            self.group_fatigue,
            self.rate_fatigue,
            self.silence_deficit_fatigue,
            self.sustained_fatigue,
        ]
    }
}

/// What the current fatigue does to the triggering action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyEffect {
    /// Factor to apply to the action's effect.
    pub multiplier: f64,
    /// Whether the action is suppressed entirely.
    pub locked: bool,
    /// Global dissonance level (debuff mode only).
    pub dissonance: f64,
    /// Human-readable summary. Presentation only.
    pub description: String,
}

impl PenaltyEffect {
    /// No penalty at all.
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            multiplier: 1.0,
            locked: false,
            dissonance: 0.0,
            description: String::new(),
        }
    }
}

impl Default for PenaltyEffect {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Advice for bringing fatigue back down, one per overloaded dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "hint", content = "categories", rename_all = "snake_case")]
pub enum RecoveryHint {
    /// Activity has gone on too long without a pause.
    TakeBreak,
    /// Actions are coming too fast.
    SlowDown,
    /// Not enough silence between phrases.
    LeaveGaps,
    /// Try these unused base categories.
    TryCategories(Vec<Category>),
    /// Every base category is in use; spread choices more evenly.
    VaryCategories,
    /// The order of choices is too predictable.
    BreakPattern,
    /// The timing between actions is too regular.
    VaryTiming,
    /// The same short combinations keep repeating.
    AvoidRepeats,
    /// The same kind of grouped action keeps repeating.
    VaryGroups,
}

impl fmt::Display for RecoveryHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TakeBreak => f.write_str("Pause for a moment; you have been acting nonstop"),
            Self::SlowDown => f.write_str("Slow down and give each action room"),
            Self::LeaveGaps => f.write_str("Leave gaps between phrases; silence counts too"),
            Self::TryCategories(categories) => {
                f.write_str("Try something new: ")?;
                for (i, c) in categories.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(c.name())?;
                }
                Ok(())
            }
            Self::VaryCategories => f.write_str("Spread your choices across more categories"),
            Self::BreakPattern => f.write_str("Break the current sequence; try a different order"),
            Self::VaryTiming => f.write_str("Vary your timing between actions"),
            Self::AvoidRepeats => f.write_str("Avoid repeating the same combinations"),
            Self::VaryGroups => f.write_str("Mix in different kinds of grouped actions"),
        }
    }
}

/// Full outcome of one `record` or `query` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FatigueResult {
    /// Fused index in \[0.0, 1.0\].
    pub fatigue_index: f64,
    pub severity: Severity,
    pub components: FatigueComponents,
    pub penalty: PenaltyEffect,
    /// Fatigue of the recorded or queried category; 0.0 when none was given.
    pub category_fatigue: f64,
    pub recovery_suggestions: Vec<RecoveryHint>,
}

impl FatigueResult {
    /// The result for a history too short to judge.
    #[must_use]
    pub fn calm() -> Self {
        Self {
            fatigue_index: 0.0,
            severity: Severity::None,
            components: FatigueComponents::default(),
            penalty: PenaltyEffect::neutral(),
            category_fatigue: 0.0,
            recovery_suggestions: Vec::new(),
        }
    }
}

impl fmt::Display for FatigueResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.components;
        writeln!(
            f,
            "index={:.3} severity={}",
            self.fatigue_index, self.severity
        )?;
        writeln!(
            f,
            "  choice={:.2} transition={:.2} rhythm={:.2} recurrence={:.2} group={:.2}",
            c.choice_fatigue, c.transition_fatigue, c.rhythm_fatigue, c.recurrence_rate, c.group_fatigue
        )?;
        writeln!(
            f,
            "  rate={:.2} ({:.1}/s) silence={:.2} ({:.0}% quiet) sustained={:.2} ({:.1}s)",
            c.rate_fatigue,
            c.event_rate,
            c.silence_deficit_fatigue,
            c.silence_ratio * 100.0,
            c.sustained_fatigue,
            c.sustained_duration
        )?;
        write!(
            f,
            "  penalty: multiplier={:.2} locked={}",
            self.penalty.multiplier, self.penalty.locked
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_orders_from_none_to_critical() {
        assert!(Severity::None < Severity::Mild);
        assert!(Severity::Mild < Severity::Moderate);
        assert!(Severity::Moderate < Severity::Severe);
        assert!(Severity::Severe < Severity::Critical);
    }

    #[test]
    fn calm_result_is_neutral() {
        let result = FatigueResult::calm();
        assert_eq!(result.severity, Severity::None);
        assert_eq!(result.penalty, PenaltyEffect::neutral());
        assert!(result.components.dimensions().iter().all(|d| *d == 0.0));
        assert!(result.recovery_suggestions.is_empty());
    }

    #[test]
    fn try_categories_lists_names() {
        let hint = RecoveryHint::TryCategories(vec![Category::D, Category::F, Category::A]);
        assert_eq!(hint.to_string(), "Try something new: D, F, A");
    }

    #[test]
    fn hint_serializes_with_tag() {
        let json = serde_json::to_string(&RecoveryHint::TryCategories(vec![Category::E])).unwrap();
        assert_eq!(json, r#"{"hint":"try_categories","categories":["E"]}"#);

        let json = serde_json::to_string(&RecoveryHint::SlowDown).unwrap();
        assert_eq!(json, r#"{"hint":"slow_down"}"#);
    }

    #[test]
    fn display_summarizes_calm_result() {
        let text = FatigueResult::calm().to_string();
        assert_eq!(
            text,
            "index=0.000 severity=none\n\
             \x20 choice=0.00 transition=0.00 rhythm=0.00 recurrence=0.00 group=0.00\n\
             \x20 rate=0.00 (0.0/s) silence=0.00 (100% quiet) sustained=0.00 (0.0s)\n\
             \x20 penalty: multiplier=1.00 locked=false"
        );
    }
}
