//! Tunable parameters for the fatigue engine.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::penalty::{DISSONANCE_EFFECT_SHARE, PenaltyMode};
use crate::result::Severity;

/// Per-dimension fusion weights.
///
/// The weights are not required to sum to 1.0; the fused index is clamped
/// instead of normalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionWeights {
    /// Choice diversity (decay-weighted category entropy).
    pub choice: f64,
    /// Transition predictability (conditional entropy).
    pub transition: f64,
    /// Timing regularity (entropy of quantized intervals).
    pub rhythm: f64,
    /// Structural repetition (n-gram recurrence).
    pub recurrence: f64,
    /// Group-type diversity.
    pub group: f64,
    /// Event rate above the comfortable pace.
    pub rate: f64,
    /// Shortfall of silence in the window.
    pub silence: f64,
    /// Uninterrupted activity duration.
    pub sustained: f64,
}

impl DimensionWeights {
    /// Sum of all eight weights.
    pub fn total(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// The weights in fusion order, matching `FatigueComponents::dimensions`.
    pub const fn as_array(&self) -> [f64; 8] {
        [
            self.choice,
            self.transition,
            self.rhythm,
            self.recurrence,
            self.group,
            self.rate,
            self.silence,
            self.sustained,
        ]
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            choice: 0.20,
            transition: 0.15,
            rhythm: 0.10,
            recurrence: 0.10,
            group: 0.05,
            rate: 0.20,
            silence: 0.10,
            sustained: 0.10,
        }
    }
}

/// Index values at which each severity level begins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityThresholds {
    pub mild: f64,
    pub moderate: f64,
    pub severe: f64,
    pub critical: f64,
}

impl SeverityThresholds {
    /// Maps a fused index onto the severity ladder.
    ///
    /// Checked from the top down, so an index exactly on a threshold gets
    /// the higher level.
    pub fn classify(&self, index: f64) -> Severity {
        if index >= self.critical {
            Severity::Critical
        } else if index >= self.severe {
            Severity::Severe
        } else if index >= self.moderate {
            Severity::Moderate
        } else if index >= self.mild {
            Severity::Mild
        } else {
            Severity::None
        }
    }
}

impl Default for SeverityThresholds {
    fn default() -> Self {
        Self {
            mild: 0.30,
            moderate: 0.55,
            severe: 0.75,
            critical: 0.90,
        }
    }
}

/// Effect multipliers used by the weaken penalty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityMultipliers {
    pub mild: f64,
    pub moderate: f64,
    pub severe: f64,
    pub critical: f64,
}

impl SeverityMultipliers {
    /// Multiplier for a severity level. `Severity::None` is unaffected.
    pub const fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::None => 1.0,
            Severity::Mild => self.mild,
            Severity::Moderate => self.moderate,
            Severity::Severe => self.severe,
            Severity::Critical => self.critical,
        }
    }
}

impl Default for SeverityMultipliers {
    fn default() -> Self {
        Self {
            mild: 0.85,
            moderate: 0.55,
            severe: 0.25,
            critical: 0.05,
        }
    }
}

/// Configuration for the fatigue engine.
///
/// Durations are in seconds and rates in events per second. Use
/// [`FatigueConfig::validate`] (called by `FatigueEngine::new`) before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FatigueConfig {
    /// Trailing span of history kept for analysis. Default: 15.0.
    pub window_duration: f64,

    /// Hard cap on retained events. Default: 64.
    pub max_history_size: usize,

    /// Half-life of the recency weighting. Default: 5.0.
    pub decay_half_life: f64,

    /// Fusion weights for the eight dimensions.
    pub weights: DimensionWeights,

    /// Event rate at or below which no rate fatigue accrues. Default: 2.0.
    pub rate_optimal: f64,

    /// Event rate at which rate fatigue saturates. Default: 6.0.
    pub rate_max: f64,

    /// Short trailing window used to measure the event rate. Default: 3.0.
    pub rate_window: f64,

    /// Minimum gap that counts as silence. Default: 1.5.
    pub silence_threshold: f64,

    /// Fraction of the window that should be silent. Default: 0.20.
    pub silence_ideal_ratio: f64,

    /// Recovery credited per second of silence. Default: 0.03.
    ///
    /// Carried for configuration parity; validated but not read by the engine.
    pub silence_recovery_per_second: f64,

    /// Uninterrupted activity before sustained fatigue starts. Default: 8.0.
    pub sustained_onset: f64,

    /// Uninterrupted activity at which sustained fatigue saturates. Default: 20.0.
    pub sustained_max: f64,

    /// Pause that restarts the sustained-activity timer. Default: 1.0.
    pub sustained_reset: f64,

    /// Severity ladder.
    pub thresholds: SeverityThresholds,

    /// Which penalty strategy to apply.
    pub penalty_mode: PenaltyMode,

    /// Weaken-mode multipliers.
    pub multipliers: SeverityMultipliers,

    /// Index at which lockout mode suppresses the action. Default: 0.90.
    pub lockout_threshold: f64,

    /// Scale from index to dissonance in global-debuff mode, at most 2.0.
    /// Default: 0.5.
    pub debuff_scale: f64,

    /// Recovery bonus for using a fresh category. Default: 0.15.
    ///
    /// Carried for configuration parity; validated but not read by the engine.
    pub diversity_recovery_bonus: f64,

    /// Recovery bonus for a successful grouped action. Default: 0.10.
    ///
    /// Carried for configuration parity; validated but not read by the engine.
    pub group_recovery_bonus: f64,

    /// Lengths of the n-grams checked for recurrence. Default: `[2, 3, 4]`.
    pub ngram_sizes: Vec<usize>,

    /// Number of bins for interval quantization. Default: 8.
    pub rhythm_quantize_bins: usize,

    /// Intervals at or above this land in the top bin. Default: 2.0.
    pub rhythm_max_interval: f64,

    /// Decayed occurrence count at which one category is fully fatigued.
    /// Default: 6.0.
    pub category_saturation: f64,
}

impl Default for FatigueConfig {
    fn default() -> Self {
        Self {
            window_duration: 15.0,
            max_history_size: 64,
            decay_half_life: 5.0,
            weights: DimensionWeights::default(),
            rate_optimal: 2.0,
            rate_max: 6.0,
            rate_window: 3.0,
            silence_threshold: 1.5,
            silence_ideal_ratio: 0.20,
            silence_recovery_per_second: 0.03,
            sustained_onset: 8.0,
            sustained_max: 20.0,
            sustained_reset: 1.0,
            thresholds: SeverityThresholds::default(),
            penalty_mode: PenaltyMode::default(),
            multipliers: SeverityMultipliers::default(),
            lockout_threshold: 0.90,
            debuff_scale: 0.5,
            diversity_recovery_bonus: 0.15,
            group_recovery_bonus: 0.10,
            ngram_sizes: vec![2, 3, 4],
            rhythm_quantize_bins: 8,
            rhythm_max_interval: 2.0,
            category_saturation: 6.0,
        }
    }
}

impl FatigueConfig {
    /// Checks every invariant the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint; values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("window_duration", self.window_duration),
            ("decay_half_life", self.decay_half_life),
            ("rate_optimal", self.rate_optimal),
            ("rate_max", self.rate_max),
            ("rate_window", self.rate_window),
            ("silence_threshold", self.silence_threshold),
            ("silence_ideal_ratio", self.silence_ideal_ratio),
            ("sustained_onset", self.sustained_onset),
            ("sustained_max", self.sustained_max),
            ("sustained_reset", self.sustained_reset),
            ("rhythm_max_interval", self.rhythm_max_interval),
            ("category_saturation", self.category_saturation),
            ("debuff_scale", self.debuff_scale),
        ] {
            positive(field, value)?;
        }

        // Past this scale a fully fatigued action would have a negative effect.
        if self.debuff_scale > DISSONANCE_EFFECT_SHARE.recip() {
            return Err(ConfigError::OutOfRange {
                field: "debuff_scale",
                value: self.debuff_scale,
            });
        }

        for (field, value) in [
            ("weights.choice", self.weights.choice),
            ("weights.transition", self.weights.transition),
            ("weights.rhythm", self.weights.rhythm),
            ("weights.recurrence", self.weights.recurrence),
            ("weights.group", self.weights.group),
            ("weights.rate", self.weights.rate),
            ("weights.silence", self.weights.silence),
            ("weights.sustained", self.weights.sustained),
            ("silence_recovery_per_second", self.silence_recovery_per_second),
            ("diversity_recovery_bonus", self.diversity_recovery_bonus),
            ("group_recovery_bonus", self.group_recovery_bonus),
        ] {
            non_negative(field, value)?;
        }

        for (field, value) in [
            ("multipliers.mild", self.multipliers.mild),
            ("multipliers.moderate", self.multipliers.moderate),
            ("multipliers.severe", self.multipliers.severe),
            ("multipliers.critical", self.multipliers.critical),
            ("silence_ideal_ratio", self.silence_ideal_ratio),
            ("lockout_threshold", self.lockout_threshold),
        ] {
            unit_interval(field, value)?;
        }

        let t = &self.thresholds;
        let ladder = [t.mild, t.moderate, t.severe, t.critical];
        if ladder.iter().any(|v| !v.is_finite()) || ladder.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::ThresholdsNotIncreasing {
                mild: t.mild,
                moderate: t.moderate,
                severe: t.severe,
                critical: t.critical,
            });
        }

        ramp("rate", self.rate_optimal, self.rate_max)?;
        ramp("sustained", self.sustained_onset, self.sustained_max)?;

        if self.ngram_sizes.is_empty() {
            return Err(ConfigError::EmptyNgramSizes);
        }
        if self.ngram_sizes.contains(&0) {
            return Err(ConfigError::InvalidNgramSize);
        }
        if self.max_history_size == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.rhythm_quantize_bins == 0 {
            return Err(ConfigError::ZeroBins);
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field });
    }
    if value < 0.0 {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}

fn unit_interval(field: &'static str, value: f64) -> Result<(), ConfigError> {
    non_negative(field, value)?;
    if value > 1.0 {
        return Err(ConfigError::OutOfRange { field, value });
    }
    Ok(())
}

fn ramp(field: &'static str, lower: f64, upper: f64) -> Result<(), ConfigError> {
    if upper <= lower {
        return Err(ConfigError::RampInverted {
            field,
            lower,
            upper,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(FatigueConfig::default().validate(), Ok(()));
    }

    #[test]
    fn default_weights_sum_to_one() {
        let total = DimensionWeights::default().total();
        assert!((total - 1.0).abs() < 1e-9, "got {total}");
    }

    #[test]
    fn rejects_non_positive_window() {
        let config = FatigueConfig {
            window_duration: 0.0,
            ..FatigueConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "window_duration",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_nan_half_life() {
        let config = FatigueConfig {
            decay_half_life: f64::NAN,
            ..FatigueConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NonFinite {
                field: "decay_half_life"
            })
        );
    }

    #[test]
    fn rejects_debuff_scale_that_inverts_the_effect() {
        let config = FatigueConfig {
            debuff_scale: 4.0,
            ..FatigueConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "debuff_scale",
                value: 4.0
            })
        );

        let edge = FatigueConfig {
            debuff_scale: 2.0,
            ..FatigueConfig::default()
        };
        assert_eq!(edge.validate(), Ok(()));
    }

    #[test]
    fn rejects_equal_thresholds() {
        let config = FatigueConfig {
            thresholds: SeverityThresholds {
                mild: 0.3,
                moderate: 0.3,
                severe: 0.75,
                critical: 0.9,
            },
            ..FatigueConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdsNotIncreasing { .. })
        ));
    }

    #[test]
    fn rejects_empty_and_zero_ngram_sizes() {
        let empty = FatigueConfig {
            ngram_sizes: vec![],
            ..FatigueConfig::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::EmptyNgramSizes));

        let zero = FatigueConfig {
            ngram_sizes: vec![2, 0],
            ..FatigueConfig::default()
        };
        assert_eq!(zero.validate(), Err(ConfigError::InvalidNgramSize));
    }

    #[test]
    fn rejects_inverted_rate_ramp() {
        let config = FatigueConfig {
            rate_optimal: 6.0,
            rate_max: 2.0,
            ..FatigueConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RampInverted { field: "rate", .. })
        ));
    }

    #[test]
    fn rejects_zero_capacity() {
        let config = FatigueConfig {
            max_history_size: 0,
            ..FatigueConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn rejects_negative_weight() {
        let config = FatigueConfig {
            weights: DimensionWeights {
                rate: -0.1,
                ..DimensionWeights::default()
            },
            ..FatigueConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                field: "weights.rate",
                ..
            })
        ));
    }

    #[test]
    fn classify_resolves_ties_upward() {
        let t = SeverityThresholds::default();
        assert_eq!(t.classify(0.0), Severity::None);
        assert_eq!(t.classify(0.2999), Severity::None);
        assert_eq!(t.classify(0.30), Severity::Mild);
        assert_eq!(t.classify(0.55), Severity::Moderate);
        assert_eq!(t.classify(0.75), Severity::Severe);
        assert_eq!(t.classify(0.90), Severity::Critical);
        assert_eq!(t.classify(1.0), Severity::Critical);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: FatigueConfig =
            serde_json::from_str(r#"{"window_duration": 20.0, "weights": {"rate": 0.3}}"#)
                .unwrap();
        assert!((config.window_duration - 20.0).abs() < f64::EPSILON);
        assert!((config.weights.rate - 0.3).abs() < f64::EPSILON);
        assert!((config.weights.choice - 0.20).abs() < f64::EPSILON);
        assert_eq!(config.ngram_sizes, vec![2, 3, 4]);
    }
}
