//! Penalty strategies that turn a fatigue reading into a gameplay effect.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::FatigueConfig;
use crate::math::clamp01;
use crate::result::{PenaltyEffect, Severity};

/// How much of its effect a debuffed action loses per unit of dissonance.
pub(crate) const DISSONANCE_EFFECT_SHARE: f64 = 0.5;

/// Which penalty strategy the engine applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyMode {
    /// Scale the action's effect by a per-severity multiplier.
    #[default]
    Weaken,
    /// Suppress the action outright past a threshold.
    Lockout,
    /// Apply a continuous penalty proportional to the index.
    GlobalDebuff,
}

impl PenaltyMode {
    /// Every mode, in declaration order.
    pub const ALL: [Self; 3] = [Self::Weaken, Self::Lockout, Self::GlobalDebuff];

    /// The strategy object for this mode.
    pub fn policy(self) -> &'static dyn PenaltyPolicy {
        match self {
            Self::Weaken => &Weaken,
            Self::Lockout => &Lockout,
            Self::GlobalDebuff => &GlobalDebuff,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Weaken => "weaken",
            Self::Lockout => "lockout",
            Self::GlobalDebuff => "global_debuff",
        }
    }
}

impl fmt::Display for PenaltyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A strategy for deriving a [`PenaltyEffect`] from a classified reading.
///
/// Only called for severities above `None`; the engine hands out a neutral
/// effect otherwise.
pub trait PenaltyPolicy: Sync {
    fn effect(&self, index: f64, severity: Severity, config: &FatigueConfig) -> PenaltyEffect;
}

/// Scales the effect by a fixed multiplier per severity.
#[derive(Debug, Clone, Copy)]
pub struct Weaken;

impl PenaltyPolicy for Weaken {
    fn effect(&self, _index: f64, severity: Severity, config: &FatigueConfig) -> PenaltyEffect {
        let multiplier = config.multipliers.for_severity(severity);
        PenaltyEffect {
            multiplier,
            locked: false,
            dissonance: 0.0,
            description: format!("Effect reduced to {:.0}%", multiplier * 100.0),
        }
    }
}

/// Binary gate: fully suppressed once the index reaches the lockout threshold.
#[derive(Debug, Clone, Copy)]
pub struct Lockout;

impl PenaltyPolicy for Lockout {
    fn effect(&self, index: f64, _severity: Severity, config: &FatigueConfig) -> PenaltyEffect {
        let locked = index >= config.lockout_threshold;
        PenaltyEffect {
            multiplier: if locked { 0.0 } else { 1.0 },
            locked,
            dissonance: 0.0,
            description: if locked {
                "Locked! Use other categories to unlock.".to_string()
            } else {
                "Close to lockout; add more variety.".to_string()
            },
        }
    }
}

/// Continuous dissonance proportional to the index.
#[derive(Debug, Clone, Copy)]
pub struct GlobalDebuff;

impl PenaltyPolicy for GlobalDebuff {
    fn effect(&self, index: f64, _severity: Severity, config: &FatigueConfig) -> PenaltyEffect {
        let dissonance = index * config.debuff_scale;
        PenaltyEffect {
            multiplier: clamp01(DISSONANCE_EFFECT_SHARE.mul_add(-dissonance, 1.0)),
            locked: false,
            dissonance,
            description: format!(
                "Global dissonance {:.1}%; every action is affected",
                dissonance * 100.0
            ),
        }
    }
}

/// Derives the penalty for a reading under the configured mode.
pub fn penalty_for(index: f64, severity: Severity, config: &FatigueConfig) -> PenaltyEffect {
    if severity == Severity::None {
        return PenaltyEffect::neutral();
    }
    config.penalty_mode.policy().effect(index, severity, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(mode: PenaltyMode) -> FatigueConfig {
        FatigueConfig {
            penalty_mode: mode,
            ..FatigueConfig::default()
        }
    }

    #[test]
    fn no_severity_is_neutral_in_every_mode() {
        for mode in PenaltyMode::ALL {
            let effect = penalty_for(0.95, Severity::None, &config_with(mode));
            assert_eq!(effect, PenaltyEffect::neutral(), "mode {mode}");
        }
    }

    #[test]
    fn weaken_uses_multiplier_table() {
        let config = config_with(PenaltyMode::Weaken);
        let moderate = penalty_for(0.6, Severity::Moderate, &config);
        assert!((moderate.multiplier - 0.55).abs() < f64::EPSILON);
        assert!(!moderate.locked);
        assert_eq!(moderate.description, "Effect reduced to 55%");

        let critical = penalty_for(0.95, Severity::Critical, &config);
        assert!((critical.multiplier - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn lockout_is_binary_at_threshold() {
        let config = config_with(PenaltyMode::Lockout);

        let below = penalty_for(0.89, Severity::Severe, &config);
        assert!(!below.locked);
        assert!((below.multiplier - 1.0).abs() < f64::EPSILON);

        let at = penalty_for(0.90, Severity::Critical, &config);
        assert!(at.locked);
        assert!(at.multiplier.abs() < f64::EPSILON);
    }

    #[test]
    fn global_debuff_scales_with_index() {
        let config = config_with(PenaltyMode::GlobalDebuff);
        let effect = penalty_for(0.6, Severity::Moderate, &config);

        // dissonance = 0.6 * 0.5, multiplier = 1 - 0.3 * 0.5
        assert!((effect.dissonance - 0.3).abs() < 1e-12);
        assert!((effect.multiplier - 0.85).abs() < 1e-12);
        assert!(!effect.locked);
    }

    #[test]
    fn global_debuff_multiplier_never_goes_negative() {
        // Unvalidated configs can still reach the policy directly.
        let config = FatigueConfig {
            debuff_scale: 4.0,
            ..config_with(PenaltyMode::GlobalDebuff)
        };
        let effect = penalty_for(0.7066, Severity::Moderate, &config);

        assert!((effect.dissonance - 2.8264).abs() < 1e-9);
        assert_eq!(effect.multiplier, 0.0);
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&PenaltyMode::GlobalDebuff).unwrap();
        assert_eq!(json, "\"global_debuff\"");
    }
}
