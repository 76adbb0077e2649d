//! Named difficulty presets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::{DimensionWeights, FatigueConfig, SeverityMultipliers, SeverityThresholds};

/// A bundled configuration tuned for a difficulty level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Longer memory, slower decay, late thresholds and gentle penalties.
    Lenient,
    /// The stock configuration.
    #[default]
    Default,
    /// Short memory, fast decay, early thresholds and harsh penalties.
    Strict,
    /// Strict, with extra weight on choice and rate.
    Expert,
}

impl Preset {
    pub const ALL: [Self; 4] = [Self::Lenient, Self::Default, Self::Strict, Self::Expert];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Default => "default",
            Self::Strict => "strict",
            Self::Expert => "expert",
        }
    }

    /// One-line summary for listings.
    #[must_use]
    pub const fn summary(&self) -> &'static str {
        match self {
            Self::Lenient => "forgiving; for learning the controls",
            Self::Default => "balanced",
            Self::Strict => "punishes repetition quickly",
            Self::Expert => "demands constant variety and restraint",
        }
    }

    /// Builds the configuration for this preset.
    pub fn config(self) -> FatigueConfig {
        let base = FatigueConfig::default();
        match self {
            Self::Default => base,
            Self::Lenient => FatigueConfig {
                window_duration: 20.0,
                decay_half_life: 7.0,
                thresholds: SeverityThresholds {
                    mild: 0.45,
                    moderate: 0.65,
                    severe: 0.82,
                    critical: 0.95,
                },
                multipliers: SeverityMultipliers {
                    mild: 0.90,
                    moderate: 0.65,
                    severe: 0.35,
                    critical: 0.10,
                },
                rate_optimal: 3.0,
                rate_max: 8.0,
                sustained_onset: 12.0,
                sustained_max: 30.0,
                ..base
            },
            Self::Strict => FatigueConfig {
                window_duration: 12.0,
                decay_half_life: 3.5,
                thresholds: SeverityThresholds {
                    mild: 0.22,
                    moderate: 0.42,
                    severe: 0.62,
                    critical: 0.80,
                },
                multipliers: SeverityMultipliers {
                    mild: 0.80,
                    moderate: 0.45,
                    severe: 0.15,
                    critical: 0.02,
                },
                rate_optimal: 1.5,
                rate_max: 4.0,
                sustained_onset: 6.0,
                sustained_max: 15.0,
                ..base
            },
            Self::Expert => FatigueConfig {
                window_duration: 10.0,
                decay_half_life: 2.5,
                weights: DimensionWeights {
                    choice: 0.18,
                    transition: 0.15,
                    rhythm: 0.08,
                    recurrence: 0.09,
                    group: 0.05,
                    rate: 0.22,
                    silence: 0.12,
                    sustained: 0.11,
                },
                thresholds: SeverityThresholds {
                    mild: 0.18,
                    moderate: 0.35,
                    severe: 0.52,
                    critical: 0.70,
                },
                multipliers: SeverityMultipliers {
                    mild: 0.75,
                    moderate: 0.35,
                    severe: 0.10,
                    critical: 0.01,
                },
                rate_optimal: 1.2,
                rate_max: 3.5,
                sustained_onset: 5.0,
                sustained_max: 12.0,
                ..base
            },
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lenient" | "easy" => Ok(Self::Lenient),
            "default" | "normal" => Ok(Self::Default),
            "strict" | "hard" => Ok(Self::Strict),
            "expert" | "maestro" => Ok(Self::Expert),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

impl Serialize for Preset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Preset {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown preset names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPreset(String);

impl fmt::Display for UnknownPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown preset: {} (expected lenient, default, strict or expert)",
            self.0
        )
    }
}

impl std::error::Error for UnknownPreset {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_preset_is_valid() {
        for preset in Preset::ALL {
            assert_eq!(preset.config().validate(), Ok(()), "preset {preset}");
        }
    }

    #[test]
    fn presets_tighten_monotonically() {
        let configs: Vec<_> = [Preset::Lenient, Preset::Default, Preset::Strict, Preset::Expert]
            .into_iter()
            .map(Preset::config)
            .collect();

        for pair in configs.windows(2) {
            assert!(pair[0].window_duration >= pair[1].window_duration);
            assert!(pair[0].thresholds.mild > pair[1].thresholds.mild);
            assert!(pair[0].multipliers.critical > pair[1].multipliers.critical);
            assert!(pair[0].rate_max > pair[1].rate_max);
        }
    }

    #[test]
    fn expert_reweights_dimensions() {
        let expert = Preset::Expert.config();
        assert!((expert.weights.total() - 1.0).abs() < 1e-9);
        assert!(expert.weights.rate > FatigueConfig::default().weights.rate);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("strict".parse::<Preset>(), Ok(Preset::Strict));
        assert_eq!("maestro".parse::<Preset>(), Ok(Preset::Expert));
        assert_eq!("easy".parse::<Preset>(), Ok(Preset::Lenient));
        assert_eq!(
            "brutal".parse::<Preset>().unwrap_err().to_string(),
            "unknown preset: brutal (expected lenient, default, strict or expert)"
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>(), Ok(preset));
        }
    }
}
