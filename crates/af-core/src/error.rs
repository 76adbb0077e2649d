//! Error types for the fatigue engine.

use thiserror::Error;

/// A configuration that cannot drive the engine.
///
/// Returned when a [`FatigueConfig`](crate::FatigueConfig) is validated.
/// Invalid values are rejected, never clamped.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// A duration, rate or scale that must be strictly positive was not.
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    /// A value that must be a finite number was NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    /// A value fell outside its allowed range.
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// The severity thresholds do not strictly increase.
    #[error(
        "severity thresholds must strictly increase, got {mild} / {moderate} / {severe} / {critical}"
    )]
    ThresholdsNotIncreasing {
        mild: f64,
        moderate: f64,
        severe: f64,
        critical: f64,
    },

    /// A linear ramp whose upper bound does not exceed its lower bound.
    #[error("{field}: upper bound {upper} must exceed lower bound {lower}")]
    RampInverted {
        field: &'static str,
        lower: f64,
        upper: f64,
    },

    /// No n-gram sizes were configured.
    #[error("at least one n-gram size is required")]
    EmptyNgramSizes,

    /// An n-gram size of zero.
    #[error("n-gram sizes must be at least 1")]
    InvalidNgramSize,

    /// The history buffer would hold no events.
    #[error("max_history_size must be at least 1")]
    ZeroCapacity,

    /// Interval quantization with no bins.
    #[error("rhythm_quantize_bins must be at least 1")]
    ZeroBins,
}

/// A call that violates the engine's input contract.
///
/// Detected before any state is touched, so the engine is unchanged after
/// an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A timestamp earlier than the last recorded event.
    #[error("timestamp {now} is earlier than the last recorded event at {last}")]
    OutOfOrder { now: f64, last: f64 },

    /// A NaN or infinite timestamp.
    #[error("timestamp must be finite, got {value}")]
    NonFiniteTimestamp { value: f64 },
}
