//! Core logic for the aesthetic fatigue engine.
//!
//! This crate scores how monotonous a stream of player actions has become:
//! - Dimensions: eight independent measures of repetition, pace and rest
//! - Engine: a bounded rolling history fused into a single index and severity
//! - Penalties: pluggable strategies that turn severity into a gameplay effect
//! - Presets: bundled configurations for each difficulty level

mod category;
mod config;
pub mod dimensions;
mod engine;
mod error;
mod event;
pub mod math;
mod penalty;
mod preset;
mod result;

pub use category::{Category, KeyKind, UnknownCategory};
pub use config::{DimensionWeights, FatigueConfig, SeverityMultipliers, SeverityThresholds};
pub use engine::{EnginePhase, FatigueEngine, MIN_EVENTS, fuse};
pub use error::{ConfigError, EngineError};
pub use event::{ActionEvent, GroupType, InconsistentGroup};
pub use penalty::{GlobalDebuff, Lockout, PenaltyMode, PenaltyPolicy, Weaken, penalty_for};
pub use preset::{Preset, UnknownPreset};
pub use result::{FatigueComponents, FatigueResult, PenaltyEffect, RecoveryHint, Severity};
