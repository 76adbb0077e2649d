//! The stateful fatigue engine.
//!
//! The engine keeps a bounded, time-ordered history of actions and turns it
//! into a [`FatigueResult`] on every `record` or `query`. All per-call work is
//! linear in the history size.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::category::Category;
use crate::config::{DimensionWeights, FatigueConfig};
use crate::dimensions;
use crate::error::{ConfigError, EngineError};
use crate::event::ActionEvent;
use crate::math::{clamp01, decay_weight};
use crate::penalty::penalty_for;
use crate::result::{FatigueComponents, FatigueResult, RecoveryHint};

/// Events needed before any dimension is scored.
pub const MIN_EVENTS: usize = 3;

/// A dimension above this earns a recovery hint.
const HINT_THRESHOLD: f64 = 0.5;

/// Decayed weight below which a base category counts as unused.
const UNUSED_CATEGORY_WEIGHT: f64 = 0.5;

const MAX_SUGGESTED_CATEGORIES: usize = 3;

/// Share of the window by which accumulated silence decays per recorded event.
const SILENCE_DECAY_SHARE: f64 = 0.01;

/// Coarse lifecycle of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// No retained events.
    Empty,
    /// Some events, but too few to score.
    Warming,
    /// Enough history for a full reading.
    Active,
}

impl fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Warming => "warming",
            Self::Active => "active",
        };
        write!(f, "{s}")
    }
}

/// Tracks one subject's recent actions and scores their monotony.
#[derive(Debug, Clone)]
pub struct FatigueEngine {
    config: FatigueConfig,
    history: VecDeque<ActionEvent>,
    /// Start of the current uninterrupted run. Survives window pruning.
    activity_start: Option<f64>,
    /// Newest timestamp ever recorded, used to reject out-of-order input.
    last_event_at: Option<f64>,
    accumulated_silence: f64,
}

impl FatigueEngine {
    /// Creates an engine after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found in `config`.
    pub fn new(config: FatigueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            history: VecDeque::with_capacity(config.max_history_size),
            config,
            activity_start: None,
            last_event_at: None,
            accumulated_silence: 0.0,
        })
    }

    pub const fn config(&self) -> &FatigueConfig {
        &self.config
    }

    /// Number of retained events.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Retained events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &ActionEvent> {
        self.history.iter()
    }

    pub fn phase(&self) -> EnginePhase {
        match self.history.len() {
            0 => EnginePhase::Empty,
            n if n < MIN_EVENTS => EnginePhase::Warming,
            _ => EnginePhase::Active,
        }
    }

    /// Start of the current uninterrupted activity run, if any.
    pub const fn activity_start(&self) -> Option<f64> {
        self.activity_start
    }

    /// Timestamp of the newest recorded event.
    pub const fn last_event_at(&self) -> Option<f64> {
        self.last_event_at
    }

    /// Silence banked from long pauses. Reported for diagnostics only; it
    /// does not feed the index.
    pub const fn accumulated_silence(&self) -> f64 {
        self.accumulated_silence
    }

    /// Records an action and returns the reading that includes it.
    ///
    /// # Errors
    ///
    /// Fails without touching any state if the timestamp is not finite or is
    /// earlier than the previously recorded event.
    pub fn record(&mut self, event: ActionEvent) -> Result<FatigueResult, EngineError> {
        self.check_time(event.timestamp)?;

        self.track_activity(event.timestamp);
        self.history.push_back(event);
        self.prune(event.timestamp);
        self.accumulated_silence = self
            .config
            .window_duration
            .mul_add(-SILENCE_DECAY_SHARE, self.accumulated_silence)
            .max(0.0);

        let result = self.evaluate(event.timestamp, Some(event.category));
        debug!(
            timestamp = event.timestamp,
            category = %event.category,
            index = result.fatigue_index,
            severity = %result.severity,
            "recorded action"
        );
        Ok(result)
    }

    /// Reads the current fatigue at `now` without recording anything.
    ///
    /// Expired events are still pruned. Pass a category to get its
    /// per-category fatigue in the result.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FatigueEngine::record`].
    pub fn query(
        &mut self,
        now: f64,
        category: Option<Category>,
    ) -> Result<FatigueResult, EngineError> {
        self.check_time(now)?;
        self.prune(now);
        Ok(self.evaluate(now, category))
    }

    /// Per-category fatigue for all twelve categories at `now`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`FatigueEngine::query`].
    pub fn category_fatigue_map(&mut self, now: f64) -> Result<BTreeMap<Category, f64>, EngineError> {
        self.check_time(now)?;
        self.prune(now);

        let events: &[ActionEvent] = self.history.make_contiguous();
        Ok(Category::ALL
            .into_iter()
            .map(|c| (c, category_fatigue(events, c, now, &self.config)))
            .collect())
    }

    /// Forgets all history. The configuration is kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.activity_start = None;
        self.last_event_at = None;
        self.accumulated_silence = 0.0;
        debug!("engine reset");
    }

    fn check_time(&self, now: f64) -> Result<(), EngineError> {
        if !now.is_finite() {
            warn!(value = now, "rejecting non-finite timestamp");
            return Err(EngineError::NonFiniteTimestamp { value: now });
        }
        match self.last_event_at {
            Some(last) if now < last => {
                warn!(now, last, "rejecting out-of-order timestamp");
                Err(EngineError::OutOfOrder { now, last })
            }
            _ => Ok(()),
        }
    }

    fn track_activity(&mut self, timestamp: f64) {
        match self.last_event_at {
            None => self.activity_start = Some(timestamp),
            Some(last) => {
                let gap = timestamp - last;
                if gap >= self.config.sustained_reset {
                    self.activity_start = Some(timestamp);
                }
                if gap >= self.config.silence_threshold {
                    self.accumulated_silence += gap;
                }
            }
        }
        self.last_event_at = Some(timestamp);
    }

    /// Drops events older than the window, then the oldest beyond capacity.
    fn prune(&mut self, now: f64) {
        let cutoff = now - self.config.window_duration;
        let before = self.history.len();

        while self.history.front().is_some_and(|e| e.timestamp < cutoff) {
            self.history.pop_front();
        }
        while self.history.len() > self.config.max_history_size {
            self.history.pop_front();
        }

        let dropped = before - self.history.len();
        if dropped > 0 {
            trace!(dropped, retained = self.history.len(), "pruned history");
        }
    }

    fn evaluate(&mut self, now: f64, category: Option<Category>) -> FatigueResult {
        let config = &self.config;
        let events: &[ActionEvent] = self.history.make_contiguous();
        if events.len() < MIN_EVENTS {
            return FatigueResult::calm();
        }

        // The run marker only moves on record, so idle queries keep counting.
        let components = dimensions::measure(events, self.activity_start, now, config);
        let fatigue_index = fuse(&components, &config.weights);
        let severity = config.thresholds.classify(fatigue_index);

        FatigueResult {
            fatigue_index,
            severity,
            components,
            penalty: penalty_for(fatigue_index, severity, config),
            category_fatigue: category.map_or(0.0, |c| category_fatigue(events, c, now, config)),
            recovery_suggestions: recovery_hints(&components, events, now, config),
        }
    }
}

/// Weighted sum of the eight dimensions, clamped to \[0.0, 1.0\].
pub fn fuse(components: &FatigueComponents, weights: &DimensionWeights) -> f64 {
    let weighted: f64 = components
        .dimensions()
        .iter()
        .zip(weights.as_array())
        .map(|(dimension, weight)| dimension * weight)
        .sum();
    clamp01(weighted)
}

fn decayed_weights(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> BTreeMap<Category, f64> {
    let mut weights = BTreeMap::new();
    for event in events {
        *weights.entry(event.category).or_insert(0.0) +=
            decay_weight(now - event.timestamp, config.decay_half_life);
    }
    weights
}

fn category_fatigue(
    events: &[ActionEvent],
    category: Category,
    now: f64,
    config: &FatigueConfig,
) -> f64 {
    let weight: f64 = events
        .iter()
        .filter(|e| e.category == category)
        .map(|e| decay_weight(now - e.timestamp, config.decay_half_life))
        .sum();
    clamp01(weight / config.category_saturation)
}

fn recovery_hints(
    components: &FatigueComponents,
    events: &[ActionEvent],
    now: f64,
    config: &FatigueConfig,
) -> Vec<RecoveryHint> {
    let mut hints = Vec::new();

    if components.sustained_fatigue > HINT_THRESHOLD {
        hints.push(RecoveryHint::TakeBreak);
    }
    if components.rate_fatigue > HINT_THRESHOLD {
        hints.push(RecoveryHint::SlowDown);
    }
    if components.silence_deficit_fatigue > HINT_THRESHOLD {
        hints.push(RecoveryHint::LeaveGaps);
    }
    if components.choice_fatigue > HINT_THRESHOLD {
        let weights = decayed_weights(events, now, config);
        let unused: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| c.is_white())
            .filter(|c| weights.get(c).copied().unwrap_or(0.0) < UNUSED_CATEGORY_WEIGHT)
            .take(MAX_SUGGESTED_CATEGORIES)
            .collect();
        hints.push(if unused.is_empty() {
            RecoveryHint::VaryCategories
        } else {
            RecoveryHint::TryCategories(unused)
        });
    }
    if components.transition_fatigue > HINT_THRESHOLD {
        hints.push(RecoveryHint::BreakPattern);
    }
    if components.rhythm_fatigue > HINT_THRESHOLD {
        hints.push(RecoveryHint::VaryTiming);
    }
    if components.recurrence_rate > HINT_THRESHOLD {
        hints.push(RecoveryHint::AvoidRepeats);
    }
    if components.group_fatigue > HINT_THRESHOLD {
        hints.push(RecoveryHint::VaryGroups);
    }

    hints
}

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "exact equality intended for reset and determinism checks"
)]
mod tests {
    use super::*;
    use crate::result::Severity;

    fn engine() -> FatigueEngine {
        FatigueEngine::new(FatigueConfig::default()).unwrap()
    }

    fn record(engine: &mut FatigueEngine, ts: f64, category: Category) -> FatigueResult {
        engine.record(ActionEvent::single(ts, category)).unwrap()
    }

    #[test]
    fn rejects_invalid_config() {
        let config = FatigueConfig {
            max_history_size: 0,
            ..FatigueConfig::default()
        };
        assert_eq!(
            FatigueEngine::new(config).unwrap_err(),
            ConfigError::ZeroCapacity
        );
    }

    #[test]
    fn fewer_than_three_events_is_calm() {
        let mut engine = engine();
        assert_eq!(engine.phase(), EnginePhase::Empty);

        let first = record(&mut engine, 0.0, Category::C);
        let second = record(&mut engine, 0.5, Category::C);
        assert_eq!(first, FatigueResult::calm());
        assert_eq!(second, FatigueResult::calm());
        assert_eq!(engine.phase(), EnginePhase::Warming);

        let third = record(&mut engine, 1.0, Category::C);
        assert!(third.fatigue_index > 0.0);
        assert_eq!(engine.phase(), EnginePhase::Active);
    }

    #[test]
    fn out_of_order_leaves_state_untouched() {
        let mut engine = engine();
        for i in 0..4 {
            record(&mut engine, f64::from(i) * 0.5, Category::C);
        }
        let before = engine.query(1.5, None).unwrap();
        let len = engine.len();

        let err = engine.record(ActionEvent::single(1.0, Category::D)).unwrap_err();
        assert_eq!(err, EngineError::OutOfOrder { now: 1.0, last: 1.5 });
        assert_eq!(engine.len(), len);
        assert_eq!(engine.last_event_at(), Some(1.5));
        assert_eq!(engine.query(1.5, None).unwrap(), before);
    }

    #[test]
    fn query_before_last_event_is_rejected() {
        let mut engine = engine();
        record(&mut engine, 5.0, Category::C);
        assert!(matches!(
            engine.query(4.0, None),
            Err(EngineError::OutOfOrder { .. })
        ));
    }

    #[test]
    fn non_finite_timestamps_are_rejected() {
        let mut engine = engine();
        assert!(matches!(
            engine.record(ActionEvent::single(f64::NAN, Category::C)),
            Err(EngineError::NonFiniteTimestamp { .. })
        ));
        assert!(matches!(
            engine.query(f64::INFINITY, None),
            Err(EngineError::NonFiniteTimestamp { .. })
        ));
        assert!(engine.is_empty());
        assert_eq!(engine.last_event_at(), None);
    }

    #[test]
    fn equal_timestamps_are_accepted() {
        let mut engine = engine();
        record(&mut engine, 1.0, Category::C);
        record(&mut engine, 1.0, Category::E);
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn window_prunes_old_events() {
        let mut engine = engine();
        record(&mut engine, 0.0, Category::C);
        record(&mut engine, 1.0, Category::D);
        record(&mut engine, 20.0, Category::E);
        assert_eq!(engine.len(), 1);
        assert_eq!(engine.events().next().map(|e| e.category), Some(Category::E));
    }

    #[test]
    fn event_exactly_at_cutoff_is_kept() {
        let mut engine = engine();
        record(&mut engine, 0.0, Category::C);
        engine.query(15.0, None).unwrap();
        assert_eq!(engine.len(), 1);
        engine.query(15.01, None).unwrap();
        assert!(engine.is_empty());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let config = FatigueConfig {
            max_history_size: 4,
            ..FatigueConfig::default()
        };
        let mut engine = FatigueEngine::new(config).unwrap();
        for (i, category) in [Category::C, Category::D, Category::E, Category::F, Category::G]
            .into_iter()
            .enumerate()
        {
            record(&mut engine, i as f64 * 0.1, category);
        }
        assert_eq!(engine.len(), 4);
        assert_eq!(engine.events().next().map(|e| e.category), Some(Category::D));
    }

    #[test]
    fn sustained_start_survives_pruning() {
        let config = FatigueConfig {
            window_duration: 2.0,
            ..FatigueConfig::default()
        };
        let mut engine = FatigueEngine::new(config).unwrap();
        for i in 0..40 {
            record(&mut engine, f64::from(i) * 0.5, Category::ALL[i as usize % 12]);
        }
        assert_eq!(engine.activity_start(), Some(0.0));

        let result = engine.query(19.5, None).unwrap();
        assert!((result.components.sustained_duration - 19.5).abs() < 1e-9);
        assert!(result.components.sustained_fatigue > 0.9);
    }

    #[test]
    fn pause_restarts_sustained_timer() {
        let mut engine = engine();
        for i in 0..5 {
            record(&mut engine, f64::from(i) * 0.5, Category::C);
        }
        assert_eq!(engine.activity_start(), Some(0.0));

        record(&mut engine, 3.0, Category::D);
        assert_eq!(engine.activity_start(), Some(3.0));
    }

    #[test]
    fn idle_query_keeps_counting_the_sustained_run() {
        let mut engine = engine();
        for i in 0..30 {
            record(&mut engine, f64::from(i) * 0.5, Category::C);
        }
        assert_eq!(engine.last_event_at(), Some(14.5));

        let idle = engine.query(16.0, None).unwrap();
        assert!((idle.components.sustained_duration - 16.0).abs() < 1e-9);
        assert!((idle.components.sustained_fatigue - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(engine.activity_start(), Some(0.0));

        // The next record after the pause starts a fresh run.
        let resumed = record(&mut engine, 16.0, Category::D);
        assert_eq!(engine.activity_start(), Some(16.0));
        assert_eq!(resumed.components.sustained_duration, 0.0);
    }

    #[test]
    fn long_pause_banks_silence() {
        let mut engine = engine();
        record(&mut engine, 0.0, Category::C);
        record(&mut engine, 3.0, Category::D);
        // 3.0 gap banked, minus two decays of 15 * 0.01 (the first is floored).
        assert!((engine.accumulated_silence() - 2.85).abs() < 1e-9);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut engine = engine();
        for i in 0..6 {
            record(&mut engine, f64::from(i) * 0.2, Category::C);
        }
        engine.reset();
        let once = engine.clone();
        engine.reset();

        assert!(engine.is_empty());
        assert_eq!(engine.phase(), EnginePhase::Empty);
        assert_eq!(engine.activity_start(), once.activity_start());
        assert_eq!(engine.last_event_at(), None);
        assert_eq!(engine.accumulated_silence(), 0.0);

        // Any timestamp is acceptable again.
        assert!(engine.record(ActionEvent::single(0.0, Category::C)).is_ok());
    }

    #[test]
    fn repeated_queries_are_identical() {
        let mut engine = engine();
        for (i, category) in [Category::C, Category::E, Category::G, Category::C, Category::A]
            .into_iter()
            .enumerate()
        {
            record(&mut engine, i as f64 * 0.4, category);
        }
        let first = engine.query(2.0, Some(Category::C)).unwrap();
        let second = engine.query(2.0, Some(Category::C)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.fatigue_index.to_bits(), second.fatigue_index.to_bits());
    }

    #[test]
    fn monotone_run_reaches_moderate() {
        let mut engine = engine();
        let mut last = Severity::None;
        for i in 0..12 {
            let result = record(&mut engine, f64::from(i) * 0.5, Category::C);
            assert!(result.severity >= last, "severity dropped at event {i}");
            last = result.severity;
        }
        assert!(last >= Severity::Moderate, "ended at {last}");
    }

    #[test]
    fn category_fatigue_tracks_recorded_category() {
        let mut engine = engine();
        let mut result = FatigueResult::calm();
        for i in 0..6 {
            result = record(&mut engine, f64::from(i) * 0.5, Category::C);
        }
        assert!(result.category_fatigue > 0.5);

        let other = engine.query(2.5, Some(Category::G)).unwrap();
        assert_eq!(other.category_fatigue, 0.0);
        let none = engine.query(2.5, None).unwrap();
        assert_eq!(none.category_fatigue, 0.0);
    }

    #[test]
    fn heat_map_covers_every_category() {
        let mut engine = engine();
        for (i, category) in [Category::C, Category::C, Category::E, Category::C]
            .into_iter()
            .enumerate()
        {
            record(&mut engine, i as f64 * 0.5, category);
        }
        let map = engine.category_fatigue_map(2.0).unwrap();
        assert_eq!(map.len(), 12);
        assert!(map[&Category::C] > map[&Category::E]);
        assert_eq!(map[&Category::B], 0.0);
    }

    #[test]
    fn monotone_run_suggests_unused_white_categories() {
        let mut engine = engine();
        let mut result = FatigueResult::calm();
        for i in 0..10 {
            result = record(&mut engine, f64::from(i) * 0.5, Category::C);
        }
        assert!(result.recovery_suggestions.contains(&RecoveryHint::TryCategories(vec![
            Category::D,
            Category::E,
            Category::F,
        ])));
        assert!(result.recovery_suggestions.contains(&RecoveryHint::BreakPattern));
    }

    #[test]
    fn hints_follow_priority_order() {
        let components = FatigueComponents {
            sustained_fatigue: 0.9,
            rate_fatigue: 0.9,
            recurrence_rate: 0.9,
            group_fatigue: 0.9,
            ..FatigueComponents::default()
        };
        let hints = recovery_hints(&components, &[], 0.0, &FatigueConfig::default());
        assert_eq!(
            hints,
            vec![
                RecoveryHint::TakeBreak,
                RecoveryHint::SlowDown,
                RecoveryHint::AvoidRepeats,
                RecoveryHint::VaryGroups,
            ]
        );
    }

    #[test]
    fn choice_hint_falls_back_when_all_white_keys_are_busy() {
        let events: Vec<ActionEvent> = Category::ALL
            .into_iter()
            .filter(|c| c.is_white())
            .map(|c| ActionEvent::single(0.0, c))
            .collect();
        let components = FatigueComponents {
            choice_fatigue: 0.9,
            ..FatigueComponents::default()
        };
        let hints = recovery_hints(&components, &events, 0.0, &FatigueConfig::default());
        assert_eq!(hints, vec![RecoveryHint::VaryCategories]);
    }

    #[test]
    fn fuse_clamps_overweighted_sum() {
        let components = FatigueComponents {
            choice_fatigue: 1.0,
            transition_fatigue: 1.0,
            ..FatigueComponents::default()
        };
        let weights = DimensionWeights {
            choice: 0.8,
            transition: 0.8,
            ..DimensionWeights::default()
        };
        assert_eq!(fuse(&components, &weights), 1.0);
    }

    #[test]
    fn recovery_parameters_do_not_change_readings() {
        let tuned = FatigueConfig {
            silence_recovery_per_second: 5.0,
            diversity_recovery_bonus: 5.0,
            group_recovery_bonus: 5.0,
            ..FatigueConfig::default()
        };
        let mut plain = engine();
        let mut tuned = FatigueEngine::new(tuned).unwrap();
        for i in 0..12 {
            let event = ActionEvent::single(f64::from(i) * 0.7, Category::ALL[i as usize % 4]);
            assert_eq!(plain.record(event).unwrap(), tuned.record(event).unwrap());
        }
        assert_eq!(
            plain.query(12.0, Some(Category::C)).unwrap(),
            tuned.query(12.0, Some(Category::C)).unwrap()
        );
    }

    #[test]
    fn engine_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<FatigueEngine>();
    }
}
