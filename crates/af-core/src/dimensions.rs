//! The eight fatigue dimensions.
//!
//! Each calculator looks at the retained history (ascending by timestamp),
//! the evaluation time and the configuration, and returns a [`Reading`]: the
//! raw measurement plus the fatigue contribution derived from it, always in
//! \[0.0, 1.0\].

use crate::category::Category;
use crate::config::FatigueConfig;
use crate::event::ActionEvent;
use crate::math::{
    clamp01, decay_weight, decay_weighted_entropy, linear_ramp, ngram_recurrence_rate, quantize,
    transition_entropy,
};
use crate::result::FatigueComponents;

/// A raw measurement and the fatigue it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub raw: f64,
    pub fatigue: f64,
}

impl Reading {
    /// A reading for entropy-style measures, where fatigue is `1 - entropy`.
    fn from_entropy(entropy: f64) -> Self {
        Self {
            raw: entropy,
            fatigue: clamp01(1.0 - entropy),
        }
    }
}

/// Diversity of category choices, weighted toward recent events.
pub fn choice_diversity(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> Reading {
    let entropy = decay_weighted_entropy(
        events.iter().map(|e| (e.timestamp, e.category)),
        |dt| decay_weight(dt, config.decay_half_life),
        now,
    );
    Reading::from_entropy(entropy)
}

/// Predictability of the next category given the current one.
pub fn transition(events: &[ActionEvent]) -> Reading {
    let sequence: Vec<Category> = events.iter().map(|e| e.category).collect();
    Reading::from_entropy(transition_entropy(&sequence, Category::COUNT))
}

/// Regularity of the gaps between consecutive events.
///
/// Each interval is stamped with the later event's time so it decays along
/// with that event. Needs at least three events.
pub fn rhythm(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> Reading {
    if events.len() < 3 {
        return Reading {
            raw: 1.0,
            fatigue: 0.0,
        };
    }

    let intervals = events.windows(2).map(|pair| {
        let dt = pair[1].timestamp - pair[0].timestamp;
        let bin = quantize(dt, config.rhythm_quantize_bins, config.rhythm_max_interval);
        (pair[1].timestamp, bin)
    });
    let entropy = decay_weighted_entropy(
        intervals,
        |dt| decay_weight(dt, config.decay_half_life),
        now,
    );
    Reading::from_entropy(entropy)
}

/// Weight of one n-gram size in the recurrence mean.
const fn ngram_weight(n: usize) -> f64 {
    match n {
        3 => 0.4,
        _ => 0.3,
    }
}

/// Weighted mean of n-gram recurrence rates over the configured sizes.
///
/// Sizes longer than the sequence are skipped.
pub fn recurrence(events: &[ActionEvent], config: &FatigueConfig) -> Reading {
    if events.len() < 2 {
        return Reading {
            raw: 0.0,
            fatigue: 0.0,
        };
    }

    let sequence: Vec<Category> = events.iter().map(|e| e.category).collect();
    let (weighted_sum, total_weight) = config
        .ngram_sizes
        .iter()
        .filter(|&&n| sequence.len() >= n)
        .fold((0.0, 0.0), |(sum, weight), &n| {
            let w = ngram_weight(n);
            (ngram_recurrence_rate(&sequence, n).mul_add(w, sum), weight + w)
        });

    let rate = if total_weight > 0.0 {
        clamp01(weighted_sum / total_weight)
    } else {
        0.0
    };
    Reading {
        raw: rate,
        fatigue: rate,
    }
}

/// Diversity of group types, with ungrouped actions as their own kind.
pub fn group_diversity(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> Reading {
    let entropy = decay_weighted_entropy(
        events.iter().map(|e| (e.timestamp, e.group_type)),
        |dt| decay_weight(dt, config.decay_half_life),
        now,
    );
    Reading::from_entropy(entropy)
}

/// Events per second over the trailing rate window.
///
/// Measured from the oldest event inside the window up to `now`.
pub fn event_rate(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> f64 {
    let cutoff = now - config.rate_window;
    let start = events.partition_point(|e| e.timestamp < cutoff);
    let recent = &events[start..];
    if recent.len() < 2 {
        return 0.0;
    }

    let span = now - recent[0].timestamp;
    if span <= 0.0 {
        return 0.0;
    }
    recent.len() as f64 / span
}

/// Fatigue from acting faster than the comfortable pace.
pub fn rate(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> Reading {
    let rate = event_rate(events, now, config);
    Reading {
        raw: rate,
        fatigue: linear_ramp(rate, config.rate_optimal, config.rate_max),
    }
}

/// Fraction of the analysed span spent in gaps of at least the silence
/// threshold, including the trailing gap up to `now`.
pub fn silence_ratio(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> f64 {
    let (Some(first), Some(last)) = (events.first(), events.last()) else {
        return 1.0;
    };
    if events.len() < 2 {
        return 1.0;
    }

    let window_start = first.timestamp.max(now - config.window_duration);
    let span = now - window_start;
    if span <= 0.0 {
        return 1.0;
    }

    let inner: f64 = events
        .windows(2)
        .map(|pair| pair[1].timestamp - pair[0].timestamp)
        .filter(|gap| *gap >= config.silence_threshold)
        .sum();
    let trailing = now - last.timestamp;
    let silence = if trailing >= config.silence_threshold {
        inner + trailing
    } else {
        inner
    };

    (silence / span).min(1.0)
}

/// Fatigue from not leaving enough silence.
pub fn silence_deficit(events: &[ActionEvent], now: f64, config: &FatigueConfig) -> Reading {
    let ratio = silence_ratio(events, now, config);
    let ideal = config.silence_ideal_ratio;
    let fatigue = if ratio >= ideal {
        0.0
    } else {
        clamp01((ideal - ratio) / ideal)
    };
    Reading {
        raw: ratio,
        fatigue,
    }
}

/// Fatigue from acting without a real pause.
///
/// `activity_start` is tracked by the engine across window pruning.
pub fn sustained(activity_start: Option<f64>, now: f64, config: &FatigueConfig) -> Reading {
    let duration = activity_start.map_or(0.0, |start| (now - start).max(0.0));
    Reading {
        raw: duration,
        fatigue: linear_ramp(duration, config.sustained_onset, config.sustained_max),
    }
}

/// Runs all eight calculators.
pub fn measure(
    events: &[ActionEvent],
    activity_start: Option<f64>,
    now: f64,
    config: &FatigueConfig,
) -> FatigueComponents {
    let choice = choice_diversity(events, now, config);
    let transition = transition(events);
    let rhythm = rhythm(events, now, config);
    let recurrence = recurrence(events, config);
    let group = group_diversity(events, now, config);
    let rate = rate(events, now, config);
    let silence = silence_deficit(events, now, config);
    let sustained = sustained(activity_start, now, config);

    FatigueComponents {
        choice_entropy: choice.raw,
        choice_fatigue: choice.fatigue,
        transition_entropy: transition.raw,
        transition_fatigue: transition.fatigue,
        rhythm_entropy: rhythm.raw,
        rhythm_fatigue: rhythm.fatigue,
        recurrence_rate: recurrence.fatigue,
        group_diversity: group.raw,
        group_fatigue: group.fatigue,
        event_rate: rate.raw,
        rate_fatigue: rate.fatigue,
        silence_ratio: silence.raw,
        silence_deficit_fatigue: silence.fatigue,
        sustained_duration: sustained.raw,
        sustained_fatigue: sustained.fatigue,
    }
}

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "exact equality intended for degenerate cases"
)]
mod tests {
    use super::*;
    use crate::event::GroupType;

    const EPS: f64 = 1e-9;

    fn evenly_spaced(categories: &[Category], spacing: f64) -> Vec<ActionEvent> {
        categories
            .iter()
            .enumerate()
            .map(|(i, &c)| ActionEvent::single(i as f64 * spacing, c))
            .collect()
    }

    #[test]
    fn single_category_has_full_choice_fatigue() {
        let events = evenly_spaced(&[Category::C; 6], 0.5);
        let reading = choice_diversity(&events, 2.5, &FatigueConfig::default());
        assert_eq!(reading.raw, 0.0);
        assert_eq!(reading.fatigue, 1.0);
    }

    #[test]
    fn distinct_categories_have_low_choice_fatigue() {
        let events = evenly_spaced(
            &[Category::C, Category::D, Category::E, Category::F],
            0.5,
        );
        let reading = choice_diversity(&events, 1.5, &FatigueConfig::default());
        assert!(reading.fatigue < 0.05, "got {}", reading.fatigue);
    }

    #[test]
    fn rhythm_needs_three_events() {
        let events = evenly_spaced(&[Category::C, Category::D], 0.5);
        let reading = rhythm(&events, 0.5, &FatigueConfig::default());
        assert_eq!(reading.fatigue, 0.0);
    }

    #[test]
    fn metronomic_rhythm_is_fully_fatiguing() {
        let events = evenly_spaced(&[Category::C, Category::D, Category::E, Category::F], 0.5);
        let reading = rhythm(&events, 1.5, &FatigueConfig::default());
        assert_eq!(reading.fatigue, 1.0);
    }

    #[test]
    fn varied_rhythm_lowers_fatigue() {
        let events = vec![
            ActionEvent::single(0.0, Category::C),
            ActionEvent::single(0.2, Category::D),
            ActionEvent::single(1.0, Category::E),
            ActionEvent::single(1.3, Category::F),
            ActionEvent::single(2.8, Category::G),
        ];
        let reading = rhythm(&events, 2.8, &FatigueConfig::default());
        assert!(reading.fatigue < 0.2, "got {}", reading.fatigue);
    }

    #[test]
    fn recurrence_of_three_identical_events() {
        // bigrams: 2 total, 1 unique -> 0.5; trigram: single -> 0.0; size 4 skipped.
        let events = evenly_spaced(&[Category::C; 3], 0.5);
        let reading = recurrence(&events, &FatigueConfig::default());
        let expected = 0.5f64.mul_add(0.3, 0.0) / 0.7;
        assert!((reading.fatigue - expected).abs() < EPS);
    }

    #[test]
    fn recurrence_skips_sizes_longer_than_sequence() {
        let config = FatigueConfig {
            ngram_sizes: vec![5],
            ..FatigueConfig::default()
        };
        let events = evenly_spaced(&[Category::C; 3], 0.5);
        assert_eq!(recurrence(&events, &config).fatigue, 0.0);
    }

    #[test]
    fn ungrouped_stream_has_full_group_fatigue() {
        let events = evenly_spaced(&[Category::C, Category::D, Category::E], 0.5);
        let reading = group_diversity(&events, 1.0, &FatigueConfig::default());
        assert_eq!(reading.fatigue, 1.0);
    }

    #[test]
    fn mixed_groups_lower_group_fatigue() {
        let events = vec![
            ActionEvent::single(0.0, Category::C),
            ActionEvent::grouped(0.5, Category::E, GroupType::MajorTriad),
            ActionEvent::single(1.0, Category::G),
            ActionEvent::grouped(1.5, Category::A, GroupType::MinorTriad),
        ];
        let reading = group_diversity(&events, 1.5, &FatigueConfig::default());
        assert!(reading.fatigue < 0.1, "got {}", reading.fatigue);
    }

    #[test]
    fn rate_below_optimal_is_free() {
        // One event per second.
        let events = evenly_spaced(&[Category::C; 4], 1.0);
        let reading = rate(&events, 3.0, &FatigueConfig::default());
        assert!(reading.raw < 2.0);
        assert_eq!(reading.fatigue, 0.0);
    }

    #[test]
    fn rate_ramps_between_optimal_and_max() {
        // Window [0.0, 3.0] holds all seven events: 7 / 3.0 per second.
        let events = evenly_spaced(&[Category::C; 7], 0.5);
        let reading = rate(&events, 3.0, &FatigueConfig::default());
        assert!((reading.raw - 7.0 / 3.0).abs() < EPS);
        let expected = (7.0 / 3.0 - 2.0) / 4.0;
        assert!((reading.fatigue - expected).abs() < EPS);
    }

    #[test]
    fn rate_saturates_at_max() {
        let events = evenly_spaced(&[Category::C; 30], 0.1);
        let reading = rate(&events, 2.9, &FatigueConfig::default());
        assert_eq!(reading.fatigue, 1.0);
    }

    #[test]
    fn silence_ratio_counts_long_gaps_and_trailing_gap() {
        let events = vec![
            ActionEvent::single(0.0, Category::C),
            ActionEvent::single(0.5, Category::D),
            ActionEvent::single(2.5, Category::E),
        ];
        // Inner gap of 2.0 counts, trailing gap of 2.5 counts: 4.5 / 5.0.
        let ratio = silence_ratio(&events, 5.0, &FatigueConfig::default());
        assert!((ratio - 0.9).abs() < EPS);
    }

    #[test]
    fn no_silence_is_full_deficit() {
        let events = evenly_spaced(&[Category::C; 10], 0.2);
        let reading = silence_deficit(&events, 1.8, &FatigueConfig::default());
        assert_eq!(reading.raw, 0.0);
        assert_eq!(reading.fatigue, 1.0);
    }

    #[test]
    fn partial_silence_scales_deficit() {
        // One 1.5s gap over a 15s span: ratio 0.1, half the ideal 0.2.
        let mut events = evenly_spaced(&[Category::C; 10], 0.5);
        let resume = 4.5 + 1.5;
        events.extend(
            (0..19).map(|i| ActionEvent::single(f64::from(i).mul_add(0.5, resume), Category::D)),
        );
        let now = resume + 9.0;
        let reading = silence_deficit(&events, now, &FatigueConfig::default());
        assert!((reading.raw - 0.1).abs() < EPS, "ratio {}", reading.raw);
        assert!((reading.fatigue - 0.5).abs() < EPS);
    }

    #[test]
    fn sustained_ramps_after_onset() {
        let config = FatigueConfig::default();
        assert_eq!(sustained(None, 100.0, &config).fatigue, 0.0);
        assert_eq!(sustained(Some(0.0), 8.0, &config).fatigue, 0.0);
        assert!((sustained(Some(0.0), 14.0, &config).fatigue - 0.5).abs() < EPS);
        assert_eq!(sustained(Some(0.0), 25.0, &config).fatigue, 1.0);
    }

    #[test]
    fn measure_fills_every_component() {
        let events = evenly_spaced(&[Category::C; 5], 0.5);
        let components = measure(&events, Some(0.0), 2.0, &FatigueConfig::default());
        assert_eq!(components.choice_fatigue, 1.0);
        assert_eq!(components.transition_fatigue, 1.0);
        assert_eq!(components.rhythm_fatigue, 1.0);
        assert_eq!(components.group_fatigue, 1.0);
        assert!((components.sustained_duration - 2.0).abs() < EPS);
        assert!(components.dimensions().iter().all(|d| (0.0..=1.0).contains(d)));
    }
}
