//! End-to-end behaviour of the engine on realistic play sessions.

use af_core::{
    ActionEvent, Category, DimensionWeights, FatigueConfig, FatigueEngine, FatigueResult,
    GroupType, PenaltyMode, Preset, Severity, SeverityThresholds,
};
use proptest::prelude::*;

const WHITE: [Category; 7] = [
    Category::C,
    Category::D,
    Category::E,
    Category::F,
    Category::G,
    Category::A,
    Category::B,
];

fn engine() -> FatigueEngine {
    FatigueEngine::new(FatigueConfig::default()).unwrap()
}

/// Records every `(timestamp, category)` pair and returns the last result.
fn play(engine: &mut FatigueEngine, events: impl IntoIterator<Item = (f64, Category)>) -> FatigueResult {
    let mut last = FatigueResult::calm();
    for (ts, category) in events {
        last = engine.record(ActionEvent::single(ts, category)).unwrap();
    }
    last
}

fn round_robin(count: usize, spacing: f64) -> Vec<(f64, Category)> {
    (0..count)
        .map(|i| (i as f64 * spacing, WHITE[i % WHITE.len()]))
        .collect()
}

#[test]
fn repeating_one_category_escalates_severity() {
    let mut engine = engine();
    let mut severities = Vec::new();
    for i in 0..12 {
        let result = engine
            .record(ActionEvent::single(f64::from(i) * 0.5, Category::C))
            .unwrap();
        severities.push(result.severity);
    }

    assert_eq!(severities[0], Severity::None);
    assert_eq!(severities[1], Severity::None);
    assert!(severities.windows(2).all(|w| w[0] <= w[1]), "{severities:?}");
    assert!(severities[11] >= Severity::Moderate);
}

#[test]
fn barrage_is_caught_by_pace_dimensions() {
    let mut engine = engine();
    let result = play(&mut engine, round_robin(40, 0.15));

    let c = &result.components;
    assert!(c.rate_fatigue > 0.3, "rate {}", c.rate_fatigue);
    assert!(c.silence_deficit_fatigue > 0.3, "silence {}", c.silence_deficit_fatigue);
    assert!(c.choice_fatigue < 0.1, "choice {}", c.choice_fatigue);
}

#[test]
fn diverse_play_beats_monotone_play() {
    let mut monotone = engine();
    let mono = play(&mut monotone, (0..12).map(|i| (f64::from(i) * 0.5, Category::C)));

    let mut diverse = engine();
    let div = play(&mut diverse, round_robin(12, 0.5));

    assert!(div.components.choice_fatigue < mono.components.choice_fatigue);
    assert!(div.fatigue_index < mono.fatigue_index);
}

#[test]
fn uniform_rush_scores_higher_than_phrased_bursts() {
    let mut uniform = engine();
    let rushed = play(&mut uniform, round_robin(24, 0.2));

    // Six bursts of four, each followed by a two second rest.
    let bursts: Vec<(f64, Category)> = (0..24)
        .map(|i| {
            let (burst, step) = (i / 4, i % 4);
            (
                burst as f64 * 2.6 + step as f64 * 0.2,
                WHITE[i % WHITE.len()],
            )
        })
        .collect();
    let mut phrased = engine();
    let breathing = play(&mut phrased, bursts);

    assert!(
        rushed.fatigue_index > breathing.fatigue_index,
        "uniform {} vs bursty {}",
        rushed.fatigue_index,
        breathing.fatigue_index
    );
    assert!(breathing.components.silence_ratio > rushed.components.silence_ratio);
}

#[test]
fn idle_time_lets_fatigue_recover() {
    let mut engine = engine();
    let progression = [Category::C, Category::D, Category::E];
    let last = play(
        &mut engine,
        (0..15).map(|i| (f64::from(i) * 0.3, progression[i as usize % 3])),
    );

    // Pace fatigue fades within a few seconds of rest.
    let mut previous = last.fatigue_index;
    for idle in [1.0, 2.0, 3.0] {
        let result = engine.query(4.2 + idle, None).unwrap();
        assert!(
            result.fatigue_index <= previous,
            "index rose after {idle}s idle"
        );
        if idle >= 2.0 {
            assert_eq!(result.components.rate_fatigue, 0.0);
        }
        previous = result.fatigue_index;
    }
    assert!(previous < last.fatigue_index);

    // The sustained run keeps counting until the next record, but a long
    // rest still leaves the player better off than when they stopped.
    let rested = engine.query(16.2, None).unwrap();
    assert!((rested.components.sustained_duration - 16.2).abs() < 1e-9);
    assert!(rested.fatigue_index < last.fatigue_index);

    let resumed = engine.record(ActionEvent::single(16.2, Category::G)).unwrap();
    assert_eq!(resumed.components.sustained_fatigue, 0.0);
}

#[test]
fn lockout_mode_locks_only_at_threshold() {
    let config = FatigueConfig {
        penalty_mode: PenaltyMode::Lockout,
        lockout_threshold: 0.6,
        ..FatigueConfig::default()
    };
    let mut engine = FatigueEngine::new(config).unwrap();
    let result = play(&mut engine, (0..10).map(|i| (f64::from(i) * 0.4, Category::C)));

    assert!(result.fatigue_index >= 0.6);
    assert!(result.penalty.locked);
    assert!(result.penalty.multiplier.abs() < f64::EPSILON);
}

#[test]
fn stricter_presets_judge_the_same_session_more_harshly() {
    let session = round_robin(30, 0.25);
    let severity_under = |preset: Preset| {
        let mut engine = FatigueEngine::new(preset.config()).unwrap();
        play(&mut engine, session.clone()).severity
    };

    assert!(severity_under(Preset::Lenient) <= severity_under(Preset::Default));
    assert!(severity_under(Preset::Default) <= severity_under(Preset::Strict));
}

#[test]
fn grouped_actions_of_one_kind_raise_group_fatigue() {
    let mut engine = engine();
    let mut result = FatigueResult::calm();
    for (i, root) in [Category::C, Category::F, Category::G, Category::C, Category::F]
        .into_iter()
        .enumerate()
    {
        result = engine
            .record(ActionEvent::grouped(i as f64 * 0.6, root, GroupType::MajorTriad))
            .unwrap();
    }
    assert!(result.components.group_fatigue > 0.99);
}

#[test]
fn two_retained_events_score_zero_under_any_config() {
    let config = FatigueConfig {
        weights: DimensionWeights {
            choice: 1.0,
            transition: 1.0,
            rhythm: 1.0,
            recurrence: 1.0,
            group: 1.0,
            rate: 1.0,
            silence: 1.0,
            sustained: 1.0,
        },
        thresholds: SeverityThresholds {
            mild: 0.01,
            moderate: 0.02,
            severe: 0.03,
            critical: 0.04,
        },
        penalty_mode: PenaltyMode::Lockout,
        lockout_threshold: 0.0,
        window_duration: 2.0,
        ..FatigueConfig::default()
    };

    let mut engine = FatigueEngine::new(config.clone()).unwrap();
    let second = play(&mut engine, [(0.0, Category::C), (1.0, Category::C)]);
    assert_eq!(second, FatigueResult::calm());

    // A third event arrives, but the window has already dropped the first.
    let third = engine.record(ActionEvent::single(2.5, Category::C)).unwrap();
    assert_eq!(engine.len(), 2);
    assert_eq!(third, FatigueResult::calm());
    assert_eq!(engine.query(2.5, Some(Category::C)).unwrap(), FatigueResult::calm());

    // A two-slot history never reaches three events.
    let mut capped = FatigueEngine::new(FatigueConfig {
        max_history_size: 2,
        ..config
    })
    .unwrap();
    for i in 0..10 {
        let result = capped
            .record(ActionEvent::single(f64::from(i) * 0.1, Category::C))
            .unwrap();
        assert_eq!(result, FatigueResult::calm());
    }
}

fn arbitrary_session() -> impl Strategy<Value = Vec<ActionEvent>> {
    prop::collection::vec((0.0..4.0_f64, 0..Category::COUNT, 0..GroupType::ALL.len()), 0..80)
        .prop_map(|steps| {
            let mut ts = 0.0;
            steps
                .into_iter()
                .map(|(gap, category, group)| {
                    ts += gap;
                    ActionEvent::grouped(ts, Category::ALL[category], GroupType::ALL[group])
                })
                .collect()
        })
}

/// Valid configurations well away from the bundled presets.
fn arbitrary_config() -> impl Strategy<Value = FatigueConfig> {
    let weights = prop::array::uniform8(0.0..0.6_f64);
    let ladder = (0.01..0.4_f64, prop::array::uniform3(0.01..0.2_f64));
    let penalty = (
        prop::sample::select(PenaltyMode::ALL.to_vec()),
        0.01..=2.0_f64,
        0.0..=1.0_f64,
    );
    let shape = (2.0..30.0_f64, 0.5..10.0_f64, 1..100_usize, 0.5..5.0_f64);
    (weights, ladder, penalty, shape).prop_map(
        |(w, (mild, steps), (penalty_mode, debuff_scale, lockout_threshold), shape)| {
            let (window_duration, decay_half_life, max_history_size, sustained_reset) = shape;
            FatigueConfig {
                weights: DimensionWeights {
                    choice: w[0],
                    transition: w[1],
                    rhythm: w[2],
                    recurrence: w[3],
                    group: w[4],
                    rate: w[5],
                    silence: w[6],
                    sustained: w[7],
                },
                thresholds: SeverityThresholds {
                    mild,
                    moderate: mild + steps[0],
                    severe: mild + steps[0] + steps[1],
                    critical: mild + steps[0] + steps[1] + steps[2],
                },
                penalty_mode,
                debuff_scale,
                lockout_threshold,
                window_duration,
                decay_half_life,
                max_history_size,
                sustained_reset,
                ..FatigueConfig::default()
            }
        },
    )
}

fn any_config() -> impl Strategy<Value = FatigueConfig> {
    prop_oneof![
        prop::sample::select(Preset::ALL.to_vec()).prop_map(Preset::config),
        arbitrary_config(),
    ]
}

fn in_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

proptest! {
    #[test]
    fn every_output_stays_in_bounds(
        session in arbitrary_session(),
        config in any_config(),
        idle in 0.0..30.0_f64,
    ) {
        prop_assert_eq!(config.validate(), Ok(()));
        let mut engine = FatigueEngine::new(config).unwrap();
        let mut results = Vec::new();
        for event in &session {
            results.push(engine.record(*event).unwrap());
        }
        let end = session.last().map_or(0.0, |e| e.timestamp) + idle;
        results.push(engine.query(end, Some(Category::C)).unwrap());

        for result in &results {
            prop_assert!(in_unit_interval(result.fatigue_index));
            for dimension in result.components.dimensions() {
                prop_assert!(in_unit_interval(dimension), "{:?}", result.components);
            }
            prop_assert!(in_unit_interval(result.category_fatigue));
            prop_assert!(in_unit_interval(result.penalty.multiplier));
            prop_assert!(result.components.event_rate.is_finite());
            prop_assert!(result.components.sustained_duration.is_finite());
        }

        for value in engine.category_fatigue_map(end).unwrap().values() {
            prop_assert!(in_unit_interval(*value));
        }
    }

    #[test]
    fn queries_do_not_change_the_answer(session in arbitrary_session(), idle in 0.0..5.0_f64) {
        let mut engine = engine();
        for event in &session {
            engine.record(*event).unwrap();
        }
        let at = session.last().map_or(0.0, |e| e.timestamp) + idle;
        let first = engine.query(at, None).unwrap();
        let second = engine.query(at, None).unwrap();
        prop_assert_eq!(first.fatigue_index.to_bits(), second.fatigue_index.to_bits());
        prop_assert_eq!(first, second);
    }
}
