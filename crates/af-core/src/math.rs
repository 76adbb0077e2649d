//! Information-theoretic helpers shared by the dimension calculators.
//!
//! Every function here is pure and returns a finite value. Degenerate inputs
//! (too few samples, a single distinct symbol) are defined as zero rather
//! than treated as errors.
//!
//! Aggregation goes through ordered maps so that floating point sums are
//! accumulated in the same order on every call.

use std::collections::{BTreeMap, BTreeSet};

/// Clamps to \[0.0, 1.0\], mapping NaN to 0.0.
pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Rises linearly from 0 at `lower` to 1 at `upper`.
///
/// Values at or below `lower` yield 0; values past `upper` are clamped.
pub fn linear_ramp(value: f64, lower: f64, upper: f64) -> f64 {
    if value <= lower {
        return 0.0;
    }
    clamp01((value - lower) / (upper - lower))
}

/// Exponential recency weight `2^(-dt / half_life)`.
///
/// Returns 1.0 for `dt <= 0`.
pub fn decay_weight(dt: f64, half_life: f64) -> f64 {
    if dt <= 0.0 {
        return 1.0;
    }
    (-dt / half_life).exp2()
}

/// Maps a continuous value onto one of `num_bins` equal-width bins over
/// \[0, `max_value`\]. Out-of-range values land in the first or last bin.
pub fn quantize(value: f64, num_bins: usize, max_value: f64) -> usize {
    let last = num_bins.saturating_sub(1);
    let clamped = value.max(0.0).min(max_value);
    let normalized = clamped / max_value;
    ((normalized * num_bins as f64) as usize).min(last)
}

/// Shannon entropy of a distribution, normalized by `log2(distinct)`.
fn normalized_from_weights(weights: impl Iterator<Item = f64>, distinct: usize, total: f64) -> f64 {
    if distinct <= 1 || total <= 0.0 {
        return 0.0;
    }

    let entropy: f64 = weights
        .filter(|w| *w > 0.0)
        .map(|w| {
            let p = w / total;
            -p * p.log2()
        })
        .sum();

    clamp01(entropy / (distinct as f64).log2())
}

/// Normalized Shannon entropy of a categorical count distribution.
///
/// Returns 0.0 when fewer than two categories are present or `total <= 1`.
pub fn normalized_entropy<K: Ord>(counts: &BTreeMap<K, usize>, total: usize) -> f64 {
    if total <= 1 {
        return 0.0;
    }
    normalized_from_weights(
        counts.values().map(|&c| c as f64),
        counts.len(),
        total as f64,
    )
}

/// Normalized Shannon entropy where each occurrence contributes
/// `decay(now - timestamp)` instead of 1.
///
/// `samples` yields `(timestamp, symbol)` pairs. Returns 0.0 for at most one
/// sample or at most one distinct symbol.
pub fn decay_weighted_entropy<K, I, F>(samples: I, decay: F, now: f64) -> f64
where
    K: Ord,
    I: IntoIterator<Item = (f64, K)>,
    F: Fn(f64) -> f64,
{
    let mut weighted: BTreeMap<K, f64> = BTreeMap::new();
    let mut total_weight = 0.0;
    let mut samples_seen = 0_usize;

    for (timestamp, symbol) in samples {
        let w = decay(now - timestamp);
        *weighted.entry(symbol).or_insert(0.0) += w;
        total_weight += w;
        samples_seen += 1;
    }

    if samples_seen <= 1 {
        return 0.0;
    }
    normalized_from_weights(weighted.values().copied(), weighted.len(), total_weight)
}

/// Conditional entropy `H(next | current)` over consecutive pairs,
/// normalized by `log2(alphabet_size)`.
///
/// Returns 0.0 for sequences shorter than two.
pub fn transition_entropy<T: Ord>(sequence: &[T], alphabet_size: usize) -> f64 {
    if sequence.len() < 2 {
        return 0.0;
    }

    let mut pair_counts: BTreeMap<(&T, &T), usize> = BTreeMap::new();
    let mut from_counts: BTreeMap<&T, usize> = BTreeMap::new();
    for pair in sequence.windows(2) {
        *pair_counts.entry((&pair[0], &pair[1])).or_insert(0) += 1;
        *from_counts.entry(&pair[0]).or_insert(0) += 1;
    }

    let total = (sequence.len() - 1) as f64;
    let conditional: f64 = pair_counts
        .iter()
        .map(|((from, _), &count)| {
            let joint = count as f64 / total;
            let cond = count as f64 / from_counts[from] as f64;
            -joint * cond.log2()
        })
        .sum();

    let max_entropy = if alphabet_size > 1 {
        (alphabet_size as f64).log2()
    } else {
        1.0
    };
    clamp01(conditional / max_entropy)
}

/// Share of length-`n` windows that repeat an earlier window:
/// `1 - unique / total`.
///
/// Returns 0.0 when the sequence is shorter than `n` or yields a single
/// n-gram.
pub fn ngram_recurrence_rate<T: Ord>(sequence: &[T], n: usize) -> f64 {
    if n == 0 || sequence.len() < n {
        return 0.0;
    }

    let total = sequence.len() - n + 1;
    if total <= 1 {
        return 0.0;
    }
    let unique: BTreeSet<&[T]> = sequence.windows(n).collect();

    1.0 - unique.len() as f64 / total as f64
}

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "exact equality intended for degenerate cases"
)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn counts(values: &[(char, usize)]) -> BTreeMap<char, usize> {
        values.iter().copied().collect()
    }

    #[test]
    fn entropy_of_uniform_distribution_is_one() {
        let c = counts(&[('a', 3), ('b', 3), ('c', 3)]);
        assert!((normalized_entropy(&c, 9) - 1.0).abs() < EPS);
    }

    #[test]
    fn entropy_of_single_category_is_zero() {
        let c = counts(&[('a', 10)]);
        assert_eq!(normalized_entropy(&c, 10), 0.0);
    }

    #[test]
    fn entropy_with_single_sample_is_zero() {
        let c = counts(&[('a', 1)]);
        assert_eq!(normalized_entropy(&c, 1), 0.0);
    }

    #[test]
    fn skewed_distribution_is_between_bounds() {
        let c = counts(&[('a', 9), ('b', 1)]);
        let h = normalized_entropy(&c, 10);
        assert!(h > 0.0 && h < 1.0, "got {h}");
        // H(0.9, 0.1) ≈ 0.469
        assert!((h - 0.468_995_593_589_281_2).abs() < 1e-6);
    }

    #[test]
    fn decay_weighted_entropy_matches_plain_without_decay() {
        let samples = [(0.0, 'a'), (1.0, 'b'), (2.0, 'a'), (3.0, 'b')];
        let h = decay_weighted_entropy(samples, |_| 1.0, 3.0);
        assert!((h - 1.0).abs() < EPS);
    }

    #[test]
    fn decay_shifts_weight_toward_recent_symbols() {
        // Two old 'a's and two recent 'b's: with decay the distribution skews
        // toward 'b', so entropy drops below the undecayed value of 1.0.
        let samples = [(0.0, 'a'), (0.1, 'a'), (9.9, 'b'), (10.0, 'b')];
        let h = decay_weighted_entropy(samples, |dt| decay_weight(dt, 2.0), 10.0);
        assert!(h < 0.5, "got {h}");
    }

    #[test]
    fn decay_weighted_entropy_degenerate_cases() {
        assert_eq!(
            decay_weighted_entropy([(0.0, 'a')], |_| 1.0, 0.0),
            0.0
        );
        assert_eq!(
            decay_weighted_entropy([(0.0, 'a'), (1.0, 'a')], |_| 1.0, 1.0),
            0.0
        );
        let empty: [(f64, char); 0] = [];
        assert_eq!(decay_weighted_entropy(empty, |_| 1.0, 0.0), 0.0);
    }

    #[test]
    fn transition_entropy_of_constant_sequence_is_zero() {
        assert_eq!(transition_entropy(&[1, 1, 1, 1, 1], 12), 0.0);
    }

    #[test]
    fn transition_entropy_of_cycle_is_zero() {
        // Every symbol has exactly one successor.
        assert_eq!(transition_entropy(&[1, 2, 3, 1, 2, 3, 1], 12), 0.0);
    }

    #[test]
    fn transition_entropy_of_coin_flips() {
        // From 0 the next symbol is 0 or 1 with equal odds; same from 1.
        let seq = [0, 0, 1, 1, 0];
        let h = transition_entropy(&seq, 2);
        assert!((h - 1.0).abs() < EPS, "got {h}");
    }

    #[test]
    fn transition_entropy_short_sequence() {
        assert_eq!(transition_entropy(&[3], 12), 0.0);
        assert_eq!(transition_entropy::<u8>(&[], 12), 0.0);
    }

    #[test]
    fn recurrence_rate_counts_repeated_windows() {
        // bigrams: ab, ba, ab, ba -> 2 unique of 4
        let seq = ['a', 'b', 'a', 'b', 'a'];
        assert!((ngram_recurrence_rate(&seq, 2) - 0.5).abs() < EPS);
    }

    #[test]
    fn recurrence_rate_of_distinct_sequence_is_zero() {
        assert_eq!(ngram_recurrence_rate(&[1, 2, 3, 4, 5], 2), 0.0);
    }

    #[test]
    fn recurrence_rate_degenerate_cases() {
        assert_eq!(ngram_recurrence_rate(&[1, 2], 3), 0.0);
        assert_eq!(ngram_recurrence_rate(&[1, 1, 1], 3), 0.0);
        assert_eq!(ngram_recurrence_rate(&[1, 1, 1], 0), 0.0);
    }

    #[test]
    fn decay_weight_halves_each_half_life() {
        assert_eq!(decay_weight(0.0, 5.0), 1.0);
        assert!((decay_weight(5.0, 5.0) - 0.5).abs() < EPS);
        assert!((decay_weight(10.0, 5.0) - 0.25).abs() < EPS);
    }

    #[test]
    fn quantize_clamps_both_edges() {
        assert_eq!(quantize(-1.0, 8, 2.0), 0);
        assert_eq!(quantize(0.0, 8, 2.0), 0);
        assert_eq!(quantize(0.5, 8, 2.0), 2);
        assert_eq!(quantize(1.99, 8, 2.0), 7);
        assert_eq!(quantize(2.0, 8, 2.0), 7);
        assert_eq!(quantize(50.0, 8, 2.0), 7);
    }

    #[test]
    fn clamp01_handles_nan_and_bounds() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-0.5), 0.0);
        assert_eq!(clamp01(1.5), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn linear_ramp_interpolates() {
        assert_eq!(linear_ramp(1.0, 2.0, 6.0), 0.0);
        assert_eq!(linear_ramp(2.0, 2.0, 6.0), 0.0);
        assert!((linear_ramp(4.0, 2.0, 6.0) - 0.5).abs() < EPS);
        assert_eq!(linear_ramp(9.0, 2.0, 6.0), 1.0);
    }
}
