#![allow(dead_code)]

use ddsketch::{DDSketch, IndexMapping, Store};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Pareto};

/// The value a sketch is expected to approximate for quantile `q` over the given sorted
/// data: the entry whose cumulative count first exceeds `q * n`.
pub fn rank_quantile(sorted: &[f64], q: f64) -> f64 {
    assert!(!sorted.is_empty());
    let position = (q * sorted.len() as f64).floor() as usize;
    sorted[position.min(sorted.len() - 1)]
}

/// Asserts that the sketch answers every quantile of a grid within its relative
/// accuracy of the true value of the data it was built from.
pub fn assert_sketch_accurate<M: IndexMapping, S: Store>(sketch: &DDSketch<M, S>, data: &[f64]) {
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap());

    let rel_acc = sketch.relative_accuracy();
    for i in 0..=100 {
        let q = i as f64 / 100.0;
        let actual = sketch.quantile(q).unwrap();
        let expected = rank_quantile(&sorted, q);

        let max_error = rel_acc * expected.abs();
        assert!(
            (actual - expected).abs() <= max_error + 1e-9,
            "quantile {}: expected {} within {}, got {}",
            q,
            expected,
            max_error,
            actual
        );
    }
}

/// Generates seeded samples from a normal distribution centred well away from zero.
pub fn normal_samples(size: usize, seed: u64) -> Vec<f64> {
    let distribution = Normal::new(1000.0, 100.0).expect("normal distribution should be valid");
    let mut rng = SmallRng::seed_from_u64(seed);
    distribution.sample_iter(&mut rng).take(size).collect()
}

/// Generates seeded samples that roughly correspond to the latency of a typical web
/// service, in microseconds: a big hump at the beginning with a long tail.
pub fn latency_samples(size: usize, seed: u64) -> Vec<f64> {
    let distribution = Pareto::new(1.0, 1.0).expect("pareto distribution should be valid");
    let mut rng = SmallRng::seed_from_u64(seed);
    distribution
        .sample_iter(&mut rng)
        .map(|n: f64| n * 10_000.0)
        .filter(|n| *n > 15_000.0 && *n < 10_000_000.0)
        .take(size)
        .collect()
}
