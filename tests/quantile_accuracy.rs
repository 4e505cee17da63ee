mod common;

use common::{assert_sketch_accurate, normal_samples};
use ddsketch::{
    CubicallyInterpolatedMapping, DDSketch, DenseStore, LinearlyInterpolatedMapping, LogarithmicMapping,
    SparseStore,
};

#[test]
fn uniform_integers_hit_expected_quantiles() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    for i in 1..=1000 {
        sketch.add(i as f64).unwrap();
    }

    for (q, expected) in [(0.1, 99.5), (0.5, 499.5), (0.9, 899.5), (0.99, 989.5)] {
        let actual = sketch.quantile(q).unwrap();
        let relative_error = (actual - expected).abs() / expected;
        assert!(
            relative_error <= 0.01,
            "quantile {}: expected {} within 1%, got {} (error {})",
            q,
            expected,
            actual,
            relative_error
        );
    }
}

#[test]
fn uniform_integers_all_mappings() {
    let data: Vec<f64> = (1..=1000).map(f64::from).collect();

    let mut log_sketch: DDSketch<LogarithmicMapping, DenseStore> =
        DDSketch::with_mapping(LogarithmicMapping::new(0.02).unwrap());
    let mut linear_sketch: DDSketch<LinearlyInterpolatedMapping, DenseStore> =
        DDSketch::with_mapping(LinearlyInterpolatedMapping::new(0.02).unwrap());
    let mut cubic_sketch: DDSketch<CubicallyInterpolatedMapping, DenseStore> =
        DDSketch::with_mapping(CubicallyInterpolatedMapping::new(0.02).unwrap());

    for &value in &data {
        log_sketch.add(value).unwrap();
        linear_sketch.add(value).unwrap();
        cubic_sketch.add(value).unwrap();
    }

    assert_sketch_accurate(&log_sketch, &data);
    assert_sketch_accurate(&linear_sketch, &data);
    assert_sketch_accurate(&cubic_sketch, &data);
}

#[test]
fn seeded_normal_samples() {
    let data = normal_samples(10_000, 0xC0FFEE);

    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in &data {
        sketch.add(value).unwrap();
    }

    assert_sketch_accurate(&sketch, &data);
}

#[test]
fn seeded_normal_samples_sparse_store() {
    let data = normal_samples(5_000, 42);

    let mut sketch: DDSketch<LogarithmicMapping, SparseStore> =
        DDSketch::with_mapping(LogarithmicMapping::new(0.01).unwrap());
    for &value in &data {
        sketch.add(value).unwrap();
    }

    assert_sketch_accurate(&sketch, &data);
}

#[test]
fn constant_stream() {
    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    for _ in 0..10_000 {
        sketch.add(42.0).unwrap();
    }

    for q in [0.0, 0.01, 0.5, 0.99, 1.0] {
        let actual = sketch.quantile(q).unwrap();
        assert!(
            (actual - 42.0).abs() <= 0.01 * 42.0,
            "quantile {} of a constant stream: got {}",
            q,
            actual
        );
    }
}

#[test]
fn summary_statistics_are_exact() {
    let data: Vec<f64> = (1..=100).map(f64::from).collect();

    let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in &data {
        sketch.add(value).unwrap();
    }

    assert_eq!(sketch.count(), 100.0);
    assert_eq!(sketch.sum(), Some(5050.0));
    assert_eq!(sketch.avg(), Some(50.5));
    assert_eq!(sketch.min(), Some(1.0));
    assert_eq!(sketch.max(), Some(100.0));
}
