mod common;

use common::normal_samples;
use ddsketch::{DDSketch, SketchError};

#[test]
fn merged_halves_match_single_sketch_bitwise() {
    let data = normal_samples(2_000, 0xDD5EED);
    let (first_half, second_half) = data.split_at(data.len() / 2);

    let mut first = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in first_half {
        first.add(value).unwrap();
    }

    let mut second = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in second_half {
        second.add(value).unwrap();
    }

    let mut combined = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in &data {
        combined.add(value).unwrap();
    }

    first.merge(&second).unwrap();

    assert_eq!(first.count(), combined.count());
    assert_eq!(first.min(), combined.min());
    assert_eq!(first.max(), combined.max());

    // With unit weights and no collapse, the merged sketch holds exactly the same bins,
    // so every quantile answer is bitwise equal.
    for i in 0..=100 {
        let q = i as f64 / 100.0;
        assert_eq!(
            first.quantile(q).unwrap(),
            combined.quantile(q).unwrap(),
            "quantile {} diverged after merge",
            q
        );
    }
}

#[test]
fn merge_is_commutative_without_collapse() {
    let data = normal_samples(1_000, 7);
    let (first_half, second_half) = data.split_at(data.len() / 2);

    let mut a = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in first_half {
        a.add(value).unwrap();
    }

    let mut b = DDSketch::with_relative_accuracy(0.01).unwrap();
    for &value in second_half {
        b.add(value).unwrap();
    }

    let mut a_then_b = a.clone();
    a_then_b.merge(&b).unwrap();

    let mut b_then_a = b.clone();
    b_then_a.merge(&a).unwrap();

    for i in 0..=100 {
        let q = i as f64 / 100.0;
        assert_eq!(
            a_then_b.quantile(q).unwrap(),
            b_then_a.quantile(q).unwrap(),
            "quantile {} depends on merge order",
            q
        );
    }
}

#[test]
fn merge_does_not_mutate_argument() {
    let mut receiver = DDSketch::with_relative_accuracy(0.01).unwrap();
    receiver.add(1.0).unwrap();

    let mut argument = DDSketch::with_relative_accuracy(0.01).unwrap();
    argument.add(2.0).unwrap();
    let snapshot = argument.clone();

    receiver.merge(&argument).unwrap();

    assert_eq!(argument, snapshot);
}

#[test]
fn incompatible_accuracies_do_not_merge() {
    let mut first = DDSketch::with_relative_accuracy(0.01).unwrap();
    first.add(1.0).unwrap();
    first.add(2.0).unwrap();

    let mut second = DDSketch::with_relative_accuracy(0.02).unwrap();
    second.add(3.0).unwrap();

    let first_snapshot = first.clone();
    let second_snapshot = second.clone();

    let result = first.merge(&second);
    assert!(matches!(result, Err(SketchError::IncompatibleMerge { .. })));

    // Both sketches are exactly as they were before the failed merge.
    assert_eq!(first, first_snapshot);
    assert_eq!(second, second_snapshot);
}

#[test]
fn weighted_merge_accumulates_mass() {
    let mut first = DDSketch::with_relative_accuracy(0.01).unwrap();
    first.add_weighted(10.0, 2.5).unwrap();

    let mut second = DDSketch::with_relative_accuracy(0.01).unwrap();
    second.add_weighted(10.0, 1.5).unwrap();
    second.add_weighted(1000.0, 0.5).unwrap();

    first.merge(&second).unwrap();

    assert_eq!(first.count(), 4.5);
    assert_eq!(first.sum(), Some(540.0));

    // Nearly all mass sits at 10.
    let median = first.quantile(0.5).unwrap();
    assert!((median - 10.0).abs() <= 0.01 * 10.0);
}
