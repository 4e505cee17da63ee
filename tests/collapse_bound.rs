use ddsketch::{
    CollapsingHighestDenseStore, CollapsingLowestDenseStore, DDSketch, LogarithmicMapping, Store,
};

#[test]
fn powers_of_two_respect_bin_limit() {
    let mut sketch = DDSketch::with_relative_accuracy_and_bin_limit(0.01, 128).unwrap();
    for e in 1..=1000 {
        sketch.add(2.0f64.powi(e)).unwrap();
    }

    // The store never holds more than the limit plus the collapsed sentinel bin.
    let live_bins = sketch.positive_store().bins().count();
    assert!(live_bins <= 129, "{} live bins with a limit of 128", live_bins);
    assert!(sketch.positive_store().is_collapsed());

    // The observed extremes stay exact even though the low tail collapsed.
    assert_eq!(sketch.quantile(1.0).unwrap(), 2.0f64.powi(1000));
    assert_eq!(sketch.quantile(0.0).unwrap(), 2.0);

    // Quantiles outside the collapsed tail keep their accuracy guarantee. Keys of
    // consecutive powers of two sit ~35 apart at 1% accuracy, so the 128-bin window
    // holds only the last few powers; q = 0.9985 targets 2^999, which is live.
    let p9985 = sketch.quantile(0.9985).unwrap();
    let expected = 2.0f64.powi(999);
    assert!(
        (p9985 - expected).abs() <= 0.01 * expected,
        "expected about 2^999, got {}",
        p9985
    );
}

#[test]
fn collapsing_highest_mirror() {
    let mapping = LogarithmicMapping::new(0.01).unwrap();
    let mut sketch: DDSketch<LogarithmicMapping, CollapsingHighestDenseStore> = DDSketch::new(
        mapping,
        CollapsingHighestDenseStore::new(128),
        CollapsingHighestDenseStore::new(128),
    );

    for e in 1..=1000 {
        sketch.add(2.0f64.powi(e)).unwrap();
    }

    let live_bins = sketch.positive_store().bins().count();
    assert!(live_bins <= 129, "{} live bins with a limit of 128", live_bins);
    assert!(sketch.positive_store().is_collapsed());

    assert_eq!(sketch.quantile(0.0).unwrap(), 2.0);
    assert_eq!(sketch.quantile(1.0).unwrap(), 2.0f64.powi(1000));

    // The mirror store keeps the bottom of the distribution accurate instead; here the
    // live window holds only the first few powers of two.
    let low = sketch.quantile(0.0015).unwrap();
    let expected = 4.0;
    assert!(
        (low - expected).abs() <= 0.01 * expected,
        "expected about 2^2, got {}",
        low
    );
}

#[test]
fn collapse_bound_holds_under_merge() {
    let mut first = DDSketch::with_relative_accuracy_and_bin_limit(0.01, 64).unwrap();
    for i in 1..=10_000 {
        first.add(i as f64).unwrap();
    }

    let mut second = DDSketch::with_relative_accuracy_and_bin_limit(0.01, 64).unwrap();
    for i in 10_000..=1_000_000 {
        second.add(i as f64).unwrap();
    }

    first.merge(&second).unwrap();

    assert!(first.positive_store().bins().count() <= 65);
    assert_eq!(first.count(), 1_000_001.0);
    assert_eq!(first.quantile(1.0).unwrap(), 1_000_000.0);
    assert_eq!(first.quantile(0.0).unwrap(), 1.0);
}

#[test]
fn total_count_preserved_through_collapse() {
    let mut store = CollapsingLowestDenseStore::new(32);
    let mut expected = 0.0;
    for i in 0..5_000 {
        store.add(i, 1.5);
        expected += 1.5;
    }

    assert_eq!(store.total_count(), expected);
    let binned: f64 = store.bins().map(|(_, count)| count).sum();
    assert!((binned - expected).abs() < 1e-6 * expected);
}
