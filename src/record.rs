//! Logical serialisation view.
//!
//! A sketch projects to a plain, language-neutral record and can be rebuilt from one.
//! The record pins down everything two implementations need to agree on (the mapping
//! variant and gamma, the store layout, and the scalar accumulators) while leaving the
//! byte-level encoding to thin adapters; the `serde` feature derives
//! `Serialize`/`Deserialize` on every record type.
//!
//! Rebuilding validates its input: counts must be finite and non-negative, variant tags
//! must match the target types, and the scalar totals must agree with the stored counts.
//! A sketch that survives the round-trip answers every quantile identically.

use crate::mapping::Interpolation;
use crate::store::StoreVariant;

/// Serialisable form of an index mapping.
///
/// The interpolation tag and gamma fully determine bucketing; relative accuracy is
/// derived as `(gamma - 1) / (gamma + 1)` on reconstruction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct IndexMappingRecord {
    /// The mapping variant.
    pub interpolation: Interpolation,
    /// The ratio between consecutive bucket boundaries, to full double precision.
    pub gamma: f64,
    /// The index offset applied by the mapping.
    pub index_offset: f64,
}

/// Serialisable form of a store.
///
/// Counts are the dense projection of the live key range: `counts[i]` is the count at
/// key `offset + i`. A sparse store with widely scattered keys therefore serialises
/// proportionally to its key span.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct StoreRecord {
    /// The store variant.
    pub variant: StoreVariant,
    /// The bin limit, for collapsing variants.
    pub bin_limit: Option<usize>,
    /// The key of `counts[0]`.
    pub offset: i32,
    /// Per-key counts in ascending key order, trimmed to the live range.
    pub counts: Vec<f64>,
    /// Whether the low tail has been collapsed into its bottom bin.
    pub is_collapsed_lo: bool,
    /// Whether the high tail has been collapsed into its top bin.
    pub is_collapsed_hi: bool,
}

impl StoreRecord {
    /// Builds a record from live bins in ascending key order.
    pub(crate) fn from_bins(
        variant: StoreVariant, bin_limit: Option<usize>, bins: impl Iterator<Item = (i32, f64)>,
        is_collapsed_lo: bool, is_collapsed_hi: bool,
    ) -> Self {
        let bins: Vec<(i32, f64)> = bins.collect();
        let (offset, counts) = if bins.is_empty() {
            (0, Vec::new())
        } else {
            let min_index = bins[0].0;
            let max_index = bins[bins.len() - 1].0;
            let mut counts = vec![0.0; (max_index as i64 - min_index as i64 + 1) as usize];
            for (index, count) in bins {
                counts[(index - min_index) as usize] = count;
            }
            (min_index, counts)
        };

        Self {
            variant,
            bin_limit,
            offset,
            counts,
            is_collapsed_lo,
            is_collapsed_hi,
        }
    }
}

/// Serialisable form of a sketch.
///
/// See [`DDSketch::to_record`][crate::DDSketch::to_record] and
/// [`DDSketch::from_record`][crate::DDSketch::from_record].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SketchRecord {
    /// The index mapping.
    pub mapping: IndexMappingRecord,
    /// The store holding positive values.
    pub positive_store: StoreRecord,
    /// The store holding negative values (keyed by the index of the absolute value).
    pub negative_store: StoreRecord,
    /// Count of values folded into the zero bucket.
    pub zero_count: f64,
    /// Sum of all values weighted by their counts.
    pub sum: f64,
    /// Minimum observed value (+infinity when empty).
    pub min: f64,
    /// Maximum observed value (-infinity when empty).
    pub max: f64,
    /// Total count across both stores and the zero bucket.
    pub count: f64,
}
