use std::collections::BTreeMap;

use super::{validate_record_count, Store, StoreVariant};
use crate::error::RecordConversionError;
use crate::record::StoreRecord;

/// A sparse store using a sorted map for bin storage.
///
/// This store only keeps track of non-empty bins, making it memory-efficient for data
/// with widely scattered indices. However, it does not support collapsing, so memory
/// usage can grow unbounded.
///
/// Use this store when:
/// - Input values span a wide range with gaps
/// - You don't need bounded memory usage
/// - You want to avoid the overhead of dense array allocation
#[derive(Clone, Debug, PartialEq)]
pub struct SparseStore {
    /// The bin counts, keyed by index.
    bins: BTreeMap<i32, f64>,

    /// Total count across all bins.
    count: f64,
}

impl SparseStore {
    /// Creates an empty `SparseStore`.
    pub fn new() -> Self {
        Self {
            bins: BTreeMap::new(),
            count: 0.0,
        }
    }

    fn key_at(&self, rank: f64, inclusive: bool) -> Option<i32> {
        if self.is_empty() {
            return None;
        }

        let rank = rank.max(0.0);
        let mut cumulative = 0.0;
        for (&index, &count) in &self.bins {
            cumulative += count;
            let reached = cumulative > rank || (inclusive && count > 0.0 && cumulative >= rank);
            if reached {
                return Some(index);
            }
        }
        self.max_index()
    }
}

impl Store for SparseStore {
    fn add(&mut self, index: i32, count: f64) {
        if count <= 0.0 {
            return;
        }

        *self.bins.entry(index).or_insert(0.0) += count;
        self.count += count;
    }

    fn total_count(&self) -> f64 {
        self.count
    }

    fn min_index(&self) -> Option<i32> {
        self.bins.iter().find(|(_, &c)| c > 0.0).map(|(&k, _)| k)
    }

    fn max_index(&self) -> Option<i32> {
        self.bins.iter().rev().find(|(_, &c)| c > 0.0).map(|(&k, _)| k)
    }

    fn key_at_rank(&self, rank: f64) -> Option<i32> {
        self.key_at(rank, true)
    }

    fn key_at_rank_exclusive(&self, rank: f64) -> Option<i32> {
        self.key_at(rank, false)
    }

    fn bins(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.bins
            .iter()
            .filter(|(_, &count)| count > 0.0)
            .map(|(&index, &count)| (index, count))
    }

    fn merge(&mut self, other: &Self) {
        for (&index, &count) in &other.bins {
            if count > 0.0 {
                *self.bins.entry(index).or_insert(0.0) += count;
            }
        }
        self.count += other.count;
    }

    fn is_empty(&self) -> bool {
        self.count == 0.0
    }

    fn clear(&mut self) {
        self.bins.clear();
        self.count = 0.0;
    }

    fn variant(&self) -> StoreVariant {
        StoreVariant::Sparse
    }

    fn to_record(&self) -> StoreRecord {
        // The record holds the dense projection of the live key range, so a store with
        // pathologically scattered keys serialises proportionally to its key span.
        StoreRecord::from_bins(StoreVariant::Sparse, None, Store::bins(self), false, false)
    }

    fn from_record(record: &StoreRecord) -> Result<Self, RecordConversionError> {
        if record.variant != StoreVariant::Sparse {
            return Err(RecordConversionError::StoreMismatch {
                expected: StoreVariant::Sparse,
                actual: record.variant,
            });
        }

        let mut store = Self::new();
        for (i, &count) in record.counts.iter().enumerate() {
            let index = record.offset + i as i32;
            let count = validate_record_count(index, count)?;
            if count > 0.0 {
                store.add(index, count);
            }
        }
        Ok(store)
    }
}

impl Default for SparseStore {
    fn default() -> Self {
        Self::new()
    }
}
