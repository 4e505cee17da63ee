use super::{validate_record_count, Store, StoreVariant};
use crate::error::RecordConversionError;
use crate::record::StoreRecord;

/// A dense store using contiguous array storage.
///
/// This store grows unbounded to accommodate any range of indices. It's memory-efficient
/// when the indices are clustered together, but can use significant memory if indices are
/// widely scattered.
///
/// Use this store when:
/// - You have a bounded range of input values
/// - Memory usage is not a concern
/// - You need the fastest possible insertion performance
#[derive(Clone, Debug, PartialEq)]
pub struct DenseStore {
    /// The bin counts, stored contiguously.
    bins: Vec<f64>,

    /// The count stored in bins[0] corresponds to this index.
    offset: i32,

    /// Total count across all bins.
    count: f64,
}

impl DenseStore {
    /// Creates an empty `DenseStore`.
    pub fn new() -> Self {
        Self {
            bins: Vec::new(),
            offset: 0,
            count: 0.0,
        }
    }

    /// Ensures the store can accommodate the given index, growing if necessary.
    fn grow(&mut self, index: i32) {
        if self.bins.is_empty() {
            self.bins.push(0.0);
            self.offset = index;
            return;
        }

        if index < self.offset {
            // Need to prepend bins
            let num_prepend = (self.offset - index) as usize;
            let mut new_bins = vec![0.0; num_prepend + self.bins.len()];
            new_bins[num_prepend..].copy_from_slice(&self.bins);
            self.bins = new_bins;
            self.offset = index;
        } else if index >= self.offset + self.bins.len() as i32 {
            // Need to append bins
            let new_len = (index - self.offset + 1) as usize;
            self.bins.resize(new_len, 0.0);
        }
    }

    /// Returns the index into the bins array for the given logical index.
    #[inline]
    fn bin_index(&self, index: i32) -> usize {
        (index - self.offset) as usize
    }

    fn key_at(&self, rank: f64, inclusive: bool) -> Option<i32> {
        if self.is_empty() {
            return None;
        }

        let rank = rank.max(0.0);
        let mut cumulative = 0.0;
        for (i, &count) in self.bins.iter().enumerate() {
            cumulative += count;
            let reached = cumulative > rank || (inclusive && count > 0.0 && cumulative >= rank);
            if reached {
                return Some(self.offset + i as i32);
            }
        }
        self.max_index()
    }
}

impl Store for DenseStore {
    fn add(&mut self, index: i32, count: f64) {
        if count <= 0.0 {
            return;
        }

        self.grow(index);
        let bin_idx = self.bin_index(index);
        self.bins[bin_idx] += count;
        self.count += count;
    }

    fn total_count(&self) -> f64 {
        self.count
    }

    fn min_index(&self) -> Option<i32> {
        self.bins
            .iter()
            .position(|&count| count > 0.0)
            .map(|i| self.offset + i as i32)
    }

    fn max_index(&self) -> Option<i32> {
        self.bins
            .iter()
            .rposition(|&count| count > 0.0)
            .map(|i| self.offset + i as i32)
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
            .enumerate()
            .filter(|(_, &count)| count > 0.0)
            .map(|(i, &count)| (self.offset + i as i32, count))
    }

    fn merge(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }

        // Grow to accommodate the other store's range, then add pointwise.
        if let (Some(other_min), Some(other_max)) = (other.min_index(), other.max_index()) {
            self.grow(other_min);
            self.grow(other_max);

            for (index, count) in Store::bins(other) {
                let bin_idx = self.bin_index(index);
                self.bins[bin_idx] += count;
            }
        }

        self.count += other.count;
    }

    fn is_empty(&self) -> bool {
        self.count == 0.0
    }

    fn clear(&mut self) {
        self.bins.clear();
        self.offset = 0;
        self.count = 0.0;
    }

    fn variant(&self) -> StoreVariant {
        StoreVariant::Dense
    }

    fn to_record(&self) -> StoreRecord {
        StoreRecord::from_bins(StoreVariant::Dense, None, Store::bins(self), false, false)
    }

    fn from_record(record: &StoreRecord) -> Result<Self, RecordConversionError> {
        if record.variant != StoreVariant::Dense {
            return Err(RecordConversionError::StoreMismatch {
                expected: StoreVariant::Dense,
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

impl Default for DenseStore {
    fn default() -> Self {
        Self::new()
    }
}
