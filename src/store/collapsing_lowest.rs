use super::{validate_record_count, Store, StoreVariant};
use crate::error::RecordConversionError;
use crate::record::StoreRecord;

/// A dense store that collapses lowest-indexed bins when capacity is exceeded.
///
/// This store maintains a contiguous window of at most `bin_limit` bins. When adding an
/// index above the window would exceed the limit, the window shifts up so that the new
/// index becomes the top; every count that falls below the new bottom is accumulated into
/// the bottom bin, sacrificing accuracy for lower quantiles to preserve accuracy for
/// higher quantiles. Once collapsed, additions below the window land in the bottom bin.
///
/// Use this store when:
/// - You need bounded memory usage
/// - Higher quantiles (e.g., p95, p99) are more important than lower quantiles
/// - You're tracking latencies or other metrics where the tail matters most
#[derive(Clone, Debug, PartialEq)]
pub struct CollapsingLowestDenseStore {
    /// The bin counts, stored contiguously.
    bins: Vec<f64>,

    /// The count stored in bins[0] corresponds to this index.
    offset: i32,

    /// Maximum number of bins to maintain.
    bin_limit: usize,

    /// Total count across all bins.
    count: f64,

    /// Whether collapsing has occurred (accuracy may be compromised for low quantiles).
    is_collapsed: bool,
}

impl CollapsingLowestDenseStore {
    /// Creates an empty `CollapsingLowestDenseStore` with the given maximum number of
    /// bins.
    ///
    /// # Panics
    ///
    /// Panics if `bin_limit` is zero.
    pub fn new(bin_limit: usize) -> Self {
        assert!(bin_limit >= 1, "bin_limit must be at least 1");
        Self {
            bins: Vec::new(),
            offset: 0,
            bin_limit,
            count: 0.0,
            is_collapsed: false,
        }
    }

    /// Returns the maximum number of bins this store maintains.
    pub fn bin_limit(&self) -> usize {
        self.bin_limit
    }

    /// Returns `true` if this store has collapsed bins.
    ///
    /// If true, accuracy guarantees may not hold for lower quantiles.
    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    /// Makes room for the given logical index and returns its position in the bins
    /// array, collapsing the low tail if the window has to move.
    fn normalize(&mut self, index: i32) -> usize {
        if self.bins.is_empty() {
            self.bins.push(0.0);
            self.offset = index;
            return 0;
        }

        if index < self.offset {
            if !self.is_collapsed {
                self.extend_below(index);
            }
            // Below a collapsed window, the bottom bin absorbs the count.
            return (index as i64 - self.offset as i64).max(0) as usize;
        }

        if index as i64 >= self.offset as i64 + self.bins.len() as i64 {
            self.extend_above(index);
        }
        (index - self.offset) as usize
    }

    /// Extends the window downwards to cover `index`, stopping at the bin limit.
    fn extend_below(&mut self, index: i32) {
        let top = self.offset as i64 + self.bins.len() as i64;
        let new_offset = (index as i64).max(top - self.bin_limit as i64) as i32;

        let num_prepend = (self.offset - new_offset) as usize;
        if num_prepend > 0 {
            let mut new_bins = vec![0.0; num_prepend + self.bins.len()];
            new_bins[num_prepend..].copy_from_slice(&self.bins);
            self.bins = new_bins;
            self.offset = new_offset;
        }

        if new_offset > index {
            self.is_collapsed = true;
        }
    }

    /// Extends the window upwards to cover `index`, shifting it and collapsing the low
    /// tail once the bin limit is reached.
    fn extend_above(&mut self, index: i32) {
        let required = index as i64 - self.offset as i64 + 1;
        if required <= self.bin_limit as i64 {
            self.bins.resize(required as usize, 0.0);
            return;
        }

        // The window shifts so that `index` sits at the top; everything that falls below
        // the new bottom is folded into the bottom bin.
        let new_offset = (index as i64 - self.bin_limit as i64 + 1) as i32;
        if new_offset as i64 >= self.offset as i64 + self.bins.len() as i64 {
            // The jump clears the current window entirely.
            let collapsed: f64 = self.bins.iter().sum();
            self.bins.clear();
            self.bins.resize(self.bin_limit, 0.0);
            self.bins[0] = collapsed;
        } else {
            let shift = (new_offset - self.offset) as usize;
            let collapsed: f64 = self.bins[..shift].iter().sum();
            self.bins.drain(..shift);
            self.bins[0] += collapsed;
            self.bins.resize(self.bin_limit, 0.0);
        }
        self.offset = new_offset;
        self.is_collapsed = true;
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

impl Store for CollapsingLowestDenseStore {
    fn add(&mut self, index: i32, count: f64) {
        if count <= 0.0 {
            return;
        }

        let bin_idx = self.normalize(index);
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

        for (index, count) in Store::bins(other) {
            self.add(index, count);
        }

        // Folded in only after the adds: a collapsed flag set up front would make
        // `normalize` skip extending below the window even when there is spare capacity
        // for the other store's low bins.
        if other.is_collapsed {
            self.is_collapsed = true;
        }
    }

    fn is_empty(&self) -> bool {
        self.count == 0.0
    }

    fn clear(&mut self) {
        self.bins.clear();
        self.offset = 0;
        self.count = 0.0;
        self.is_collapsed = false;
    }

    fn variant(&self) -> StoreVariant {
        StoreVariant::CollapsingLowest
    }

    fn to_record(&self) -> StoreRecord {
        StoreRecord::from_bins(
            StoreVariant::CollapsingLowest,
            Some(self.bin_limit),
            Store::bins(self),
            self.is_collapsed,
            false,
        )
    }

    fn from_record(record: &StoreRecord) -> Result<Self, RecordConversionError> {
        if record.variant != StoreVariant::CollapsingLowest {
            return Err(RecordConversionError::StoreMismatch {
                expected: StoreVariant::CollapsingLowest,
                actual: record.variant,
            });
        }

        let bin_limit = record.bin_limit.ok_or(RecordConversionError::MissingBinLimit {
            variant: StoreVariant::CollapsingLowest,
        })?;
        if bin_limit == 0 {
            return Err(RecordConversionError::InvalidBinLimit);
        }

        let mut store = Self::new(bin_limit);
        for (i, &count) in record.counts.iter().enumerate() {
            let index = record.offset + i as i32;
            let count = validate_record_count(index, count)?;
            if count > 0.0 {
                store.add(index, count);
            }
        }
        store.is_collapsed |= record.is_collapsed_lo;
        Ok(store)
    }
}

impl Default for CollapsingLowestDenseStore {
    /// Creates a collapsing lowest dense store with a default of 2048 bins.
    fn default() -> Self {
        Self::new(2048)
    }
}
