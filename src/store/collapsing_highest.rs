use super::{validate_record_count, Store, StoreVariant};
use crate::error::RecordConversionError;
use crate::record::StoreRecord;

/// A dense store that collapses highest-indexed bins when capacity is exceeded.
///
/// The mirror image of [`CollapsingLowestDenseStore`][super::CollapsingLowestDenseStore]:
/// the window shifts down when an index below it would exceed the limit, and every count
/// that falls above the new top is accumulated into the top bin. Once collapsed,
/// additions above the window land in the top bin.
///
/// Use this store when lower quantiles (e.g., p1, p5) must remain accurate and the upper
/// tail is expendable.
#[derive(Clone, Debug, PartialEq)]
pub struct CollapsingHighestDenseStore {
    /// The bin counts, stored contiguously.
    bins: Vec<f64>,

    /// The count stored in bins[0] corresponds to this index.
    offset: i32,

    /// Maximum number of bins to maintain.
    bin_limit: usize,

    /// Total count across all bins.
    count: f64,

    /// Whether collapsing has occurred (accuracy may be compromised for high quantiles).
    is_collapsed: bool,
}

impl CollapsingHighestDenseStore {
    /// Creates an empty `CollapsingHighestDenseStore` with the given maximum number of
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
    /// If true, accuracy guarantees may not hold for higher quantiles.
    pub fn is_collapsed(&self) -> bool {
        self.is_collapsed
    }

    /// Makes room for the given logical index and returns its position in the bins
    /// array, collapsing the high tail if the window has to move.
    fn normalize(&mut self, index: i32) -> usize {
        if self.bins.is_empty() {
            self.bins.push(0.0);
            self.offset = index;
            return 0;
        }

        if index as i64 >= self.offset as i64 + self.bins.len() as i64 {
            if !self.is_collapsed {
                self.extend_above(index);
            }
            // Above a collapsed window, the top bin absorbs the count.
            let last = self.bins.len() - 1;
            return ((index as i64 - self.offset as i64) as usize).min(last);
        }

        if index < self.offset {
            self.extend_below(index);
        }
        (index - self.offset) as usize
    }

    /// Extends the window upwards to cover `index`, stopping at the bin limit.
    fn extend_above(&mut self, index: i32) {
        let new_top = (index as i64).min(self.offset as i64 + self.bin_limit as i64 - 1);
        let new_len = (new_top - self.offset as i64 + 1) as usize;
        if new_len > self.bins.len() {
            self.bins.resize(new_len, 0.0);
        }

        if new_top < index as i64 {
            self.is_collapsed = true;
        }
    }

    /// Extends the window downwards to cover `index`, shifting it and collapsing the
    /// high tail once the bin limit is reached.
    fn extend_below(&mut self, index: i32) {
        let required = self.offset as i64 + self.bins.len() as i64 - index as i64;
        if required <= self.bin_limit as i64 {
            let num_prepend = (self.offset - index) as usize;
            let mut new_bins = vec![0.0; num_prepend + self.bins.len()];
            new_bins[num_prepend..].copy_from_slice(&self.bins);
            self.bins = new_bins;
            self.offset = index;
            return;
        }

        // The window shifts so that `index` sits at the bottom; everything that falls
        // above the new top is folded into the top bin.
        let new_top = (index as i64 + self.bin_limit as i64 - 1) as i32;
        if (new_top as i64) < self.offset as i64 {
            // The jump clears the current window entirely.
            let collapsed: f64 = self.bins.iter().sum();
            self.bins.clear();
            self.bins.resize(self.bin_limit, 0.0);
            self.bins[self.bin_limit - 1] = collapsed;
        } else {
            let keep = (new_top - self.offset + 1) as usize;
            if keep < self.bins.len() {
                let collapsed: f64 = self.bins[keep..].iter().sum();
                self.bins.truncate(keep);
                self.bins[keep - 1] += collapsed;
            }
            let num_prepend = (self.offset - index) as usize;
            let mut new_bins = vec![0.0; num_prepend + self.bins.len()];
            new_bins[num_prepend..].copy_from_slice(&self.bins);
            self.bins = new_bins;
        }
        self.offset = index;
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

impl Store for CollapsingHighestDenseStore {
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
        // `normalize` skip extending above the window even when there is spare capacity
        // for the other store's high bins.
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
        StoreVariant::CollapsingHighest
    }

    fn to_record(&self) -> StoreRecord {
        StoreRecord::from_bins(
            StoreVariant::CollapsingHighest,
            Some(self.bin_limit),
            Store::bins(self),
            false,
            self.is_collapsed,
        )
    }

    fn from_record(record: &StoreRecord) -> Result<Self, RecordConversionError> {
        if record.variant != StoreVariant::CollapsingHighest {
            return Err(RecordConversionError::StoreMismatch {
                expected: StoreVariant::CollapsingHighest,
                actual: record.variant,
            });
        }

        let bin_limit = record.bin_limit.ok_or(RecordConversionError::MissingBinLimit {
            variant: StoreVariant::CollapsingHighest,
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
        store.is_collapsed |= record.is_collapsed_hi;
        Ok(store)
    }
}

impl Default for CollapsingHighestDenseStore {
    /// Creates a collapsing highest dense store with a default of 2048 bins.
    fn default() -> Self {
        Self::new(2048)
    }
}
