//! Sketch storage.
//!
//! Stores manage the counts of mapped values: each holds a set of bins keyed by integer
//! index together with the (possibly fractional, for weighted samples) number of
//! observations counted in each bin.

mod collapsing_highest;
pub use self::collapsing_highest::CollapsingHighestDenseStore;

mod collapsing_lowest;
pub use self::collapsing_lowest::CollapsingLowestDenseStore;

mod dense;
pub use self::dense::DenseStore;

mod sparse;
pub use self::sparse::SparseStore;

use crate::error::RecordConversionError;
use crate::record::StoreRecord;

/// How a store organises its bins and which tail, if any, it collapses.
///
/// This is the closed set of store variants a serialised sketch can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum StoreVariant {
    /// Unbounded contiguous storage ([`DenseStore`]).
    Dense,
    /// Unbounded map-backed storage ([`SparseStore`]).
    Sparse,
    /// Bounded storage collapsing the lowest bins ([`CollapsingLowestDenseStore`]).
    CollapsingLowest,
    /// Bounded storage collapsing the highest bins ([`CollapsingHighestDenseStore`]).
    CollapsingHighest,
}

/// Storage for sketch observations.
pub trait Store: Clone + Send + Sync {
    /// Adds a count to the bin at the given index.
    ///
    /// Counts that are not strictly positive are ignored.
    fn add(&mut self, index: i32, count: f64);

    /// Returns the total count across all bins.
    fn total_count(&self) -> f64;

    /// Returns the minimum index with a non-zero count, or `None` if empty.
    fn min_index(&self) -> Option<i32>;

    /// Returns the maximum index with a non-zero count, or `None` if empty.
    fn max_index(&self) -> Option<i32>;

    /// Returns the smallest index whose cumulative count reaches the given rank.
    ///
    /// The rank may be fractional. A rank of zero (or less) yields the smallest live
    /// index; a rank at or past the total count yields the largest. Returns `None` only
    /// when the store is empty.
    fn key_at_rank(&self, rank: f64) -> Option<i32>;

    /// Returns the smallest index whose cumulative count strictly exceeds the given
    /// rank.
    ///
    /// This is the lookup the sketch uses for its plain ascending walk over the
    /// positive-value store; the negative store instead reverses its rank against the
    /// store total, which turns the strict lookup into the inclusive
    /// [`key_at_rank`][Self::key_at_rank]. Falls back to the largest live index;
    /// returns `None` only when the store is empty.
    fn key_at_rank_exclusive(&self, rank: f64) -> Option<i32>;

    /// Iterates the live bins as `(index, count)` pairs in ascending index order.
    fn bins(&self) -> impl Iterator<Item = (i32, f64)> + '_;

    /// Merges another store into this one.
    fn merge(&mut self, other: &Self);

    /// Returns `true` if the store is empty.
    fn is_empty(&self) -> bool;

    /// Clears all bins from the store.
    fn clear(&mut self);

    /// Returns the store variant tag used in serialised records.
    fn variant(&self) -> StoreVariant;

    /// Projects this store to its serialisable record.
    fn to_record(&self) -> StoreRecord;

    /// Rebuilds a store from its record.
    ///
    /// # Errors
    ///
    /// Fails if the record names a different variant, carries an invalid or missing bin
    /// limit, or contains a count that is negative or not finite.
    fn from_record(record: &StoreRecord) -> Result<Self, RecordConversionError>
    where
        Self: Sized;
}

/// Validates a bin count read from a record.
///
/// # Errors
///
/// If the count is negative or not finite, an error is returned.
pub(crate) fn validate_record_count(index: i32, count: f64) -> Result<f64, RecordConversionError> {
    if count < 0.0 || !count.is_finite() {
        return Err(RecordConversionError::InvalidBinCount { index, count });
    }
    Ok(count)
}
