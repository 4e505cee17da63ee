//! Index mappings.
//!
//! An index mapping defines how floating-point values are assigned to integer bin
//! indices, which determines the relative accuracy guarantee of the sketch. All mappings
//! here place consecutive bucket boundaries a factor of gamma apart; they differ in how
//! the logarithm is computed, trading CPU per insertion against a slightly larger number
//! of buckets for the same accuracy.

mod cubic;
mod linear;
mod logarithmic;

pub use cubic::CubicallyInterpolatedMapping;
pub use linear::LinearlyInterpolatedMapping;
pub use logarithmic::LogarithmicMapping;

use crate::error::RecordConversionError;
use crate::record::IndexMappingRecord;

/// How a mapping approximates the logarithm.
///
/// This is the closed set of mapping variants a serialised sketch can name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum Interpolation {
    /// Exact logarithm, no interpolation ([`LogarithmicMapping`]).
    None,
    /// Linear interpolation of log2 between powers of two ([`LinearlyInterpolatedMapping`]).
    Linear,
    /// Cubic interpolation of log2 between powers of two ([`CubicallyInterpolatedMapping`]).
    Cubic,
}

/// Maps values to bin indices and vice versa.
///
/// For any `value` within the indexable range, `value(index(value))` must differ from
/// `value` by at most `relative_accuracy() * value`. Equality of two mappings compares
/// the quantities that determine bucketing (gamma and index offset), so equal mappings
/// assign every value the same index.
pub trait IndexMapping: Clone + PartialEq + Send + Sync {
    /// Returns the index of the bin for the given positive value.
    ///
    /// The value must be within `[min_indexable_value, max_indexable_value]`. Negative
    /// values are handled by the sketch facade, which indexes their absolute value into a
    /// separate store.
    fn index(&self, value: f64) -> i32;

    /// Returns the representative value for the given index.
    ///
    /// The representative sits inside the bucket so that the relative error towards
    /// either bucket boundary is at most `relative_accuracy()`.
    fn value(&self, index: i32) -> f64;

    /// Returns the lower bound of the bucket at the given index.
    fn lower_bound(&self, index: i32) -> f64;

    /// Returns the upper bound of the bucket at the given index.
    fn upper_bound(&self, index: i32) -> f64;

    /// Returns the relative accuracy guaranteed by this mapping.
    fn relative_accuracy(&self) -> f64;

    /// Returns the smallest positive value that can be indexed.
    ///
    /// The sketch facade folds values of smaller magnitude into its zero bucket.
    fn min_indexable_value(&self) -> f64;

    /// Returns the largest positive value that can be indexed.
    fn max_indexable_value(&self) -> f64;

    /// Returns the gamma value (the ratio between consecutive bucket boundaries).
    fn gamma(&self) -> f64;

    /// Returns the index offset applied after the logarithm is taken.
    ///
    /// `index(1.0)` equals the offset truncated to an integer.
    fn index_offset(&self) -> f64;

    /// Returns the interpolation tag identifying this mapping variant.
    fn interpolation(&self) -> Interpolation;

    /// Projects this mapping to its serialisable record.
    fn to_record(&self) -> IndexMappingRecord;

    /// Rebuilds a mapping from its record.
    ///
    /// The record's gamma is taken verbatim, so the rebuilt mapping assigns every value
    /// the exact index the original did.
    ///
    /// # Errors
    ///
    /// Fails if the record names a different variant or carries a gamma that is not
    /// greater than 1.
    fn from_record(record: &IndexMappingRecord) -> Result<Self, RecordConversionError>
    where
        Self: Sized;
}

/// Splits a positive normal `f64` into `(significand, exponent)` such that
/// `value == (1 + significand) * 2^exponent` with `significand` in `[0, 1)`.
pub(crate) fn significand_and_exponent(value: f64) -> (f64, i32) {
    let bits = value.to_bits();
    let exponent = ((bits >> 52) & 0x7ff) as i32 - 1023;
    let significand = f64::from_bits((bits & 0x000f_ffff_ffff_ffff) | 0x3ff0_0000_0000_0000) - 1.0;
    (significand, exponent)
}

/// Computes `mantissa * 2^exponent`, flushing to zero or infinity outside the `f64`
/// exponent range.
pub(crate) fn ldexp(mantissa: f64, exponent: i32) -> f64 {
    mantissa * 2.0f64.powi(exponent)
}
