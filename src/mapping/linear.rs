//! Linearly-interpolated index mapping implementation.

use super::{ldexp, significand_and_exponent, IndexMapping, Interpolation};
use crate::error::{RecordConversionError, SketchError};
use crate::record::IndexMappingRecord;

/// Fast index mapping that interpolates log2 linearly between powers of two.
///
/// The exponent of a value is read straight off its IEEE-754 representation and log2 of
/// the mantissa is approximated by the mantissa itself, avoiding any transcendental call
/// on the insertion path.
///
/// The multiplier is the one the exact logarithm would use, which makes every bucket at
/// most gamma wide regardless of where the linear chord sits below the true logarithm.
/// The requested accuracy therefore holds as a worst-case bound, paid for with up to
/// ~44% more buckets than [`LogarithmicMapping`][super::LogarithmicMapping] for the same
/// value range.
#[derive(Clone, Debug)]
pub struct LinearlyInterpolatedMapping {
    /// The ratio between consecutive bucket boundaries.
    gamma: f64,
    /// Precomputed 1/ln(gamma).
    multiplier: f64,
    /// The relative accuracy guarantee.
    relative_accuracy: f64,
    /// Offset applied to every computed index.
    index_offset: f64,
    /// Minimum value that can be indexed.
    min_indexable_value: f64,
    /// Maximum value that can be indexed.
    max_indexable_value: f64,
}

impl LinearlyInterpolatedMapping {
    /// Creates a new linearly-interpolated mapping with the given relative accuracy.
    ///
    /// # Errors
    ///
    /// Returns an error if the relative accuracy is not in the open interval (0, 1).
    pub fn new(relative_accuracy: f64) -> Result<Self, SketchError> {
        Self::with_index_offset(relative_accuracy, 0.0)
    }

    /// Creates a new linearly-interpolated mapping with the given relative accuracy and
    /// index offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the relative accuracy is not in the open interval (0, 1).
    pub fn with_index_offset(relative_accuracy: f64, index_offset: f64) -> Result<Self, SketchError> {
        if relative_accuracy <= 0.0 || relative_accuracy >= 1.0 {
            return Err(SketchError::InvalidRelativeAccuracy { relative_accuracy });
        }

        let gamma = (1.0 + relative_accuracy) / (1.0 - relative_accuracy);
        Ok(Self::from_parts(gamma, relative_accuracy, index_offset))
    }

    /// Creates a new linearly-interpolated mapping with the given gamma value.
    ///
    /// The relative accuracy is derived as `(gamma - 1) / (gamma + 1)`. Gamma is kept
    /// verbatim, so a mapping rebuilt from a serialised gamma buckets values exactly as
    /// the original did.
    ///
    /// # Errors
    ///
    /// Returns an error if gamma is not greater than 1.
    pub fn with_gamma(gamma: f64, index_offset: f64) -> Result<Self, SketchError> {
        if !(gamma > 1.0) {
            return Err(SketchError::InvalidGamma { gamma });
        }

        let relative_accuracy = (gamma - 1.0) / (gamma + 1.0);
        Ok(Self::from_parts(gamma, relative_accuracy, index_offset))
    }

    fn from_parts(gamma: f64, relative_accuracy: f64, index_offset: f64) -> Self {
        let multiplier = 1.0 / gamma.ln();

        let mut mapping = Self {
            gamma,
            multiplier,
            relative_accuracy,
            index_offset,
            min_indexable_value: 0.0,
            max_indexable_value: 0.0,
        };
        mapping.min_indexable_value = f64::MIN_POSITIVE.max(mapping.pow_gamma(i32::MIN as f64 + 1.0));
        mapping.max_indexable_value = mapping.pow_gamma(i32::MAX as f64 - 1.0).min(f64::MAX / gamma);
        mapping
    }

    /// Approximates log2 by `significand + exponent`, exact at every power of two.
    fn log2_approx(value: f64) -> f64 {
        let (significand, exponent) = significand_and_exponent(value);
        significand + exponent as f64
    }

    /// Exact algebraic inverse of [`Self::log2_approx`].
    fn exp2_approx(x: f64) -> f64 {
        let exponent = x.floor();
        ldexp(1.0 + (x - exponent), exponent as i32)
    }

    /// The approximate bucket coordinate of a value.
    fn log_gamma(&self, value: f64) -> f64 {
        Self::log2_approx(value) * self.multiplier
    }

    /// The inverse of [`Self::log_gamma`].
    fn pow_gamma(&self, x: f64) -> f64 {
        Self::exp2_approx(x / self.multiplier)
    }
}

impl IndexMapping for LinearlyInterpolatedMapping {
    fn index(&self, value: f64) -> i32 {
        (self.log_gamma(value).ceil() + self.index_offset) as i32
    }

    fn value(&self, index: i32) -> f64 {
        self.upper_bound(index) * 2.0 / (1.0 + self.gamma)
    }

    fn lower_bound(&self, index: i32) -> f64 {
        self.pow_gamma(index as f64 - self.index_offset - 1.0)
    }

    fn upper_bound(&self, index: i32) -> f64 {
        self.pow_gamma(index as f64 - self.index_offset)
    }

    fn relative_accuracy(&self) -> f64 {
        self.relative_accuracy
    }

    fn min_indexable_value(&self) -> f64 {
        self.min_indexable_value
    }

    fn max_indexable_value(&self) -> f64 {
        self.max_indexable_value
    }

    fn gamma(&self) -> f64 {
        self.gamma
    }

    fn index_offset(&self) -> f64 {
        self.index_offset
    }

    fn interpolation(&self) -> Interpolation {
        Interpolation::Linear
    }

    fn to_record(&self) -> IndexMappingRecord {
        IndexMappingRecord {
            interpolation: Interpolation::Linear,
            gamma: self.gamma,
            index_offset: self.index_offset,
        }
    }

    fn from_record(record: &IndexMappingRecord) -> Result<Self, RecordConversionError> {
        if record.interpolation != Interpolation::Linear {
            return Err(RecordConversionError::MappingMismatch {
                expected: Interpolation::Linear,
                actual: record.interpolation,
            });
        }

        Self::with_gamma(record.gamma, record.index_offset)
            .map_err(|_| RecordConversionError::InvalidGamma { gamma: record.gamma })
    }
}

impl PartialEq for LinearlyInterpolatedMapping {
    fn eq(&self, other: &Self) -> bool {
        self.gamma == other.gamma && self.index_offset == other.index_offset
    }
}

impl Default for LinearlyInterpolatedMapping {
    /// Creates a linearly-interpolated mapping with 1% relative accuracy.
    fn default() -> Self {
        Self::new(0.01).expect("0.01 is a valid relative accuracy")
    }
}
