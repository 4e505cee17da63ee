//! Logarithmic index mapping implementation.

use super::{IndexMapping, Interpolation};
use crate::error::{RecordConversionError, SketchError};
use crate::record::IndexMappingRecord;

/// Memory-optimal index mapping backed by the exact logarithm.
///
/// Maps values to indices using `index = ceil(log(value) / log(gamma))` where
/// `gamma = (1 + alpha) / (1 - alpha)` and `alpha` is the relative accuracy. Given a
/// target accuracy this requires the fewest buckets of any mapping, at the cost of one
/// transcendental call per insertion.
#[derive(Clone, Debug)]
pub struct LogarithmicMapping {
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

impl LogarithmicMapping {
    /// Creates a new logarithmic mapping with the given relative accuracy.
    ///
    /// # Errors
    ///
    /// Returns an error if the relative accuracy is not in the open interval (0, 1).
    ///
    /// # Example
    ///
    /// ```
    /// use ddsketch::LogarithmicMapping;
    ///
    /// // Create a mapping with 1% relative accuracy
    /// let mapping = LogarithmicMapping::new(0.01).unwrap();
    /// ```
    pub fn new(relative_accuracy: f64) -> Result<Self, SketchError> {
        Self::with_index_offset(relative_accuracy, 0.0)
    }

    /// Creates a new logarithmic mapping with the given relative accuracy and index
    /// offset.
    ///
    /// The offset shifts every computed index, such that `index(1.0)` equals the offset
    /// truncated to an integer.
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

    /// Creates a new logarithmic mapping with the given gamma value.
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
        // The indexable range is constrained by the smallest positive normal f64 on one
        // side and by i32 index overflow on the other.
        mapping.min_indexable_value = f64::MIN_POSITIVE.max(mapping.pow_gamma(i32::MIN as f64 + 1.0));
        mapping.max_indexable_value = mapping.pow_gamma(i32::MAX as f64 - 1.0).min(f64::MAX / gamma);
        mapping
    }

    /// log_gamma(value), the exact bucket coordinate of a value.
    fn log_gamma(&self, value: f64) -> f64 {
        value.ln() * self.multiplier
    }

    /// gamma^x, the inverse of [`Self::log_gamma`].
    fn pow_gamma(&self, x: f64) -> f64 {
        (x / self.multiplier).exp()
    }
}

impl IndexMapping for LogarithmicMapping {
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
        Interpolation::None
    }

    fn to_record(&self) -> IndexMappingRecord {
        IndexMappingRecord {
            interpolation: Interpolation::None,
            gamma: self.gamma,
            index_offset: self.index_offset,
        }
    }

    fn from_record(record: &IndexMappingRecord) -> Result<Self, RecordConversionError> {
        if record.interpolation != Interpolation::None {
            return Err(RecordConversionError::MappingMismatch {
                expected: Interpolation::None,
                actual: record.interpolation,
            });
        }

        Self::with_gamma(record.gamma, record.index_offset)
            .map_err(|_| RecordConversionError::InvalidGamma { gamma: record.gamma })
    }
}

impl PartialEq for LogarithmicMapping {
    fn eq(&self, other: &Self) -> bool {
        // Gamma and offset fully determine bucketing; everything else is derived.
        self.gamma == other.gamma && self.index_offset == other.index_offset
    }
}

impl Default for LogarithmicMapping {
    /// Creates a logarithmic mapping with 1% relative accuracy (the common default).
    fn default() -> Self {
        Self::new(0.01).expect("0.01 is a valid relative accuracy")
    }
}
