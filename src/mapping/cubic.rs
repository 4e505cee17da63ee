//! Cubically-interpolated index mapping implementation.

use super::{ldexp, significand_and_exponent, IndexMapping, Interpolation};
use crate::error::{RecordConversionError, SketchError};
use crate::record::IndexMappingRecord;

/// Index mapping that interpolates log2 with a cubic polynomial between powers of two.
///
/// Like [`LinearlyInterpolatedMapping`][super::LinearlyInterpolatedMapping] this reads
/// the exponent straight off the IEEE-754 representation, but the mantissa is pushed
/// through a cubic chosen to match log2 at the octave endpoints. The polynomial tracks
/// the logarithm closely enough that only ~1% more buckets are needed than the
/// memory-optimal exact mapping, while still avoiding transcendental calls on the
/// insertion path. The inverse solves the cubic with Cardano's formula.
#[derive(Clone, Debug)]
pub struct CubicallyInterpolatedMapping {
    /// The ratio between consecutive bucket boundaries.
    gamma: f64,
    /// Precomputed 1/(C * ln(gamma)).
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

impl CubicallyInterpolatedMapping {
    const A: f64 = 6.0 / 35.0;
    const B: f64 = -3.0 / 5.0;
    const C: f64 = 10.0 / 7.0;

    /// Creates a new cubically-interpolated mapping with the given relative accuracy.
    ///
    /// # Errors
    ///
    /// Returns an error if the relative accuracy is not in the open interval (0, 1).
    pub fn new(relative_accuracy: f64) -> Result<Self, SketchError> {
        Self::with_index_offset(relative_accuracy, 0.0)
    }

    /// Creates a new cubically-interpolated mapping with the given relative accuracy and
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

    /// Creates a new cubically-interpolated mapping with the given gamma value.
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
        // The cubic's slope at the octave start is C, so the multiplier is scaled down
        // by C to keep the worst-case bucket width within gamma.
        let multiplier = 1.0 / (Self::C * gamma.ln());

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

    /// Approximates log2 by a cubic of the significand, exact at every power of two.
    fn log2_approx(value: f64) -> f64 {
        let (s, exponent) = significand_and_exponent(value);
        ((Self::A * s + Self::B) * s + Self::C) * s + exponent as f64
    }

    /// Inverse of [`Self::log2_approx`], solving the cubic with Cardano's formula.
    fn exp2_approx(x: f64) -> f64 {
        let exponent = x.floor();
        let delta_0 = Self::B * Self::B - 3.0 * Self::A * Self::C;
        let delta_1 = 2.0 * Self::B * Self::B * Self::B
            - 9.0 * Self::A * Self::B * Self::C
            - 27.0 * Self::A * Self::A * (x - exponent);
        let cardano = ((delta_1 - (delta_1 * delta_1 - 4.0 * delta_0 * delta_0 * delta_0).sqrt()) / 2.0).cbrt();
        let significand_plus_one = -(Self::B + cardano + delta_0 / cardano) / (3.0 * Self::A) + 1.0;
        ldexp(significand_plus_one, exponent as i32)
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

impl IndexMapping for CubicallyInterpolatedMapping {
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
        Interpolation::Cubic
    }

    fn to_record(&self) -> IndexMappingRecord {
        IndexMappingRecord {
            interpolation: Interpolation::Cubic,
            gamma: self.gamma,
            index_offset: self.index_offset,
        }
    }

    fn from_record(record: &IndexMappingRecord) -> Result<Self, RecordConversionError> {
        if record.interpolation != Interpolation::Cubic {
            return Err(RecordConversionError::MappingMismatch {
                expected: Interpolation::Cubic,
                actual: record.interpolation,
            });
        }

        Self::with_gamma(record.gamma, record.index_offset)
            .map_err(|_| RecordConversionError::InvalidGamma { gamma: record.gamma })
    }
}

impl PartialEq for CubicallyInterpolatedMapping {
    fn eq(&self, other: &Self) -> bool {
        self.gamma == other.gamma && self.index_offset == other.index_offset
    }
}

impl Default for CubicallyInterpolatedMapping {
    /// Creates a cubically-interpolated mapping with 1% relative accuracy.
    fn default() -> Self {
        Self::new(0.01).expect("0.01 is a valid relative accuracy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::tests::{assert_mapping_accuracy, assert_mapping_monotonic};

    #[test]
    fn test_new_invalid_accuracy() {
        assert!(CubicallyInterpolatedMapping::new(0.0).is_err());
        assert!(CubicallyInterpolatedMapping::new(1.0).is_err());
        assert!(CubicallyInterpolatedMapping::new(-0.1).is_err());
    }

    #[test]
    fn test_log2_approx_exact_at_powers_of_two() {
        for e in -1000..1000 {
            let value = 2.0f64.powi(e);
            assert_eq!(CubicallyInterpolatedMapping::log2_approx(value), e as f64);
        }
    }

    #[test]
    fn test_exp2_approx_inverts_log2_approx() {
        for &value in &[1e-8, 0.3, 1.0, 1.5, 2.7, 42.0, 1e12] {
            let rebuilt =
                CubicallyInterpolatedMapping::exp2_approx(CubicallyInterpolatedMapping::log2_approx(value));
            assert!(
                (rebuilt - value).abs() <= value * 1e-12,
                "{} rebuilt as {}",
                value,
                rebuilt
            );
        }
    }

    #[test]
    fn test_accuracy_sweep() {
        for &rel_acc in &[1e-4, 1e-3, 0.01, 0.05, 0.1, 0.25] {
            let mapping = CubicallyInterpolatedMapping::new(rel_acc).unwrap();
            assert_mapping_accuracy(&mapping);
        }
    }

    #[test]
    fn test_monotonicity() {
        let mapping = CubicallyInterpolatedMapping::new(0.02).unwrap();
        assert_mapping_monotonic(&mapping);
    }

    #[test]
    fn test_index_offset() {
        for &offset in &[0.0, 1.0, -12.23, 7768.3] {
            let mapping = CubicallyInterpolatedMapping::with_index_offset(0.01, offset).unwrap();
            assert_eq!(mapping.index(1.0), offset as i32);
        }
    }

    #[test]
    fn test_uses_fewer_buckets_than_linear() {
        let cubic = CubicallyInterpolatedMapping::new(0.01).unwrap();
        let linear = crate::mapping::LinearlyInterpolatedMapping::new(0.01).unwrap();

        // Same value span, fewer distinct indices.
        let cubic_span = cubic.index(1e9) - cubic.index(1e-9);
        let linear_span = linear.index(1e9) - linear.index(1e-9);
        assert!(cubic_span < linear_span);
    }

    #[test]
    fn test_record_roundtrip_preserves_gamma() {
        let mapping = CubicallyInterpolatedMapping::new(0.02).unwrap();
        let record = mapping.to_record();
        let rebuilt = CubicallyInterpolatedMapping::from_record(&record).unwrap();

        assert_eq!(mapping, rebuilt);
        for &value in &[0.001, 0.1, 1.0, 42.0, 1e9] {
            assert_eq!(mapping.index(value), rebuilt.index(value));
        }
    }
}
