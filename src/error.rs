//! Error types.

use std::fmt;

use crate::mapping::Interpolation;
use crate::store::StoreVariant;

/// Errors surfaced by sketch construction and the sketch facade.
///
/// No error mutates the sketch it was reported from: a failed `add`, `merge` or
/// `quantile` leaves the receiver exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub enum SketchError {
    /// The relative accuracy is outside the open interval (0, 1).
    InvalidRelativeAccuracy {
        /// The rejected relative accuracy.
        relative_accuracy: f64,
    },

    /// The gamma value is not greater than 1.
    InvalidGamma {
        /// The rejected gamma value.
        gamma: f64,
    },

    /// The value is NaN or infinite.
    InvalidValue {
        /// The rejected value.
        value: f64,
    },

    /// The weight is not a positive finite number.
    InvalidWeight {
        /// The rejected weight.
        weight: f64,
    },

    /// The quantile is outside [0, 1].
    InvalidQuantile {
        /// The rejected quantile.
        quantile: f64,
    },

    /// The operation requires at least one recorded value.
    EmptySketch,

    /// The other sketch buckets values differently (different gamma or index offset), so
    /// merging would silently corrupt counts.
    IncompatibleMerge {
        /// Gamma of the receiving sketch.
        expected_gamma: f64,
        /// Gamma of the other sketch.
        actual_gamma: f64,
    },
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRelativeAccuracy { relative_accuracy } => {
                write!(f, "relative accuracy must be between 0 and 1 (exclusive), got {}", relative_accuracy)
            }
            Self::InvalidGamma { gamma } => write!(f, "gamma must be greater than 1, got {}", gamma),
            Self::InvalidValue { value } => write!(f, "value must be finite, got {}", value),
            Self::InvalidWeight { weight } => {
                write!(f, "weight must be positive and finite, got {}", weight)
            }
            Self::InvalidQuantile { quantile } => {
                write!(f, "quantile must be within [0, 1], got {}", quantile)
            }
            Self::EmptySketch => write!(f, "sketch contains no values"),
            Self::IncompatibleMerge {
                expected_gamma,
                actual_gamma,
            } => {
                write!(
                    f,
                    "sketches bucket values differently: gamma {} vs {}",
                    expected_gamma, actual_gamma
                )
            }
        }
    }
}

impl std::error::Error for SketchError {}

/// Errors that can occur when rebuilding a mapping, store, or sketch from its record.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordConversionError {
    /// The record describes a different mapping variant than the target type.
    MappingMismatch {
        /// The interpolation of the target mapping type.
        expected: Interpolation,
        /// The interpolation named by the record.
        actual: Interpolation,
    },

    /// The record's gamma value is not greater than 1.
    InvalidGamma {
        /// The gamma value from the record.
        gamma: f64,
    },

    /// The record describes a different store variant than the target type.
    StoreMismatch {
        /// The variant of the target store type.
        expected: StoreVariant,
        /// The variant named by the record.
        actual: StoreVariant,
    },

    /// The record describes a collapsing store but carries no bin limit.
    MissingBinLimit {
        /// The store variant missing its limit.
        variant: StoreVariant,
    },

    /// The record's bin limit is zero.
    InvalidBinLimit,

    /// A bin count is negative or not finite.
    InvalidBinCount {
        /// The bin index.
        index: i32,
        /// The offending count value.
        count: f64,
    },

    /// The zero count is negative or not finite.
    InvalidZeroCount {
        /// The offending count value.
        count: f64,
    },

    /// The total count is negative or not finite.
    InvalidCount {
        /// The offending count value.
        count: f64,
    },

    /// The total count disagrees with the sum of the store and zero counts.
    InconsistentCount {
        /// The total count from the record.
        count: f64,
        /// The count recovered from the stores and the zero bucket.
        stored: f64,
    },
}

impl fmt::Display for RecordConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MappingMismatch { expected, actual } => {
                write!(f, "mapping variant mismatch: expected {:?}, got {:?}", expected, actual)
            }
            Self::InvalidGamma { gamma } => write!(f, "gamma must be greater than 1, got {}", gamma),
            Self::StoreMismatch { expected, actual } => {
                write!(f, "store variant mismatch: expected {:?}, got {:?}", expected, actual)
            }
            Self::MissingBinLimit { variant } => {
                write!(f, "store variant {:?} requires a bin limit", variant)
            }
            Self::InvalidBinLimit => write!(f, "bin limit must be at least 1"),
            Self::InvalidBinCount { index, count } => {
                write!(f, "invalid bin count at index {}: {}", index, count)
            }
            Self::InvalidZeroCount { count } => write!(f, "invalid zero count: {}", count),
            Self::InvalidCount { count } => write!(f, "invalid total count: {}", count),
            Self::InconsistentCount { count, stored } => {
                write!(f, "total count {} disagrees with stored counts {}", count, stored)
            }
        }
    }
}

impl std::error::Error for RecordConversionError {}
