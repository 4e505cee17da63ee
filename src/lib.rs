//! DDSketch: a fully-mergeable quantile sketch with relative-error guarantees.
//!
//! A sketch ingests a stream of real-valued samples and answers any quantile query with
//! a value whose relative error is bounded by a configured accuracy. Two sketches built
//! from disjoint streams can be merged into one that behaves as if it had seen the
//! concatenated stream, which makes per-shard sketching with late aggregation the
//! natural deployment pattern.
//!
//! # Quick Start
//!
//! ```
//! use ddsketch::DDSketch;
//!
//! let mut sketch = DDSketch::with_relative_accuracy(0.01).unwrap();
//! sketch.add(1.0).unwrap();
//! sketch.add(2.0).unwrap();
//! sketch.add(3.0).unwrap();
//!
//! let median = sketch.quantile(0.5).unwrap();
//! ```
//!
//! # Mappings and Stores
//!
//! The sketch is generic over its index mapping and its bin store:
//!
//! - Mappings: [`LogarithmicMapping`] (exact, memory-optimal),
//!   [`LinearlyInterpolatedMapping`] (fastest, ~44% more buckets),
//!   [`CubicallyInterpolatedMapping`] (fast, ~1% more buckets).
//! - Stores: [`CollapsingLowestDenseStore`] (bounded memory, upper quantiles stay
//!   accurate), [`CollapsingHighestDenseStore`] (bounded memory, lower quantiles stay
//!   accurate), [`DenseStore`] (unbounded, contiguous), [`SparseStore`] (unbounded,
//!   scattered keys).
//!
//! The defaults (logarithmic mapping with a low-collapsing store of 2048 bins) suit
//! latency-style workloads where tail percentiles matter most.
//!
//! # Serialisation
//!
//! A sketch projects to a plain [`SketchRecord`] and back (see [`DDSketch::to_record`] /
//! [`DDSketch::from_record`]); round-tripping preserves every quantile. The record types
//! derive `serde` traits under the `serde` feature.
//!
//! # Feature Flags
//!
//! - `serde`: Enables serialization/deserialization of the record types.

#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod mapping;
pub mod record;
pub mod store;

mod common;
mod sketch;

pub use error::{RecordConversionError, SketchError};
pub use mapping::{
    CubicallyInterpolatedMapping, IndexMapping, Interpolation, LinearlyInterpolatedMapping, LogarithmicMapping,
};
pub use record::{IndexMappingRecord, SketchRecord, StoreRecord};
pub use sketch::DDSketch;
pub use store::{
    CollapsingHighestDenseStore, CollapsingLowestDenseStore, DenseStore, SparseStore, Store, StoreVariant,
};
