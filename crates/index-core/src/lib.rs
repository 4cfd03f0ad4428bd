//! Core index construction engine.
//!
//! Ties the workspace together: observations come in through an
//! [`ObservationSource`], flow through feature building ([`quant`]),
//! manifold projection ([`manifold`]), constituent selection and
//! weighting, and leave as chained [`types::IndexSnapshot`]s through a
//! [`SnapshotSink`].
//!
//! The pipeline itself is the pure [`compute_cycle`]; [`IndexEngine`]
//! adds the single-writer chaining discipline around it.

pub mod engine;
pub mod error;
pub mod select;
pub mod sink;
pub mod source;
pub mod weights;

pub use engine::{compute_cycle, CycleState, IndexEngine};
pub use error::{CycleError, SinkError, SourceError, WeightError};
pub use select::{select_constituents, Selection};
pub use sink::{MemorySink, SnapshotSink};
pub use source::{InMemorySource, ObservationSource, TimeWindow};
pub use weights::{compute_weights, WeightSet};
