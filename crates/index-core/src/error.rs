//! Error taxonomy for the index engine.
//!
//! Structural failures abort a cycle and surface as [`CycleError`],
//! leaving the previously committed snapshot untouched. Per-symbol and
//! per-constituent issues (insufficient history, degraded selection,
//! excluded weighting bases) are never errors; they travel as
//! `SnapshotNote`s on the returned snapshot.

use std::time::Duration;
use types::{ConfigError, Timestamp, WeightingMethod};

/// Terminal error of `compute_cycle`, wrapping the originating kind.
#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    /// Configuration rejected before any work started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Data source failure (transient; retryable by the caller).
    #[error("data source: {0}")]
    Source(#[from] SourceError),

    /// Every universe symbol was excluded during feature building.
    #[error("no eligible assets after feature building")]
    NoEligibleAssets,

    /// Degenerate feature space; cycle-fatal.
    #[error("projection: {0}")]
    Projection(#[from] manifold::ProjectionError),

    /// Weighting basis collapsed with no survivors; cycle-fatal.
    #[error("weighting: {0}")]
    Weight(#[from] WeightError),

    /// Snapshot could not be committed.
    #[error("snapshot sink: {0}")]
    Sink(#[from] SinkError),
}

impl CycleError {
    /// Whether the caller may retry the cycle with backoff.
    ///
    /// Only external I/O failures are retryable; structural failures
    /// will recur until the input universe changes.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CycleError::Source(_) | CycleError::Sink(SinkError::Unavailable(_)))
    }
}

/// Invalid weighting basis across the whole constituent set.
///
/// A single constituent with a non-positive basis is excluded and
/// recorded, not an error; this fires only when nothing survives.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WeightError {
    /// The weighting basis summed to zero or no constituent had a
    /// positive basis value.
    #[error("weighting basis for {method} is zero across all constituents")]
    EmptyBasis { method: WeightingMethod },
}

/// Data source failures. Both variants are transient and retryable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    /// Connectivity problem reaching the source.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The fetch exceeded the caller-supplied bound.
    #[error("fetch exceeded timeout of {0:?}")]
    Timeout(Duration),
}

/// Snapshot sink failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SinkError {
    /// Chaining discipline violation: snapshots must be committed in
    /// strictly increasing timestamp order.
    #[error("snapshot at {timestamp} is not after last committed {last}")]
    NonMonotonic { timestamp: Timestamp, last: Timestamp },

    /// The sink is temporarily unavailable (retryable).
    #[error("sink unavailable: {0}")]
    Unavailable(String),
}
