//! Core data model for the manifold index engine.
//!
//! This crate defines the fundamental types shared across the index
//! construction pipeline: market observations, index configuration,
//! constituents, and committed index snapshots.
//!
//! # Design Notes
//!
//! - All numeric market data uses `f64`; index values are statistical
//!   quantities, not settlement amounts, so fixed-point is unnecessary
//! - Every type is `Serialize`/`Deserialize` so snapshots can be handed
//!   to an external sink unchanged
//! - Types here are pure data; pipeline logic lives in downstream crates

pub mod config;
pub mod observation;
pub mod snapshot;

pub use config::{ConfigError, IndexConfig, WeightingMethod};
pub use observation::{Observation, ObservationError};
pub use snapshot::{BaseRef, Constituent, IndexSnapshot, SnapshotNote};

// =============================================================================
// Aliases
// =============================================================================

/// Asset symbol (e.g., "BTC", "ETH").
pub type Symbol = String;

/// Wall clock timestamp in milliseconds since epoch (UTC).
pub type Timestamp = u64;

// =============================================================================
// Constants
// =============================================================================

/// Milliseconds in one calendar day.
pub const MILLIS_PER_DAY: u64 = 86_400_000;

/// Trading days per year for annualization. Crypto markets trade
/// continuously, so a full 365-day year is used rather than 252.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Tolerance for the "constituent weights sum to 1.0" invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;
