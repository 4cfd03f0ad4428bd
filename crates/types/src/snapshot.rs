//! Index snapshots and constituents.
//!
//! An [`IndexSnapshot`] is the output of one successful computation
//! cycle: the scalar index value, the ordered constituent list with
//! weights, a reference to the previous snapshot it chains from, and
//! the degraded conditions absorbed along the way. Snapshots are
//! immutable once created; the index engine is the sole writer.

use crate::{Symbol, Timestamp, WEIGHT_SUM_TOLERANCE};
use serde::{Deserialize, Serialize};

// =============================================================================
// Constituent
// =============================================================================

/// One index member for one cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constituent {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Normalized weight in `[0, 1]`. Weights across one snapshot sum
    /// to 1.0 within [`WEIGHT_SUM_TOLERANCE`].
    pub weight: f64,
    /// Timestamp of the cycle that set this weight.
    pub updated_at: Timestamp,
}

// =============================================================================
// Snapshot Notes
// =============================================================================

/// Degraded-but-recoverable conditions recorded on a snapshot.
///
/// Per-symbol and per-constituent issues never fail a cycle when the
/// algorithm can proceed with a reduced but valid universe; they are
/// absorbed here so callers can audit what the engine worked around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SnapshotNote {
    /// A symbol had fewer valid in-window observations than required
    /// and was excluded before projection.
    InsufficientData {
        symbol: Symbol,
        have: usize,
        need: usize,
    },
    /// Malformed observations for a symbol were dropped as outliers.
    OutlierDropped { symbol: Symbol, count: usize },
    /// Fewer eligible assets existed than the configured constituent
    /// count; all eligible assets were selected.
    DegradedSelection { requested: usize, actual: usize },
    /// A selected constituent had a non-positive weighting basis and
    /// was excluded, with remaining weights renormalized.
    WeightBasisExcluded { symbol: Symbol },
}

// =============================================================================
// Index Snapshot
// =============================================================================

/// Reference to the previous snapshot used for index chaining.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseRef {
    /// Previous index value.
    pub value: f64,
    /// Previous snapshot timestamp.
    pub timestamp: Timestamp,
}

/// The committed output of one index computation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// Cycle timestamp.
    pub timestamp: Timestamp,
    /// Scalar index value.
    pub value: f64,
    /// Ordered constituents (selection order preserved).
    pub constituents: Vec<Constituent>,
    /// Chaining reference. `None` for the very first cycle, which
    /// starts from the configured base index value.
    pub base: Option<BaseRef>,
    /// Degraded conditions absorbed during the cycle.
    pub notes: Vec<SnapshotNote>,
}

impl IndexSnapshot {
    /// Sum of constituent weights. Should be 1.0 within tolerance.
    pub fn weight_sum(&self) -> f64 {
        self.constituents.iter().map(|c| c.weight).sum()
    }

    /// Whether the weight-sum invariant holds.
    pub fn weights_normalized(&self) -> bool {
        (self.weight_sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }

    /// Whether this cycle selected fewer constituents than requested.
    pub fn is_degraded(&self) -> bool {
        self.notes
            .iter()
            .any(|n| matches!(n, SnapshotNote::DegradedSelection { .. }))
    }

    /// Weight of a specific constituent, if present.
    pub fn weight_of(&self, symbol: &str) -> Option<f64> {
        self.constituents
            .iter()
            .find(|c| c.symbol == symbol)
            .map(|c| c.weight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(weights: &[(&str, f64)]) -> IndexSnapshot {
        IndexSnapshot {
            timestamp: 1_000,
            value: 1000.0,
            constituents: weights
                .iter()
                .map(|(s, w)| Constituent {
                    symbol: s.to_string(),
                    weight: *w,
                    updated_at: 1_000,
                })
                .collect(),
            base: None,
            notes: Vec::new(),
        }
    }

    #[test]
    fn weight_sum_invariant() {
        let snap = snapshot(&[("BTC", 0.6), ("ETH", 0.4)]);
        assert!(snap.weights_normalized());

        let bad = snapshot(&[("BTC", 0.6), ("ETH", 0.3)]);
        assert!(!bad.weights_normalized());
    }

    #[test]
    fn degraded_flag_reads_notes() {
        let mut snap = snapshot(&[("BTC", 1.0)]);
        assert!(!snap.is_degraded());
        snap.notes.push(SnapshotNote::DegradedSelection {
            requested: 5,
            actual: 1,
        });
        assert!(snap.is_degraded());
    }

    #[test]
    fn weight_lookup() {
        let snap = snapshot(&[("BTC", 0.7), ("ETH", 0.3)]);
        assert_eq!(snap.weight_of("ETH"), Some(0.3));
        assert_eq!(snap.weight_of("SOL"), None);
    }
}
