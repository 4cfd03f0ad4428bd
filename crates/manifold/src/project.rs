//! The projection contract and its output type.

use crate::standardize::Standardized;
use serde::{Deserialize, Serialize};
use std::fmt;
use types::Symbol;

// =============================================================================
// Embedding
// =============================================================================

/// N assets embedded as points in R^k.
///
/// Produced fresh each cycle; not retained across cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    symbols: Vec<Symbol>,
    points: Vec<Vec<f64>>,
    dimension: usize,
}

impl Embedding {
    /// Assemble an embedding. Internal to projector implementations.
    pub(crate) fn new(symbols: Vec<Symbol>, points: Vec<Vec<f64>>, dimension: usize) -> Self {
        debug_assert_eq!(symbols.len(), points.len());
        debug_assert!(points.iter().all(|p| p.len() == dimension));
        Self {
            symbols,
            points,
            dimension,
        }
    }

    /// Number of embedded assets.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the embedding is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Embedding dimension k.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Symbols in row order (matches the standardized matrix).
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Embedded point for row `i`.
    pub fn point(&self, i: usize) -> &[f64] {
        &self.points[i]
    }

    /// Euclidean distance between two embedded assets.
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        self.points[i]
            .iter()
            .zip(&self.points[j])
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }

    /// Mean embedding-space distance from asset `i` to all others.
    pub fn mean_distance(&self, i: usize) -> f64 {
        let n = self.len();
        if n < 2 {
            return 0.0;
        }
        let sum: f64 = (0..n).filter(|&j| j != i).map(|j| self.distance(i, j)).sum();
        sum / (n - 1) as f64
    }
}

// =============================================================================
// Projector Contract
// =============================================================================

/// A manifold projection algorithm.
///
/// Given standardized features, return an N x k embedding that
/// approximately preserves neighbor rank-order for small k. Linear and
/// nonlinear implementations both satisfy the contract.
pub trait Projector: Send + Sync {
    /// Short algorithm name for logs and snapshots.
    fn name(&self) -> &'static str;

    /// Project the standardized matrix into `k` dimensions.
    fn project(&self, features: &Standardized, k: usize) -> Result<Embedding, ProjectionError>;
}

/// Validate the shape constraints common to all projectors:
/// `1 <= k < n_features` and `n_assets >= k + 1`.
pub(crate) fn check_shape(
    n_assets: usize,
    n_features: usize,
    k: usize,
) -> Result<(), ProjectionError> {
    if k == 0 || k >= n_features {
        return Err(ProjectionError::BadDimension {
            dimension: k,
            n_features,
        });
    }
    if n_assets < k + 1 {
        return Err(ProjectionError::TooFewAssets {
            assets: n_assets,
            required: k + 1,
        });
    }
    Ok(())
}

// =============================================================================
// Errors
// =============================================================================

/// Degenerate feature space; aborts the cycle rather than returning a
/// misleading embedding.
#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Not enough assets to embed meaningfully (N < k + 1).
    TooFewAssets { assets: usize, required: usize },
    /// Requested embedding dimension outside `1 <= k < n_features`.
    BadDimension { dimension: usize, n_features: usize },
    /// A feature column has zero variance after outlier exclusion.
    DegenerateColumn { index: usize, name: String },
    /// A row has the wrong number of features.
    ShapeMismatch {
        row: usize,
        expected: usize,
        got: usize,
    },
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::TooFewAssets { assets, required } => {
                write!(f, "too few assets to embed: {} (need {})", assets, required)
            }
            ProjectionError::BadDimension {
                dimension,
                n_features,
            } => write!(
                f,
                "embedding dimension {} invalid for {} features (need 1 <= k < features)",
                dimension, n_features
            ),
            ProjectionError::DegenerateColumn { index, name } => {
                write!(f, "feature column {} ({}) has zero variance", index, name)
            }
            ProjectionError::ShapeMismatch { row, expected, got } => {
                write!(
                    f,
                    "feature row {} has {} values, expected {}",
                    row, got, expected
                )
            }
        }
    }
}

impl std::error::Error for ProjectionError {}
