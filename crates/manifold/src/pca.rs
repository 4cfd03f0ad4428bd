//! Linear projection via principal components.
//!
//! The default projector. On standardized input the covariance matrix
//! is the feature correlation matrix (features x features, small), so
//! the top-k eigenvectors come cheaply from power iteration. Linear
//! projection preserves global and local neighbor structure exactly up
//! to the discarded components, satisfying the projection contract.

use crate::eigen;
use crate::project::{check_shape, Embedding, ProjectionError, Projector};
use crate::standardize::Standardized;

/// Principal component projector.
#[derive(Debug, Clone)]
pub struct PcaProjector {
    /// Power iteration cap per component.
    pub max_iterations: usize,
    /// Convergence tolerance on the iterate delta.
    pub tolerance: f64,
}

impl Default for PcaProjector {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-12,
        }
    }
}

impl Projector for PcaProjector {
    fn name(&self) -> &'static str {
        "pca"
    }

    fn project(&self, features: &Standardized, k: usize) -> Result<Embedding, ProjectionError> {
        let n = features.len();
        let d = features.n_features();
        check_shape(n, d, k)?;

        // Covariance of standardized columns; means are zero by
        // construction.
        let rows = features.rows();
        let mut cov = vec![0.0; d * d];
        for a in 0..d {
            for b in a..d {
                let sum: f64 = rows.iter().map(|r| r[a] * r[b]).sum();
                let value = sum / n as f64;
                cov[a * d + b] = value;
                cov[b * d + a] = value;
            }
        }

        let components = eigen::top_eigenpairs(&cov, d, k, None, self.max_iterations, self.tolerance);

        let points = rows
            .iter()
            .map(|row| {
                components
                    .iter()
                    .map(|c| row.iter().zip(&c.vector).map(|(x, v)| x * v).sum())
                    .collect()
            })
            .collect();

        Ok(Embedding::new(features.symbols().to_vec(), points, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standardize::standardize;

    fn cluster_features() -> Standardized {
        // Two clusters in 3 features: rows 0-2 low, rows 3-5 high,
        // with small within-cluster wiggle.
        let rows = vec![
            vec![1.0, 2.0, 0.1],
            vec![1.1, 2.1, 0.2],
            vec![0.9, 1.9, 0.15],
            vec![9.0, 12.0, 5.0],
            vec![9.2, 12.1, 5.1],
            vec![8.8, 11.9, 4.9],
        ];
        let symbols = (0..6).map(|i| format!("S{}", i)).collect();
        standardize(symbols, rows, &["a", "b", "c"]).unwrap()
    }

    #[test]
    fn preserves_cluster_structure_in_one_dimension() {
        let features = cluster_features();
        let embedding = PcaProjector::default().project(&features, 1).unwrap();

        // Within-cluster distances must be smaller than any
        // across-cluster distance.
        let within = embedding.distance(0, 1).max(embedding.distance(3, 4));
        let across = embedding.distance(0, 3).min(embedding.distance(2, 5));
        assert!(
            within < across,
            "within {} should be < across {}",
            within,
            across
        );
    }

    #[test]
    fn rejects_bad_dimensions() {
        let features = cluster_features();
        let projector = PcaProjector::default();
        assert!(matches!(
            projector.project(&features, 0),
            Err(ProjectionError::BadDimension { .. })
        ));
        assert!(matches!(
            projector.project(&features, 3),
            Err(ProjectionError::BadDimension { .. })
        ));
    }

    #[test]
    fn rejects_too_few_assets() {
        let rows = vec![vec![1.0, 2.0, 3.0], vec![2.0, 1.0, 0.0]];
        let symbols = vec!["A".to_string(), "B".to_string()];
        let features = standardize(symbols, rows, &[]).unwrap();
        assert!(matches!(
            PcaProjector::default().project(&features, 2),
            Err(ProjectionError::TooFewAssets { .. })
        ));
    }

    #[test]
    fn projection_is_deterministic() {
        let features = cluster_features();
        let projector = PcaProjector::default();
        let a = projector.project(&features, 2).unwrap();
        let b = projector.project(&features, 2).unwrap();
        assert_eq!(a, b);
    }
}
