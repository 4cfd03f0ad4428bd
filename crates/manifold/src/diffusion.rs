//! Graph-neighbor projection via diffusion coordinates.
//!
//! Nonlinear alternative to [`crate::PcaProjector`]. Builds a Gaussian
//! affinity graph over the assets, symmetrically normalizes it, and
//! embeds each asset with the leading non-trivial eigenvectors of the
//! diffusion operator. Local neighborhoods in feature space map to
//! nearby diffusion coordinates, so neighbor rank-order is
//! approximately preserved for small k.

use crate::distance::DistanceMatrix;
use crate::eigen;
use crate::project::{check_shape, Embedding, ProjectionError, Projector};
use crate::standardize::Standardized;

/// Diffusion map projector.
#[derive(Debug, Clone)]
pub struct DiffusionProjector {
    /// Gaussian affinity bandwidth. `None` uses the median positive
    /// pairwise distance, a scale-free default.
    pub bandwidth: Option<f64>,
    /// Diffusion time: eigenvalues are raised to this power, damping
    /// fine-grained structure as it grows.
    pub steps: u32,
    /// Power iteration cap per component.
    pub max_iterations: usize,
    /// Convergence tolerance on the iterate delta.
    pub tolerance: f64,
}

impl Default for DiffusionProjector {
    fn default() -> Self {
        Self {
            bandwidth: None,
            steps: 1,
            max_iterations: 300,
            tolerance: 1e-12,
        }
    }
}

impl Projector for DiffusionProjector {
    fn name(&self) -> &'static str {
        "diffusion"
    }

    fn project(&self, features: &Standardized, k: usize) -> Result<Embedding, ProjectionError> {
        let n = features.len();
        check_shape(n, features.n_features(), k)?;

        let distances = DistanceMatrix::from_standardized(features);
        // All-zero distances would mean identical rows, which a
        // standardized matrix cannot produce; fall back defensively.
        let sigma = self
            .bandwidth
            .or_else(|| distances.median_positive())
            .unwrap_or(1.0);

        // Gaussian affinity kernel, self-affinity 1.
        let mut kernel = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                let d = distances.get(i, j);
                kernel[i * n + j] = (-d * d / (2.0 * sigma * sigma)).exp();
            }
        }

        // Symmetric normalization S = D^{-1/2} K D^{-1/2}.
        let degree: Vec<f64> = (0..n)
            .map(|i| (0..n).map(|j| kernel[i * n + j]).sum())
            .collect();
        let mut operator = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                operator[i * n + j] = kernel[i * n + j] / (degree[i] * degree[j]).sqrt();
            }
        }

        // The stationary component sqrt(degree) carries no geometry;
        // deflate it and embed with the next k eigenvectors.
        let stationary: Vec<f64> = degree.iter().map(|d| d.sqrt()).collect();
        let components = eigen::top_eigenpairs(
            &operator,
            n,
            k,
            Some(&stationary),
            self.max_iterations,
            self.tolerance,
        );

        let points = (0..n)
            .map(|i| {
                components
                    .iter()
                    .map(|c| c.value.powi(self.steps as i32) * c.vector[i] / degree[i].sqrt())
                    .collect()
            })
            .collect();

        Ok(Embedding::new(features.symbols().to_vec(), points, k))
    }
}
