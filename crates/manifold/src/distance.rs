//! Pairwise distance matrix in standardized feature space.
//!
//! Computed once per cycle and shared by the selector (redundancy
//! penalty) and the diffusion projector (affinity graph).

use crate::standardize::Standardized;

/// Symmetric N x N Euclidean distance matrix, flat row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Compute pairwise Euclidean distances between standardized rows.
    pub fn from_standardized(features: &Standardized) -> Self {
        let rows = features.rows();
        let n = rows.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = euclidean(&rows[i], &rows[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    /// Number of assets.
    pub fn len(&self) -> usize {
        self.n
    }

    /// Whether the matrix is empty.
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Distance between assets `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Median of the strictly-positive off-diagonal distances.
    ///
    /// Used as the default affinity bandwidth by the diffusion
    /// projector. `None` when every pairwise distance is zero.
    pub fn median_positive(&self) -> Option<f64> {
        let mut values: Vec<f64> = Vec::with_capacity(self.n * (self.n - 1) / 2);
        for i in 0..self.n {
            for j in (i + 1)..self.n {
                let d = self.get(i, j);
                if d > 0.0 {
                    values.push(d);
                }
            }
        }
        if values.is_empty() {
            return None;
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        Some(values[values.len() / 2])
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standardize::standardize;

    fn standardized() -> Standardized {
        let rows = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 2.0],
            vec![3.0, 1.0],
        ];
        let symbols = (0..4).map(|i| format!("S{}", i)).collect();
        standardize(symbols, rows, &[]).unwrap()
    }

    #[test]
    fn symmetric_with_zero_diagonal() {
        let dist = DistanceMatrix::from_standardized(&standardized());
        assert_eq!(dist.len(), 4);
        for i in 0..4 {
            assert_eq!(dist.get(i, i), 0.0);
            for j in 0..4 {
                assert_eq!(dist.get(i, j), dist.get(j, i));
            }
        }
    }

    #[test]
    fn median_bandwidth_is_positive() {
        let dist = DistanceMatrix::from_standardized(&standardized());
        assert!(dist.median_positive().unwrap() > 0.0);
    }
}
