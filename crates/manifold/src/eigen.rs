//! Power-iteration eigendecomposition for small symmetric matrices.
//!
//! The matrices here are tiny (features x features for PCA, assets x
//! assets for diffusion), so power iteration with deflation is plenty
//! and keeps the workspace free of a linear algebra dependency. The
//! starting vector is fixed, never random: projection must be
//! bit-reproducible across runs.

/// One eigenvalue/eigenvector pair.
#[derive(Debug, Clone)]
pub(crate) struct EigenPair {
    pub value: f64,
    pub vector: Vec<f64>,
}

/// Top `k` eigenpairs of a symmetric `n x n` matrix (flat row-major),
/// by descending absolute eigenvalue.
///
/// If `deflate_first` is given, that direction is removed before
/// iterating; the diffusion projector uses this to skip the trivial
/// stationary component.
pub(crate) fn top_eigenpairs(
    matrix: &[f64],
    n: usize,
    k: usize,
    deflate_first: Option<&[f64]>,
    max_iterations: usize,
    tolerance: f64,
) -> Vec<EigenPair> {
    debug_assert_eq!(matrix.len(), n * n);
    let mut m = matrix.to_vec();

    if let Some(v) = deflate_first {
        let mut v = v.to_vec();
        if normalize(&mut v) {
            let value = rayleigh(&m, n, &v);
            deflate(&mut m, n, value, &v);
        }
    }

    let mut pairs = Vec::with_capacity(k);
    for component in 0..k {
        let pair = dominant_eigenpair(&m, n, component, max_iterations, tolerance);
        deflate(&mut m, n, pair.value, &pair.vector);
        pairs.push(pair);
    }
    pairs
}

/// Dominant eigenpair of `m` via power iteration.
fn dominant_eigenpair(
    m: &[f64],
    n: usize,
    component: usize,
    max_iterations: usize,
    tolerance: f64,
) -> EigenPair {
    // Fixed, asymmetric start vector; the component offset keeps
    // successive starts from being parallel.
    let mut v: Vec<f64> = (0..n)
        .map(|i| 1.0 / (1.0 + ((i + component) % n) as f64))
        .collect();
    if !normalize(&mut v) {
        return EigenPair {
            value: 0.0,
            vector: vec![0.0; n],
        };
    }

    for _ in 0..max_iterations {
        let mut w = mat_vec(m, n, &v);
        if !normalize(&mut w) {
            // Matrix annihilated the vector: remaining spectrum is zero.
            return EigenPair {
                value: 0.0,
                vector: v,
            };
        }
        // Convergence up to sign (negative eigenvalues flip each step).
        let same: f64 = w.iter().zip(&v).map(|(a, b)| (a - b).powi(2)).sum();
        let flipped: f64 = w.iter().zip(&v).map(|(a, b)| (a + b).powi(2)).sum();
        let delta = same.min(flipped).sqrt();
        v = w;
        if delta < tolerance {
            break;
        }
    }

    fix_sign(&mut v);
    EigenPair {
        value: rayleigh(m, n, &v),
        vector: v,
    }
}

fn mat_vec(m: &[f64], n: usize, v: &[f64]) -> Vec<f64> {
    (0..n)
        .map(|i| (0..n).map(|j| m[i * n + j] * v[j]).sum())
        .collect()
}

fn rayleigh(m: &[f64], n: usize, v: &[f64]) -> f64 {
    let mv = mat_vec(m, n, v);
    v.iter().zip(&mv).map(|(a, b)| a * b).sum()
}

/// Subtract `value * v v^T` from `m`.
fn deflate(m: &mut [f64], n: usize, value: f64, v: &[f64]) {
    for i in 0..n {
        for j in 0..n {
            m[i * n + j] -= value * v[i] * v[j];
        }
    }
}

/// Scale to unit length. Returns false for a (near) zero vector.
fn normalize(v: &mut [f64]) -> bool {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm < 1e-300 {
        return false;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
    true
}

/// Deterministic sign convention: the entry with the largest magnitude
/// is positive.
fn fix_sign(v: &mut [f64]) {
    let mut max_idx = 0;
    for (i, x) in v.iter().enumerate() {
        if x.abs() > v[max_idx].abs() {
            max_idx = i;
        }
    }
    if v[max_idx] < 0.0 {
        for x in v.iter_mut() {
            *x = -*x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagonal_matrix_eigenpairs() {
        // diag(3, 1): eigenvalues 3 and 1 with axis eigenvectors.
        let m = vec![3.0, 0.0, 0.0, 1.0];
        let pairs = top_eigenpairs(&m, 2, 2, None, 500, 1e-13);

        assert!((pairs[0].value - 3.0).abs() < 1e-9);
        assert!((pairs[0].vector[0].abs() - 1.0).abs() < 1e-6);
        assert!((pairs[1].value - 1.0).abs() < 1e-9);
        assert!((pairs[1].vector[1].abs() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn symmetric_2x2() {
        // [[2, 1], [1, 2]] has eigenvalues 3 and 1.
        let m = vec![2.0, 1.0, 1.0, 2.0];
        let pairs = top_eigenpairs(&m, 2, 2, None, 500, 1e-13);
        assert!((pairs[0].value - 3.0).abs() < 1e-9);
        assert!((pairs[1].value - 1.0).abs() < 1e-9);
        // Eigenvectors are orthogonal
        let dot: f64 = pairs[0]
            .vector
            .iter()
            .zip(&pairs[1].vector)
            .map(|(a, b)| a * b)
            .sum();
        assert!(dot.abs() < 1e-6);
    }

    #[test]
    fn deflation_removes_supplied_direction() {
        let m = vec![2.0, 1.0, 1.0, 2.0];
        // Deflating the (1,1) direction leaves the (1,-1)/lambda=1 pair.
        let pairs = top_eigenpairs(&m, 2, 1, Some(&[1.0, 1.0]), 500, 1e-13);
        assert!((pairs[0].value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn deterministic_across_runs() {
        let m = vec![4.0, 1.0, 0.5, 1.0, 3.0, 0.2, 0.5, 0.2, 1.0];
        let a = top_eigenpairs(&m, 3, 2, None, 500, 1e-13);
        let b = top_eigenpairs(&m, 3, 2, None, 500, 1e-13);
        assert_eq!(a[0].vector, b[0].vector);
        assert_eq!(a[1].vector, b[1].vector);
    }
}
