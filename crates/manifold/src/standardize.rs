//! Z-score standardization of the feature matrix.
//!
//! Standardization is mandatory before projection: without it the
//! embedding is dominated by scale-heavy features (market caps dwarf
//! log returns by many orders of magnitude). A zero-variance column is
//! degenerate input and fails the cycle.

use crate::project::ProjectionError;
use quant::stats;
use types::Symbol;

/// A standardized feature matrix: every column has mean 0 and variance
/// 1 (population) across assets.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardized {
    symbols: Vec<Symbol>,
    rows: Vec<Vec<f64>>,
    n_features: usize,
}

impl Standardized {
    /// Number of assets (rows).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Symbols in row order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Standardized rows.
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// One standardized column.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.rows.iter().map(|r| r[index]).collect()
    }
}

/// Standardize each feature column to zero mean, unit variance.
///
/// `feature_names` is used only to name a degenerate column in the
/// error; it may be shorter than the column count.
pub fn standardize(
    symbols: Vec<Symbol>,
    rows: Vec<Vec<f64>>,
    feature_names: &[&str],
) -> Result<Standardized, ProjectionError> {
    let n = rows.len();
    if n < 2 {
        return Err(ProjectionError::TooFewAssets {
            assets: n,
            required: 2,
        });
    }

    let n_features = rows[0].len();
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_features {
            return Err(ProjectionError::ShapeMismatch {
                row: i,
                expected: n_features,
                got: row.len(),
            });
        }
    }

    // Per-column mean and population standard deviation.
    let mut means = Vec::with_capacity(n_features);
    let mut stds = Vec::with_capacity(n_features);
    for col in 0..n_features {
        let values: Vec<f64> = rows.iter().map(|r| r[col]).collect();
        let mean = stats::mean(&values).unwrap_or(0.0);
        let sd = stats::std_dev(&values).unwrap_or(0.0);
        if sd == 0.0 {
            return Err(ProjectionError::DegenerateColumn {
                index: col,
                name: feature_names.get(col).unwrap_or(&"?").to_string(),
            });
        }
        means.push(mean);
        stds.push(sd);
    }

    let standardized = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(col, v)| (v - means[col]) / stds[col])
                .collect()
        })
        .collect();

    Ok(Standardized {
        symbols,
        rows: standardized,
        n_features,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn symbols(n: usize) -> Vec<Symbol> {
        (0..n).map(|i| format!("S{}", i)).collect()
    }

    #[test]
    fn columns_have_zero_mean_unit_variance() {
        let rows = vec![
            vec![1.0, 100.0],
            vec![2.0, 250.0],
            vec![3.0, 900.0],
            vec![4.0, 50.0],
        ];
        let std = standardize(symbols(4), rows, &["a", "b"]).unwrap();

        for col in 0..2 {
            let values = std.column(col);
            let mean = stats::mean(&values).unwrap();
            let var = stats::variance(&values).unwrap();
            assert!(mean.abs() < 1e-12, "column {} mean {}", col, mean);
            assert!((var - 1.0).abs() < 1e-12, "column {} variance {}", col, var);
        }
    }

    #[test]
    fn zero_variance_column_is_degenerate() {
        let rows = vec![vec![1.0, 7.0], vec![2.0, 7.0], vec![3.0, 7.0]];
        let err = standardize(symbols(3), rows, &["vol", "flat"]).unwrap_err();
        assert_eq!(
            err,
            ProjectionError::DegenerateColumn {
                index: 1,
                name: "flat".to_string()
            }
        );
    }

    #[test]
    fn ragged_rows_rejected() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(matches!(
            standardize(symbols(2), rows, &[]),
            Err(ProjectionError::ShapeMismatch { row: 1, .. })
        ));
    }

    #[test]
    fn single_row_is_too_few() {
        assert!(matches!(
            standardize(symbols(1), vec![vec![1.0]], &[]),
            Err(ProjectionError::TooFewAssets { .. })
        ));
    }
}
