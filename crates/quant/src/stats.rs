//! Statistical utilities for feature computation.
//!
//! Shared by the feature builder and the manifold standardization step:
//! moments, log returns, and volatility. Functions return `Option` when
//! the input is too short or degenerate rather than guessing at a value.

use types::DAYS_PER_YEAR;

/// Mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population variance (n denominator).
pub fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / values.len() as f64)
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Sample variance (n-1 denominator).
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(sum_sq / (n - 1) as f64)
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Log returns of a price series: `ln(p[i] / p[i-1])`.
///
/// Pairs containing a non-positive price are skipped; the feature
/// builder drops such points as outliers before calling this, so in
/// practice every consecutive pair contributes.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    if prices.len() < 2 {
        return vec![];
    }
    prices
        .windows(2)
        .filter_map(|w| {
            if w[0] > 0.0 && w[1] > 0.0 {
                Some((w[1] / w[0]).ln())
            } else {
                None
            }
        })
        .collect()
}

/// Annualized volatility of daily returns.
///
/// Sample standard deviation scaled by `sqrt(365)`; crypto markets
/// trade every calendar day.
pub fn annualized_volatility(daily_returns: &[f64]) -> Option<f64> {
    sample_std_dev(daily_returns).map(|sd| sd * DAYS_PER_YEAR.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_variance() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[]), None);

        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = std_dev(&values).unwrap();
        assert!((sd - 2.0).abs() < 1e-9);
    }

    #[test]
    fn log_returns_of_doubling_series() {
        let rets = log_returns(&[1.0, 2.0, 4.0, 8.0]);
        assert_eq!(rets.len(), 3);
        for r in rets {
            assert!((r - 2.0f64.ln()).abs() < 1e-12);
        }
    }

    #[test]
    fn flat_series_has_zero_volatility() {
        let rets = log_returns(&[50.0; 10]);
        assert_eq!(annualized_volatility(&rets), Some(0.0));
    }

    #[test]
    fn volatility_annualization_scale() {
        // Alternating +1%/-1% daily log returns: sample sd is known.
        let rets: Vec<f64> = (0..30).map(|i| if i % 2 == 0 { 0.01 } else { -0.01 }).collect();
        let sd = sample_std_dev(&rets).unwrap();
        let vol = annualized_volatility(&rets).unwrap();
        assert!((vol - sd * 365f64.sqrt()).abs() < 1e-12);
    }
}
