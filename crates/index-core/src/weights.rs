//! Constituent weighting.
//!
//! Each method maps a constituent to a non-negative basis value; the
//! normalized bases are the weights. A constituent whose basis is not
//! positive is excluded and the survivors renormalized, preserving the
//! weight-sum invariant. Only a fully collapsed basis is an error.

use crate::error::WeightError;
use quant::AssetProfile;
use tracing::warn;
use types::{Symbol, WeightingMethod};

/// Normalized weights in selection order, plus the exclusions applied
/// to get there.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightSet {
    /// `(symbol, weight)` pairs; weights sum to 1.0.
    pub weights: Vec<(Symbol, f64)>,
    /// Constituents dropped for a non-positive basis.
    pub excluded: Vec<Symbol>,
}

/// Compute normalized constituent weights.
pub fn compute_weights(
    method: WeightingMethod,
    profiles: &[&AssetProfile],
) -> Result<WeightSet, WeightError> {
    let mut survivors: Vec<(Symbol, f64)> = Vec::with_capacity(profiles.len());
    let mut excluded = Vec::new();

    for profile in profiles {
        let value = basis(method, profile);
        if value > 0.0 && value.is_finite() {
            survivors.push((profile.symbol.clone(), value));
        } else {
            warn!(symbol = %profile.symbol, %method, basis = value, "excluding constituent with non-positive weighting basis");
            excluded.push(profile.symbol.clone());
        }
    }

    let total: f64 = survivors.iter().map(|(_, v)| v).sum();
    if survivors.is_empty() || total <= 0.0 {
        return Err(WeightError::EmptyBasis { method });
    }

    Ok(WeightSet {
        weights: survivors.into_iter().map(|(s, v)| (s, v / total)).collect(),
        excluded,
    })
}

/// Raw basis value for one constituent under a weighting method.
fn basis(method: WeightingMethod, profile: &AssetProfile) -> f64 {
    match method {
        WeightingMethod::MarketCap => profile.avg_market_cap,
        WeightingMethod::Volume => profile.avg_volume,
        WeightingMethod::Liquidity => {
            if profile.avg_market_cap > 0.0 {
                profile.avg_volume / profile.avg_market_cap
            } else {
                0.0
            }
        }
        // Diagonal risk parity: equal risk contribution under a
        // diagonal covariance assumption reduces to inverse volatility.
        WeightingMethod::RiskParity => {
            if profile.volatility > 0.0 {
                1.0 / profile.volatility
            } else {
                0.0
            }
        }
    }
}
