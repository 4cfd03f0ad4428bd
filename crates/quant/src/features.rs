//! Feature builder: observation history in, feature matrix out.
//!
//! Transforms raw per-asset time series into a numeric feature matrix
//! (assets x features) over a lookback window. Per-symbol computation
//! is pure and order-independent, so it runs through the [`parallel`]
//! helpers; matrix assembly (cross-sectional features, cap ranks) is a
//! second, sequential pass.
//!
//! Malformed observations (non-positive price, negative volume or
//! market cap) are dropped as outliers and counted; symbols left with
//! fewer than the configured minimum of valid points are excluded with
//! an [`ExclusionReason`]. Neither condition aborts the cycle.

use crate::stats;
use std::collections::HashMap;
use tracing::debug;
use types::{Observation, Symbol};

// =============================================================================
// Feature Schema
// =============================================================================

/// Feature names, in column order.
///
/// A single source of truth shared by the matrix and its consumers so
/// column indices cannot silently drift.
pub const FEATURE_NAMES: &[&str] = &[
    "f_vol_annualized",
    "f_liquidity_ratio",
    "f_inv_volatility",
    "f_mean_log_return",
    "f_cap_share",
];

/// Named column indices for the feature matrix.
pub mod col {
    /// Annualized volatility of daily log returns.
    pub const VOL_ANNUALIZED: usize = 0;
    /// Average daily volume normalized by average market cap.
    pub const LIQUIDITY_RATIO: usize = 1;
    /// Inverse volatility (risk-parity weight precursor); 0 for flat series.
    pub const INV_VOLATILITY: usize = 2;
    /// Mean daily log return over the window.
    pub const MEAN_LOG_RETURN: usize = 3;
    /// Share of total average market cap across eligible assets.
    pub const CAP_SHARE: usize = 4;
}

/// Number of feature columns.
pub const N_FEATURES: usize = FEATURE_NAMES.len();

// =============================================================================
// Output Types
// =============================================================================

/// Per-asset feature vector plus the summary statistics downstream
/// stages need (weighting bases, tie-break ranks).
#[derive(Debug, Clone, PartialEq)]
pub struct AssetProfile {
    /// Asset symbol.
    pub symbol: Symbol,
    /// Feature vector, ordered per [`FEATURE_NAMES`].
    pub features: Vec<f64>,
    /// Annualized log-return volatility (risk-parity basis).
    pub volatility: f64,
    /// Average in-window traded volume (volume weighting basis).
    pub avg_volume: f64,
    /// Average in-window market cap (market-cap weighting basis).
    pub avg_market_cap: f64,
    /// Rank by average market cap, 0 = largest. Selection tie-break.
    pub cap_rank: usize,
}

/// Why a symbol was excluded from the feature matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionReason {
    /// Fewer valid in-window observations than required.
    InsufficientData { have: usize, need: usize },
}

/// A symbol excluded before projection, with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureExclusion {
    pub symbol: Symbol,
    pub reason: ExclusionReason,
}

/// The assembled feature matrix: one row per eligible asset, rows
/// ordered by symbol for determinism.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    profiles: Vec<AssetProfile>,
}

impl FeatureMatrix {
    /// Number of assets (rows).
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    /// Whether no asset survived feature building.
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        N_FEATURES
    }

    /// Rows in symbol order.
    pub fn profiles(&self) -> &[AssetProfile] {
        &self.profiles
    }

    /// Symbols in row order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.profiles.iter().map(|p| p.symbol.clone()).collect()
    }

    /// Look up one asset's profile.
    pub fn profile(&self, symbol: &str) -> Option<&AssetProfile> {
        self.profiles.iter().find(|p| p.symbol == symbol)
    }

    /// One feature column across all assets, in row order.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.profiles.iter().map(|p| p.features[index]).collect()
    }
}

/// Result of feature building: the matrix plus everything that was
/// worked around to produce it.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureBuild {
    pub matrix: FeatureMatrix,
    /// Symbols excluded before projection.
    pub exclusions: Vec<FeatureExclusion>,
    /// Outlier observations dropped, per symbol (only symbols with
    /// at least one drop appear).
    pub outliers: Vec<(Symbol, usize)>,
}

// =============================================================================
// Feature Building
// =============================================================================

/// Intermediate per-symbol result, before cross-sectional features.
struct SymbolStats {
    symbol: Symbol,
    volatility: f64,
    liquidity_ratio: f64,
    mean_log_return: f64,
    avg_volume: f64,
    avg_market_cap: f64,
    dropped: usize,
}

/// Build the feature matrix from per-symbol observation history.
///
/// Deterministic: rows are ordered by symbol and every statistic is a
/// pure function of the supplied observations. `force_sequential`
/// disables parallel per-symbol computation at runtime.
pub fn build_feature_matrix(
    history: &HashMap<Symbol, Vec<Observation>>,
    min_observations: usize,
    force_sequential: bool,
) -> FeatureBuild {
    // Sorted entry list so both the parallel map and the assembled
    // matrix have a stable row order.
    let mut entries: Vec<(&Symbol, &Vec<Observation>)> = history.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let per_symbol = parallel::map_slice(
        &entries,
        |(symbol, observations)| symbol_stats(symbol, observations, min_observations),
        force_sequential,
    );

    let mut stats_rows = Vec::new();
    let mut exclusions = Vec::new();
    let mut outliers = Vec::new();
    for result in per_symbol {
        match result {
            Ok(row) => {
                if row.dropped > 0 {
                    outliers.push((row.symbol.clone(), row.dropped));
                }
                stats_rows.push(row);
            }
            Err(exclusion) => exclusions.push(exclusion),
        }
    }

    // Cross-sectional pass: cap shares and market-cap ranks need the
    // full eligible set.
    let total_cap: f64 = stats_rows.iter().map(|r| r.avg_market_cap).sum();

    let mut rank_order: Vec<usize> = (0..stats_rows.len()).collect();
    rank_order.sort_by(|&a, &b| {
        let (ra, rb) = (&stats_rows[a], &stats_rows[b]);
        rb.avg_market_cap
            .partial_cmp(&ra.avg_market_cap)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| ra.symbol.cmp(&rb.symbol))
    });
    let mut cap_ranks = vec![0usize; stats_rows.len()];
    for (rank, &row_idx) in rank_order.iter().enumerate() {
        cap_ranks[row_idx] = rank;
    }

    let profiles = stats_rows
        .into_iter()
        .zip(cap_ranks)
        .map(|(row, cap_rank)| {
            let cap_share = if total_cap > 0.0 {
                row.avg_market_cap / total_cap
            } else {
                0.0
            };
            let mut features = vec![0.0; N_FEATURES];
            features[col::VOL_ANNUALIZED] = row.volatility;
            features[col::LIQUIDITY_RATIO] = row.liquidity_ratio;
            features[col::INV_VOLATILITY] = if row.volatility > 0.0 {
                1.0 / row.volatility
            } else {
                0.0
            };
            features[col::MEAN_LOG_RETURN] = row.mean_log_return;
            features[col::CAP_SHARE] = cap_share;

            AssetProfile {
                symbol: row.symbol,
                features,
                volatility: row.volatility,
                avg_volume: row.avg_volume,
                avg_market_cap: row.avg_market_cap,
                cap_rank,
            }
        })
        .collect();

    FeatureBuild {
        matrix: FeatureMatrix { profiles },
        exclusions,
        outliers,
    }
}

/// Compute one symbol's in-window statistics.
fn symbol_stats(
    symbol: &Symbol,
    observations: &[Observation],
    min_observations: usize,
) -> Result<SymbolStats, FeatureExclusion> {
    // Drop malformed points as outliers; they are logged, counted, and
    // otherwise invisible to the rest of the pipeline.
    let mut valid: Vec<&Observation> = Vec::with_capacity(observations.len());
    let mut dropped = 0usize;
    for obs in observations {
        match obs.validate() {
            Ok(()) => valid.push(obs),
            Err(err) => {
                debug!(symbol = %symbol, error = %err, "dropping outlier observation");
                dropped += 1;
            }
        }
    }
    valid.sort_by_key(|o| o.timestamp);

    let insufficient = |have: usize| FeatureExclusion {
        symbol: symbol.clone(),
        reason: ExclusionReason::InsufficientData {
            have,
            need: min_observations,
        },
    };

    if valid.len() < min_observations {
        return Err(insufficient(valid.len()));
    }

    let prices: Vec<f64> = valid.iter().map(|o| o.price).collect();
    let returns = stats::log_returns(&prices);

    // Volatility needs at least two returns (three prices). A symbol
    // that clears min_observations but still cannot produce a sample
    // standard deviation is treated as insufficient history.
    let volatility = match stats::annualized_volatility(&returns) {
        Some(vol) => vol,
        None => return Err(insufficient(valid.len())),
    };

    let avg_volume = stats::mean(&valid.iter().map(|o| o.volume).collect::<Vec<_>>())
        .unwrap_or(0.0);
    let avg_market_cap = stats::mean(&valid.iter().map(|o| o.market_cap).collect::<Vec<_>>())
        .unwrap_or(0.0);
    let liquidity_ratio = if avg_market_cap > 0.0 {
        avg_volume / avg_market_cap
    } else {
        0.0
    };

    Ok(SymbolStats {
        symbol: symbol.clone(),
        volatility,
        liquidity_ratio,
        mean_log_return: stats::mean(&returns).unwrap_or(0.0),
        avg_volume,
        avg_market_cap,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Daily observations with a fixed 1% up / 1% down alternation.
    fn history_for(symbol: &str, days: usize, start_price: f64, cap: f64) -> Vec<Observation> {
        let mut price = start_price;
        (0..days)
            .map(|i| {
                price *= if i % 2 == 0 { 1.01 } else { 0.99 };
                Observation::new(symbol, price, cap, cap * 0.05, i as u64 * 86_400_000)
            })
            .collect()
    }

    fn single_symbol_build(observations: Vec<Observation>, min_obs: usize) -> FeatureBuild {
        let mut history = HashMap::new();
        history.insert(observations[0].symbol.clone(), observations);
        build_feature_matrix(&history, min_obs, true)
    }

    #[test]
    fn builds_fixed_order_rows_sorted_by_symbol() {
        let mut history = HashMap::new();
        for sym in ["ETH", "BTC", "SOL"] {
            history.insert(sym.to_string(), history_for(sym, 30, 100.0, 1e9));
        }
        let build = build_feature_matrix(&history, 20, true);

        assert_eq!(build.matrix.symbols(), vec!["BTC", "ETH", "SOL"]);
        assert!(build.exclusions.is_empty());
        for profile in build.matrix.profiles() {
            assert_eq!(profile.features.len(), N_FEATURES);
        }
    }

    #[test]
    fn short_history_excluded_not_fatal() {
        let mut history = HashMap::new();
        history.insert("BTC".to_string(), history_for("BTC", 30, 100.0, 1e9));
        history.insert("DOGE".to_string(), history_for("DOGE", 5, 1.0, 1e7));
        let build = build_feature_matrix(&history, 20, true);

        assert_eq!(build.matrix.len(), 1);
        assert_eq!(build.exclusions.len(), 1);
        assert_eq!(build.exclusions[0].symbol, "DOGE");
        assert_eq!(
            build.exclusions[0].reason,
            ExclusionReason::InsufficientData { have: 5, need: 20 }
        );
    }

    #[test]
    fn outliers_dropped_and_counted() {
        let mut observations = history_for("BTC", 30, 100.0, 1e9);
        observations.push(Observation::new("BTC", -5.0, 1e9, 1e6, 999));
        observations.push(Observation::new("BTC", 100.0, -1.0, 1e6, 998));
        let build = single_symbol_build(observations, 20);

        assert_eq!(build.matrix.len(), 1);
        assert_eq!(build.outliers, vec![("BTC".to_string(), 2)]);
    }

    #[test]
    fn flat_prices_produce_zero_volatility_features() {
        let observations: Vec<Observation> = (0..30)
            .map(|i| Observation::new("USDX", 1.0, 1e8, 1e6, i as u64 * 86_400_000))
            .collect();
        let build = single_symbol_build(observations, 20);

        let profile = build.matrix.profile("USDX").unwrap();
        assert_eq!(profile.features[col::VOL_ANNUALIZED], 0.0);
        // Flat series carries no inverse-volatility information
        assert_eq!(profile.features[col::INV_VOLATILITY], 0.0);
    }

    #[test]
    fn cap_share_and_rank_are_cross_sectional() {
        let mut history = HashMap::new();
        history.insert("BIG".to_string(), history_for("BIG", 30, 100.0, 3e9));
        history.insert("SMALL".to_string(), history_for("SMALL", 30, 10.0, 1e9));
        let build = build_feature_matrix(&history, 20, true);

        let big = build.matrix.profile("BIG").unwrap();
        let small = build.matrix.profile("SMALL").unwrap();
        assert_eq!(big.cap_rank, 0);
        assert_eq!(small.cap_rank, 1);
        assert!((big.features[col::CAP_SHARE] - 0.75).abs() < 1e-9);
        assert!((small.features[col::CAP_SHARE] - 0.25).abs() < 1e-9);
    }

    #[test]
    fn determinism_parallel_matches_sequential() {
        let mut history = HashMap::new();
        for sym in ["A", "B", "C", "D", "E", "F"] {
            history.insert(sym.to_string(), history_for(sym, 40, 50.0, 1e8));
        }
        let sequential = build_feature_matrix(&history, 20, true);
        let parallel = build_feature_matrix(&history, 20, false);
        assert_eq!(sequential, parallel);
    }
}
