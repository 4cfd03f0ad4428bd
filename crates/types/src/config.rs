//! Index construction configuration.
//!
//! [`IndexConfig`] carries every knob the engine recognizes. It follows
//! the builder convention used throughout the workspace: `Default` plus
//! chained `with_*` setters, validated once at the start of a cycle.

use crate::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

// =============================================================================
// Weighting Method
// =============================================================================

/// Constituent weighting methodology.
///
/// A closed set selected by exhaustive match, so adding a method is a
/// compile-time event rather than a runtime string lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WeightingMethod {
    /// Weight proportional to market capitalization.
    MarketCap,
    /// Weight proportional to trailing average traded volume.
    Volume,
    /// Weight proportional to volume / market cap (liquidity proxy).
    Liquidity,
    /// Weight proportional to inverse volatility. This is the diagonal
    /// covariance approximation of risk parity: each constituent
    /// contributes equal marginal risk assuming zero cross-asset
    /// covariance. A full covariance optimization is deliberately out
    /// of scope.
    RiskParity,
}

impl WeightingMethod {
    /// All supported methods, for help text and iteration.
    pub const ALL: [WeightingMethod; 4] = [
        WeightingMethod::MarketCap,
        WeightingMethod::Volume,
        WeightingMethod::Liquidity,
        WeightingMethod::RiskParity,
    ];
}

impl fmt::Display for WeightingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeightingMethod::MarketCap => "marketCap",
            WeightingMethod::Volume => "volume",
            WeightingMethod::Liquidity => "liquidity",
            WeightingMethod::RiskParity => "riskParity",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for WeightingMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marketCap" | "market_cap" | "market-cap" => Ok(WeightingMethod::MarketCap),
            "volume" => Ok(WeightingMethod::Volume),
            "liquidity" => Ok(WeightingMethod::Liquidity),
            "riskParity" | "risk_parity" | "risk-parity" => Ok(WeightingMethod::RiskParity),
            other => Err(ConfigError::UnknownWeightingMethod(other.to_string())),
        }
    }
}

// =============================================================================
// Index Configuration
// =============================================================================

/// Configuration for one index computation cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Candidate universe. The engine fetches observations for exactly
    /// these symbols; membership of the universe itself is a caller
    /// decision.
    pub universe: Vec<Symbol>,
    /// Historical window length in days used for feature computation.
    pub lookback_days: u32,
    /// Target number of index constituents.
    pub constituent_count: usize,
    /// Rebalance cadence in days. Governs the caller's scheduling only;
    /// the engine computes whenever asked.
    pub update_frequency_days: u32,
    /// Weighting methodology.
    pub weighting_method: WeightingMethod,
    /// Target embedding dimension for the manifold projection.
    pub manifold_dimension: usize,
    /// Minimum valid in-window observations a symbol needs to be
    /// eligible for the feature matrix.
    pub min_observations: usize,
    /// Index level for the very first cycle (no previous snapshot).
    pub base_index_value: f64,
    /// Upper bound on a single data-source fetch. Exceeding it surfaces
    /// as a retryable timeout, never a hang.
    pub fetch_timeout: Duration,
    /// Force sequential per-symbol feature computation even when the
    /// `parallel` feature is enabled. Useful for profiling and debugging.
    pub force_sequential: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            universe: Vec::new(),
            lookback_days: 30,
            constituent_count: 10,
            update_frequency_days: 7,
            weighting_method: WeightingMethod::MarketCap,
            manifold_dimension: 2,
            min_observations: 20,
            base_index_value: 1000.0,
            fetch_timeout: Duration::from_secs(30),
            force_sequential: false,
        }
    }
}

impl IndexConfig {
    /// Create a configuration for the given universe with defaults.
    pub fn new(universe: Vec<Symbol>) -> Self {
        Self {
            universe,
            ..Default::default()
        }
    }

    /// Set the lookback window in days.
    pub fn with_lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// Set the target constituent count.
    pub fn with_constituent_count(mut self, count: usize) -> Self {
        self.constituent_count = count;
        self
    }

    /// Set the rebalance cadence in days.
    pub fn with_update_frequency_days(mut self, days: u32) -> Self {
        self.update_frequency_days = days;
        self
    }

    /// Set the weighting methodology.
    pub fn with_weighting_method(mut self, method: WeightingMethod) -> Self {
        self.weighting_method = method;
        self
    }

    /// Set the manifold embedding dimension.
    pub fn with_manifold_dimension(mut self, k: usize) -> Self {
        self.manifold_dimension = k;
        self
    }

    /// Set the minimum in-window observation count per symbol.
    pub fn with_min_observations(mut self, min: usize) -> Self {
        self.min_observations = min;
        self
    }

    /// Set the base index value used by the first cycle.
    pub fn with_base_index_value(mut self, base: f64) -> Self {
        self.base_index_value = base;
        self
    }

    /// Set the data-source fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Force sequential feature computation.
    pub fn with_force_sequential(mut self, force: bool) -> Self {
        self.force_sequential = force;
        self
    }

    /// Check the configuration against its documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.is_empty() {
            return Err(ConfigError::EmptyUniverse);
        }
        if self.lookback_days == 0 {
            return Err(ConfigError::NonPositive("lookback_days"));
        }
        if self.constituent_count == 0 {
            return Err(ConfigError::NonPositive("constituent_count"));
        }
        if self.update_frequency_days == 0 {
            return Err(ConfigError::NonPositive("update_frequency_days"));
        }
        if self.manifold_dimension == 0 {
            return Err(ConfigError::NonPositive("manifold_dimension"));
        }
        if self.min_observations == 0 {
            return Err(ConfigError::NonPositive("min_observations"));
        }
        if !(self.base_index_value > 0.0) {
            return Err(ConfigError::NonPositiveBase(self.base_index_value));
        }
        Ok(())
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration validation failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The candidate universe contains no symbols.
    EmptyUniverse,
    /// A count/period field that must be positive is zero.
    NonPositive(&'static str),
    /// The base index value is zero, negative, or NaN.
    NonPositiveBase(f64),
    /// Unrecognized weighting method name.
    UnknownWeightingMethod(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyUniverse => write!(f, "universe must contain at least one symbol"),
            ConfigError::NonPositive(field) => write!(f, "{} must be positive", field),
            ConfigError::NonPositiveBase(v) => {
                write!(f, "base_index_value must be positive, got {}", v)
            }
            ConfigError::UnknownWeightingMethod(s) => {
                write!(
                    f,
                    "unknown weighting method '{}' (expected one of: marketCap, volume, liquidity, riskParity)",
                    s
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}
