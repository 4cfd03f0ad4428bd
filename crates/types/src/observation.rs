//! Raw market observations.
//!
//! An [`Observation`] is one asset at one instant: price, market
//! capitalization, and traded volume. Observations are immutable once
//! ingested; the feature builder validates them and drops outliers
//! rather than mutating them.

use crate::{Symbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single market data point for one asset at one timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Asset symbol. Must be non-empty.
    pub symbol: Symbol,
    /// Last traded price. Must be strictly positive.
    pub price: f64,
    /// Market capitalization in quote currency. Must be non-negative.
    pub market_cap: f64,
    /// Traded volume over the observation interval. Must be non-negative.
    pub volume: f64,
    /// Observation instant, milliseconds since epoch (UTC).
    pub timestamp: Timestamp,
}

impl Observation {
    /// Create a new observation.
    pub fn new(
        symbol: impl Into<Symbol>,
        price: f64,
        market_cap: f64,
        volume: f64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            market_cap,
            volume,
            timestamp,
        }
    }

    /// Check the observation against the data-model invariants.
    ///
    /// Invalid observations are treated as outliers by the feature
    /// builder: dropped and counted, never aborting a cycle.
    pub fn validate(&self) -> Result<(), ObservationError> {
        if self.symbol.is_empty() {
            return Err(ObservationError::EmptySymbol);
        }
        if !(self.price > 0.0) {
            return Err(ObservationError::NonPositivePrice(self.price));
        }
        if self.market_cap < 0.0 || self.market_cap.is_nan() {
            return Err(ObservationError::NegativeMarketCap(self.market_cap));
        }
        if self.volume < 0.0 || self.volume.is_nan() {
            return Err(ObservationError::NegativeVolume(self.volume));
        }
        Ok(())
    }
}

/// Reasons an observation fails validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationError {
    /// Symbol string is empty.
    EmptySymbol,
    /// Price is zero, negative, or NaN.
    NonPositivePrice(f64),
    /// Market cap is negative or NaN.
    NegativeMarketCap(f64),
    /// Volume is negative or NaN.
    NegativeVolume(f64),
}

impl fmt::Display for ObservationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObservationError::EmptySymbol => write!(f, "observation symbol is empty"),
            ObservationError::NonPositivePrice(p) => {
                write!(f, "observation price must be positive, got {}", p)
            }
            ObservationError::NegativeMarketCap(c) => {
                write!(f, "observation market cap must be non-negative, got {}", c)
            }
            ObservationError::NegativeVolume(v) => {
                write!(f, "observation volume must be non-negative, got {}", v)
            }
        }
    }
}

impl std::error::Error for ObservationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(price: f64, cap: f64, volume: f64) -> Observation {
        Observation::new("BTC", price, cap, volume, 1_000)
    }

    #[test]
    fn valid_observation_passes() {
        assert!(obs(100.0, 1e9, 1e6).validate().is_ok());
        // Zero cap and zero volume are allowed (new listings)
        assert!(obs(0.01, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn non_positive_price_rejected() {
        assert!(matches!(
            obs(0.0, 1e9, 1e6).validate(),
            Err(ObservationError::NonPositivePrice(_))
        ));
        assert!(matches!(
            obs(-1.0, 1e9, 1e6).validate(),
            Err(ObservationError::NonPositivePrice(_))
        ));
        assert!(obs(f64::NAN, 1e9, 1e6).validate().is_err());
    }

    #[test]
    fn negative_basis_values_rejected() {
        assert!(matches!(
            obs(1.0, -1.0, 0.0).validate(),
            Err(ObservationError::NegativeMarketCap(_))
        ));
        assert!(matches!(
            obs(1.0, 0.0, -1.0).validate(),
            Err(ObservationError::NegativeVolume(_))
        ));
    }

    #[test]
    fn empty_symbol_rejected() {
        let o = Observation::new("", 1.0, 1.0, 1.0, 0);
        assert_eq!(o.validate(), Err(ObservationError::EmptySymbol));
    }
}
