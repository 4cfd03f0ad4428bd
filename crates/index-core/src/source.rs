//! The observation data source seam.
//!
//! The engine consumes market history through [`ObservationSource`],
//! keeping connectivity, persistence, and retry policy outside the
//! core. An in-memory implementation backs tests and the demo binary.

use crate::error::SourceError;
use std::collections::HashSet;
use std::time::Duration;
use types::{Observation, Symbol, Timestamp};

/// Inclusive observation window `[start, end]`.
pub type TimeWindow = (Timestamp, Timestamp);

/// Abstract market data source.
///
/// A fetch may return an empty or partial sequence; missing history is
/// a per-symbol `InsufficientData` condition, not a hard failure. Every
/// fetch is bounded by the caller-supplied timeout so a cycle can never
/// hang on I/O.
pub trait ObservationSource: Send + Sync {
    /// Fetch all observations for `symbols` within `window`.
    fn fetch_observations(
        &self,
        symbols: &[Symbol],
        window: TimeWindow,
        timeout: Duration,
    ) -> Result<Vec<Observation>, SourceError>;
}

/// In-memory observation store for tests, backfills, and the demo.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    observations: Vec<Observation>,
    /// Pretend each fetch takes this long; fetches whose budget is
    /// smaller fail with a timeout. Lets callers exercise the timeout
    /// path without real I/O.
    simulated_latency: Option<Duration>,
}

impl InMemorySource {
    /// Create a source over a fixed observation set.
    pub fn new(observations: Vec<Observation>) -> Self {
        Self {
            observations,
            simulated_latency: None,
        }
    }

    /// Simulate fetch latency for timeout testing.
    pub fn with_simulated_latency(mut self, latency: Duration) -> Self {
        self.simulated_latency = Some(latency);
        self
    }

    /// Append more observations (backfill setup).
    pub fn extend(&mut self, observations: impl IntoIterator<Item = Observation>) {
        self.observations.extend(observations);
    }
}

impl ObservationSource for InMemorySource {
    fn fetch_observations(
        &self,
        symbols: &[Symbol],
        window: TimeWindow,
        timeout: Duration,
    ) -> Result<Vec<Observation>, SourceError> {
        if let Some(latency) = self.simulated_latency {
            if latency > timeout {
                return Err(SourceError::Timeout(timeout));
            }
        }

        let wanted: HashSet<&Symbol> = symbols.iter().collect();
        let (start, end) = window;
        Ok(self
            .observations
            .iter()
            .filter(|o| o.timestamp >= start && o.timestamp <= end && wanted.contains(&o.symbol))
            .cloned()
            .collect())
    }
}
