//! The index computation cycle and its single-writer engine.
//!
//! [`compute_cycle`] is the pure pipeline: fetch, feature building,
//! projection, selection, weighting, finalization. It holds no state,
//! so tests drive it directly with whatever previous snapshot they
//! like. [`IndexEngine`] wraps it with the chaining discipline: one
//! cycle at a time, each new snapshot chained to the last committed
//! one, and nothing mutated when a cycle fails.
//!
//! # Design Notes
//!
//! The fetch window is widened backwards to the previous snapshot's
//! timestamp when that lies before the lookback window, so the chaining
//! return always has a reference price. Feature computation still sees
//! only the lookback window.

use crate::error::CycleError;
use crate::select::select_constituents;
use crate::sink::SnapshotSink;
use crate::source::ObservationSource;
use crate::weights::compute_weights;
use manifold::{standardize, DistanceMatrix, Projector};
use parking_lot::Mutex;
use quant::{build_feature_matrix, AssetProfile, ExclusionReason, FEATURE_NAMES};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};
use types::{
    BaseRef, Constituent, IndexConfig, IndexSnapshot, Observation, SnapshotNote, Symbol,
    Timestamp, MILLIS_PER_DAY,
};

// =============================================================================
// Cycle State
// =============================================================================

/// Pipeline stage of a computation cycle, for logs and failure
/// attribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    BuildingFeatures,
    Projecting,
    Selecting,
    Weighting,
    Finalizing,
    Failed,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CycleState::Idle => "idle",
            CycleState::BuildingFeatures => "buildingFeatures",
            CycleState::Projecting => "projecting",
            CycleState::Selecting => "selecting",
            CycleState::Weighting => "weighting",
            CycleState::Finalizing => "finalizing",
            CycleState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

impl CycleError {
    /// The pipeline stage this error aborted.
    pub fn stage(&self) -> CycleState {
        match self {
            CycleError::Config(_) => CycleState::Idle,
            CycleError::Source(_) | CycleError::NoEligibleAssets => CycleState::BuildingFeatures,
            CycleError::Projection(_) => CycleState::Projecting,
            CycleError::Weight(_) => CycleState::Weighting,
            CycleError::Sink(_) => CycleState::Finalizing,
        }
    }
}

// =============================================================================
// Cycle Pipeline
// =============================================================================

/// Run one full computation cycle against `source`, without touching
/// any engine state.
///
/// `previous` is the snapshot to chain from; `None` means the very
/// first cycle, which lands exactly on the configured base index value.
pub fn compute_cycle<S>(
    source: &S,
    projector: &dyn Projector,
    timestamp: Timestamp,
    config: &IndexConfig,
    previous: Option<&IndexSnapshot>,
) -> Result<IndexSnapshot, CycleError>
where
    S: ObservationSource + ?Sized,
{
    config.validate()?;

    let window_start = timestamp.saturating_sub(config.lookback_days as u64 * MILLIS_PER_DAY);
    let fetch_start = previous.map_or(window_start, |p| window_start.min(p.timestamp));

    debug!(state = %CycleState::BuildingFeatures, timestamp, window_start, "cycle started");
    let observations = source.fetch_observations(
        &config.universe,
        (fetch_start, timestamp),
        config.fetch_timeout,
    )?;

    // Every universe symbol gets an entry so missing history surfaces
    // as an insufficient-data note rather than silently vanishing.
    let mut full_history: HashMap<Symbol, Vec<Observation>> = config
        .universe
        .iter()
        .map(|s| (s.clone(), Vec::new()))
        .collect();
    for obs in observations {
        if let Some(entries) = full_history.get_mut(&obs.symbol) {
            entries.push(obs);
        }
    }

    let window_history: HashMap<Symbol, Vec<Observation>> = full_history
        .iter()
        .map(|(symbol, entries)| {
            let in_window = entries
                .iter()
                .filter(|o| o.timestamp >= window_start)
                .cloned()
                .collect();
            (symbol.clone(), in_window)
        })
        .collect();

    let build = build_feature_matrix(
        &window_history,
        config.min_observations,
        config.force_sequential,
    );

    let mut notes: Vec<SnapshotNote> = Vec::new();
    for (symbol, count) in &build.outliers {
        notes.push(SnapshotNote::OutlierDropped {
            symbol: symbol.clone(),
            count: *count,
        });
    }
    for exclusion in &build.exclusions {
        match exclusion.reason {
            ExclusionReason::InsufficientData { have, need } => {
                warn!(symbol = %exclusion.symbol, have, need, "excluding symbol with insufficient history");
                notes.push(SnapshotNote::InsufficientData {
                    symbol: exclusion.symbol.clone(),
                    have,
                    need,
                });
            }
        }
    }
    if build.matrix.is_empty() {
        return Err(CycleError::NoEligibleAssets);
    }

    debug!(state = %CycleState::Projecting, assets = build.matrix.len(), algorithm = projector.name(), "projecting features");
    let rows: Vec<Vec<f64>> = build
        .matrix
        .profiles()
        .iter()
        .map(|p| p.features.clone())
        .collect();
    let standardized = standardize(build.matrix.symbols(), rows, FEATURE_NAMES)?;
    let distances = DistanceMatrix::from_standardized(&standardized);
    let embedding = projector.project(&standardized, config.manifold_dimension)?;

    debug!(state = %CycleState::Selecting, "selecting constituents");
    let selection = select_constituents(
        &embedding,
        &distances,
        build.matrix.profiles(),
        config.constituent_count,
    );
    if selection.is_degraded() {
        warn!(
            requested = selection.requested,
            actual = selection.symbols.len(),
            "degraded selection: fewer eligible assets than requested"
        );
        notes.push(SnapshotNote::DegradedSelection {
            requested: selection.requested,
            actual: selection.symbols.len(),
        });
    }

    debug!(state = %CycleState::Weighting, method = %config.weighting_method, "weighting constituents");
    let chosen: Vec<&AssetProfile> = selection
        .symbols
        .iter()
        .filter_map(|s| build.matrix.profile(s))
        .collect();
    let weighted = compute_weights(config.weighting_method, &chosen)?;
    for symbol in &weighted.excluded {
        notes.push(SnapshotNote::WeightBasisExcluded {
            symbol: symbol.clone(),
        });
    }

    debug!(state = %CycleState::Finalizing, "finalizing snapshot");
    let value = match previous {
        Some(prev) => {
            let weighted_return: f64 = weighted
                .weights
                .iter()
                .map(|(symbol, weight)| {
                    let entries = full_history.get(symbol).map(Vec::as_slice).unwrap_or(&[]);
                    weight * period_return(entries, window_start, prev.timestamp)
                })
                .sum();
            prev.value * (1.0 + weighted_return)
        }
        None => config.base_index_value,
    };

    let snapshot = IndexSnapshot {
        timestamp,
        value,
        constituents: weighted
            .weights
            .iter()
            .map(|(symbol, weight)| Constituent {
                symbol: symbol.clone(),
                weight: *weight,
                updated_at: timestamp,
            })
            .collect(),
        base: previous.map(|p| BaseRef {
            value: p.value,
            timestamp: p.timestamp,
        }),
        notes,
    };
    debug_assert!(snapshot.weights_normalized());

    info!(
        timestamp,
        value = snapshot.value,
        constituents = snapshot.constituents.len(),
        notes = snapshot.notes.len(),
        "cycle finalized"
    );
    Ok(snapshot)
}

/// Price return of one constituent since the previous snapshot.
///
/// Reference price is the latest observation at or before the previous
/// timestamp; if the history starts later, the earliest in-window price
/// stands in. No usable prices at all means a zero return.
fn period_return(history: &[Observation], window_start: Timestamp, previous_ts: Timestamp) -> f64 {
    let mut valid: Vec<&Observation> = history
        .iter()
        .filter(|o| o.price.is_finite() && o.price > 0.0)
        .collect();
    valid.sort_by_key(|o| o.timestamp);

    let last = match valid.last() {
        Some(o) => o.price,
        None => return 0.0,
    };
    let reference = valid
        .iter()
        .rev()
        .find(|o| o.timestamp <= previous_ts)
        .or_else(|| valid.iter().find(|o| o.timestamp >= window_start))
        .map(|o| o.price);

    match reference {
        Some(p) if p > 0.0 => last / p - 1.0,
        _ => 0.0,
    }
}

// =============================================================================
// Index Engine
// =============================================================================

/// Single-writer index engine.
///
/// Owns the data source, the snapshot sink, and the chaining state.
/// `run_cycle` holds the chain lock across compute and commit, so
/// concurrent callers serialize and every committed snapshot chains to
/// its immediate predecessor. A failed cycle leaves the chain (and the
/// sink) exactly as it was.
pub struct IndexEngine<S, K> {
    source: S,
    sink: K,
    projector: Box<dyn Projector>,
    chain: Mutex<Option<IndexSnapshot>>,
}

impl<S, K> IndexEngine<S, K>
where
    S: ObservationSource,
    K: SnapshotSink,
{
    /// Create an engine with an empty chain.
    pub fn new(source: S, sink: K, projector: Box<dyn Projector>) -> Self {
        Self {
            source,
            sink,
            projector,
            chain: Mutex::new(None),
        }
    }

    /// Seed the chain with a previously committed snapshot, e.g. when
    /// resuming from persisted history.
    pub fn with_previous(self, snapshot: IndexSnapshot) -> Self {
        *self.chain.lock() = Some(snapshot);
        self
    }

    /// Run one cycle at `timestamp` and commit the result.
    pub fn run_cycle(
        &self,
        timestamp: Timestamp,
        config: &IndexConfig,
    ) -> Result<IndexSnapshot, CycleError> {
        let mut chain = self.chain.lock();
        let result = compute_cycle(
            &self.source,
            self.projector.as_ref(),
            timestamp,
            config,
            chain.as_ref(),
        )
        .and_then(|snapshot| {
            self.sink.commit(&snapshot)?;
            Ok(snapshot)
        });

        match result {
            Ok(snapshot) => {
                *chain = Some(snapshot.clone());
                Ok(snapshot)
            }
            Err(err) => {
                warn!(state = %CycleState::Failed, stage = %err.stage(), error = %err, "cycle failed");
                Err(err)
            }
        }
    }

    /// The last successfully committed snapshot.
    pub fn last_snapshot(&self) -> Option<IndexSnapshot> {
        self.chain.lock().clone()
    }

    /// Access the snapshot sink.
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Access the observation source.
    pub fn source(&self) -> &S {
        &self.source
    }
}
