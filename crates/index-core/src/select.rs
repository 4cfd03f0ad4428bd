//! Constituent selection on the manifold embedding.
//!
//! Greedy diversity-aware centrality: each pick maximizes a score that
//! rewards assets central to the embedded universe and penalizes
//! feature-space proximity to assets already selected. Central assets
//! are representative of the market's dominant structure; the
//! redundancy penalty stops the index from stacking near-duplicates of
//! the first pick.
//!
//! With fewer eligible assets than requested, every eligible asset is
//! selected and the shortfall is reported, never an error.

use manifold::{DistanceMatrix, Embedding};
use quant::AssetProfile;
use tracing::debug;
use types::Symbol;

/// Relative strength of the redundancy penalty against centrality.
///
/// Affinity to the closest already-selected asset is in (0, 1], the
/// same range as centrality, so 0.5 lets a strongly central asset win
/// over a moderately redundant one but not over a near-duplicate.
const REDUNDANCY_WEIGHT: f64 = 0.5;

/// Outcome of constituent selection, in selection order.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Selected symbols, highest-scoring first.
    pub symbols: Vec<Symbol>,
    /// The configured constituent count this selection aimed for.
    pub requested: usize,
}

impl Selection {
    /// Whether fewer assets were selected than requested.
    pub fn is_degraded(&self) -> bool {
        self.symbols.len() < self.requested
    }
}

/// Select up to `count` constituents from the embedded universe.
///
/// `embedding`, `distances`, and `profiles` must share row order (all
/// three derive from the same feature matrix). Deterministic: score
/// ties break toward the lower market-cap rank.
pub fn select_constituents(
    embedding: &Embedding,
    distances: &DistanceMatrix,
    profiles: &[AssetProfile],
    count: usize,
) -> Selection {
    let n = embedding.len();
    debug_assert_eq!(n, profiles.len());
    debug_assert_eq!(n, distances.len());

    // Centrality in embedding space: closer to everyone = higher.
    let centrality: Vec<f64> = (0..n).map(|i| 1.0 / (1.0 + embedding.mean_distance(i))).collect();

    let mut selected: Vec<usize> = Vec::with_capacity(count.min(n));
    let mut remaining: Vec<usize> = (0..n).collect();

    while selected.len() < count && !remaining.is_empty() {
        let mut best: Option<(usize, f64)> = None;
        for (slot, &candidate) in remaining.iter().enumerate() {
            // Redundancy: affinity to the nearest already-selected
            // asset, measured in feature space.
            let redundancy = selected
                .iter()
                .map(|&s| 1.0 / (1.0 + distances.get(candidate, s)))
                .fold(0.0, f64::max);
            let score = centrality[candidate] - REDUNDANCY_WEIGHT * redundancy;

            let better = match best {
                None => true,
                Some((best_slot, best_score)) => {
                    score > best_score
                        || (score == best_score
                            && profiles[candidate].cap_rank
                                < profiles[remaining[best_slot]].cap_rank)
                }
            };
            if better {
                best = Some((slot, score));
            }
        }

        // remaining is non-empty, so best is always set here
        if let Some((slot, score)) = best {
            let picked = remaining.swap_remove(slot);
            debug!(symbol = %profiles[picked].symbol, score, "selected constituent");
            selected.push(picked);
        }
    }

    Selection {
        symbols: selected.iter().map(|&i| profiles[i].symbol.clone()).collect(),
        requested: count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifold::{standardize, PcaProjector, Projector};

    /// Three near-duplicate assets plus two distinct ones.
    fn fixture() -> (Embedding, DistanceMatrix, Vec<AssetProfile>) {
        let rows = vec![
            vec![1.0, 2.0, 3.0],
            vec![1.05, 2.05, 3.05],
            vec![1.1, 1.95, 2.95],
            vec![8.0, 1.0, 0.5],
            vec![0.5, 9.0, 7.0],
        ];
        let symbols: Vec<Symbol> = ["A", "B", "C", "D", "E"].iter().map(|s| s.to_string()).collect();
        let profiles: Vec<AssetProfile> = symbols
            .iter()
            .enumerate()
            .map(|(i, s)| AssetProfile {
                symbol: s.clone(),
                features: rows[i].clone(),
                volatility: 0.5,
                avg_volume: 1e6,
                avg_market_cap: 1e9 / (i + 1) as f64,
                cap_rank: i,
            })
            .collect();
        let standardized = standardize(symbols, rows, &["x", "y", "z"]).unwrap();
        let distances = DistanceMatrix::from_standardized(&standardized);
        let embedding = PcaProjector::default().project(&standardized, 2).unwrap();
        (embedding, distances, profiles)
    }

    #[test]
    fn selects_requested_count() {
        let (embedding, distances, profiles) = fixture();
        let selection = select_constituents(&embedding, &distances, &profiles, 3);
        assert_eq!(selection.symbols.len(), 3);
        assert!(!selection.is_degraded());
    }

    #[test]
    fn redundancy_penalty_spreads_picks_across_clusters() {
        let (embedding, distances, profiles) = fixture();
        let selection = select_constituents(&embedding, &distances, &profiles, 3);
        // A, B, C are near-duplicates; at most two of the three picks
        // may come from that cluster.
        let cluster_picks = selection
            .symbols
            .iter()
            .filter(|s| ["A", "B", "C"].contains(&s.as_str()))
            .count();
        assert!(cluster_picks <= 2, "picked {:?}", selection.symbols);
    }

    #[test]
    fn small_universe_selects_everything_and_reports_shortfall() {
        let (embedding, distances, profiles) = fixture();
        let selection = select_constituents(&embedding, &distances, &profiles, 10);
        assert_eq!(selection.symbols.len(), 5);
        assert!(selection.is_degraded());
        assert_eq!(selection.requested, 10);
    }

    #[test]
    fn selection_is_deterministic() {
        let (embedding, distances, profiles) = fixture();
        let a = select_constituents(&embedding, &distances, &profiles, 4);
        let b = select_constituents(&embedding, &distances, &profiles, 4);
        assert_eq!(a, b);
    }
}
