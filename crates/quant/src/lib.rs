//! Statistics and feature extraction for index construction.
//!
//! # Modules
//!
//! - [`stats`] - Statistical utilities (returns, volatility)
//! - [`features`] - The feature builder: per-asset observation history
//!   in, feature matrix out
//!
//! # Design Notes
//!
//! - All calculations use `f64` and are deterministic: identical input
//!   observations produce identical feature vectors, with no hidden
//!   randomness or wall-clock dependence
//! - The feature builder is a pure function over its inputs; it holds
//!   no state between computation cycles

pub mod features;
pub mod stats;

pub use features::{
    AssetProfile, ExclusionReason, FeatureBuild, FeatureExclusion, FeatureMatrix, FEATURE_NAMES,
    build_feature_matrix,
};
