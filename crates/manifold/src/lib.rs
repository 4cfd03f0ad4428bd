//! Dimensionality reduction over asset feature matrices.
//!
//! The manifold projector takes a standardized feature matrix (assets x
//! features) and produces a low-dimensional embedding that preserves
//! local neighborhood structure, plus a pairwise distance matrix in the
//! original feature space for downstream structural grouping.
//!
//! # Modules
//!
//! - [`standardize`] - Mandatory z-score standardization per feature column
//! - [`distance`] - Symmetric pairwise distance matrix
//! - [`project`] - The [`Projector`] contract and the [`Embedding`] type
//! - [`pca`] - Linear projector (principal components via power iteration)
//! - [`diffusion`] - Graph-neighbor projector (diffusion coordinates)
//!
//! # Design Notes
//!
//! - Projection is pluggable behind [`Projector`]; the engine depends
//!   only on the contract, never on a specific algorithm's internals
//! - Everything here is deterministic: power iteration starts from a
//!   fixed vector, never a random one, so identical input yields a
//!   bit-identical embedding

pub mod diffusion;
pub mod distance;
mod eigen;
pub mod pca;
pub mod project;
pub mod standardize;

pub use diffusion::DiffusionProjector;
pub use distance::DistanceMatrix;
pub use pca::PcaProjector;
pub use project::{Embedding, ProjectionError, Projector};
pub use standardize::{standardize, Standardized};
