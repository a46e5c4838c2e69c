//! treecat — tree-structured latent categorical models for tabular data.
//!
//! Purpose
//! -------
//! Provide a cohesive TreeCat stack: validated tabular batches, decayed
//! sufficient statistics over the complete graph, the conjugate Dirichlet
//! posterior, the directed tree forward pass, and the six-phase training
//! loop, together with the error types and the trait seams for external
//! collaborators (feature models, sampling sites, parameter optimizers).
//! This is the surface most consumers should depend on.
//!
//! Key behaviors
//! -------------
//! - Collect core numerical and structural building blocks in [`core`]:
//!   tabular batches ([`TableData`]), the active tree ([`TreeTopology`]),
//!   decayed count tables ([`SufficientStats`]), and the conjugate posterior
//!   with its per-edge marginal-likelihood scores.
//! - Expose the user-facing model and training APIs in [`models`]:
//!   [`TreeCat`] (forward pass, imputation, structure mutation) and
//!   [`TreeCatTrainer`] (the six-phase minibatch step).
//! - Define the external-collaborator seams in [`traits`] and [`sites`]:
//!   [`Feature`] / [`Mixture`] for per-column likelihood models,
//!   [`SampleSite`] for named sample statements, and [`Optimizer`] for
//!   parameter learning. Reference implementations live in [`features`]
//!   and [`sites`].
//! - Centralize TreeCat-specific error types in [`errors`]
//!   ([`TreeCatError`] and the [`TreeCatResult`] alias) so callers see a
//!   uniform error surface across the stack.
//!
//! Invariants & assumptions
//! ------------------------
//! - Latent capacity `M > 1` is fixed for a model's lifetime and shared by
//!   every vertex; sufficient statistics cover all `V(V-1)/2` vertex pairs
//!   so any spanning tree can be scored without re-accumulation.
//! - The active edge set always holds exactly `V - 1` canonicalized
//!   `(lo, hi)` edges; topology changes go through [`TreeCat::set_edges`]
//!   and rebuild adjacency, edge index, and center atomically.
//! - Statistics updates are atomic: validation of the realized latent
//!   matrix happens before any mutation, so a failed update leaves the
//!   store untouched.
//! - Posterior tables are ordinary `ndarray` containers of finite positive
//!   probabilities; normalization is row-wise for vertices and block-wise
//!   for edges.
//!
//! Conventions
//! -----------
//! - Vertices are column indices `0..V`; feature order defines vertex
//!   order. Pair `k`-indexing follows [`crate::structure::graph::pair_index`].
//! - Sample-site names are derived from feature names: `z_{name}` for the
//!   latent class of a column, `x_{name}` for its value.
//! - The stack performs no I/O; diagnostics go through `tracing` at debug
//!   level. Error conditions are surfaced as [`TreeCatResult`]; panics
//!   indicate programming errors such as traversal stepping off the tree.
pub mod core;
pub mod errors;
pub mod features;
pub mod models;
pub mod sites;
pub mod traits;

// ---- Re-exports (primary public surface) ----------------------------------
//
// The everyday types. Lower-level pieces (the propagator, the raw posterior
// functions, pair-index helpers) stay under their submodules.

pub use self::core::{Posterior, SufficientStats, TableData, TreeTopology};

pub use self::errors::{TreeCatError, TreeCatResult};

pub use self::features::{DiscreteFeature, MapOptimizer, RealFeature};

pub use self::models::{TreeCat, TreeCatTrainer, DEFAULT_ANNEALING_RATE};

pub use self::sites::{RandomSite, SampleSite, ValueDist};

pub use self::traits::{Feature, Mixture, Optimizer};

/// One-line import of the TreeCat surface for downstream code.
pub mod prelude {
    pub use super::core::{Posterior, SufficientStats, TableData, TreeTopology};
    pub use super::errors::{TreeCatError, TreeCatResult};
    pub use super::features::{DiscreteFeature, MapOptimizer, RealFeature};
    pub use super::models::{TreeCat, TreeCatTrainer, DEFAULT_ANNEALING_RATE};
    pub use super::sites::{RandomSite, SampleSite, ValueDist};
    pub use super::traits::{Feature, Mixture, Optimizer};
    pub use crate::structure::search::{FixedTree, MaxSpanningTree, StructureSearch};
}
