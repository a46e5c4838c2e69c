//! core — TreeCat data, topology, statistics, and posterior primitives.
//!
//! Purpose
//! -------
//! Collect the building blocks the model and trainer layers are wired from:
//! validated tabular batches, the canonicalized spanning tree with its
//! derived adjacency structures, the decayed sufficient-statistics store,
//! and the conjugate Dirichlet posterior with per-edge marginal-likelihood
//! scoring.
//!
//! Key behaviors
//! -------------
//! - Track observed batches in [`TableData`]: per-column optional arrays of
//!   equal length, at least one present.
//! - Represent the active tree in [`TreeTopology`]: canonical `(lo, hi)`
//!   edges, flat CSR adjacency, an edge index usable from either endpoint,
//!   and the leaf-pruning center used as traversal root.
//! - Accumulate decayed latent co-occurrence counts in [`SufficientStats`],
//!   covering every vertex pair of the complete graph.
//! - Convert counts to posterior-mean probability tables
//!   ([`get_posterior`]) and to per-pair Dirichlet-multinomial logits
//!   ([`compute_edge_logits`]) for structure search.
//!
//! Invariants & assumptions
//! ------------------------
//! - All count tables hold finite, strictly positive `f64` values; seeding
//!   guarantees positivity and the decay factor lies in `(0, 1]`.
//! - Pair-major layouts follow [`crate::structure::graph::pair_index`]; a
//!   pair block for `(v1, v2)` with `v1 < v2` stores `v1`'s state on the
//!   first axis.
//! - Statistics validate the full update before mutating anything.
pub mod data;
pub mod posterior;
pub mod stats;
pub mod topology;

pub use self::data::TableData;
pub use self::posterior::{compute_edge_logits, get_posterior, Posterior};
pub use self::stats::SufficientStats;
pub use self::topology::TreeTopology;
