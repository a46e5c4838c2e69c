//! structure — complete-graph indexing and spanning-tree search seams.
//!
//! Purpose
//! -------
//! Provide the graph-side vocabulary the TreeCat stack is written against:
//! the canonical pair indexing of the complete graph over `V` vertices
//! ([`graph`]) and the structure-search boundary with its reference kernels
//! ([`search`]).
//!
//! Conventions
//! -----------
//! - Pairs are canonicalized as `(lo, hi)` with `lo < hi`; the pair index
//!   `k = lo + hi(hi-1)/2` enumerates `hi` in ascending order and, within a
//!   fixed `hi`, `lo` in ascending order.
//! - Edge-logit vectors are indexed by pair index and are comparable only
//!   relative to each other.
pub mod graph;
pub mod search;

pub use self::graph::{complete_graph, num_pairs, pair_index};
pub use self::search::{FixedTree, MaxSpanningTree, StructureSearch};
