//! Complete-graph pair indexing for structure learning.
//!
//! Sufficient statistics and edge scores are stored for **every** unordered
//! vertex pair, not just the pairs that are currently tree edges, so that
//! candidate edges can be scored during structure search. This module fixes
//! the addressing scheme shared by those tables.
//!
//! ## Indexing convention
//! The unordered pair `(v1, v2)` with `v1 < v2` has the scalar index
//! `k = v1 + v2 * (v2 - 1) / 2`, giving the enumeration
//! `(0,1), (0,2), (1,2), (0,3), (1,3), ...` over the
//! `K = V * (V - 1) / 2` pairs of a `V`-vertex complete graph.

/// Number of unordered vertex pairs in a complete graph over `num_vertices`.
#[inline]
pub fn num_pairs(num_vertices: usize) -> usize {
    num_vertices * (num_vertices.saturating_sub(1)) / 2
}

/// Scalar index of the unordered pair `(v1, v2)` in the complete graph.
///
/// Order-insensitive: `pair_index(a, b) == pair_index(b, a)`.
///
/// # Preconditions
/// `v1 != v2`. Violations are programming errors and are only checked in
/// debug builds.
#[inline]
pub fn pair_index(v1: usize, v2: usize) -> usize {
    debug_assert_ne!(v1, v2, "pair_index is undefined for self-loops");
    let (lo, hi) = if v1 < v2 { (v1, v2) } else { (v2, v1) };
    lo + hi * (hi - 1) / 2
}

/// All unordered vertex pairs of the complete graph, listed in pair-index
/// order, so that `complete_graph(v)[k]` is the pair with index `k`.
pub fn complete_graph(num_vertices: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(num_pairs(num_vertices));
    for v2 in 1..num_vertices {
        for v1 in 0..v2 {
            pairs.push((v1, v2));
        }
    }
    pairs
}
