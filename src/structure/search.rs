//! Structure-search seam and reference spanning-tree kernels.
//!
//! Purpose
//! -------
//! The Markov-chain kernel that resamples spanning trees in proportion to
//! the product of exponentiated edge scores is an external collaborator; the
//! core only produces the per-pair logits and consumes the proposed edge
//! list. [`StructureSearch`] is that boundary. Two reference kernels ship
//! with the crate: [`FixedTree`], which never rewires (useful to train with
//! a frozen structure and in tests), and [`MaxSpanningTree`], a
//! deterministic Kruskal ascent to the maximum-weight spanning tree under
//! the current logits.
//!
//! Conventions
//! -----------
//! - `edge_logits[k]` scores the complete-graph pair with pair index `k`
//!   (see [`crate::structure::graph::pair_index`]). Logits are comparable
//!   relative to each other only.
//! - A proposal must return exactly `V - 1` edges forming a spanning tree
//!   over the same vertex set; the trainer installs it without re-scoring.
use crate::structure::graph::complete_graph;
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use ndarray::ArrayView1;

/// Spanning-tree proposal kernel consulted once per training step.
pub trait StructureSearch {
    /// Propose a spanning tree given the complete-graph edge scores and the
    /// current tree.
    ///
    /// `edge_logits` has one entry per complete-graph pair in pair-index
    /// order; `current_edges` is the canonicalized active edge list.
    fn propose(
        &mut self, edge_logits: ArrayView1<'_, f64>, current_edges: &[(usize, usize)],
    ) -> TreeCatResult<Vec<(usize, usize)>>;
}

/// Identity kernel: keeps the current tree regardless of scores.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTree;

impl StructureSearch for FixedTree {
    fn propose(
        &mut self, _edge_logits: ArrayView1<'_, f64>, current_edges: &[(usize, usize)],
    ) -> TreeCatResult<Vec<(usize, usize)>> {
        Ok(current_edges.to_vec())
    }
}

/// Deterministic greedy kernel: Kruskal's algorithm on the edge logits.
///
/// Converges to the mode of the spanning-tree ensemble instead of sampling
/// from it; a Metropolis kernel behind the same trait replaces it in
/// production training.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxSpanningTree;

impl StructureSearch for MaxSpanningTree {
    fn propose(
        &mut self, edge_logits: ArrayView1<'_, f64>, current_edges: &[(usize, usize)],
    ) -> TreeCatResult<Vec<(usize, usize)>> {
        let num_vertices = current_edges.len() + 1;
        let pairs = complete_graph(num_vertices);
        if edge_logits.len() != pairs.len() {
            return Err(TreeCatError::NotASpanningTree {
                reason: "edge logits do not cover the complete graph",
            });
        }

        // Sort pair indices by descending logit; ties resolve by pair index
        // so proposals are deterministic.
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        order.sort_by(|&a, &b| {
            edge_logits[b].total_cmp(&edge_logits[a]).then(a.cmp(&b))
        });

        let mut forest = UnionFind::new(num_vertices);
        let mut edges = Vec::with_capacity(num_vertices - 1);
        for k in order {
            let (v1, v2) = pairs[k];
            if forest.union(v1, v2) {
                edges.push((v1, v2));
                if edges.len() == num_vertices - 1 {
                    break;
                }
            }
        }
        if edges.len() != num_vertices - 1 {
            return Err(TreeCatError::NotASpanningTree {
                reason: "greedy selection could not connect every vertex",
            });
        }
        edges.sort_unstable();
        Ok(edges)
    }
}

/// Disjoint-set forest with path halving and union by size.
struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind { parent: (0..n).collect(), size: vec![1; n] }
    }

    fn find(&mut self, mut v: usize) -> usize {
        while self.parent[v] != v {
            self.parent[v] = self.parent[self.parent[v]];
            v = self.parent[v];
        }
        v
    }

    /// Join the components of `a` and `b`; `false` when already joined.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        let (big, small) = if self.size[ra] >= self.size[rb] { (ra, rb) } else { (rb, ra) };
        self.parent[small] = big;
        self.size[big] += self.size[small];
        true
    }
}
