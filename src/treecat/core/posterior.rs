//! Conjugate Dirichlet posteriors and edge marginal-likelihood scores.
//!
//! Purpose
//! -------
//! Turn the decayed sufficient statistics into (a) posterior-mean probability
//! tables for the current tree, used to parameterize directed propagation,
//! and (b) a per-pair Dirichlet-multinomial marginal log-likelihood score
//! over the **complete graph**, used as the potential function for spanning
//! tree structure search. Both computations are pure functions of a
//! [`SufficientStats`] store (plus the current [`TreeTopology`] for the
//! posterior); nothing here carries state of its own.
//!
//! ## Priors
//! A Jeffreys prior of `0.5` per vertex cell, and `0.5 / M` per edge cell,
//! forcing a sparse prior on edges.
//!
//! ## Score scale
//! [`compute_edge_logits`] deliberately drops the normalizing
//! `ln Γ(α)` / `ln Γ(M·α)` terms, which cancel across compared spanning
//! trees. The logits are meaningful for **relative comparison only**; they
//! must not be mixed with absolute-scale likelihoods computed elsewhere.
use crate::structure::graph::{complete_graph, pair_index};
use crate::treecat::core::stats::SufficientStats;
use crate::treecat::core::topology::TreeTopology;
use ndarray::{Array1, Array2, Array3, ArrayView2};
use statrs::function::gamma::ln_gamma;

/// Jeffreys prior concentration per vertex cell.
pub(crate) const VERTEX_PRIOR: f64 = 0.5;

/// Posterior-mean probability tables for one tree topology.
///
/// `vertex_probs` has one normalized row per vertex; `edge_probs` has one
/// normalized `M×M` joint block per tree edge, with the first axis indexing
/// the lower-numbered endpoint of the canonicalized edge.
#[derive(Debug, Clone)]
pub struct Posterior {
    /// `(V, M)` vertex marginals.
    pub vertex_probs: Array2<f64>,
    /// `(E, M, M)` edge joints, aligned with `topology.edges()`.
    pub edge_probs: Array3<f64>,
}

/// Posterior means under the Dirichlet prior, restricted to the current
/// tree.
///
/// Vertex rows are `(0.5 + counts) / row_sum`; each edge block is
/// `(0.5 / M + counts) / block_sum`, looked up in the complete-graph table
/// via the pair index of the edge's endpoints.
pub fn get_posterior(stats: &SufficientStats, topology: &TreeTopology) -> Posterior {
    let m = stats.capacity();
    let edge_prior = VERTEX_PRIOR / m as f64;

    let mut vertex_probs = &stats.vertex_stats() + VERTEX_PRIOR;
    for mut row in vertex_probs.rows_mut() {
        let total = row.sum();
        row /= total;
    }

    let complete = stats.complete_stats();
    let mut edge_probs = Array3::zeros((topology.num_edges(), m, m));
    for (e, &(v1, v2)) in topology.edges().iter().enumerate() {
        let k = pair_index(v1, v2);
        let mut block = edge_probs.index_axis_mut(ndarray::Axis(0), e);
        let counts = complete.row(k);
        let total: f64 = counts.iter().map(|&c| c + edge_prior).sum();
        for s1 in 0..m {
            for s2 in 0..m {
                block[(s1, s2)] = (counts[s1 * m + s2] + edge_prior) / total;
            }
        }
    }

    Posterior { vertex_probs, edge_probs }
}

/// Non-normalized marginal log-likelihood score of every complete-graph
/// pair.
///
/// For pair `k = (v1, v2)` the score is the Dirichlet-multinomial marginal
/// log-likelihood of the pairwise joint counts minus the marginal scores of
/// both endpoints' vertex counts, a pairwise mutual-information-like
/// quantity. The resulting `(K,)` vector is the potential handed to the
/// spanning-tree structure-search kernel; pairs that are not currently tree
/// edges are scored all the same.
pub fn compute_edge_logits(stats: &SufficientStats) -> Array1<f64> {
    let m = stats.capacity() as f64;
    let vertex_logits = dirmul_log_prob(VERTEX_PRIOR, stats.vertex_stats());
    let mut edge_logits = dirmul_log_prob(VERTEX_PRIOR / m, stats.complete_stats());
    for (k, &(v1, v2)) in complete_graph(stats.num_vertices()).iter().enumerate() {
        edge_logits[k] -= vertex_logits[v1] + vertex_logits[v2];
    }
    edge_logits
}

/// Non-normalized Dirichlet-multinomial marginal log-likelihood per row.
///
/// For scalar concentration `alpha` and a non-negative count row `c`,
/// the value is `Σ_i ln Γ(alpha + c_i) − Σ_i ln Γ(1 + c_i)`; the
/// `ln Γ(alpha)` and `ln Γ(n·alpha)` normalizers are omitted deliberately
/// because they cancel across compared models.
pub(crate) fn dirmul_log_prob(alpha: f64, counts: ArrayView2<'_, f64>) -> Array1<f64> {
    counts.rows().into_iter().map(|row| {
        row.iter().map(|&c| ln_gamma(alpha + c) - ln_gamma(1.0 + c)).sum()
    }).collect()
}
