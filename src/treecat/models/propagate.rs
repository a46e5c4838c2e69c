//! Directed propagation over the rooted tree.
//!
//! Purpose
//! -------
//! Realize every latent and observed variable consistently with the
//! undirected tree: starting from the centrally chosen root, each vertex's
//! latent state is determined from its parent's realized state through the
//! edge's joint posterior table, and each observed value from the vertex's
//! own latent state through the column's mixture. The traversal is
//! re-derived from the topology on every call; no cached direction survives
//! a structure-search update.
//!
//! Key behaviors
//! -------------
//! - Explicit worklist of vertices tagged with their discovery edge instead
//!   of recursion, so wide or deep trees cannot exhaust the call stack.
//! - Root conditional is the vertex-marginal row broadcast across the
//!   batch; non-root conditionals index the edge's `M×M` joint block by the
//!   parent's realized state per row, transposing the block when the edge
//!   was stored with the endpoints in the opposite order.
//! - Observed sites condition on present data; fully missing columns are
//!   realized only when imputation is requested.
//!
//! Concurrency
//! -----------
//! The traversal is expressed sequentially but its ordering guarantee is
//! only a partial order by tree depth: a child needs its parent's realized
//! latent value and nothing else, so sibling subtrees are independent and
//! rows are data-parallel. The central root exists to balance subtree
//! depths for exactly that reason.
use crate::treecat::core::data::TableData;
use crate::treecat::core::posterior::Posterior;
use crate::treecat::core::topology::TreeTopology;
use crate::treecat::errors::TreeCatResult;
use crate::treecat::sites::SampleSite;
use crate::treecat::traits::Mixture;
use ndarray::{Array1, Array2, Axis};

/// Realized variables for one propagation pass.
#[derive(Debug, Clone)]
pub struct Propagated {
    /// `(V, batch)` realized latent states.
    pub z: Array2<usize>,
    /// Per-column realized values; `None` for columns that were missing and
    /// not imputed.
    pub x: Vec<Option<Array1<f64>>>,
}

/// Directed-propagation pass over one topology and posterior point
/// estimate.
///
/// Borrows the topology and tables immutably; the topology must not change
/// for the lifetime of the propagator (single-writer, step-boundary
/// discipline).
pub struct TreePropagator<'a> {
    topology: &'a TreeTopology,
    posterior: &'a Posterior,
    capacity: usize,
}

impl<'a> TreePropagator<'a> {
    pub fn new(topology: &'a TreeTopology, posterior: &'a Posterior, capacity: usize) -> Self {
        TreePropagator { topology, posterior, capacity }
    }

    /// Realize latent states and observed values for one batch.
    ///
    /// `mixtures` holds one frozen mixture per vertex (step-local feature
    /// parameters); `names` the per-vertex site-name stems. Every sampling
    /// statement is routed through `site`.
    pub fn run(
        &self, data: &TableData, impute: bool, mixtures: &[Box<dyn Mixture>], names: &[&str],
        site: &mut dyn SampleSite,
    ) -> TreeCatResult<Propagated> {
        let num_vertices = self.topology.num_vertices();
        let batch_size = data.batch_size();
        let m = self.capacity;

        let mut z = Array2::<usize>::zeros((num_vertices, batch_size));
        let mut x: Vec<Option<Array1<f64>>> = vec![None; num_vertices];
        let mut visited = vec![false; num_vertices];

        let root = self.topology.center();
        // Each entry carries the parent and the index of the joining edge,
        // recorded when the child is discovered through the adjacency.
        let mut worklist: Vec<(usize, Option<(usize, usize)>)> = vec![(root, None)];
        visited[root] = true;

        while let Some((v, parent)) = worklist.pop() {
            // Conditional distribution of z[v], one row per data row.
            let probs = match parent {
                None => {
                    let marginal = self.posterior.vertex_probs.row(v);
                    let mut probs = Array2::zeros((batch_size, m));
                    for mut row in probs.rows_mut() {
                        row.assign(&marginal);
                    }
                    probs
                }
                Some((parent, e)) => {
                    let joint = self.posterior.edge_probs.index_axis(Axis(0), e);
                    let mut probs = Array2::zeros((batch_size, m));
                    for row in 0..batch_size {
                        let parent_state = z[(parent, row)];
                        // The stored block's first axis belongs to the
                        // lower-numbered endpoint; flip when the parent is
                        // the higher-numbered one.
                        for s in 0..m {
                            probs[(row, s)] = if parent < v {
                                joint[(parent_state, s)]
                            } else {
                                joint[(s, parent_state)]
                            };
                        }
                    }
                    probs
                }
            };
            let states = site.sample_categorical(&format!("z_{}", names[v]), probs.view())?;
            z.row_mut(v).assign(&states);

            // Observed site: condition on data, or impute when asked.
            let observed = data.column(v);
            if observed.is_some() || impute {
                let realized = site.sample_value(
                    &format!("x_{}", names[v]),
                    mixtures[v].as_ref(),
                    z.row(v),
                    observed.map(|column| column.view()),
                )?;
                x[v] = Some(realized);
            }

            for (child, e) in self.topology.adjacency(v) {
                if !visited[child] {
                    visited[child] = true;
                    worklist.push((child, Some((v, e))));
                }
            }
        }

        Ok(Propagated { z, x })
    }
}
