//! The TreeCat model: features, latent tree, and sufficient statistics.
//!
//! Purpose
//! -------
//! Tie the per-column feature models to a shared tree-structured discrete
//! latent variable. The model owns the active [`TreeTopology`] and the
//! [`SufficientStats`] store; the conjugate posterior is computed on demand
//! and the forward pass is delegated to [`TreePropagator`]. The topology is
//! mutated only through [`TreeCat::set_edges`], called by the trainer after
//! a structure-search step; within a training step every other component
//! treats it as immutable.
//!
//! Key behaviors
//! -------------
//! - Constructed from a feature list, a latent capacity `M > 1`, an optional
//!   edge list (defaulting to a chain), and an annealing rate.
//! - [`TreeCat::model`] runs one forward pass: freeze per-feature mixtures,
//!   compute the posterior point estimate, propagate root-to-leaves, and
//!   return the realized latent matrix and column values.
//! - [`TreeCat::impute`] runs the same pass with imputation enabled and
//!   returns one posterior sample of every column.
use crate::treecat::core::data::TableData;
use crate::treecat::core::posterior::{compute_edge_logits, get_posterior, Posterior};
use crate::treecat::core::stats::SufficientStats;
use crate::treecat::core::topology::TreeTopology;
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use crate::treecat::models::propagate::{Propagated, TreePropagator};
use crate::treecat::sites::SampleSite;
use crate::treecat::traits::Feature;
use ndarray::Array1;

/// Default exponential growth-rate limit for sufficient statistics.
pub const DEFAULT_ANNEALING_RATE: f64 = 0.01;

/// Tree-structured latent categorical model over heterogeneous columns.
pub struct TreeCat {
    pub(crate) features: Vec<Box<dyn Feature>>,
    capacity: usize,
    topology: TreeTopology,
    pub(crate) stats: SufficientStats,
}

// Feature objects are opaque trait objects; render them by name.
impl std::fmt::Debug for TreeCat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeCat")
            .field("features", &self.feature_names())
            .field("capacity", &self.capacity)
            .field("topology", &self.topology)
            .field("stats", &self.stats)
            .finish()
    }
}

impl TreeCat {
    /// Build a model over `features.len()` columns.
    ///
    /// `edges` must hold exactly `V - 1` edges forming a tree; `None`
    /// selects the default chain `0-1, 1-2, ...`.
    ///
    /// # Errors
    /// - [`TreeCatError::EmptyFeatureSet`] for an empty feature list.
    /// - [`TreeCatError::CapacityTooSmall`] if `capacity <= 1`.
    /// - [`TreeCatError::EdgeCountMismatch`] if the edge count is not
    ///   `V - 1`, plus the per-edge checks of [`TreeTopology::new`].
    /// - [`TreeCatError::InvalidAnnealingRate`] for a non-positive rate.
    pub fn new(
        features: Vec<Box<dyn Feature>>, capacity: usize, edges: Option<Vec<(usize, usize)>>,
        annealing_rate: f64,
    ) -> TreeCatResult<Self> {
        if features.is_empty() {
            return Err(TreeCatError::EmptyFeatureSet);
        }
        let num_vertices = features.len();
        let topology = match edges {
            None => TreeTopology::chain(num_vertices)?,
            Some(edges) => {
                if edges.len() != num_vertices - 1 {
                    return Err(TreeCatError::EdgeCountMismatch {
                        expected: num_vertices - 1,
                        actual: edges.len(),
                    });
                }
                TreeTopology::new(edges)?
            }
        };
        let stats = SufficientStats::new(num_vertices, capacity, annealing_rate)?;
        Ok(TreeCat { features, capacity, topology, stats })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    pub fn topology(&self) -> &TreeTopology {
        &self.topology
    }

    /// Canonicalized active edge list.
    pub fn edges(&self) -> &[(usize, usize)] {
        self.topology.edges()
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.iter().map(|f| f.name()).collect()
    }

    /// Decayed sufficient statistics feeding the conjugate posterior.
    pub fn stats(&self) -> &SufficientStats {
        &self.stats
    }

    /// Install a new edge list after a structure-search step, rebuilding
    /// adjacency, edge index, and center. Statistics are untouched; they
    /// cover the complete graph and remain valid for any tree.
    pub fn set_edges(&mut self, edges: Vec<(usize, usize)>) -> TreeCatResult<()> {
        if edges.len() != self.num_features() - 1 {
            return Err(TreeCatError::EdgeCountMismatch {
                expected: self.num_features() - 1,
                actual: edges.len(),
            });
        }
        self.topology = TreeTopology::new(edges)?;
        Ok(())
    }

    /// Posterior-mean probability tables for the current tree.
    pub fn posterior(&self) -> Posterior {
        get_posterior(&self.stats, &self.topology)
    }

    /// Edge marginal-likelihood scores over the complete graph, for
    /// structure search. Relative scale only.
    pub fn edge_logits(&self) -> Array1<f64> {
        compute_edge_logits(&self.stats)
    }

    /// One forward pass: freeze mixtures, compute the posterior point
    /// estimate, and propagate root-to-leaves through `site`.
    ///
    /// Returns the realized latent matrix and per-column values; missing
    /// columns are realized only when `impute` is set.
    ///
    /// # Errors
    /// - [`TreeCatError::FeatureDataMismatch`] if the batch's column count
    ///   differs from the feature count, plus any error surfaced by the
    ///   sampling site or the mixtures.
    pub fn model(
        &self, data: &TableData, impute: bool, site: &mut dyn SampleSite,
    ) -> TreeCatResult<Propagated> {
        if data.num_columns() != self.num_features() {
            return Err(TreeCatError::FeatureDataMismatch {
                features: self.num_features(),
                columns: data.num_columns(),
            });
        }
        let mixtures = self
            .features
            .iter()
            .map(|feature| feature.sample_mixture(self.capacity, site))
            .collect::<TreeCatResult<Vec<_>>>()?;
        let posterior = self.posterior();
        let names = self.feature_names();
        let propagator = TreePropagator::new(&self.topology, &posterior, self.capacity);
        propagator.run(data, impute, &mixtures, &names, site)
    }

    /// Impute missing columns by drawing one sample from the joint
    /// posterior predictive.
    ///
    /// Observed cells are returned unchanged; missing columns are filled
    /// conditional on the observed ones through the latent tree. (Exact
    /// discrete marginalization is the job of an external enumeration
    /// runtime standing behind `site`; the default site yields an ancestral
    /// sample.)
    ///
    /// # Errors
    /// Everything [`TreeCat::model`] surfaces; additionally
    /// [`TreeCatError::FeatureDataMismatch`] if the pass realized fewer
    /// columns than the model has features.
    pub fn impute(
        &self, data: &TableData, site: &mut dyn SampleSite,
    ) -> TreeCatResult<Vec<Array1<f64>>> {
        let out = self.model(data, true, site)?;
        let columns: Vec<Array1<f64>> = out.x.into_iter().flatten().collect();
        if columns.len() != self.num_features() {
            return Err(TreeCatError::FeatureDataMismatch {
                features: self.num_features(),
                columns: columns.len(),
            });
        }
        Ok(columns)
    }

    /// Depth-indented diagnostic rendering of the active tree.
    pub fn pretty_print(&self, root: Option<&str>) -> TreeCatResult<String> {
        self.topology.pretty_print(&self.feature_names(), root)
    }
}
