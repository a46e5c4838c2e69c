//! External-collaborator seams: feature models and parameter optimizers.
//!
//! Purpose
//! -------
//! The core owns no feature parameters and no gradient machinery. Each data
//! column is coupled to the latent tree through a [`Feature`] object owned
//! by the model but specified externally, and parameter learning happens
//! behind the [`Optimizer`] trait, a black box that consumes the realized
//! latent assignment of the current step and returns a scalar loss.
//!
//! Key behaviors
//! -------------
//! - [`Feature`] covers the per-column lifecycle: initialization from an
//!   observed column, drawing mixture parameters for a training step, and
//!   the parameter-update hook optimizers call.
//! - [`Mixture`] is the step-local handle produced by
//!   [`Feature::sample_mixture`]: a frozen set of per-component observation
//!   distributions indexed by latent state.
//! - Feature models may be shared across vertices (two columns pointing at
//!   the same learned parameters); nothing in the core assumes 1:1
//!   ownership beyond vertex association.
//!
//! Conventions
//! -----------
//! - `capacity` (`M`) is the shared latent cardinality; `component` indexes
//!   `0..M`.
//! - Losses are negative log-likelihoods; lower is better. They share no
//!   scale with the edge logits of the structure layer.
use crate::treecat::core::data::TableData;
use crate::treecat::errors::TreeCatResult;
use crate::treecat::sites::{SampleSite, ValueDist};
use ndarray::{ArrayView1, ArrayView2};

/// Per-column feature model associated 1:1 with a vertex.
///
/// Implementations own the learned observation parameters for one column
/// type (real, discrete, ...). The core calls these methods and nothing
/// else.
pub trait Feature {
    /// Human-readable column name, used for site names and tree printouts.
    fn name(&self) -> &str;

    /// Draw shared, then per-component, observation parameters for this
    /// training step, returning a frozen mixture handle.
    ///
    /// Point-estimated features simply freeze their current parameters; a
    /// fully Bayesian implementation would realize them through `site`.
    fn sample_mixture(
        &self, capacity: usize, site: &mut dyn SampleSite,
    ) -> TreeCatResult<Box<dyn Mixture>>;

    /// Initialize parameters from one observed column before training.
    fn init(&mut self, column: ArrayView1<'_, f64>) -> TreeCatResult<()>;

    /// Parameter-update hook called by optimizers.
    ///
    /// `components` holds the realized latent state of every row of
    /// `column`; `rate` is the optimizer's step size. Returns the column's
    /// negative log-likelihood under the pre-update parameters.
    fn update(
        &mut self, column: ArrayView1<'_, f64>, components: ArrayView1<'_, usize>, rate: f64,
    ) -> TreeCatResult<f64>;
}

/// Step-local mixture handle: per-component observation distributions.
pub trait Mixture {
    /// Observation distribution of one latent component.
    fn value_dist(&self, component: usize) -> TreeCatResult<ValueDist>;
}

/// Black-box parameter optimizer.
///
/// One call per training step, before the sufficient-statistics update.
/// Production deployments put a gradient-based variational optimizer behind
/// this trait; the crate ships a moment-matching reference implementation
/// for tests and small models.
pub trait Optimizer {
    /// Update feature parameters given the realized latent matrix `z`
    /// (`(V, batch)`); returns a scalar loss for the step.
    fn step(
        &mut self, features: &mut [Box<dyn Feature>], data: &TableData,
        z: ArrayView2<'_, usize>,
    ) -> TreeCatResult<f64>;
}
