//! Training loop: parameter learning and structure search in lock step.
//!
//! Purpose
//! -------
//! Drive one model through minibatch training. Every step runs six phases
//! in strict order: (1) a forward pass under the current tree realizing the
//! latent matrix, (2) the parameter-optimizer update consuming it, (3) the
//! sufficient-statistics update, (4) edge-logit computation over the
//! complete graph, (5) the structure-search proposal, and (6) installation
//! of the proposed edge set. Phases 3–6 are unconditional; structure search
//! runs at the same cadence as parameter learning, with no skip or backoff
//! policy.
//!
//! Error handling
//! --------------
//! There is no retry and no partial-failure recovery within a step: any
//! error aborts the whole step and surfaces to the caller, who restarts
//! from the last completed step's tree and statistics.
use crate::treecat::core::data::TableData;
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use crate::treecat::models::treecat::TreeCat;
use crate::treecat::sites::SampleSite;
use crate::treecat::traits::Optimizer;
use crate::structure::search::StructureSearch;

/// Owns a [`TreeCat`] model for the duration of training, together with the
/// two external collaborators: the parameter optimizer and the
/// structure-search kernel.
pub struct TreeCatTrainer {
    model: TreeCat,
    optimizer: Box<dyn Optimizer>,
    search: Box<dyn StructureSearch>,
}

impl TreeCatTrainer {
    pub fn new(
        model: TreeCat, optimizer: Box<dyn Optimizer>, search: Box<dyn StructureSearch>,
    ) -> Self {
        TreeCatTrainer { model, optimizer, search }
    }

    /// Initialize feature parameters from the observed columns of `data`.
    ///
    /// Call once before the first [`TreeCatTrainer::step`]. Missing columns
    /// leave their feature at its constructed defaults.
    ///
    /// # Errors
    /// - [`TreeCatError::FeatureDataMismatch`] if the column count differs
    ///   from the feature count, plus any feature-level failure.
    pub fn init(&mut self, data: &TableData) -> TreeCatResult<()> {
        if data.num_columns() != self.model.num_features() {
            return Err(TreeCatError::FeatureDataMismatch {
                features: self.model.num_features(),
                columns: data.num_columns(),
            });
        }
        for (v, feature) in self.model.features.iter_mut().enumerate() {
            if let Some(column) = data.column(v) {
                feature.init(column.view())?;
            }
        }
        Ok(())
    }

    /// Run one six-phase training step and return the optimizer's loss.
    ///
    /// `num_rows` is the full dataset size when `data` is a minibatch; it
    /// controls the stationary smoothing horizon of the statistics decay
    /// and defaults to the batch size.
    pub fn step(
        &mut self, data: &TableData, num_rows: Option<usize>, site: &mut dyn SampleSite,
    ) -> TreeCatResult<f64> {
        // Phases 1-2: parameter update under the current tree, extracting
        // the latent matrix realized during the pass.
        let realized = self.model.model(data, false, site)?;
        let loss = self.optimizer.step(&mut self.model.features, data, realized.z.view())?;

        // Phase 3: absorb the realized latent states.
        self.model.stats.update(num_rows, realized.z.view())?;

        // Phases 4-6: rescore every candidate edge and install the
        // kernel's proposal.
        let edge_logits = self.model.edge_logits();
        let new_edges = self.search.propose(edge_logits.view(), self.model.edges())?;
        self.model.set_edges(new_edges)?;

        tracing::debug!(
            loss,
            count_stats = self.model.stats.count_stats(),
            edges = ?self.model.edges(),
            "training step complete"
        );
        Ok(loss)
    }

    pub fn model(&self) -> &TreeCat {
        &self.model
    }

    /// Hand the trained model back.
    pub fn into_model(self) -> TreeCat {
        self.model
    }
}
