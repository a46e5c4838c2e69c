//! Decayed sufficient statistics for latent-state co-occurrence.
//!
//! Purpose
//! -------
//! Maintain exponentially-decayed counts of single-vertex latent states and
//! of pairwise latent-state co-occurrence over the **complete graph** on the
//! vertex set, not just the current tree edges, so that candidate edges not
//! in the tree can still be scored during structure search. The store is fed
//! one minibatch of realized latent assignments per training step and is the
//! sole input to the conjugate posterior layer.
//!
//! Key behaviors
//! -------------
//! - Initialize all tables to a single uniform pseudo-observation so
//!   posterior quantities are well-defined before any real data is seen.
//! - Per [`SufficientStats::update`]: validate the batch, compute one decay
//!   factor, accumulate unit counts, then scale every table by the decay.
//! - Statistics live for the full training run; they are never reset, only
//!   decayed.
//!
//! ## Decay law
//! `decay = min(annealing, exponential_smoothing)` with
//! `annealing = (1 + annealing_rate) / (1 + batch_size / count_stats)` and
//! `exponential_smoothing = 1 / (1 + batch_size / num_rows)`. Early in
//! training `count_stats` is small and `annealing` binds, capping the growth
//! of the effective sample size to a bounded multiplicative factor per step;
//! once `count_stats` approaches `num_rows`, `exponential_smoothing` binds
//! and the store behaves as a stationary exponential moving average over the
//! fraction `batch_size / num_rows` seen each step.
//!
//! Invariants & assumptions
//! ------------------------
//! - All entries stay strictly positive and `count_stats > 0` after any
//!   sequence of updates; `decay ∈ (0, 1]` whenever `annealing_rate > 0` and
//!   `batch_size <= num_rows`.
//! - Entries are a decayed histogram, not an instantaneous one; after the
//!   first update they never exactly equal a row count.
//! - The pairwise accumulation is O(batch_size · V²) and dominates the cost
//!   of an update; it bounds the practical vertex count.
use crate::structure::graph::{complete_graph, num_pairs};
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use ndarray::{Array2, ArrayView2};

/// Decayed co-occurrence statistics over vertices and complete-graph pairs.
#[derive(Debug, Clone)]
pub struct SufficientStats {
    num_vertices: usize,
    capacity: usize,
    annealing_rate: f64,
    /// Effective accumulated row count.
    count_stats: f64,
    /// `(V, M)` decayed counts of vertex latent states.
    vertex_stats: Array2<f64>,
    /// `(K, M * M)` decayed counts of latent-state pairs, one row per
    /// unordered vertex pair of the complete graph in pair-index order.
    complete_stats: Array2<f64>,
    /// Complete-graph pairs in pair-index order.
    grid: Vec<(usize, usize)>,
}

impl SufficientStats {
    /// Create a store seeded with one uniform pseudo-observation.
    ///
    /// # Errors
    /// - [`TreeCatError::CapacityTooSmall`] if `capacity <= 1`.
    /// - [`TreeCatError::InvalidAnnealingRate`] if the rate is not finite
    ///   and strictly positive.
    pub fn new(
        num_vertices: usize, capacity: usize, annealing_rate: f64,
    ) -> TreeCatResult<Self> {
        if capacity <= 1 {
            return Err(TreeCatError::CapacityTooSmall { capacity });
        }
        if !annealing_rate.is_finite() || annealing_rate <= 0.0 {
            return Err(TreeCatError::InvalidAnnealingRate { value: annealing_rate });
        }
        let m = capacity as f64;
        Ok(SufficientStats {
            num_vertices,
            capacity,
            annealing_rate,
            count_stats: 1.0,
            vertex_stats: Array2::from_elem((num_vertices, capacity), 1.0 / m),
            complete_stats: Array2::from_elem(
                (num_pairs(num_vertices), capacity * capacity),
                1.0 / (m * m),
            ),
            grid: complete_graph(num_vertices),
        })
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn annealing_rate(&self) -> f64 {
        self.annealing_rate
    }

    /// Effective accumulated row count; strictly positive at all times.
    pub fn count_stats(&self) -> f64 {
        self.count_stats
    }

    /// `(V, M)` decayed vertex-state counts.
    pub fn vertex_stats(&self) -> ArrayView2<'_, f64> {
        self.vertex_stats.view()
    }

    /// `(K, M * M)` decayed pair-state counts in pair-index order.
    pub fn complete_stats(&self) -> ArrayView2<'_, f64> {
        self.complete_stats.view()
    }

    /// Absorb one minibatch of realized latent assignments.
    ///
    /// `z` holds one latent state per `(vertex, row)`; `num_rows` is the size
    /// of the full dataset and defaults to the batch size when unknown. The
    /// update is atomic per call: all inputs are validated before any table
    /// is touched.
    ///
    /// # Errors
    /// - [`TreeCatError::EmptyBatch`] for a zero-row batch.
    /// - [`TreeCatError::LatentShapeMismatch`] if `z` does not have `V` rows.
    /// - [`TreeCatError::BatchExceedsNumRows`] if `batch_size > num_rows`.
    /// - [`TreeCatError::LatentStateOutOfRange`] if any state is `>= M`.
    pub fn update(
        &mut self, num_rows: Option<usize>, z: ArrayView2<'_, usize>,
    ) -> TreeCatResult<()> {
        let (vertices, batch_size) = z.dim();
        if vertices != self.num_vertices {
            return Err(TreeCatError::LatentShapeMismatch {
                expected_vertices: self.num_vertices,
                actual: vertices,
            });
        }
        if batch_size == 0 {
            return Err(TreeCatError::EmptyBatch);
        }
        let num_rows = num_rows.unwrap_or(batch_size);
        if batch_size > num_rows {
            return Err(TreeCatError::BatchExceedsNumRows { batch_size, num_rows });
        }
        for ((vertex, row), &state) in z.indexed_iter() {
            if state >= self.capacity {
                return Err(TreeCatError::LatentStateOutOfRange {
                    vertex,
                    row,
                    state,
                    capacity: self.capacity,
                });
            }
        }

        let decay = self.decay(batch_size, num_rows);
        debug_assert!(decay > 0.0 && decay <= 1.0);

        self.count_stats += batch_size as f64;
        self.count_stats *= decay;

        let m = self.capacity;
        for row in 0..batch_size {
            for v in 0..self.num_vertices {
                self.vertex_stats[(v, z[(v, row)])] += 1.0;
            }
            for (k, &(v1, v2)) in self.grid.iter().enumerate() {
                self.complete_stats[(k, z[(v1, row)] * m + z[(v2, row)])] += 1.0;
            }
        }
        self.vertex_stats *= decay;
        self.complete_stats *= decay;

        tracing::debug!(
            count_stats = self.count_stats,
            batch_size,
            num_rows,
            decay,
            "sufficient statistics updated"
        );
        Ok(())
    }

    /// Decay factor for one update; see the module docs for the law.
    fn decay(&self, batch_size: usize, num_rows: usize) -> f64 {
        let batch = batch_size as f64;
        let annealing = (1.0 + self.annealing_rate) / (1.0 + batch / self.count_stats);
        let exponential_smoothing = 1.0 / (1.0 + batch / num_rows as f64);
        annealing.min(exponential_smoothing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::graph::pair_index;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction: pseudo-observation seeding and parameter validation.
    // - The worked V=3 / M=2 update scenario from the model design.
    // - Decay bounds and positivity of `count_stats` over many updates.
    // - Atomic rejection of invalid batches.
    // -------------------------------------------------------------------------

    fn make_store() -> SufficientStats {
        SufficientStats::new(3, 2, 0.01).unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify the pseudo-observation initialization: one effective row spread
    // uniformly over states and state pairs.
    //
    // Given
    // -----
    // - A fresh store with V = 3, M = 2.
    //
    // Expect
    // ------
    // - `count_stats == 1`, vertex cells `1/2`, pair cells `1/4`, and table
    //   shapes `(3, 2)` and `(3, 4)`.
    fn new_store_holds_one_uniform_pseudo_observation() {
        let stats = make_store();
        assert_eq!(stats.count_stats(), 1.0);
        assert_eq!(stats.vertex_stats().dim(), (3, 2));
        assert_eq!(stats.complete_stats().dim(), (3, 4));
        assert!(stats.vertex_stats().iter().all(|&c| c == 0.5));
        assert!(stats.complete_stats().iter().all(|&c| c == 0.25));
    }

    #[test]
    // Purpose
    // -------
    // Reject capacities that cannot express a mixture and non-positive
    // annealing rates.
    //
    // Given
    // -----
    // - `capacity = 1` and `annealing_rate = 0.0`.
    //
    // Expect
    // ------
    // - `CapacityTooSmall` and `InvalidAnnealingRate` respectively.
    fn new_rejects_invalid_parameters() {
        assert_eq!(
            SufficientStats::new(3, 1, 0.01).unwrap_err(),
            TreeCatError::CapacityTooSmall { capacity: 1 }
        );
        assert_eq!(
            SufficientStats::new(3, 2, 0.0).unwrap_err(),
            TreeCatError::InvalidAnnealingRate { value: 0.0 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Check the worked single-row scenario: with one prior pseudo-row the
    // decay is exactly 0.5 and the updated counts are the prior-plus-count
    // histogram scaled by it.
    //
    // Given
    // -----
    // - V = 3, M = 2, fresh store, `update(num_rows = 1, z = [[0], [0], [1]])`.
    //
    // Expect
    // ------
    // - `annealing = 1.01 / 2`, `smoothing = 0.5`, so `decay = 0.5`.
    // - `count_stats == 1.0` afterwards.
    // - `vertex_stats[0] == [0.75, 0.25]` (that is `[1.5, 0.5] * 0.5`).
    // - The pair (0, 2) cell for states (0, 1) is `(0.25 + 1) * 0.5`.
    fn update_matches_worked_single_row_scenario() {
        let mut stats = make_store();
        let z = array![[0usize], [0], [1]];
        stats.update(Some(1), z.view()).unwrap();

        assert_relative_eq!(stats.count_stats(), 1.0);
        assert_relative_eq!(stats.vertex_stats()[(0, 0)], 0.75);
        assert_relative_eq!(stats.vertex_stats()[(0, 1)], 0.25);
        assert_relative_eq!(stats.vertex_stats()[(2, 1)], 0.75);

        // Pair (0, 2) realized states (z0, z2) = (0, 1), flat cell 0 * 2 + 1.
        let k = pair_index(0, 2);
        assert_relative_eq!(stats.complete_stats()[(k, 1)], 0.625);
        assert_relative_eq!(stats.complete_stats()[(k, 0)], 0.125);
    }

    #[test]
    // Purpose
    // -------
    // Ensure the decay factor stays in (0, 1] and `count_stats` stays
    // strictly positive and bounded over a long run of minibatches.
    //
    // Given
    // -----
    // - 300 updates of batch 4 against `num_rows = 20`. While the annealing
    //   term binds, each update multiplies the count by exactly
    //   `1 + annealing_rate = 1.01`, so crossing 15 takes
    //   `ln 15 / ln 1.01 ≈ 272` steps; afterwards the smoothing term binds
    //   and the count converges monotonically toward `num_rows`.
    //
    // Expect
    // ------
    // - Every per-call decay lies in (0, 1].
    // - `count_stats > 0` throughout and never exceeds `num_rows`.
    // - After 300 steps the count has passed 15 on its way to 20.
    fn update_keeps_decay_and_counts_bounded() {
        let mut stats = make_store();
        let z = array![[0usize, 1, 0, 1], [1, 1, 0, 0], [0, 0, 1, 1]];
        for _ in 0..300 {
            let decay = stats.decay(4, 20);
            assert!(decay > 0.0 && decay <= 1.0);
            stats.update(Some(20), z.view()).unwrap();
            assert!(stats.count_stats() > 0.0);
            assert!(stats.count_stats() <= 20.0);
        }
        // Long-run stationarity: the effective count approaches num_rows.
        assert!(stats.count_stats() > 15.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify that invalid batches are rejected before any mutation, keeping
    // the update atomic.
    //
    // Given
    // -----
    // - A zero-row batch, a wrong vertex count, `batch > num_rows`, and an
    //   out-of-range latent state.
    //
    // Expect
    // ------
    // - The matching error for each, and the store left exactly at its
    //   seeded state afterwards.
    fn update_rejects_invalid_batches_atomically() {
        let mut stats = make_store();

        let empty = Array2::<usize>::zeros((3, 0));
        assert_eq!(stats.update(None, empty.view()).unwrap_err(), TreeCatError::EmptyBatch);

        let wrong_rows = array![[0usize], [1]];
        assert_eq!(
            stats.update(None, wrong_rows.view()).unwrap_err(),
            TreeCatError::LatentShapeMismatch { expected_vertices: 3, actual: 2 }
        );

        let z = array![[0usize, 1], [1, 0], [0, 0]];
        assert_eq!(
            stats.update(Some(1), z.view()).unwrap_err(),
            TreeCatError::BatchExceedsNumRows { batch_size: 2, num_rows: 1 }
        );

        let bad_state = array![[0usize], [1], [2]];
        assert_eq!(
            stats.update(None, bad_state.view()).unwrap_err(),
            TreeCatError::LatentStateOutOfRange { vertex: 2, row: 0, state: 2, capacity: 2 }
        );

        assert_eq!(stats.count_stats(), 1.0);
        assert!(stats.vertex_stats().iter().all(|&c| c == 0.5));
    }
}
