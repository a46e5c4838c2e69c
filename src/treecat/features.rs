//! Reference feature models and a MAP-style parameter optimizer.
//!
//! Purpose
//! -------
//! Provide concrete [`Feature`] implementations for the two everyday column
//! types — real-valued columns with per-component Gaussians and discrete
//! columns with per-component categoricals — plus [`MapOptimizer`], a
//! moment-matching point-estimate updater standing behind the [`Optimizer`]
//! seam. Production deployments may replace any of these with externally
//! learned models; the trainer only sees the traits.
//!
//! Key behaviors
//! -------------
//! - `init` seeds per-component parameters from column moments with a
//!   deterministic symmetry-breaking spread, so components start distinct
//!   without randomness.
//! - `update` blends per-component sample moments into the parameters with
//!   the optimizer's step size and returns the column's negative
//!   log-likelihood under the pre-update parameters.
//!
//! Conventions
//! -----------
//! - Discrete columns store category ids as whole numbers in `f64` cells;
//!   ids must lie in `0..cardinality`.
//! - Standard deviations and probabilities are floored at small positive
//!   constants so every observation distribution stays constructible.
use crate::treecat::core::data::TableData;
use crate::treecat::errors::{TreeCatError, TreeCatResult};
use crate::treecat::sites::{SampleSite, ValueDist};
use crate::treecat::traits::{Feature, Mixture, Optimizer};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use statrs::distribution::{Categorical, Normal};

/// Smallest admissible standard deviation / probability mass.
const FLOOR: f64 = 1e-6;

// ---------------------------------------------------------------------------
// Real-valued columns
// ---------------------------------------------------------------------------

/// Real-valued column: one Gaussian observation model per latent component.
#[derive(Debug, Clone)]
pub struct RealFeature {
    name: String,
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl RealFeature {
    /// A feature with `capacity` components, centered at zero with unit
    /// scale until [`Feature::init`] sees data.
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        RealFeature {
            name: name.into(),
            means: Array1::zeros(capacity),
            stds: Array1::ones(capacity),
        }
    }

    fn frozen(&self) -> RealMixture {
        RealMixture { means: self.means.clone(), stds: self.stds.clone() }
    }
}

impl Feature for RealFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample_mixture(
        &self, _capacity: usize, _site: &mut dyn SampleSite,
    ) -> TreeCatResult<Box<dyn Mixture>> {
        // Point-estimated parameters: freeze the current values.
        Ok(Box::new(self.frozen()))
    }

    /// Seed component means at evenly spaced column quantiles and share the
    /// column's spread across components.
    fn init(&mut self, column: ArrayView1<'_, f64>) -> TreeCatResult<()> {
        let capacity = self.means.len();
        let mut sorted: Vec<f64> = column.iter().copied().collect();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let n = sorted.len();
        let mean = column.sum() / n as f64;
        let var = column.iter().map(|&x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        let spread = (var.sqrt() / capacity as f64).max(FLOOR);
        for k in 0..capacity {
            let q = ((k as f64 + 0.5) / capacity as f64 * n as f64) as usize;
            self.means[k] = sorted[q.min(n - 1)];
            self.stds[k] = spread;
        }
        Ok(())
    }

    fn update(
        &mut self, column: ArrayView1<'_, f64>, components: ArrayView1<'_, usize>, rate: f64,
    ) -> TreeCatResult<f64> {
        let mixture = self.frozen();
        let mut loss = 0.0;
        for (row, &x) in column.iter().enumerate() {
            loss -= mixture.value_dist(components[row])?.ln_pdf(x);
        }

        // Blend per-component sample moments into the parameters.
        let capacity = self.means.len();
        let mut sums = Array1::<f64>::zeros(capacity);
        let mut sq_sums = Array1::<f64>::zeros(capacity);
        let mut counts = Array1::<f64>::zeros(capacity);
        for (row, &x) in column.iter().enumerate() {
            let k = components[row];
            sums[k] += x;
            sq_sums[k] += x * x;
            counts[k] += 1.0;
        }
        for k in 0..capacity {
            if counts[k] > 0.0 {
                let target_mean = sums[k] / counts[k];
                let target_var = (sq_sums[k] / counts[k] - target_mean * target_mean).max(0.0);
                self.means[k] += rate * (target_mean - self.means[k]);
                let target_std = target_var.sqrt().max(FLOOR);
                self.stds[k] = (self.stds[k] + rate * (target_std - self.stds[k])).max(FLOOR);
            }
        }
        Ok(loss)
    }
}

/// Frozen per-component Gaussians for one training step.
#[derive(Debug, Clone)]
pub struct RealMixture {
    means: Array1<f64>,
    stds: Array1<f64>,
}

impl Mixture for RealMixture {
    fn value_dist(&self, component: usize) -> TreeCatResult<ValueDist> {
        Ok(ValueDist::Normal(Normal::new(self.means[component], self.stds[component])?))
    }
}

// ---------------------------------------------------------------------------
// Discrete columns
// ---------------------------------------------------------------------------

/// Discrete column with `cardinality` categories: one categorical
/// observation model per latent component.
#[derive(Debug, Clone)]
pub struct DiscreteFeature {
    name: String,
    /// `(M, cardinality)` per-component category probabilities.
    probs: Array2<f64>,
}

impl DiscreteFeature {
    /// A feature with uniform category probabilities until
    /// [`Feature::init`] sees data.
    pub fn new(name: impl Into<String>, capacity: usize, cardinality: usize) -> Self {
        DiscreteFeature {
            name: name.into(),
            probs: Array2::from_elem((capacity, cardinality), 1.0 / cardinality as f64),
        }
    }

    fn cardinality(&self) -> usize {
        self.probs.ncols()
    }

    fn frozen(&self) -> DiscreteMixture {
        DiscreteMixture { probs: self.probs.clone() }
    }

    fn category(&self, value: f64) -> TreeCatResult<usize> {
        let category = value as usize;
        if !value.is_finite() || value.fract() != 0.0 || category >= self.cardinality() {
            return Err(TreeCatError::InvalidDistribution {
                reason: format!(
                    "column '{}' holds {value}, not a category id in 0..{}",
                    self.name,
                    self.cardinality()
                ),
            });
        }
        Ok(category)
    }
}

impl Feature for DiscreteFeature {
    fn name(&self) -> &str {
        &self.name
    }

    fn sample_mixture(
        &self, _capacity: usize, _site: &mut dyn SampleSite,
    ) -> TreeCatResult<Box<dyn Mixture>> {
        Ok(Box::new(self.frozen()))
    }

    /// Seed every component at the column's category frequencies, with a
    /// deterministic per-component tilt to break symmetry.
    fn init(&mut self, column: ArrayView1<'_, f64>) -> TreeCatResult<()> {
        let cardinality = self.cardinality();
        let mut freq = Array1::<f64>::from_elem(cardinality, 0.5);
        for &value in column.iter() {
            freq[self.category(value)?] += 1.0;
        }
        let total = freq.sum();
        for k in 0..self.probs.nrows() {
            for c in 0..cardinality {
                let tilt = if c == k % cardinality { 0.5 } else { 0.0 };
                self.probs[(k, c)] = freq[c] / total + tilt;
            }
            let row_total: f64 = self.probs.row(k).sum();
            for c in 0..cardinality {
                self.probs[(k, c)] /= row_total;
            }
        }
        Ok(())
    }

    fn update(
        &mut self, column: ArrayView1<'_, f64>, components: ArrayView1<'_, usize>, rate: f64,
    ) -> TreeCatResult<f64> {
        let mixture = self.frozen();
        let mut loss = 0.0;
        for (row, &value) in column.iter().enumerate() {
            self.category(value)?;
            loss -= mixture.value_dist(components[row])?.ln_pdf(value);
        }

        let cardinality = self.cardinality();
        let capacity = self.probs.nrows();
        // Laplace-smoothed per-component frequencies.
        let mut counts = Array2::<f64>::from_elem((capacity, cardinality), 0.5);
        for (row, &value) in column.iter().enumerate() {
            counts[(components[row], value as usize)] += 1.0;
        }
        for k in 0..capacity {
            let total: f64 = counts.row(k).sum();
            for c in 0..cardinality {
                let target = counts[(k, c)] / total;
                self.probs[(k, c)] =
                    (self.probs[(k, c)] + rate * (target - self.probs[(k, c)])).max(FLOOR);
            }
            let row_total: f64 = self.probs.row(k).sum();
            for c in 0..cardinality {
                self.probs[(k, c)] /= row_total;
            }
        }
        Ok(loss)
    }
}

/// Frozen per-component categoricals for one training step.
#[derive(Debug, Clone)]
pub struct DiscreteMixture {
    probs: Array2<f64>,
}

impl Mixture for DiscreteMixture {
    fn value_dist(&self, component: usize) -> TreeCatResult<ValueDist> {
        Ok(ValueDist::Categorical(Categorical::new(
            self.probs.row(component).to_vec().as_slice(),
        )?))
    }
}

// ---------------------------------------------------------------------------
// Reference optimizer
// ---------------------------------------------------------------------------

/// Moment-matching MAP optimizer: applies [`Feature::update`] to every
/// observed column with a fixed step size.
///
/// Missing columns contribute nothing; the returned loss is the summed
/// negative log-likelihood of the observed columns.
#[derive(Debug, Clone, Copy)]
pub struct MapOptimizer {
    rate: f64,
}

impl MapOptimizer {
    pub fn new(rate: f64) -> Self {
        MapOptimizer { rate }
    }
}

impl Default for MapOptimizer {
    fn default() -> Self {
        MapOptimizer::new(0.1)
    }
}

impl Optimizer for MapOptimizer {
    fn step(
        &mut self, features: &mut [Box<dyn Feature>], data: &TableData,
        z: ArrayView2<'_, usize>,
    ) -> TreeCatResult<f64> {
        if features.len() != data.num_columns() {
            return Err(TreeCatError::FeatureDataMismatch {
                features: features.len(),
                columns: data.num_columns(),
            });
        }
        let mut loss = 0.0;
        for (v, feature) in features.iter_mut().enumerate() {
            if let Some(column) = data.column(v) {
                loss += feature.update(column.view(), z.row(v), self.rate)?;
            }
        }
        Ok(loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::treecat::sites::RandomSite;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Moment-based initialization of both feature kinds.
    // - Update direction and loss finiteness.
    // - Category validation for discrete columns.
    // - MapOptimizer aggregation over present columns.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `RealFeature::init` spreads component means across the
    // column's quantiles in increasing order.
    //
    // Given
    // -----
    // - Column `0..20` and capacity 4.
    //
    // Expect
    // ------
    // - Strictly increasing means within the data range, positive stds.
    fn real_feature_init_spreads_means_over_quantiles() {
        let mut feature = RealFeature::new("age", 4);
        let column: Array1<f64> = (0..20).map(f64::from).collect();
        feature.init(column.view()).unwrap();
        for k in 1..4 {
            assert!(feature.means[k] > feature.means[k - 1]);
        }
        assert!(feature.means[0] >= 0.0 && feature.means[3] <= 19.0);
        assert!(feature.stds.iter().all(|&s| s > 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Verify that `RealFeature::update` moves a component's mean toward the
    // sample mean of its assigned rows and returns a finite loss.
    //
    // Given
    // -----
    // - All rows assigned to component 0 with values near 10.
    //
    // Expect
    // ------
    // - Mean of component 0 strictly increases from 0 toward 10; finite
    //   positive loss; component 1 untouched.
    fn real_feature_update_moves_toward_sample_moments() {
        let mut feature = RealFeature::new("age", 2);
        let column = array![9.0, 10.0, 11.0];
        let components = array![0usize, 0, 0];
        let loss = feature.update(column.view(), components.view(), 0.5).unwrap();
        assert!(loss.is_finite());
        assert_relative_eq!(feature.means[0], 5.0);
        assert_relative_eq!(feature.means[1], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure discrete columns reject values that are not category ids.
    //
    // Given
    // -----
    // - Cardinality 3 and the values 3.0 (too large) and 0.5 (fractional).
    //
    // Expect
    // ------
    // - `InvalidDistribution` for both at init time.
    fn discrete_feature_rejects_non_category_values() {
        let mut feature = DiscreteFeature::new("color", 2, 3);
        assert!(matches!(
            feature.init(array![0.0, 3.0].view()).unwrap_err(),
            TreeCatError::InvalidDistribution { .. }
        ));
        assert!(matches!(
            feature.init(array![0.5].view()).unwrap_err(),
            TreeCatError::InvalidDistribution { .. }
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify that discrete init yields normalized, component-distinct rows
    // and that updates sharpen toward observed per-component frequencies.
    //
    // Given
    // -----
    // - A column of categories `[0, 0, 1, 2]`, capacity 2, cardinality 3.
    //
    // Expect
    // ------
    // - Every row sums to 1; rows 0 and 1 differ after init.
    // - After an update assigning category-0 rows to component 0, that
    //   component's probability of category 0 increases.
    fn discrete_feature_init_and_update_stay_normalized() {
        let mut feature = DiscreteFeature::new("color", 2, 3);
        let column = array![0.0, 0.0, 1.0, 2.0];
        feature.init(column.view()).unwrap();
        for k in 0..2 {
            assert_relative_eq!(feature.probs.row(k).sum(), 1.0, max_relative = 1e-12);
        }
        assert!(feature.probs.row(0) != feature.probs.row(1));

        let before = feature.probs[(0, 0)];
        let components = array![0usize, 0, 1, 1];
        let loss = feature.update(column.view(), components.view(), 0.5).unwrap();
        assert!(loss.is_finite() && loss > 0.0);
        assert!(feature.probs[(0, 0)] > before);
        for k in 0..2 {
            assert_relative_eq!(feature.probs.row(k).sum(), 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that `MapOptimizer` sums losses over present columns, skips
    // missing ones, and rejects column-count mismatches.
    //
    // Given
    // -----
    // - Two features, data with the second column missing.
    //
    // Expect
    // ------
    // - A finite loss equal to the first column's loss alone; a
    //   `FeatureDataMismatch` when a feature is dropped.
    fn map_optimizer_aggregates_present_columns() {
        let mut features: Vec<Box<dyn Feature>> =
            vec![Box::new(RealFeature::new("a", 2)), Box::new(RealFeature::new("b", 2))];
        let data =
            TableData::new(vec![Some(array![1.0, 2.0]), None]).unwrap();
        let z = array![[0usize, 1], [1, 0]];

        let mut optimizer = MapOptimizer::default();
        let loss = optimizer.step(&mut features, &data, z.view()).unwrap();
        assert!(loss.is_finite());

        let mut one_feature = features.split_off(1);
        assert_eq!(
            optimizer.step(&mut one_feature, &data, z.view()).unwrap_err(),
            TreeCatError::FeatureDataMismatch { features: 1, columns: 2 }
        );
    }

    #[test]
    // Purpose
    // -------
    // Smoke-test the frozen mixtures through the `SampleSite` machinery.
    //
    // Given
    // -----
    // - An initialized discrete feature and a seeded random site.
    //
    // Expect
    // ------
    // - Imputation draws valid category ids.
    fn frozen_mixtures_draw_valid_values() {
        let mut feature = DiscreteFeature::new("color", 2, 3);
        feature.init(array![0.0, 1.0, 2.0, 1.0].view()).unwrap();
        let mut site = RandomSite::from_seed(3);
        let mixture = feature.sample_mixture(2, &mut site).unwrap();
        let components = array![0usize, 1, 0];
        let values = site.sample_value("x_color", mixture.as_ref(), components.view(), None).unwrap();
        assert!(values.iter().all(|&x| x == 0.0 || x == 1.0 || x == 2.0));
    }
}
