//! Batch adapter for Whittaker baseline fits over many spectra.
//!
//! ## Purpose
//!
//! This module provides the batch execution adapter of `fastWhittaker`. It
//! fits single spectra given as slices, vectors or ndarray arrays, and whole
//! matrices of spectra (one spectrum per row) with optional parallelism.
//!
//! ## Design notes
//!
//! * **Delegation**: Configuration and single fits are delegated to the
//!   `whittaker` batch adapter.
//! * **Parallelism**: Rows are fitted in parallel via `rayon` (fastWhittaker
//!   extension).
//! * **Generics**: Generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Shared grid**: All rows of a matrix share the same x-coordinates.
//! * **Stacking**: [`ParallelBatchWhittaker::baselines`] returns the fitted
//!   baselines as a matrix of the input's shape.
//!
//! ## Invariants
//!
//! * Results are returned in row order, whatever the execution mode.
//! * Parallel and sequential execution give identical results.
//!
//! ## Non-goals
//!
//! * This adapter does not handle streaming data.
//! * This adapter does not handle missing values.

// Feature-gated imports
#[cfg(feature = "cpu")]
use crate::engine::executor::fit_rows_parallel;

// External dependencies
use ndarray::{Array2, ArrayBase, Data, Ix2};
use num_traits::Float;
use std::result::Result;

// Export dependencies from whittaker crate
use whittaker::internals::adapters::batch::{BatchWhittaker, BatchWhittakerBuilder};
use whittaker::internals::algorithms::weighting::{StrategyParams, WeightingMethod};
use whittaker::internals::engine::output::BaselineResult;
use whittaker::internals::primitives::errors::BaselineError;

// Internal dependencies
use crate::engine::executor::fit_rows_sequential;
use crate::input::SpectrumInput;

// ============================================================================
// Extended Batch Whittaker Builder
// ============================================================================

/// Builder for the batch baseline processor with parallel support.
#[derive(Debug, Clone)]
pub struct ParallelBatchWhittakerBuilder<T: Float> {
    /// Base builder from the whittaker crate
    pub base: BatchWhittakerBuilder<T>,
}

impl<T: Float> Default for ParallelBatchWhittakerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> ParallelBatchWhittakerBuilder<T> {
    /// Create a new batch builder with default parameters.
    ///
    /// # Defaults
    ///
    /// * All base parameters from whittaker BatchWhittakerBuilder
    /// * parallel: true (fastWhittaker extension)
    fn new() -> Self {
        let base = BatchWhittakerBuilder::default().parallel(true);
        Self { base }
    }

    /// Set parallel execution mode.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.base = self.base.parallel(parallel);
        self
    }

    // ========================================================================
    // Shared Setters
    // ========================================================================

    /// Set the reweighting rule.
    pub fn method(mut self, method: WeightingMethod) -> Self {
        self.base = self.base.method(method);
        self
    }

    /// Set the smoothing parameter.
    pub fn lambda(mut self, lambda: T) -> Self {
        self.base = self.base.lambda(lambda);
        self
    }

    /// Set the order of the difference penalty.
    pub fn difference_order(mut self, order: usize) -> Self {
        self.base = self.base.difference_order(order);
        self
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tol: T) -> Self {
        self.base = self.base.tolerance(tol);
        self
    }

    /// Set the iteration budget.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.base = self.base.max_iterations(iterations);
        self
    }

    /// Set the weight floor.
    pub fn min_weight(mut self, min_weight: T) -> Self {
        self.base = self.base.min_weight(min_weight);
        self
    }

    /// Set the starting weights.
    pub fn initial_weights(mut self, weights: Vec<T>) -> Self {
        self.base = self.base.initial_weights(weights);
        self
    }

    /// Set the tuning values of the reweighting rule.
    pub fn params(mut self, params: StrategyParams<T>) -> Self {
        self.base = self.base.params(params);
        self
    }

    /// Enable returning the baseline-corrected signal.
    pub fn return_corrected(mut self, enabled: bool) -> Self {
        self.base = self.base.return_corrected(enabled);
        self
    }

    // ========================================================================
    // Build Method
    // ========================================================================

    /// Build the batch processor.
    pub fn build(self) -> Result<ParallelBatchWhittaker<T>, BaselineError> {
        // Check for deferred errors from adapter conversion
        if let Some(ref err) = self.base.deferred_error {
            return Err(err.clone());
        }

        let parallel = self.base.parallel.unwrap_or(true);

        // Validation is centralized in the whittaker crate
        let processor = self.base.build()?;

        Ok(ParallelBatchWhittaker {
            processor,
            parallel,
        })
    }
}

// ============================================================================
// Extended Batch Whittaker Processor
// ============================================================================

/// Batch baseline processor with parallel support.
#[derive(Debug, Clone)]
pub struct ParallelBatchWhittaker<T: Float> {
    processor: BatchWhittaker<T>,
    parallel: bool,
}

impl<T: Float + Send + Sync> ParallelBatchWhittaker<T> {
    /// Fit the baseline of an equally spaced spectrum.
    pub fn fit<I>(&self, y: &I) -> Result<BaselineResult<T>, BaselineError>
    where
        I: SpectrumInput<T> + ?Sized,
    {
        self.processor.fit(y.samples()?)
    }

    /// Fit the baseline of a spectrum sampled at `x`.
    pub fn fit_with_x<I1, I2>(&self, x: &I1, y: &I2) -> Result<BaselineResult<T>, BaselineError>
    where
        I1: SpectrumInput<T> + ?Sized,
        I2: SpectrumInput<T> + ?Sized,
    {
        self.processor
            .fit_with_x(x.samples()?, y.samples()?)
    }

    /// Fit every row of `signals` as an equally spaced spectrum.
    pub fn fit_rows<S>(
        &self,
        signals: &ArrayBase<S, Ix2>,
    ) -> Result<Vec<BaselineResult<T>>, BaselineError>
    where
        S: Data<Elem = T>,
    {
        self.run_rows(signals, None)
    }

    /// Fit every row of `signals` against the shared coordinates `x`.
    pub fn fit_rows_with_x<I, S>(
        &self,
        x: &I,
        signals: &ArrayBase<S, Ix2>,
    ) -> Result<Vec<BaselineResult<T>>, BaselineError>
    where
        I: SpectrumInput<T> + ?Sized,
        S: Data<Elem = T>,
    {
        self.run_rows(signals, Some(x.samples()?))
    }

    /// Fitted baselines of every row, stacked in the shape of `signals`.
    pub fn baselines<S>(&self, signals: &ArrayBase<S, Ix2>) -> Result<Array2<T>, BaselineError>
    where
        S: Data<Elem = T>,
    {
        let results = self.fit_rows(signals)?;
        let flat: Vec<T> = results.into_iter().flat_map(|r| r.baseline).collect();
        Array2::from_shape_vec(signals.raw_dim(), flat)
            .map_err(|e| BaselineError::InvalidInput(e.to_string()))
    }

    /// Whether rows are fitted in parallel.
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// The reweighting rule.
    pub fn method(&self) -> WeightingMethod {
        self.processor.method()
    }

    fn run_rows<S>(
        &self,
        signals: &ArrayBase<S, Ix2>,
        x: Option<&[T]>,
    ) -> Result<Vec<BaselineResult<T>>, BaselineError>
    where
        S: Data<Elem = T>,
    {
        let config = self.processor.to_config();
        let view = signals.view();

        #[cfg(feature = "cpu")]
        {
            if self.parallel {
                return fit_rows_parallel(view, x, &config);
            }
        }

        fit_rows_sequential(view, x, &config)
    }
}
