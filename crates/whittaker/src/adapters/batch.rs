//! Batch adapter for Whittaker baseline fits.
//!
//! ## Purpose
//!
//! This module provides the batch execution adapter: a whole spectrum is held
//! in memory and fitted in one call. It is the adapter behind
//! `Whittaker::new()...adapter(Batch)`.
//!
//! ## Design notes
//!
//! * **Processing**: Fits the entire spectrum in a single reweighting loop.
//! * **Sorting**: Spectra given with x-coordinates are sorted by x and the
//!   results unsorted.
//! * **Delegation**: Delegates computation to the execution engine.
//! * **Reuse**: A built processor is immutable and can fit many spectra.
//!
//! ## Key concepts
//!
//! * **Builder Pattern**: Fluent API for configuration with sensible defaults.
//! * **Deferred validation**: Parameters are checked in `build()`; anything
//!   that depends on the data (difference order vs length, initial weight
//!   length, data-dependent defaults) is checked at `fit` time.
//!
//! ## Invariants
//!
//! * Output order matches input order.
//!
//! ## Non-goals
//!
//! * This adapter does not fit several spectra in parallel.
//! * This adapter does not handle missing values.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::weighting::{StrategyParams, WeightingMethod};
use crate::engine::executor::{SolveConfig, WhittakerBuffer, solve_baseline_with_buffer};
use crate::engine::output::BaselineResult;
use crate::engine::validator::Validator;
use crate::primitives::errors::BaselineError;

// ============================================================================
// Batch Whittaker Builder
// ============================================================================

/// Builder for the batch baseline processor.
#[derive(Debug, Clone)]
pub struct BatchWhittakerBuilder<T: Float> {
    /// Reweighting rule
    pub method: WeightingMethod,

    /// Tuning values of the reweighting rule
    pub params: StrategyParams<T>,

    /// Smoothing parameter (method default when unset)
    pub lambda: Option<T>,

    /// Order of the difference penalty
    pub difference_order: usize,

    /// Convergence tolerance
    pub tolerance: T,

    /// Iteration budget
    pub max_iterations: usize,

    /// Floor applied to every weight
    pub min_weight: T,

    /// Starting weights
    pub initial_weights: Option<Vec<T>>,

    /// Whether to return the baseline-corrected signal
    pub return_corrected: bool,

    /// Deferred error from adapter conversion
    pub deferred_error: Option<BaselineError>,

    // ++++++++++++++++++++++++++++++++++++++
    // +               DEV                  +
    // ++++++++++++++++++++++++++++++++++++++
    /// Parallel execution hint (used by multi-spectrum adapters).
    #[doc(hidden)]
    pub parallel: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation)
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: Float> Default for BatchWhittakerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> BatchWhittakerBuilder<T> {
    /// Create a new batch builder with default parameters.
    fn new() -> Self {
        let defaults = SolveConfig::<T>::default();
        Self {
            method: defaults.method,
            params: defaults.params,
            lambda: None,
            difference_order: defaults.difference_order,
            tolerance: defaults.tolerance,
            max_iterations: defaults.max_iterations,
            min_weight: defaults.min_weight,
            initial_weights: None,
            return_corrected: false,
            deferred_error: None,
            parallel: None,
            duplicate_param: None,
        }
    }

    // ========================================================================
    // Setters
    // ========================================================================

    /// Set the reweighting rule.
    pub fn method(mut self, method: WeightingMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the smoothing parameter.
    pub fn lambda(mut self, lambda: T) -> Self {
        self.lambda = Some(lambda);
        self
    }

    /// Set the order of the difference penalty.
    pub fn difference_order(mut self, order: usize) -> Self {
        self.difference_order = order;
        self
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tol: T) -> Self {
        self.tolerance = tol;
        self
    }

    /// Set the iteration budget.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set the weight floor.
    pub fn min_weight(mut self, min_weight: T) -> Self {
        self.min_weight = min_weight;
        self
    }

    /// Set the starting weights.
    pub fn initial_weights(mut self, weights: Vec<T>) -> Self {
        self.initial_weights = Some(weights);
        self
    }

    /// Replace the strategy parameters.
    pub fn params(mut self, params: StrategyParams<T>) -> Self {
        self.params = params;
        self
    }

    /// Enable returning the baseline-corrected signal.
    pub fn return_corrected(mut self, enabled: bool) -> Self {
        self.return_corrected = enabled;
        self
    }

    // ++++++++++++++++++++++++++++++++++++++
    // +               DEV                  +
    // ++++++++++++++++++++++++++++++++++++++

    /// Set parallel execution hint.
    #[doc(hidden)]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    // ========================================================================
    // Build Method
    // ========================================================================

    /// Build the batch processor.
    pub fn build(self) -> Result<BatchWhittaker<T>, BaselineError> {
        if let Some(err) = self.deferred_error {
            return Err(err);
        }

        // Check for duplicate parameter configuration
        Validator::validate_no_duplicates(self.duplicate_param)?;

        // Validate data-independent parameters
        Validator::resolve_lambda(self.method, self.lambda)?;
        if self.difference_order == 0 {
            return Err(BaselineError::InvalidDifferenceOrder {
                order: 0,
                n: 0,
            });
        }
        Validator::validate_tolerance(self.tolerance)?;
        Validator::validate_iterations(self.max_iterations)?;
        Validator::validate_min_weight(self.min_weight)?;
        if let Some(ref w) = self.initial_weights {
            Validator::validate_initial_weights(w, w.len())?;
        }

        // Parameter names and ranges; data-dependent defaults are filled at fit time
        Validator::normalize_strategy(self.method, &self.params, &[])?;

        Ok(BatchWhittaker { config: self })
    }
}

// ============================================================================
// Batch Whittaker Processor
// ============================================================================

/// Batch baseline processor.
#[derive(Debug, Clone)]
pub struct BatchWhittaker<T: Float> {
    config: BatchWhittakerBuilder<T>,
}

impl<T: Float> BatchWhittaker<T> {
    /// Fit the baseline of an equally spaced spectrum.
    pub fn fit(&self, y: &[T]) -> Result<BaselineResult<T>, BaselineError> {
        self.fit_with_buffer(None, y, None)
    }

    /// Fit the baseline of a spectrum sampled at `x`.
    pub fn fit_with_x(&self, x: &[T], y: &[T]) -> Result<BaselineResult<T>, BaselineError> {
        self.fit_with_buffer(Some(x), y, None)
    }

    /// Fit with caller-owned working memory.
    pub fn fit_with_buffer(
        &self,
        x: Option<&[T]>,
        y: &[T],
        buffer: Option<&mut WhittakerBuffer<T>>,
    ) -> Result<BaselineResult<T>, BaselineError> {
        solve_baseline_with_buffer(y, x, &self.to_config(), buffer)
    }

    /// The engine configuration this processor runs with.
    pub fn to_config(&self) -> SolveConfig<T> {
        let c = &self.config;
        SolveConfig {
            method: c.method,
            params: c.params,
            lambda: c.lambda,
            difference_order: c.difference_order,
            tolerance: c.tolerance,
            max_iterations: c.max_iterations,
            min_weight: c.min_weight,
            initial_weights: c.initial_weights.clone(),
            return_corrected: c.return_corrected,
        }
    }

    /// The reweighting rule.
    pub fn method(&self) -> WeightingMethod {
        self.config.method
    }

    /// Parallel execution hint carried from the builder.
    #[doc(hidden)]
    pub fn parallel_hint(&self) -> Option<bool> {
        self.config.parallel
    }
}
