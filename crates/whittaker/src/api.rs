//! High-level API for Whittaker baseline correction.
//!
//! ## Purpose
//!
//! This module provides the primary user-facing entry point. It implements a
//! fluent builder for the smoothing parameters, the reweighting rule and its
//! tuning values, and hands the configuration to an execution adapter.
//!
//! ## Design notes
//!
//! * **Ergonomic**: Fluent builder with sensible defaults for all parameters.
//! * **Polymorphic**: Uses marker types to transition to adapter builders.
//! * **Validated**: Parameters are validated when `.build()` is called on the adapter.
//! * **Type-Safe**: Generic over `Float` types for flexible precision.
//!
//! ## Key concepts
//!
//! * **Execution Adapters**: Batch (one spectrum per call).
//! * **String-keyed configuration**: [`WhittakerBuilder::configure`] accepts a
//!   method identifier and a parameter map, as read from a config file.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`WhittakerBuilder`] via `Whittaker::new()`.
//! 2. Chain configuration methods (`.method()`, `.lambda()`, `.p()`, etc.).
//! 3. Select an adapter via `.adapter(Adapter::Batch)` to get an execution builder.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;
#[cfg(feature = "std")]
use std::string::String;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::adapters::batch::BatchWhittakerBuilder;

// Publicly re-exported types
pub use crate::algorithms::weighting::{StrategyParams, WeightingMethod};
pub use crate::engine::output::{BaselineResult, TerminationStatus};
pub use crate::primitives::buffer::WhittakerBuffer;
pub use crate::primitives::errors::BaselineError;

/// Marker types for selecting execution adapters.
#[allow(non_snake_case)]
pub mod Adapter {
    pub use super::Batch;
}

/// Fluent builder for configuring baseline fits and execution modes.
#[derive(Debug, Clone)]
pub struct WhittakerBuilder<T> {
    /// Reweighting rule.
    pub method: Option<WeightingMethod>,

    /// Smoothing parameter.
    pub lambda: Option<T>,

    /// Order of the difference penalty.
    pub difference_order: Option<usize>,

    /// Convergence tolerance.
    pub tolerance: Option<T>,

    /// Iteration budget.
    pub max_iterations: Option<usize>,

    /// Weight floor.
    pub min_weight: Option<T>,

    /// Starting weights.
    pub initial_weights: Option<Vec<T>>,

    /// Tuning values of the reweighting rule.
    pub params: StrategyParams<T>,

    /// Return the baseline-corrected signal.
    pub return_corrected: Option<bool>,

    /// Error raised while reading string-keyed configuration.
    pub deferred_error: Option<BaselineError>,

    // ======================================
    // DEV
    // ======================================
    /// Parallel execution hint.
    #[doc(hidden)]
    pub parallel: Option<bool>,

    /// Tracks if any parameter was set multiple times (for validation)
    #[doc(hidden)]
    pub duplicate_param: Option<&'static str>,
}

impl<T: Float> Default for WhittakerBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> WhittakerBuilder<T> {
    /// Convert to a specific adapter builder.
    pub fn adapter<A>(self, _adapter: A) -> A::Output
    where
        A: WhittakerAdapter<T>,
    {
        A::convert(self)
    }

    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            method: None,
            lambda: None,
            difference_order: None,
            tolerance: None,
            max_iterations: None,
            min_weight: None,
            initial_weights: None,
            params: StrategyParams::default(),
            return_corrected: None,
            deferred_error: None,
            parallel: None,
            duplicate_param: None,
        }
    }

    // ========================================================================
    // Core Parameters
    // ========================================================================

    /// Set the reweighting rule.
    pub fn method(mut self, method: WeightingMethod) -> Self {
        if self.method.is_some() {
            self.duplicate_param = Some("method");
        }
        self.method = Some(method);
        self
    }

    /// Set the smoothing parameter (larger is smoother).
    pub fn lambda(mut self, lambda: T) -> Self {
        if self.lambda.is_some() {
            self.duplicate_param = Some("lambda");
        }
        self.lambda = Some(lambda);
        self
    }

    /// Set the order of the difference penalty.
    pub fn difference_order(mut self, order: usize) -> Self {
        if self.difference_order.is_some() {
            self.duplicate_param = Some("difference_order");
        }
        self.difference_order = Some(order);
        self
    }

    /// Set the convergence tolerance.
    pub fn tolerance(mut self, tol: T) -> Self {
        if self.tolerance.is_some() {
            self.duplicate_param = Some("tolerance");
        }
        self.tolerance = Some(tol);
        self
    }

    /// Set the iteration budget.
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        if self.max_iterations.is_some() {
            self.duplicate_param = Some("max_iterations");
        }
        self.max_iterations = Some(iterations);
        self
    }

    /// Set the floor applied to every weight.
    pub fn min_weight(mut self, min_weight: T) -> Self {
        if self.min_weight.is_some() {
            self.duplicate_param = Some("min_weight");
        }
        self.min_weight = Some(min_weight);
        self
    }

    /// Set the starting weights.
    pub fn initial_weights(mut self, weights: Vec<T>) -> Self {
        if self.initial_weights.is_some() {
            self.duplicate_param = Some("initial_weights");
        }
        self.initial_weights = Some(weights);
        self
    }

    /// Store `signal - baseline` in the result.
    pub fn return_corrected(mut self) -> Self {
        self.return_corrected = Some(true);
        self
    }

    // ========================================================================
    // Method Parameters
    // ========================================================================

    /// Asymmetry parameter (AsLS, IAsLS, PsaLSA, DerPsaLSA).
    pub fn p(mut self, p: T) -> Self {
        if self.params.p.is_some() {
            self.duplicate_param = Some("p");
        }
        self.params.p = Some(p);
        self
    }

    /// First-order penalty weight (IAsLS).
    pub fn lambda_1(mut self, lambda_1: T) -> Self {
        if self.params.lambda_1.is_some() {
            self.duplicate_param = Some("lambda_1");
        }
        self.params.lambda_1 = Some(lambda_1);
        self
    }

    /// Penalty reweighting strength (DrPLS).
    pub fn eta(mut self, eta: T) -> Self {
        if self.params.eta.is_some() {
            self.duplicate_param = Some("eta");
        }
        self.params.eta = Some(eta);
        self
    }

    /// Logistic steepness (AsPLS).
    pub fn asymmetric_coef(mut self, coef: T) -> Self {
        if self.params.asymmetric_coef.is_some() {
            self.duplicate_param = Some("asymmetric_coef");
        }
        self.params.asymmetric_coef = Some(coef);
        self
    }

    /// Decay scale above the baseline (PsaLSA, DerPsaLSA).
    pub fn k(mut self, k: T) -> Self {
        if self.params.k.is_some() {
            self.duplicate_param = Some("k");
        }
        self.params.k = Some(k);
        self
    }

    /// Half window of the pre-smoothing pass (DerPsaLSA).
    pub fn smooth_half_window(mut self, half_window: usize) -> Self {
        if self.params.smooth_half_window.is_some() {
            self.duplicate_param = Some("smooth_half_window");
        }
        self.params.smooth_half_window = Some(half_window);
        self
    }

    /// Number of pre-smoothing passes (DerPsaLSA).
    pub fn num_smooths(mut self, passes: usize) -> Self {
        if self.params.num_smooths.is_some() {
            self.duplicate_param = Some("num_smooths");
        }
        self.params.num_smooths = Some(passes);
        self
    }

    /// Budget of the prior re-estimation loop (BrPLS).
    pub fn max_outer_iterations(mut self, iterations: usize) -> Self {
        if self.params.max_outer_iterations.is_some() {
            self.duplicate_param = Some("max_outer_iterations");
        }
        self.params.max_outer_iterations = Some(iterations);
        self
    }

    /// Tolerance of the prior re-estimation loop (BrPLS).
    pub fn outer_tolerance(mut self, tol: T) -> Self {
        if self.params.outer_tolerance.is_some() {
            self.duplicate_param = Some("outer_tolerance");
        }
        self.params.outer_tolerance = Some(tol);
        self
    }

    /// Select the method by identifier and read its parameters from a map.
    ///
    /// Unknown identifiers or parameter names surface from `build()`. Values
    /// already set through the named setters are kept; a key set both ways is
    /// reported as a duplicate.
    pub fn configure(mut self, method: &str, params: &BTreeMap<String, f64>) -> Self {
        let resolved = WeightingMethod::from_name(method)
            .and_then(|m| StrategyParams::from_map(m, params).map(|p| (m, p)));
        match resolved {
            Ok((m, p)) => {
                if self.method.is_some() {
                    self.duplicate_param = Some("method");
                }
                self.method = Some(m);
                if let Some(name) = self.params.merge(&p) {
                    self.duplicate_param = Some(name);
                }
            }
            Err(err) => {
                if self.deferred_error.is_none() {
                    self.deferred_error = Some(err);
                }
            }
        }
        self
    }

    // ==========================
    // Development Options
    // ==========================

    /// Set parallel execution hint.
    #[doc(hidden)]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }
}

// ============================================================================
// Adapter Conversion
// ============================================================================

/// Trait for transitioning from a generic builder to an execution adapter.
pub trait WhittakerAdapter<T: Float> {
    /// The output execution builder.
    type Output;

    /// Convert a generic [`WhittakerBuilder`] into a specialized adapter builder.
    fn convert(builder: WhittakerBuilder<T>) -> Self::Output;
}

/// Marker for in-memory batch processing.
#[derive(Debug, Clone, Copy)]
pub struct Batch;

impl<T: Float> WhittakerAdapter<T> for Batch {
    type Output = BatchWhittakerBuilder<T>;

    fn convert(builder: WhittakerBuilder<T>) -> Self::Output {
        let mut result = BatchWhittakerBuilder::default();

        // Override with user-provided values
        if let Some(method) = builder.method {
            result.method = method;
        }
        if let Some(lambda) = builder.lambda {
            result.lambda = Some(lambda);
        }
        if let Some(order) = builder.difference_order {
            result.difference_order = order;
        }
        if let Some(tol) = builder.tolerance {
            result.tolerance = tol;
        }
        if let Some(iterations) = builder.max_iterations {
            result.max_iterations = iterations;
        }
        if let Some(min_weight) = builder.min_weight {
            result.min_weight = min_weight;
        }
        if let Some(weights) = builder.initial_weights {
            result.initial_weights = Some(weights);
        }
        if let Some(rc) = builder.return_corrected {
            result.return_corrected = rc;
        }
        result.params = builder.params;
        result.deferred_error = builder.deferred_error;

        // ======================================
        // DEV
        // ======================================

        if let Some(p) = builder.parallel {
            result.parallel = Some(p);
        }
        result.duplicate_param = builder.duplicate_param;

        result
    }
}
