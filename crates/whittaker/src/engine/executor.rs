//! Execution engine for iteratively reweighted penalized least squares.
//!
//! ## Purpose
//!
//! This module runs the reweighting loop shared by every Whittaker baseline
//! variant: build the system with the current weights, solve it, let the
//! weighting strategy propose new weights, and compare the convergence metric
//! against the tolerance.
//!
//! ## Design notes
//!
//! * Provides both a configuration-based entry point ([`solve_baseline`]) and a
//!   lower-level executor for pre-validated, sorted data and custom strategies.
//! * The penalty `D^T D` is built once per call; each iteration only refreshes
//!   the diagonal and the right-hand side.
//! * Manages working buffers through [`WhittakerBuffer`] to avoid per-iteration
//!   allocation.
//! * Generic over `Float` types to support f32 and f64.
//!
//! ## Key concepts
//!
//! ### Loop states
//! `INIT → ITERATING → {CONVERGED, MAX_ITER_REACHED, FAILED}`, plus the
//! non-fatal early exit when the strategy reports its weights exhausted.
//! Running out of iterations is not an error: the latest baseline is returned
//! with `converged = false`. A failed factorization is an error.
//!
//! ### Roundoff residuals
//! Where the solved baseline sits within `sqrt(eps) * max|y|` of the signal
//! it is set equal to the signal, so sign-based rules see an exact zero
//! residual instead of roundoff that flips sign between iterations.
//!
//! ### Weight bookkeeping
//! The weights returned are always the ones that produced the returned
//! baseline. New weights are floored at `min_weight` before they are used.
//!
//! ## Invariants
//!
//! * x-values handed to [`WhittakerExecutor::run`] are strictly increasing.
//! * All working buffers have the same length as the signal.
//! * `tol_history` holds one entry per solve that produced new weights.
//!
//! ## Non-goals
//!
//! * [`WhittakerExecutor::run`] does not validate or sort its inputs (see
//!   [`solve_baseline`]).
//! * This module does not run independent fits in parallel.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::mem::swap;
use num_traits::Float;

// Internal dependencies
use crate::algorithms::penalized::{PenalizedSystem, apply_penalty, first_order_penalty};
use crate::algorithms::weighting::{
    IterationState, OuterStep, StrategyParams, SystemForm, WeightUpdate, WeightingMethod,
    WeightingStrategy,
};
use crate::engine::output::{BaselineResult, TerminationStatus};
use crate::engine::validator::Validator;
use crate::math::banded::BandedMatrix;
use crate::math::stats::relative_difference;
pub use crate::primitives::buffer::WhittakerBuffer;
use crate::primitives::errors::BaselineError;
use crate::primitives::sorting::{permute, sort_by_x, unsort};

// ============================================================================
// Output
// ============================================================================

/// Output from the reweighting loop, in the order the executor was given.
#[derive(Debug, Clone)]
pub struct ExecutorOutput<T> {
    /// Fitted baseline.
    pub baseline: Vec<T>,

    /// Weights of the solve that produced `baseline`.
    pub weights: Vec<T>,

    /// Number of linear solves performed.
    pub iterations_run: usize,

    /// Whether the loop stopped on its own criterion.
    pub converged: bool,

    /// Why the loop stopped.
    pub status: TerminationStatus,

    /// Convergence metric of every iteration.
    pub tol_history: Vec<T>,
}

// ============================================================================
// Configuration
// ============================================================================

/// Full configuration of a baseline fit.
#[derive(Debug, Clone)]
pub struct SolveConfig<T> {
    /// Reweighting rule.
    pub method: WeightingMethod,

    /// Tuning values of the rule (unset fields take defaults).
    pub params: StrategyParams<T>,

    /// Smoothing parameter (`None` uses the method's default).
    pub lambda: Option<T>,

    /// Order of the difference penalty.
    pub difference_order: usize,

    /// Convergence tolerance.
    pub tolerance: T,

    /// Iteration budget (inner loop).
    pub max_iterations: usize,

    /// Floor applied to every weight.
    pub min_weight: T,

    /// Starting weights (`None` uses ones, or the method's own seed).
    pub initial_weights: Option<Vec<T>>,

    /// Whether to store `signal - baseline` in the result.
    pub return_corrected: bool,
}

impl<T: Float> Default for SolveConfig<T> {
    fn default() -> Self {
        Self {
            method: WeightingMethod::default(),
            params: StrategyParams::default(),
            lambda: None,
            difference_order: 2,
            tolerance: T::from(1e-3).unwrap(),
            max_iterations: 50,
            min_weight: T::epsilon(),
            initial_weights: None,
            return_corrected: false,
        }
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Validate, fit and return a baseline in the caller's sample order.
pub fn solve_baseline<T: Float>(
    signal: &[T],
    x: Option<&[T]>,
    config: &SolveConfig<T>,
) -> Result<BaselineResult<T>, BaselineError> {
    solve_baseline_with_buffer(signal, x, config, None)
}

/// [`solve_baseline`] with caller-owned working memory.
pub fn solve_baseline_with_buffer<T: Float>(
    signal: &[T],
    x: Option<&[T]>,
    config: &SolveConfig<T>,
    buffer: Option<&mut WhittakerBuffer<T>>,
) -> Result<BaselineResult<T>, BaselineError> {
    // INIT: everything is checked before the first solve
    Validator::validate_signal(signal)?;
    let n = signal.len();
    Validator::validate_difference_order(config.difference_order, n)?;
    Validator::validate_tolerance(config.tolerance)?;
    Validator::validate_iterations(config.max_iterations)?;
    Validator::validate_min_weight(config.min_weight)?;
    let lambda = Validator::resolve_lambda(config.method, config.lambda)?;
    if let Some(w) = &config.initial_weights {
        Validator::validate_initial_weights(w, n)?;
    }
    let strategy = Validator::normalize_strategy(config.method, &config.params, signal)?;

    let sorted = match x {
        Some(x) => {
            Validator::validate_x(x, signal)?;
            let sorted = sort_by_x(x, signal);
            Validator::validate_strictly_increasing(&sorted.x)?;
            Some(sorted)
        }
        None => None,
    };
    let reorder = sorted.as_ref().filter(|s| !s.is_identity());

    let executor = WhittakerExecutor::new()
        .lambda(lambda)
        .difference_order(config.difference_order)
        .tolerance(config.tolerance)
        .max_iterations(config.max_iterations)
        .min_weight(config.min_weight);

    let output = match reorder {
        Some(s) => {
            let weights = config
                .initial_weights
                .as_ref()
                .map(|w| permute(w, &s.indices));
            let mut out = executor.run(&s.y, Some(s.x.as_slice()), &strategy, weights.as_deref(), buffer)?;
            out.baseline = unsort(&out.baseline, &s.indices);
            out.weights = unsort(&out.weights, &s.indices);
            out
        }
        None => executor.run(
            signal,
            sorted.as_ref().map(|s| s.x.as_slice()),
            &strategy,
            config.initial_weights.as_deref(),
            buffer,
        )?,
    };

    let corrected = config.return_corrected.then(|| {
        signal
            .iter()
            .zip(&output.baseline)
            .map(|(&y, &z)| y - z)
            .collect()
    });

    Ok(BaselineResult {
        baseline: output.baseline,
        weights: output.weights,
        iterations_run: output.iterations_run,
        converged: output.converged,
        status: output.status,
        tol_history: output.tol_history,
        lambda_used: lambda,
        method: config.method.name(),
        corrected,
    })
}

// ============================================================================
// Executor
// ============================================================================

/// Reweighting loop over pre-validated, sorted data.
#[derive(Debug, Clone)]
pub struct WhittakerExecutor<T: Float> {
    /// Smoothing parameter.
    pub lambda: T,

    /// Order of the difference penalty.
    pub difference_order: usize,

    /// Convergence tolerance.
    pub tolerance: T,

    /// Iteration budget of each inner loop.
    pub max_iterations: usize,

    /// Floor applied to every weight.
    pub min_weight: T,
}

impl<T: Float> Default for WhittakerExecutor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> WhittakerExecutor<T> {
    // ========================================================================
    // Constructor and Builder Methods
    // ========================================================================

    /// Create an executor with default parameters.
    pub fn new() -> Self {
        Self {
            lambda: T::from(WeightingMethod::default().default_lambda()).unwrap(),
            difference_order: 2,
            tolerance: T::from(1e-3).unwrap(),
            max_iterations: 50,
            min_weight: T::epsilon(),
        }
    }

    /// Set the smoothing parameter.
    pub fn lambda(mut self, lambda: T) -> Self {
        self.lambda = lambda;
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

    // ========================================================================
    // Main Loop
    // ========================================================================

    /// Run the reweighting loop with any strategy.
    pub fn run<S: WeightingStrategy<T> + ?Sized>(
        &self,
        signal: &[T],
        x: Option<&[T]>,
        strategy: &S,
        initial_weights: Option<&[T]>,
        buffer: Option<&mut WhittakerBuffer<T>>,
    ) -> Result<ExecutorOutput<T>, BaselineError> {
        let n = signal.len();
        let mut internal_buffer;
        let buf = match buffer {
            Some(b) => b,
            None => {
                internal_buffer = WhittakerBuffer::with_capacity(n);
                &mut internal_buffer
            }
        };
        buf.prepare(n);

        match initial_weights {
            Some(w) => buf.weights.copy_from_slice(w),
            None => {
                strategy.initial_weights(signal, x, &mut buf.weights);
            }
        }
        self.floor_weights(&mut buf.weights);

        // System pieces fixed for the whole fit
        let mut system = PenalizedSystem::new(n, self.difference_order, self.lambda, x)?;
        let form = strategy.system_form();
        let mut extra = None;
        let mut rhs_offset = None;
        match form {
            SystemForm::SquaredWithFirstOrder { lambda_1 } => {
                let mut d1 = first_order_penalty(n, x)?;
                d1.scale(lambda_1);
                rhs_offset = Some(apply_penalty(&d1, signal));
                system.add_penalty(&d1)?;
            }
            SystemForm::DoublyReweighted { .. } => {
                let d1 = first_order_penalty(n, x)?;
                rhs_offset = Some(apply_penalty(&d1, signal));
                extra = Some(d1);
            }
            SystemForm::Standard | SystemForm::Adaptive => {}
        }

        let mut state = IterationState::default();
        strategy.prepare(signal, &mut state);

        let snap = signal.iter().fold(T::zero(), |m, v| m.max(v.abs())) * T::epsilon().sqrt();

        let mut tol_history = Vec::with_capacity(self.max_iterations);
        let mut iterations_run = 0;

        // ITERATING
        let status = loop {
            let mut inner = TerminationStatus::MaxIterReached;
            for iter in 1..=self.max_iterations {
                state.iteration = iter;
                Self::solve_step(
                    &system,
                    form,
                    extra.as_ref(),
                    rhs_offset.as_deref(),
                    signal,
                    &state,
                    buf,
                )?;
                snap_to_signal(&mut buf.baseline, signal, snap);
                iterations_run += 1;

                let update = strategy.update(
                    signal,
                    &buf.baseline,
                    &buf.weights,
                    &state,
                    &mut buf.new_weights,
                );
                let metric = match update {
                    WeightUpdate::Updated => relative_difference(&buf.weights, &buf.new_weights),
                    WeightUpdate::Measured(m) => m,
                    WeightUpdate::Exhausted => {
                        log::warn!(
                            "{}: weights exhausted at iteration {}; returning the current baseline",
                            strategy.name(),
                            iter
                        );
                        inner = TerminationStatus::Exhausted;
                        break;
                    }
                };
                tol_history.push(metric);
                log::debug!(
                    "{}: iteration {} metric {:e}",
                    strategy.name(),
                    iter,
                    metric.to_f64().unwrap_or(f64::NAN)
                );

                if metric < self.tolerance {
                    inner = TerminationStatus::Converged;
                    break;
                }
                if iter < self.max_iterations {
                    strategy.commit(signal, &buf.baseline, &mut state);
                    self.floor_weights(&mut buf.new_weights);
                    swap(&mut buf.weights, &mut buf.new_weights);
                }
            }

            if inner == TerminationStatus::Exhausted {
                break inner;
            }

            // Outer loop decision on the most recent strategy weights
            self.floor_weights(&mut buf.new_weights);
            match strategy.outer_step(&buf.new_weights, &mut state) {
                OuterStep::Single => break inner,
                OuterStep::Converged(m) => {
                    log::debug!(
                        "{}: outer iteration {} converged (metric {:e})",
                        strategy.name(),
                        state.outer_iteration,
                        m.to_f64().unwrap_or(f64::NAN)
                    );
                    break TerminationStatus::Converged;
                }
                OuterStep::Exceeded(_) => break TerminationStatus::MaxIterReached,
                OuterStep::Continue(m) => {
                    log::debug!(
                        "{}: outer iteration {} metric {:e}",
                        strategy.name(),
                        state.outer_iteration,
                        m.to_f64().unwrap_or(f64::NAN)
                    );
                    strategy.commit(signal, &buf.baseline, &mut state);
                    swap(&mut buf.weights, &mut buf.new_weights);
                }
            }
        };

        if status == TerminationStatus::MaxIterReached {
            log::warn!(
                "{}: no convergence after {} iterations (last metric {:e})",
                strategy.name(),
                iterations_run,
                tol_history
                    .last()
                    .and_then(|m| m.to_f64())
                    .unwrap_or(f64::NAN)
            );
        }

        Ok(ExecutorOutput {
            baseline: buf.baseline.as_vec().clone(),
            weights: buf.weights.as_vec().clone(),
            iterations_run,
            converged: status != TerminationStatus::MaxIterReached,
            status,
            tol_history,
        })
    }

    // ========================================================================
    // Main Algorithmic Logic
    // ========================================================================

    /// Assemble and solve one system; the solution lands in `buf.baseline`.
    #[allow(clippy::too_many_arguments)]
    pub fn solve_step(
        system: &PenalizedSystem<T>,
        form: SystemForm<T>,
        extra: Option<&BandedMatrix<T>>,
        rhs_offset: Option<&[T]>,
        signal: &[T],
        state: &IterationState<T>,
        buf: &mut WhittakerBuffer<T>,
    ) -> Result<(), BaselineError> {
        let WhittakerBuffer {
            baseline,
            weights,
            rhs,
            row_scale,
            solver,
            ..
        } = buf;

        for ((b, &w), &y) in rhs.iter_mut().zip(weights.iter()).zip(signal) {
            *b = w * y;
        }

        match form {
            SystemForm::Standard => system.solve(weights, rhs, baseline, solver),
            SystemForm::SquaredWithFirstOrder { .. } => {
                // row_scale holds W² here
                for ((s, b), (&w, &y)) in row_scale
                    .iter_mut()
                    .zip(rhs.iter_mut())
                    .zip(weights.iter().zip(signal))
                {
                    *s = w * w;
                    *b = *s * y;
                }
                if let Some(offset) = rhs_offset {
                    for (b, &o) in rhs.iter_mut().zip(offset) {
                        *b = *b + o;
                    }
                }
                system.solve(row_scale, rhs, baseline, solver)
            }
            SystemForm::DoublyReweighted { eta } => {
                for (s, &w) in row_scale.iter_mut().zip(weights.iter()) {
                    *s = T::one() - eta * w;
                }
                if let Some(offset) = rhs_offset {
                    for (b, &o) in rhs.iter_mut().zip(offset) {
                        *b = *b + o;
                    }
                }
                system.solve_row_scaled(weights, row_scale, extra, rhs, baseline, solver)
            }
            SystemForm::Adaptive => {
                system.solve_row_scaled(weights, &state.alpha, None, rhs, baseline, solver)
            }
        }
    }

    /// Floor weights at `min_weight`; non-finite weights become `min_weight`.
    #[inline]
    pub fn floor_weights(&self, weights: &mut [T]) {
        for w in weights.iter_mut() {
            *w = if w.is_finite() {
                w.max(self.min_weight)
            } else {
                self.min_weight
            };
        }
    }
}

// Replace roundoff-level residuals with exact zeros.
fn snap_to_signal<T: Float>(baseline: &mut [T], signal: &[T], threshold: T) {
    for (z, &y) in baseline.iter_mut().zip(signal) {
        if (y - *z).abs() <= threshold {
            *z = y;
        }
    }
}
