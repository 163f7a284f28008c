//! Reweighting rules for iteratively reweighted penalized least squares.
//!
//! ## Purpose
//!
//! Every Whittaker baseline variant shares the same solve loop and differs
//! only in how the weights are recomputed from the residual `r = y - z`
//! after each solve. This module defines that seam ([`WeightingStrategy`])
//! and implements it for the published variants ([`Strategy`]).
//!
//! ## Design notes
//!
//! * **Pure updates**: A strategy reads the signal, the current baseline and
//!   the previous weights and writes new weights. Anything it must remember
//!   between iterations lives in an explicit [`IterationState`].
//! * **System forms**: Some variants change the linear system itself, not just
//!   the weights; they declare this through [`SystemForm`] and the engine
//!   builds the matching left- and right-hand sides.
//! * **Early exit**: Rules built on statistics of the negative residuals
//!   report [`WeightUpdate::Exhausted`] when too few residuals are negative to
//!   estimate them. The engine then stops with the latest baseline.
//! * **Outer loop**: The Bayesian variant re-estimates a prior after each
//!   inner loop; [`WeightingStrategy::outer_step`] drives this.
//!
//! ## Key concepts
//!
//! * **Asymmetry**: Points above the baseline (peaks) get small weights,
//!   points below get large ones, so the fit hugs the lower envelope.
//! * **Names and parameters**: [`WeightingMethod`] is the plain selector,
//!   [`StrategyParams`] the optional tuning values, and [`Strategy`] the
//!   method with every parameter resolved.
//!
//! ## Invariants
//!
//! * `update` writes exactly `signal.len()` weights.
//! * `update` never reads weights it has not been handed.
//!
//! ## Non-goals
//!
//! * This module does not floor weights or check convergence (see the engine).
//! * This module does not validate parameter ranges (see `validator`).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BTreeMap;
#[cfg(feature = "std")]
use std::string::{String, ToString};
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::{Display, Formatter, Result as FmtResult};
use num_traits::Float;

// Internal dependencies
use crate::algorithms::polynomial::fit_quadratic;
use crate::algorithms::smoothing::{gradient, smooth};
use crate::math::special::erfcx;
use crate::math::stats::{expit, l1_norm, mean, relative_difference, rms, safe_std};
use crate::primitives::errors::BaselineError;

// ============================================================================
// Weighting Method
// ============================================================================

/// Selector for the reweighting rule.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeightingMethod {
    /// Asymmetric least squares: weight `p` above the baseline, `1 - p` below.
    #[default]
    AsLS,

    /// Improved AsLS with squared weights and a first-order penalty on the fit.
    IAsLS,

    /// Adaptive iteratively reweighted PLS (exponential weights on negative residuals).
    AirPLS,

    /// Asymmetrically reweighted PLS (logistic weights).
    ArPLS,

    /// Doubly reweighted PLS (iteration-sharpened weights, weighted penalty).
    DrPLS,

    /// Improved arPLS (iteration-sharpened weights).
    IArPLS,

    /// Adaptive smoothness PLS (per-point penalty scaling).
    AsPLS,

    /// Peaked signal asymmetric least squares (exponential decay above).
    PsaLSA,

    /// Derivative peak-screening asymmetric least squares.
    DerPsaLSA,

    /// Bayesian reweighted PLS (prior re-estimated in an outer loop).
    BrPLS,

    /// Locally symmetric reweighted PLS.
    LsrPLS,
}

impl WeightingMethod {
    /// Every method, in declaration order.
    pub const ALL: [Self; 11] = [
        Self::AsLS,
        Self::IAsLS,
        Self::AirPLS,
        Self::ArPLS,
        Self::DrPLS,
        Self::IArPLS,
        Self::AsPLS,
        Self::PsaLSA,
        Self::DerPsaLSA,
        Self::BrPLS,
        Self::LsrPLS,
    ];

    /// Lowercase identifier used in string-keyed configuration.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AsLS => "asls",
            Self::IAsLS => "iasls",
            Self::AirPLS => "airpls",
            Self::ArPLS => "arpls",
            Self::DrPLS => "drpls",
            Self::IArPLS => "iarpls",
            Self::AsPLS => "aspls",
            Self::PsaLSA => "psalsa",
            Self::DerPsaLSA => "derpsalsa",
            Self::BrPLS => "brpls",
            Self::LsrPLS => "lsrpls",
        }
    }

    /// Look up a method by its identifier (case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, BaselineError> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| BaselineError::UnknownMethod(name.to_string()))
    }

    /// Smoothing parameter used when none is given.
    pub fn default_lambda(&self) -> f64 {
        match self {
            Self::AsLS | Self::IAsLS | Self::AirPLS | Self::DerPsaLSA => 1e6,
            Self::ArPLS
            | Self::DrPLS
            | Self::IArPLS
            | Self::AsPLS
            | Self::PsaLSA
            | Self::BrPLS
            | Self::LsrPLS => 1e5,
        }
    }

    /// Names of the tuning parameters this method accepts.
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            Self::AsLS => &["p"],
            Self::IAsLS => &["p", "lambda_1"],
            Self::DrPLS => &["eta"],
            Self::AsPLS => &["asymmetric_coef"],
            Self::PsaLSA => &["p", "k"],
            Self::DerPsaLSA => &["p", "k", "smooth_half_window", "num_smooths"],
            Self::BrPLS => &["max_outer_iterations", "outer_tolerance"],
            Self::AirPLS | Self::ArPLS | Self::IArPLS | Self::LsrPLS => &[],
        }
    }
}

impl Display for WeightingMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Strategy Parameters
// ============================================================================

/// Optional tuning values; unset fields take the method's defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategyParams<T> {
    /// Asymmetry: weight given to points above the baseline.
    pub p: Option<T>,

    /// Weight of the first-order penalty on the fit (IAsLS).
    pub lambda_1: Option<T>,

    /// Penalty reweighting strength in `[0, 1]` (DrPLS).
    pub eta: Option<T>,

    /// Steepness of the logistic weighting (AsPLS).
    pub asymmetric_coef: Option<T>,

    /// Decay scale of weights above the baseline (PsaLSA, DerPsaLSA).
    pub k: Option<T>,

    /// Half window of the pre-smoothing pass (DerPsaLSA).
    pub smooth_half_window: Option<usize>,

    /// Number of pre-smoothing passes (DerPsaLSA).
    pub num_smooths: Option<usize>,

    /// Iteration budget of the prior re-estimation loop (BrPLS).
    pub max_outer_iterations: Option<usize>,

    /// Tolerance of the prior re-estimation loop (BrPLS).
    pub outer_tolerance: Option<T>,
}

impl<T> Default for StrategyParams<T> {
    fn default() -> Self {
        Self {
            p: None,
            lambda_1: None,
            eta: None,
            asymmetric_coef: None,
            k: None,
            smooth_half_window: None,
            num_smooths: None,
            max_outer_iterations: None,
            outer_tolerance: None,
        }
    }
}

impl<T: Float> StrategyParams<T> {
    /// Names of the fields that are set.
    pub fn set_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.p.is_some() {
            names.push("p");
        }
        if self.lambda_1.is_some() {
            names.push("lambda_1");
        }
        if self.eta.is_some() {
            names.push("eta");
        }
        if self.asymmetric_coef.is_some() {
            names.push("asymmetric_coef");
        }
        if self.k.is_some() {
            names.push("k");
        }
        if self.smooth_half_window.is_some() {
            names.push("smooth_half_window");
        }
        if self.num_smooths.is_some() {
            names.push("num_smooths");
        }
        if self.max_outer_iterations.is_some() {
            names.push("max_outer_iterations");
        }
        if self.outer_tolerance.is_some() {
            names.push("outer_tolerance");
        }
        names
    }

    /// Copy every field set in `other` into `self`.
    ///
    /// Returns the first field that was already set on both sides.
    pub fn merge(&mut self, other: &Self) -> Option<&'static str> {
        let mut duplicate = None;
        macro_rules! take {
            ($($field:ident),*) => {$(
                if let Some(v) = other.$field {
                    if self.$field.is_some() && duplicate.is_none() {
                        duplicate = Some(stringify!($field));
                    }
                    self.$field = Some(v);
                }
            )*};
        }
        take!(
            p,
            lambda_1,
            eta,
            asymmetric_coef,
            k,
            smooth_half_window,
            num_smooths,
            max_outer_iterations,
            outer_tolerance
        );
        duplicate
    }

    /// Read parameters from a string-keyed map.
    ///
    /// Keys the method does not accept are rejected; integer parameters must
    /// hold non-negative whole numbers.
    pub fn from_map(method: WeightingMethod, map: &BTreeMap<String, f64>) -> Result<Self, BaselineError> {
        let mut params = Self::default();
        for (key, &value) in map {
            let Some(&name) = method.parameter_names().iter().find(|&&n| n == key.as_str()) else {
                return Err(BaselineError::UnknownParameter {
                    method: method.name(),
                    parameter: key.clone(),
                });
            };
            match name {
                "p" => params.p = Some(Self::float(value)),
                "lambda_1" => params.lambda_1 = Some(Self::float(value)),
                "eta" => params.eta = Some(Self::float(value)),
                "asymmetric_coef" => params.asymmetric_coef = Some(Self::float(value)),
                "k" => params.k = Some(Self::float(value)),
                "outer_tolerance" => params.outer_tolerance = Some(Self::float(value)),
                "smooth_half_window" => {
                    params.smooth_half_window = Some(Self::count(name, value)?);
                }
                "num_smooths" => params.num_smooths = Some(Self::count(name, value)?),
                "max_outer_iterations" => {
                    params.max_outer_iterations = Some(Self::count(name, value)?);
                }
                _ => unreachable!("parameter_names and from_map disagree"),
            }
        }
        Ok(params)
    }

    fn float(value: f64) -> T {
        T::from(value).unwrap_or(T::nan())
    }

    fn count(name: &'static str, value: f64) -> Result<usize, BaselineError> {
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(BaselineError::InvalidParameter {
                parameter: name,
                value,
                expected: "a non-negative integer",
            });
        }
        Ok(value as usize)
    }
}

// ============================================================================
// Strategy Interface
// ============================================================================

/// How the weights enter the penalized system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SystemForm<T> {
    /// `(W + lambda D^T D) z = W y`.
    Standard,

    /// `(W² + lambda_1 D_1^T D_1 + lambda D^T D) z = (W² + lambda_1 D_1^T D_1) y`.
    SquaredWithFirstOrder {
        /// First-order penalty weight.
        lambda_1: T,
    },

    /// `(W + D_1^T D_1 + (I - eta W) lambda D^T D) z = (W + D_1^T D_1) y`.
    DoublyReweighted {
        /// Penalty reweighting strength.
        eta: T,
    },

    /// `(W + diag(alpha) lambda D^T D) z = W y`, alpha held in the iteration state.
    Adaptive,
}

/// Outcome of one weight update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeightUpdate<T> {
    /// New weights written; convergence is judged by their relative change.
    Updated,

    /// New weights written; convergence is judged by this metric instead.
    Measured(T),

    /// The rule cannot produce weights from this baseline; stop here.
    Exhausted,
}

/// Decision taken after an inner loop ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OuterStep<T> {
    /// The strategy has no outer loop.
    Single,

    /// The outer loop converged with this metric.
    Converged(T),

    /// Run another inner loop; metric of the finished one.
    Continue(T),

    /// The outer budget is spent; metric of the last inner loop.
    Exceeded(T),
}

/// Values a strategy carries between iterations.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationState<T> {
    /// Current inner iteration, starting at 1.
    pub iteration: usize,

    /// Completed outer iterations.
    pub outer_iteration: usize,

    /// Per-point penalty scaling (adaptive form).
    pub alpha: Vec<T>,

    /// Signal-dependent weight factors computed once per fit.
    pub partial_weights: Vec<T>,

    /// Prior probability of a point belonging to a peak (BrPLS).
    pub beta: T,

    /// L1 norm of the signal.
    pub signal_l1: T,

    /// Baseline of the previous iteration.
    pub previous_baseline: Vec<T>,
}

impl<T: Float> Default for IterationState<T> {
    fn default() -> Self {
        Self {
            iteration: 1,
            outer_iteration: 0,
            alpha: Vec::new(),
            partial_weights: Vec::new(),
            beta: T::from(0.5).unwrap(),
            signal_l1: T::zero(),
            previous_baseline: Vec::new(),
        }
    }
}

/// A reweighting rule.
pub trait WeightingStrategy<T: Float> {
    /// Short identifier of the rule.
    fn name(&self) -> &'static str;

    /// How the weights enter the linear system.
    fn system_form(&self) -> SystemForm<T> {
        SystemForm::Standard
    }

    /// Replace the all-ones starting weights. Returns false to keep them.
    fn initial_weights(&self, _signal: &[T], _x: Option<&[T]>, _out: &mut [T]) -> bool {
        false
    }

    /// Set up the iteration state for one fit.
    fn prepare(&self, _signal: &[T], _state: &mut IterationState<T>) {}

    /// Compute weights for the next solve from the current baseline.
    fn update(
        &self,
        signal: &[T],
        baseline: &[T],
        weights: &[T],
        state: &IterationState<T>,
        new_weights: &mut [T],
    ) -> WeightUpdate<T>;

    /// Record per-iteration state once the engine has decided to continue.
    fn commit(&self, _signal: &[T], _baseline: &[T], _state: &mut IterationState<T>) {}

    /// Decide whether to run another inner loop with `weights`.
    fn outer_step(&self, _weights: &[T], _state: &mut IterationState<T>) -> OuterStep<T> {
        OuterStep::Single
    }
}

// ============================================================================
// Resolved Strategies
// ============================================================================

/// A weighting method with every parameter resolved.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Strategy<T> {
    /// See [`WeightingMethod::AsLS`].
    AsLS {
        /// Weight above the baseline.
        p: T,
    },
    /// See [`WeightingMethod::IAsLS`].
    IAsLS {
        /// Weight above the baseline.
        p: T,
        /// First-order penalty weight.
        lambda_1: T,
    },
    /// See [`WeightingMethod::AirPLS`].
    AirPLS,
    /// See [`WeightingMethod::ArPLS`].
    ArPLS,
    /// See [`WeightingMethod::DrPLS`].
    DrPLS {
        /// Penalty reweighting strength.
        eta: T,
    },
    /// See [`WeightingMethod::IArPLS`].
    IArPLS,
    /// See [`WeightingMethod::AsPLS`].
    AsPLS {
        /// Logistic steepness.
        asymmetric_coef: T,
    },
    /// See [`WeightingMethod::PsaLSA`].
    PsaLSA {
        /// Weight scale above the baseline.
        p: T,
        /// Decay scale above the baseline.
        k: T,
    },
    /// See [`WeightingMethod::DerPsaLSA`].
    DerPsaLSA {
        /// Weight scale above the baseline.
        p: T,
        /// Decay scale above the baseline.
        k: T,
        /// Half window of the pre-smoothing pass.
        smooth_half_window: usize,
        /// Number of pre-smoothing passes.
        num_smooths: usize,
    },
    /// See [`WeightingMethod::BrPLS`].
    BrPLS {
        /// Outer iteration budget.
        max_outer_iterations: usize,
        /// Outer tolerance.
        outer_tolerance: T,
    },
    /// See [`WeightingMethod::LsrPLS`].
    LsrPLS,
}

impl<T: Float> Strategy<T> {
    /// The selector this strategy was resolved from.
    pub fn method(&self) -> WeightingMethod {
        match self {
            Self::AsLS { .. } => WeightingMethod::AsLS,
            Self::IAsLS { .. } => WeightingMethod::IAsLS,
            Self::AirPLS => WeightingMethod::AirPLS,
            Self::ArPLS => WeightingMethod::ArPLS,
            Self::DrPLS { .. } => WeightingMethod::DrPLS,
            Self::IArPLS => WeightingMethod::IArPLS,
            Self::AsPLS { .. } => WeightingMethod::AsPLS,
            Self::PsaLSA { .. } => WeightingMethod::PsaLSA,
            Self::DerPsaLSA { .. } => WeightingMethod::DerPsaLSA,
            Self::BrPLS { .. } => WeightingMethod::BrPLS,
            Self::LsrPLS => WeightingMethod::LsrPLS,
        }
    }
}

impl<T: Float> WeightingStrategy<T> for Strategy<T> {
    fn name(&self) -> &'static str {
        self.method().name()
    }

    fn system_form(&self) -> SystemForm<T> {
        match *self {
            Self::IAsLS { lambda_1, .. } => SystemForm::SquaredWithFirstOrder { lambda_1 },
            Self::DrPLS { eta } => SystemForm::DoublyReweighted { eta },
            Self::AsPLS { .. } => SystemForm::Adaptive,
            _ => SystemForm::Standard,
        }
    }

    fn initial_weights(&self, signal: &[T], x: Option<&[T]>, out: &mut [T]) -> bool {
        match *self {
            Self::IAsLS { p, .. } => {
                let fit = fit_quadratic(x, signal);
                asls_weights(signal, &fit, p, out);
                true
            }
            _ => false,
        }
    }

    fn prepare(&self, signal: &[T], state: &mut IterationState<T>) {
        let n = signal.len();
        match *self {
            Self::AirPLS => state.signal_l1 = l1_norm(signal),
            Self::AsPLS { .. } => {
                state.alpha.clear();
                state.alpha.resize(n, T::one());
            }
            Self::DerPsaLSA {
                smooth_half_window,
                num_smooths,
                ..
            } => {
                state.partial_weights = derivative_screen(signal, smooth_half_window, num_smooths);
            }
            Self::BrPLS { .. } => {
                state.beta = T::from(0.5).unwrap();
                state.previous_baseline.clear();
                state.previous_baseline.extend_from_slice(signal);
            }
            _ => {}
        }
    }

    fn update(
        &self,
        signal: &[T],
        baseline: &[T],
        _weights: &[T],
        state: &IterationState<T>,
        new_weights: &mut [T],
    ) -> WeightUpdate<T> {
        match *self {
            Self::AsLS { p } | Self::IAsLS { p, .. } => {
                asls_weights(signal, baseline, p, new_weights);
                WeightUpdate::Updated
            }
            Self::AirPLS => airpls_weights(signal, baseline, state, new_weights),
            Self::ArPLS => arpls_weights(signal, baseline, new_weights),
            Self::DrPLS { .. } => {
                let mult = T::from(state.iteration).unwrap().exp();
                shifted_logistic(signal, baseline, mult, new_weights)
            }
            Self::IArPLS => iarpls_weights(signal, baseline, state.iteration, new_weights),
            Self::AsPLS { asymmetric_coef } => {
                aspls_weights(signal, baseline, asymmetric_coef, new_weights)
            }
            Self::PsaLSA { p, k } => {
                for ((w, &y), &z) in new_weights.iter_mut().zip(signal).zip(baseline) {
                    let r = y - z;
                    *w = if r > T::zero() {
                        p * (-r / k).exp()
                    } else {
                        T::one() - p
                    };
                }
                WeightUpdate::Updated
            }
            Self::DerPsaLSA { p, k, .. } => {
                let half = T::from(0.5).unwrap();
                for (i, w) in new_weights.iter_mut().enumerate() {
                    let r = signal[i] - baseline[i];
                    let base = if r > T::zero() {
                        p * (-(r / k).powi(2) * half).exp()
                    } else {
                        T::one() - p
                    };
                    *w = state.partial_weights[i] * base;
                }
                WeightUpdate::Updated
            }
            Self::BrPLS { .. } => brpls_weights(signal, baseline, state, new_weights),
            Self::LsrPLS => {
                let mult = T::from(10.0).unwrap().powi(state.iteration as i32);
                shifted_logistic(signal, baseline, mult, new_weights)
            }
        }
    }

    fn commit(&self, signal: &[T], baseline: &[T], state: &mut IterationState<T>) {
        match self {
            Self::AsPLS { .. } => {
                let max_abs = signal
                    .iter()
                    .zip(baseline)
                    .fold(T::zero(), |acc, (&y, &z)| acc.max((y - z).abs()));
                if max_abs > T::zero() {
                    for ((a, &y), &z) in state.alpha.iter_mut().zip(signal).zip(baseline) {
                        *a = (y - z).abs() / max_abs;
                    }
                }
            }
            Self::BrPLS { .. } => {
                state.previous_baseline.clear();
                state.previous_baseline.extend_from_slice(baseline);
            }
            _ => {}
        }
    }

    fn outer_step(&self, weights: &[T], state: &mut IterationState<T>) -> OuterStep<T> {
        let Self::BrPLS {
            max_outer_iterations,
            outer_tolerance,
        } = *self
        else {
            return OuterStep::Single;
        };

        let weight_mean = mean(weights);
        let metric = (state.beta + weight_mean - T::one()).abs();
        state.outer_iteration += 1;
        if metric < outer_tolerance {
            return OuterStep::Converged(metric);
        }
        if state.outer_iteration >= max_outer_iterations {
            return OuterStep::Exceeded(metric);
        }
        let eps = T::epsilon();
        state.beta = (T::one() - weight_mean).max(eps).min(T::one() - eps);
        OuterStep::Continue(metric)
    }
}

// ============================================================================
// Weighting Rules
// ============================================================================

/// `p` where the signal is above the baseline, `1 - p` elsewhere.
pub fn asls_weights<T: Float>(signal: &[T], baseline: &[T], p: T, out: &mut [T]) {
    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        *w = if y > z { p } else { T::one() - p };
    }
}

// Mean and sample standard deviation of the negative residuals, or None when
// fewer than two residuals are negative.
fn negative_residual_stats<T: Float>(signal: &[T], baseline: &[T]) -> Option<(T, T)> {
    let neg: Vec<T> = signal
        .iter()
        .zip(baseline)
        .map(|(&y, &z)| y - z)
        .filter(|&r| r < T::zero())
        .collect();
    if neg.len() < 2 {
        return None;
    }
    Some((mean(&neg), safe_std(&neg)))
}

fn airpls_weights<T: Float>(
    signal: &[T],
    baseline: &[T],
    state: &IterationState<T>,
    out: &mut [T],
) -> WeightUpdate<T> {
    let (neg_count, neg_l1) = signal
        .iter()
        .zip(baseline)
        .map(|(&y, &z)| y - z)
        .filter(|&r| r < T::zero())
        .fold((0usize, T::zero()), |(c, s), r| (c + 1, s - r));
    if neg_count < 2 || !(neg_l1 > T::zero()) {
        return WeightUpdate::Exhausted;
    }

    let log_max = T::max_value().ln();
    let it = T::from(state.iteration).unwrap();
    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        let r = y - z;
        *w = if r < T::zero() {
            (it * (-r) / neg_l1).min(log_max).exp()
        } else {
            T::zero()
        };
    }
    WeightUpdate::Measured(neg_l1 / state.signal_l1.max(T::epsilon()))
}

fn arpls_weights<T: Float>(signal: &[T], baseline: &[T], out: &mut [T]) -> WeightUpdate<T> {
    let Some((m, s)) = negative_residual_stats(signal, baseline) else {
        return WeightUpdate::Exhausted;
    };
    let two = T::from(2.0).unwrap();
    let shift = two * s - m;
    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        *w = expit(-(two / s) * (y - z - shift));
    }
    WeightUpdate::Updated
}

// `0.5 * (1 - u / (1 + |u|))` with `u = mult * (r - (2 std - mean)) / std`,
// shared by the doubly and locally symmetric reweighting rules.
fn shifted_logistic<T: Float>(
    signal: &[T],
    baseline: &[T],
    mult: T,
    out: &mut [T],
) -> WeightUpdate<T> {
    let Some((m, s)) = negative_residual_stats(signal, baseline) else {
        return WeightUpdate::Exhausted;
    };
    let two = T::from(2.0).unwrap();
    let half = T::from(0.5).unwrap();
    let mult = if mult.is_finite() { mult } else { T::max_value() };
    let shift = two * s - m;
    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        let inner = mult * ((y - z - shift) / s);
        let ratio = if inner.is_infinite() {
            inner.signum()
        } else {
            inner / (T::one() + inner.abs())
        };
        *w = half * (T::one() - ratio);
    }
    WeightUpdate::Updated
}

fn iarpls_weights<T: Float>(
    signal: &[T],
    baseline: &[T],
    iteration: usize,
    out: &mut [T],
) -> WeightUpdate<T> {
    let Some((_, s)) = negative_residual_stats(signal, baseline) else {
        return WeightUpdate::Exhausted;
    };
    let two = T::from(2.0).unwrap();
    let half = T::from(0.5).unwrap();
    let mult = T::from(iteration).unwrap().exp();
    let mult = if mult.is_finite() { mult } else { T::max_value() };
    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        let inner = mult * ((y - z - two * s) / s);
        // u / sqrt(1 + u²) without squaring large u
        let ratio = if inner.abs() > T::one() {
            inner.signum() / (T::one() + (T::one() / inner).powi(2)).sqrt()
        } else {
            inner / (T::one() + inner * inner).sqrt()
        };
        *w = half * (T::one() - ratio);
    }
    WeightUpdate::Updated
}

fn aspls_weights<T: Float>(
    signal: &[T],
    baseline: &[T],
    asymmetric_coef: T,
    out: &mut [T],
) -> WeightUpdate<T> {
    let Some((_, s)) = negative_residual_stats(signal, baseline) else {
        return WeightUpdate::Exhausted;
    };
    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        *w = expit(-(asymmetric_coef / s) * (y - z - s));
    }
    WeightUpdate::Updated
}

fn brpls_weights<T: Float>(
    signal: &[T],
    baseline: &[T],
    state: &IterationState<T>,
    out: &mut [T],
) -> WeightUpdate<T> {
    let mut pos_sum = T::zero();
    let mut pos_count = 0usize;
    let mut neg_sq = T::zero();
    let mut neg_count = 0usize;
    for (&y, &z) in signal.iter().zip(baseline) {
        let r = y - z;
        if r >= T::zero() {
            pos_sum = pos_sum + r;
            pos_count += 1;
        } else {
            neg_sq = neg_sq + r * r;
            neg_count += 1;
        }
    }
    if pos_count == 0 || neg_count == 0 {
        return WeightUpdate::Exhausted;
    }

    let mu = (pos_sum / T::from(pos_count).unwrap()).max(T::epsilon());
    let sigma = (neg_sq / T::from(neg_count).unwrap()).sqrt().max(T::epsilon());
    let sqrt2 = T::from(core::f64::consts::SQRT_2).unwrap();
    let sqrt_half_pi = T::from((core::f64::consts::PI / 2.0).sqrt()).unwrap();
    let beta = state.beta;
    let multiplier = (beta / (T::one() - beta)) * sqrt_half_pi * (sigma / mu);

    for ((w, &y), &z) in out.iter_mut().zip(signal).zip(baseline) {
        let u = (y - z) / (sigma * sqrt2) - sigma / (mu * sqrt2);
        let denom = T::one() + multiplier * erfcx(-u);
        *w = if denom.is_finite() {
            T::one() / denom
        } else {
            T::zero()
        };
    }
    WeightUpdate::Measured(relative_difference(&state.previous_baseline, baseline))
}

// Peak-screening factors from the first two derivatives of a smoothed signal.
fn derivative_screen<T: Float>(signal: &[T], half_window: usize, passes: usize) -> Vec<T> {
    let smoothed = smooth(signal, half_window, passes);
    let d1 = gradient(&smoothed);
    let d2 = gradient(&d1);
    let (rms1, rms2) = (rms(&d1), rms(&d2));
    let half = T::from(0.5).unwrap();

    let factor = |d: T, scale: T| -> T {
        if scale > T::zero() {
            (-(d / scale).powi(2) * half).exp()
        } else {
            T::one()
        }
    };
    d1.iter()
        .zip(&d2)
        .map(|(&a, &b)| factor(a, rms1) * factor(b, rms2))
        .collect()
}
