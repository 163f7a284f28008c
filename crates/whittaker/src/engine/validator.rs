//! Input validation and parameter normalization.
//!
//! ## Purpose
//!
//! This module checks every input and parameter of a baseline fit before the
//! first iteration and fills in per-method defaults, so the executor only ever
//! sees a consistent configuration.
//!
//! ## Design notes
//!
//! * **Fail-Fast**: Validation stops at the first error encountered.
//! * **Efficiency**: Checks are ordered from cheap to expensive.
//! * **Generics**: Validation is generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Parameter Bounds**: lambda, tolerance and the weight floor must be
//!   positive and finite; the difference order must leave at least one row
//!   in `D`; the iteration budget is capped.
//! * **Normalization**: [`Validator::normalize_strategy`] turns a method and
//!   its optional parameters into a fully resolved [`Strategy`].
//!
//! ## Invariants
//!
//! * All validated inputs satisfy their respective mathematical constraints.
//! * Validation logic is deterministic and side-effect free.
//!
//! ## Non-goals
//!
//! * This module does not sort, transform, or filter input data.
//! * This module does not provide automatic correction of invalid inputs.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::format;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::algorithms::weighting::{Strategy, StrategyParams, WeightingMethod};
use crate::math::stats::std_dev;
use crate::primitives::errors::BaselineError;

/// Largest accepted iteration budget.
pub const MAX_ITERATIONS_LIMIT: usize = 10_000;

// ============================================================================
// Validator
// ============================================================================

/// Validation utility for baseline configuration and input data.
///
/// Provides static methods that return `Result<(), BaselineError>` and fail
/// fast upon identifying the first violation.
pub struct Validator;

impl Validator {
    // ========================================================================
    // Core Input Validation
    // ========================================================================

    /// Validate the signal: non-empty, at least two samples, all finite.
    pub fn validate_signal<T: Float>(y: &[T]) -> Result<(), BaselineError> {
        if y.is_empty() {
            return Err(BaselineError::EmptyInput);
        }
        if y.len() < 2 {
            return Err(BaselineError::TooFewPoints { got: y.len(), min: 2 });
        }
        if let Some(i) = y.iter().position(|v| !v.is_finite()) {
            return Err(BaselineError::InvalidNumericValue(format!(
                "y[{}]={}",
                i,
                y[i].to_f64().unwrap_or(f64::NAN)
            )));
        }
        Ok(())
    }

    /// Validate x-coordinates against the signal: same length, all finite.
    pub fn validate_x<T: Float>(x: &[T], y: &[T]) -> Result<(), BaselineError> {
        if x.len() != y.len() {
            return Err(BaselineError::MismatchedInputs {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if let Some(i) = x.iter().position(|v| !v.is_finite()) {
            return Err(BaselineError::InvalidNumericValue(format!(
                "x[{}]={}",
                i,
                x[i].to_f64().unwrap_or(f64::NAN)
            )));
        }
        Ok(())
    }

    /// Validate that sorted x-coordinates are strictly increasing.
    pub fn validate_strictly_increasing<T: Float>(x_sorted: &[T]) -> Result<(), BaselineError> {
        for i in 1..x_sorted.len() {
            if x_sorted[i] <= x_sorted[i - 1] {
                return Err(BaselineError::DuplicateX {
                    index: i,
                    value: x_sorted[i].to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        Ok(())
    }

    /// Validate user-supplied starting weights.
    pub fn validate_initial_weights<T: Float>(weights: &[T], n: usize) -> Result<(), BaselineError> {
        if weights.len() != n {
            return Err(BaselineError::MismatchedWeights {
                expected: n,
                got: weights.len(),
            });
        }
        if let Some(i) = weights.iter().position(|w| !w.is_finite() || *w < T::zero()) {
            return Err(BaselineError::InvalidWeights(format!(
                "weights[{}]={} (must be finite and >= 0)",
                i,
                weights[i].to_f64().unwrap_or(f64::NAN)
            )));
        }
        if weights.iter().all(|w| *w == T::zero()) {
            return Err(BaselineError::InvalidWeights(format!(
                "all {} weights are zero",
                n
            )));
        }
        Ok(())
    }

    // ========================================================================
    // Parameter Validation
    // ========================================================================

    /// Validate the smoothing parameter.
    pub fn validate_lambda<T: Float>(lambda: T) -> Result<(), BaselineError> {
        if !lambda.is_finite() || lambda <= T::zero() {
            return Err(BaselineError::InvalidLambda(
                lambda.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate the difference order against the number of samples.
    pub fn validate_difference_order(order: usize, n: usize) -> Result<(), BaselineError> {
        if order == 0 || order >= n {
            return Err(BaselineError::InvalidDifferenceOrder { order, n });
        }
        Ok(())
    }

    /// Validate the convergence tolerance.
    pub fn validate_tolerance<T: Float>(tol: T) -> Result<(), BaselineError> {
        if !tol.is_finite() || tol <= T::zero() {
            return Err(BaselineError::InvalidTolerance(
                tol.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate the iteration budget.
    pub fn validate_iterations(iterations: usize) -> Result<(), BaselineError> {
        if iterations == 0 || iterations > MAX_ITERATIONS_LIMIT {
            return Err(BaselineError::InvalidIterations(iterations));
        }
        Ok(())
    }

    /// Validate the weight floor.
    pub fn validate_min_weight<T: Float>(min_weight: T) -> Result<(), BaselineError> {
        if !min_weight.is_finite() || min_weight <= T::zero() {
            return Err(BaselineError::InvalidMinWeight(
                min_weight.to_f64().unwrap_or(f64::NAN),
            ));
        }
        Ok(())
    }

    /// Validate that no parameters were set multiple times in the builder.
    pub fn validate_no_duplicates(duplicate_param: Option<&'static str>) -> Result<(), BaselineError> {
        if let Some(param) = duplicate_param {
            return Err(BaselineError::DuplicateParameter { parameter: param });
        }
        Ok(())
    }

    // ========================================================================
    // Normalization
    // ========================================================================

    /// The configured lambda, or the method's default.
    pub fn resolve_lambda<T: Float>(method: WeightingMethod, lambda: Option<T>) -> Result<T, BaselineError> {
        let lambda = lambda.unwrap_or_else(|| T::from(method.default_lambda()).unwrap_or(T::one()));
        Self::validate_lambda(lambda)?;
        Ok(lambda)
    }

    /// Check strategy parameters against the method and fill in defaults.
    ///
    /// `signal` is needed for the data-dependent defaults (`k`, the smoothing
    /// half window).
    pub fn normalize_strategy<T: Float>(
        method: WeightingMethod,
        params: &StrategyParams<T>,
        signal: &[T],
    ) -> Result<Strategy<T>, BaselineError> {
        let accepted = method.parameter_names();
        if let Some(name) = params.set_names().into_iter().find(|n| !accepted.contains(n)) {
            return Err(BaselineError::UnknownParameter {
                method: method.name(),
                parameter: name.into(),
            });
        }

        let c = |v: f64| T::from(v).unwrap_or(T::nan());
        let strategy = match method {
            WeightingMethod::AsLS => Strategy::AsLS {
                p: Self::open_unit("p", params.p.unwrap_or(c(0.01)))?,
            },
            WeightingMethod::IAsLS => Strategy::IAsLS {
                p: Self::open_unit("p", params.p.unwrap_or(c(0.01)))?,
                lambda_1: Self::positive("lambda_1", params.lambda_1.unwrap_or(c(1e-4)))?,
            },
            WeightingMethod::AirPLS => Strategy::AirPLS,
            WeightingMethod::ArPLS => Strategy::ArPLS,
            WeightingMethod::DrPLS => {
                let eta = params.eta.unwrap_or(c(0.5));
                if !eta.is_finite() || eta < T::zero() || eta > T::one() {
                    return Err(Self::invalid("eta", eta, "a value in [0, 1]"));
                }
                Strategy::DrPLS { eta }
            }
            WeightingMethod::IArPLS => Strategy::IArPLS,
            WeightingMethod::AsPLS => Strategy::AsPLS {
                asymmetric_coef: Self::positive(
                    "asymmetric_coef",
                    params.asymmetric_coef.unwrap_or(c(0.5)),
                )?,
            },
            WeightingMethod::PsaLSA => Strategy::PsaLSA {
                p: Self::open_unit("p", params.p.unwrap_or(c(0.5)))?,
                k: Self::resolve_k(params.k, signal)?,
            },
            WeightingMethod::DerPsaLSA => Strategy::DerPsaLSA {
                p: Self::open_unit("p", params.p.unwrap_or(c(0.01)))?,
                k: Self::resolve_k(params.k, signal)?,
                smooth_half_window: params.smooth_half_window.unwrap_or(signal.len() / 200),
                num_smooths: params.num_smooths.unwrap_or(16),
            },
            WeightingMethod::BrPLS => {
                let max_outer_iterations = params.max_outer_iterations.unwrap_or(50);
                if max_outer_iterations == 0 || max_outer_iterations > MAX_ITERATIONS_LIMIT {
                    return Err(BaselineError::InvalidParameter {
                        parameter: "max_outer_iterations",
                        value: max_outer_iterations as f64,
                        expected: "an integer in [1, 10000]",
                    });
                }
                Strategy::BrPLS {
                    max_outer_iterations,
                    outer_tolerance: Self::positive(
                        "outer_tolerance",
                        params.outer_tolerance.unwrap_or(c(1e-3)),
                    )?,
                }
            }
            WeightingMethod::LsrPLS => Strategy::LsrPLS,
        };
        Ok(strategy)
    }

    // Default k is a tenth of the signal's standard deviation.
    fn resolve_k<T: Float>(k: Option<T>, signal: &[T]) -> Result<T, BaselineError> {
        match k {
            Some(k) => Self::positive("k", k),
            None => {
                let k = std_dev(signal, 0) / T::from(10.0).unwrap();
                Ok(if k.is_finite() && k > T::zero() {
                    k
                } else {
                    T::epsilon()
                })
            }
        }
    }

    fn open_unit<T: Float>(name: &'static str, v: T) -> Result<T, BaselineError> {
        if !v.is_finite() || v <= T::zero() || v >= T::one() {
            return Err(Self::invalid(name, v, "a value in (0, 1)"));
        }
        Ok(v)
    }

    fn positive<T: Float>(name: &'static str, v: T) -> Result<T, BaselineError> {
        if !v.is_finite() || v <= T::zero() {
            return Err(Self::invalid(name, v, "a finite value > 0"));
        }
        Ok(v)
    }

    fn invalid<T: Float>(name: &'static str, v: T, expected: &'static str) -> BaselineError {
        BaselineError::InvalidParameter {
            parameter: name,
            value: v.to_f64().unwrap_or(f64::NAN),
            expected,
        }
    }
}
