//! Error types for baseline estimation.
//!
//! ## Purpose
//!
//! This module defines every failure a baseline fit can report. The variants
//! fall into two classes: configuration errors, raised before the first
//! iteration when inputs or parameters are out of range, and the singular
//! system error, raised by the banded solver when a factorization breaks down.
//!
//! ## Design notes
//!
//! * **Contextual**: Errors include relevant values (e.g., actual vs. expected lengths).
//! * **Deferred**: Builder misuse is recorded and reported from `build()`.
//! * **No-std**: Supports `no_std` environments by using `alloc` for dynamic messages.
//! * **Trait Implementation**: Implements `Display` and `std::error::Error` (when `std` is enabled).
//!
//! ## Key concepts
//!
//! 1. **Configuration errors**: Empty or mismatched inputs, non-finite values,
//!    out-of-range lambda, difference order, tolerance, iteration budget, weights,
//!    unknown weighting methods or strategy parameters.
//! 2. **Singular system**: A non-positive Cholesky pivot or a zero LU pivot.
//!
//! Running out of iterations is not an error; it is reported through the
//! result's termination status.
//!
//! ## Invariants
//!
//! * All variants provide sufficient context for diagnosis.
//! * Every variant except `SingularSystem` is a configuration error.
//!
//! ## Non-goals
//!
//! * This module does not perform the validation logic itself.
//! * This module does not provide error recovery or retry strategies.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::string::String;
#[cfg(feature = "std")]
use std::error::Error;
#[cfg(feature = "std")]
use std::string::String;

// External dependencies
use core::fmt::{Display, Formatter, Result};

// ============================================================================
// Error Type
// ============================================================================

/// Error type for baseline estimation.
#[derive(Debug, Clone, PartialEq)]
pub enum BaselineError {
    /// The signal is empty.
    EmptyInput,

    /// Generic invalid input error with a descriptive message.
    InvalidInput(String),

    /// x-coordinates and signal must have the same number of elements.
    MismatchedInputs {
        /// Number of x-coordinates.
        x_len: usize,
        /// Number of signal samples.
        y_len: usize,
    },

    /// Initial weights must have one entry per signal sample.
    MismatchedWeights {
        /// Number of signal samples.
        expected: usize,
        /// Number of weights provided.
        got: usize,
    },

    /// Input data contains NaN or infinite values.
    InvalidNumericValue(String),

    /// Number of points is below the minimum for the selected difference order.
    TooFewPoints {
        /// Number of points provided.
        got: usize,
        /// Minimum required points.
        min: usize,
    },

    /// x-coordinates must be strictly increasing once sorted (no duplicates).
    DuplicateX {
        /// Position in the sorted sequence where the duplicate appears.
        index: usize,
        /// The repeated coordinate.
        value: f64,
    },

    /// Smoothing parameter lambda must be positive and finite.
    InvalidLambda(f64),

    /// Difference order must be at least 1 and below the number of points.
    InvalidDifferenceOrder {
        /// Requested difference order.
        order: usize,
        /// Number of data points.
        n: usize,
    },

    /// Convergence tolerance must be positive and finite.
    InvalidTolerance(f64),

    /// Iteration budget must be in `[1, 10_000]`.
    InvalidIterations(usize),

    /// Weight floor must be positive and finite.
    InvalidMinWeight(f64),

    /// Initial weights are negative, non-finite, or all zero.
    InvalidWeights(String),

    /// A strategy parameter is outside its admissible range.
    InvalidParameter {
        /// Parameter name.
        parameter: &'static str,
        /// Value provided.
        value: f64,
        /// Human-readable admissible range.
        expected: &'static str,
    },

    /// No weighting method with this name exists.
    UnknownMethod(String),

    /// The weighting method does not accept this parameter.
    UnknownParameter {
        /// Name of the weighting method.
        method: &'static str,
        /// Name of the rejected parameter.
        parameter: String,
    },

    /// Two banded operands disagree on their dimension or layout.
    BandMismatch {
        /// Expected dimension (columns or band rows).
        expected: usize,
        /// Provided dimension.
        got: usize,
    },

    /// Parameter was set multiple times in the builder.
    DuplicateParameter {
        /// Name of the parameter that was set multiple times.
        parameter: &'static str,
    },

    /// The banded factorization met a non-positive or zero pivot.
    SingularSystem {
        /// Row at which the factorization failed.
        index: usize,
        /// Offending pivot (or non-finite solution value).
        pivot: f64,
    },
}

impl BaselineError {
    /// True for every error raised while validating inputs and parameters.
    pub fn is_configuration_error(&self) -> bool {
        !self.is_singular()
    }

    /// True when the banded solve broke down.
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::SingularSystem { .. })
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl Display for BaselineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::EmptyInput => write!(f, "Input signal is empty"),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::MismatchedInputs { x_len, y_len } => {
                write!(
                    f,
                    "Length mismatch: x has {x_len} points, signal has {y_len}"
                )
            }
            Self::MismatchedWeights { expected, got } => {
                write!(
                    f,
                    "Length mismatch: expected {expected} initial weights, got {got}"
                )
            }
            Self::InvalidNumericValue(s) => write!(f, "Invalid numeric value: {s}"),
            Self::TooFewPoints { got, min } => {
                write!(f, "Too few points: got {got}, need at least {min}")
            }
            Self::DuplicateX { index, value } => {
                write!(
                    f,
                    "x-coordinates must be strictly increasing: x[{index}]={value} repeats"
                )
            }
            Self::InvalidLambda(lam) => {
                write!(f, "Invalid lambda: {lam} (must be > 0 and finite)")
            }
            Self::InvalidDifferenceOrder { order, n } => {
                write!(
                    f,
                    "Invalid difference order: {order} (must be >= 1 and < {n} data points)"
                )
            }
            Self::InvalidTolerance(tol) => {
                write!(f, "Invalid tolerance: {tol} (must be > 0 and finite)")
            }
            Self::InvalidIterations(iter) => {
                write!(f, "Invalid max_iterations: {iter} (must be in [1, 10000])")
            }
            Self::InvalidMinWeight(w) => {
                write!(f, "Invalid min_weight: {w} (must be > 0 and finite)")
            }
            Self::InvalidWeights(msg) => write!(f, "Invalid initial weights: {msg}"),
            Self::InvalidParameter {
                parameter,
                value,
                expected,
            } => {
                write!(
                    f,
                    "Invalid value for '{parameter}': {value} (expected {expected})"
                )
            }
            Self::UnknownMethod(name) => write!(f, "Unknown weighting method: '{name}'"),
            Self::UnknownParameter { method, parameter } => {
                write!(
                    f,
                    "Weighting method '{method}' does not accept parameter '{parameter}'"
                )
            }
            Self::BandMismatch { expected, got } => {
                write!(f, "Banded operand mismatch: expected {expected}, got {got}")
            }
            Self::DuplicateParameter { parameter } => {
                write!(
                    f,
                    "Parameter '{parameter}' was set multiple times. Each parameter can only be configured once."
                )
            }
            Self::SingularSystem { index, pivot } => {
                write!(
                    f,
                    "Singular system: factorization failed at row {index} (pivot {pivot})"
                )
            }
        }
    }
}

// ============================================================================
// Standard Error Trait
// ============================================================================

#[cfg(feature = "std")]
impl Error for BaselineError {}
