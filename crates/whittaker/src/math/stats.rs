//! Summary statistics over residuals and weights.
//!
//! This module provides the small reductions the weighting strategies and the
//! convergence checks are built from: means, standard deviations, norms, and
//! the relative difference between successive iterates.

// External dependencies
use num_traits::Float;

// Arithmetic mean; zero for an empty slice.
#[inline]
pub fn mean<T: Float>(vals: &[T]) -> T {
    if vals.is_empty() {
        return T::zero();
    }
    let n = T::from(vals.len()).unwrap_or(T::one());
    vals.iter().fold(T::zero(), |acc, &v| acc + v) / n
}

// Standard deviation with `ddof` delta degrees of freedom.
//
// Returns NaN when `len <= ddof`.
pub fn std_dev<T: Float>(vals: &[T], ddof: usize) -> T {
    if vals.len() <= ddof {
        return T::nan();
    }
    let m = mean(vals);
    let ss = vals
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - m) * (v - m));
    let dof = T::from(vals.len() - ddof).unwrap_or(T::one());
    (ss / dof).sqrt()
}

// Sample standard deviation (ddof = 1) that is never zero or non-finite.
//
// Degenerate inputs (fewer than two values, all equal) fall back to epsilon
// so it can be used as a divisor.
#[inline]
pub fn safe_std<T: Float>(vals: &[T]) -> T {
    let s = std_dev(vals, 1);
    if s.is_finite() && s > T::zero() {
        s
    } else {
        T::epsilon()
    }
}

// Root mean square; zero for an empty slice.
#[inline]
pub fn rms<T: Float>(vals: &[T]) -> T {
    if vals.is_empty() {
        return T::zero();
    }
    let n = T::from(vals.len()).unwrap_or(T::one());
    (vals.iter().fold(T::zero(), |acc, &v| acc + v * v) / n).sqrt()
}

// Sum of absolute values.
#[inline]
pub fn l1_norm<T: Float>(vals: &[T]) -> T {
    vals.iter().fold(T::zero(), |acc, &v| acc + v.abs())
}

// Euclidean norm.
#[inline]
pub fn l2_norm<T: Float>(vals: &[T]) -> T {
    vals.iter().fold(T::zero(), |acc, &v| acc + v * v).sqrt()
}

// `||new - old||_2 / max(||old||_2, eps)`.
pub fn relative_difference<T: Float>(old: &[T], new: &[T]) -> T {
    let diff = old
        .iter()
        .zip(new)
        .fold(T::zero(), |acc, (&a, &b)| acc + (b - a) * (b - a))
        .sqrt();
    diff / l2_norm(old).max(T::epsilon())
}

// Logistic sigmoid `1 / (1 + exp(-x))`, evaluated without overflow.
#[inline]
pub fn expit<T: Float>(x: T) -> T {
    if x >= T::zero() {
        T::one() / (T::one() + (-x).exp())
    } else {
        let e = x.exp();
        e / (T::one() + e)
    }
}
