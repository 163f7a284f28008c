#![cfg(feature = "dev")]
//! Tests for finite-difference operators and penalty matrices.
//!
//! These tests verify the smoothness penalty `D^T D`:
//! - Binomial stencils of the forward difference
//! - Banded Gram matrices against a dense reference
//! - Divided differences for unevenly spaced samples
//!
//! ## Test Organization
//!
//! 1. **Stencils** - difference_coefficients
//! 2. **Uniform Penalty** - diff_penalty and its raw diagonals
//! 3. **Coordinate Penalty** - DifferenceOperator::from_x and penalty_from_x

use approx::assert_relative_eq;

use whittaker::internals::math::difference::{
    DifferenceOperator, diff_penalty, diff_penalty_diagonals, difference_coefficients,
    penalty_from_x,
};
use whittaker::internals::primitives::errors::BaselineError;

// Dense (n - d) x n difference matrix built from the stencil.
fn dense_difference(n: usize, d: usize) -> Vec<Vec<f64>> {
    let stencil = difference_coefficients::<f64>(d);
    (0..n - d)
        .map(|r| {
            let mut row = vec![0.0; n];
            row[r..r + d + 1].copy_from_slice(&stencil);
            row
        })
        .collect()
}

// ============================================================================
// Stencil Tests
// ============================================================================

/// Test the signed binomial stencils.
#[test]
fn test_difference_coefficients() {
    assert_eq!(difference_coefficients::<f64>(0), vec![1.0]);
    assert_eq!(difference_coefficients::<f64>(1), vec![-1.0, 1.0]);
    assert_eq!(difference_coefficients::<f64>(2), vec![1.0, -2.0, 1.0]);
    assert_eq!(difference_coefficients::<f64>(3), vec![-1.0, 3.0, -3.0, 1.0]);
}

/// Test applying the operator to a polynomial.
///
/// Verifies that the d-th difference annihilates polynomials of degree < d.
#[test]
fn test_uniform_operator_annihilates_low_degree() {
    let op = DifferenceOperator::<f64>::uniform(10, 2);
    assert_eq!(op.rows(), 8);

    let line: Vec<f64> = (0..10).map(|i| 3.0 * i as f64 - 1.0).collect();
    assert!(op.apply(&line).iter().all(|v| v.abs() < 1e-12));

    let square: Vec<f64> = (0..10).map(|i| (i * i) as f64).collect();
    for v in op.apply(&square) {
        assert_relative_eq!(v, 2.0, epsilon = 1e-12);
    }
}

// ============================================================================
// Uniform Penalty Tests
// ============================================================================

/// Test the banded Gram matrix against a dense computation.
#[test]
fn test_diff_penalty_matches_dense() {
    for d in 1..=3 {
        let n = 9;
        let dense = dense_difference(n, d);
        let banded = diff_penalty::<f64>(n, d);
        assert_eq!(banded.lower(), d);
        assert_eq!(banded.upper(), d);

        for i in 0..n {
            for j in 0..n {
                let expected: f64 = dense.iter().map(|row| row[i] * row[j]).sum();
                assert_relative_eq!(banded.get(i, j), expected, epsilon = 1e-12);
            }
        }
    }
}

/// Test the first-order penalty against its known form.
#[test]
fn test_first_order_penalty_values() {
    let p = diff_penalty::<f64>(5, 1);
    let main: Vec<f64> = (0..5).map(|i| p.get(i, i)).collect();
    assert_eq!(main, vec![1.0, 2.0, 2.0, 2.0, 1.0]);
    for i in 0..4 {
        assert_eq!(p.get(i, i + 1), -1.0);
        assert_eq!(p.get(i + 1, i), -1.0);
    }
}

/// Test the raw diagonal layouts.
///
/// Verifies row counts and zero padding of both layouts.
#[test]
fn test_diff_penalty_diagonals_layouts() {
    let n = 6;
    let full = diff_penalty_diagonals::<f64>(n, 2, false, 0).unwrap();
    assert_eq!(full.len(), 5 * n);
    // Main diagonal is the middle row
    assert_eq!(&full[2 * n..3 * n], &[1.0, 5.0, 6.0, 6.0, 5.0, 1.0]);

    let padded = diff_penalty_diagonals::<f64>(n, 2, false, 1).unwrap();
    assert_eq!(padded.len(), 7 * n);
    assert!(padded[..n].iter().all(|&v| v == 0.0));
    assert!(padded[6 * n..].iter().all(|&v| v == 0.0));
    assert_eq!(&padded[3 * n..4 * n], &full[2 * n..3 * n]);

    let lower = diff_penalty_diagonals::<f64>(n, 2, true, 1).unwrap();
    assert_eq!(lower.len(), 4 * n);
    assert_eq!(&lower[..n], &full[2 * n..3 * n]);
    assert!(lower[3 * n..].iter().all(|&v| v == 0.0));

    assert!(matches!(
        diff_penalty_diagonals::<f64>(0, 2, true, 0),
        Err(BaselineError::TooFewPoints { .. })
    ));
}

// ============================================================================
// Coordinate Penalty Tests
// ============================================================================

/// Test that equally spaced coordinates reproduce the uniform penalty.
#[test]
fn test_penalty_from_equally_spaced_x() {
    let x: Vec<f64> = (0..12).map(|i| 100.0 + 0.25 * i as f64).collect();
    let from_x = penalty_from_x(&x, 2).unwrap();
    let uniform = diff_penalty::<f64>(12, 2);
    for i in 0..12 {
        for j in 0..12 {
            assert_relative_eq!(from_x.get(i, j), uniform.get(i, j), epsilon = 1e-9);
        }
    }
}

/// Test divided differences on uneven coordinates.
///
/// Verifies that lines are annihilated and the second divided difference of a
/// parabola in normalized units is constant.
#[test]
fn test_divided_differences_on_uneven_x() {
    let x = vec![0.0, 0.5, 1.7, 2.0, 3.1, 4.5, 5.0, 7.0];
    let op = DifferenceOperator::from_x(&x, 2).unwrap();
    assert_eq!(op.rows(), x.len() - 2);

    let line: Vec<f64> = x.iter().map(|&v| 2.0 * v + 3.0).collect();
    assert!(op.apply(&line).iter().all(|v| v.abs() < 1e-10));

    // Normalized units: (x - x0) / mean step
    let step = (x[x.len() - 1] - x[0]) / (x.len() - 1) as f64;
    let parabola: Vec<f64> = x.iter().map(|&v| ((v - x[0]) / step).powi(2)).collect();
    for v in op.apply(&parabola) {
        assert_relative_eq!(v, 2.0, epsilon = 1e-10);
    }
}

/// Test that repeated coordinates are rejected.
#[test]
fn test_from_x_rejects_duplicates() {
    let err = DifferenceOperator::from_x(&[0.0, 1.0, 1.0, 2.0], 2).unwrap_err();
    assert!(matches!(err, BaselineError::DuplicateX { index: 2, .. }));
}
