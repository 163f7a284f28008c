#![cfg(feature = "dev")]
//! Tests for penalized linear systems.
//!
//! These tests verify the assembly and solution of `W + lambda D^T D`:
//! - Symmetric solves against a dense reference
//! - Row-scaled (non-symmetric) solves through the LU path
//! - Added penalty terms and lambda resets
//!
//! ## Test Organization
//!
//! 1. **Construction** - Input checks and bandwidths
//! 2. **Symmetric Solves** - Cholesky path
//! 3. **Row-Scaled Solves** - LU path
//! 4. **Auxiliary Penalties** - First-order terms

use approx::assert_relative_eq;

use whittaker::internals::algorithms::penalized::{
    PenalizedSystem, apply_penalty, first_order_penalty,
};
use whittaker::internals::math::banded::BandedMatrix;
use whittaker::internals::primitives::buffer::SolverWorkspace;
use whittaker::internals::primitives::errors::BaselineError;

// Dense copy of a band matrix.
fn dense(m: &BandedMatrix<f64>) -> Vec<Vec<f64>> {
    let n = m.n();
    (0..n).map(|i| (0..n).map(|j| m.get(i, j)).collect()).collect()
}

// Gaussian elimination with partial pivoting on a dense copy.
fn dense_solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    for j in 0..n {
        let p = (j..n)
            .max_by(|&r, &s| a[r][j].abs().partial_cmp(&a[s][j].abs()).unwrap())
            .unwrap();
        a.swap(j, p);
        b.swap(j, p);
        for r in j + 1..n {
            let f = a[r][j] / a[j][j];
            for c in j..n {
                a[r][c] -= f * a[j][c];
            }
            b[r] -= f * b[j];
        }
    }
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let s: f64 = (i + 1..n).map(|c| a[i][c] * x[c]).sum();
        x[i] = (b[i] - s) / a[i][i];
    }
    x
}

fn signal(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let t = i as f64;
            1.0 + 0.1 * t + (0.7 * t).sin()
        })
        .collect()
}

// ============================================================================
// Construction Tests
// ============================================================================

/// Test bandwidths and the scaled penalty.
#[test]
fn test_new_scales_penalty() {
    let sys = PenalizedSystem::new(10, 2, 4.0, None).unwrap();
    assert_eq!(sys.n(), 10);
    assert_eq!(sys.diff_order(), 2);
    assert_eq!(sys.num_bands(), 2);
    assert_eq!(sys.num_rows(), 5);
    assert_eq!(sys.main_diagonal_index(), 2);
    assert_eq!(sys.lambda(), 4.0);
    // D^T D has 1, 5, 6, ... on its main diagonal
    assert_eq!(sys.penalty().get(0, 0), 4.0);
    assert_eq!(sys.penalty().get(1, 1), 20.0);
}

/// Test input checks of the constructor.
#[test]
fn test_new_rejects_bad_input() {
    assert!(matches!(
        PenalizedSystem::<f64>::new(0, 2, 1.0, None),
        Err(BaselineError::EmptyInput)
    ));
    assert!(matches!(
        PenalizedSystem::new(4, 2, 1.0, Some(&[0.0, 1.0, 2.0][..])),
        Err(BaselineError::MismatchedInputs { x_len: 3, y_len: 4 })
    ));
}

// ============================================================================
// Symmetric Solve Tests
// ============================================================================

/// Test the Cholesky path against a dense solve.
///
/// Verifies (W + lambda D^T D) z = W y for non-uniform weights.
#[test]
fn test_solve_matches_dense() {
    let n = 15;
    let y = signal(n);
    let w: Vec<f64> = (0..n).map(|i| if i % 3 == 0 { 0.05 } else { 0.95 }).collect();
    let rhs: Vec<f64> = w.iter().zip(&y).map(|(a, b)| a * b).collect();

    let sys = PenalizedSystem::new(n, 2, 25.0, None).unwrap();
    let mut ws = SolverWorkspace::default();
    let mut z = vec![0.0; n];
    sys.solve(&w, &rhs, &mut z, &mut ws).unwrap();

    let mut a = dense(sys.penalty());
    for i in 0..n {
        a[i][i] += w[i];
    }
    let expected = dense_solve(a, rhs);
    for (got, want) in z.iter().zip(&expected) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
}

/// Test that a singular system is reported.
///
/// With zero weights only the penalty remains, whose null space contains lines.
#[test]
fn test_solve_singular_penalty() {
    let sys = PenalizedSystem::new(3, 2, 1.0, None).unwrap();
    let mut ws = SolverWorkspace::default();
    let mut z = vec![0.0; 3];
    let err = sys
        .solve(&[0.0; 3], &[1.0, 2.0, 3.0], &mut z, &mut ws)
        .unwrap_err();
    assert!(err.is_singular());
}

/// Test that workspace reuse gives identical results.
#[test]
fn test_solve_reuses_workspace() {
    let n = 12;
    let y = signal(n);
    let w = vec![1.0; n];
    let sys = PenalizedSystem::new(n, 3, 10.0, None).unwrap();
    let mut ws = SolverWorkspace::default();

    let mut first = vec![0.0; n];
    sys.solve(&w, &y, &mut first, &mut ws).unwrap();
    let mut second = vec![0.0; n];
    sys.solve(&w, &y, &mut second, &mut ws).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Row-Scaled Solve Tests
// ============================================================================

/// Test that unit row scaling reproduces the symmetric solve.
#[test]
fn test_row_scaled_identity_matches_cholesky() {
    let n = 20;
    let y = signal(n);
    let w: Vec<f64> = (0..n).map(|i| 0.2 + 0.04 * i as f64).collect();
    let rhs: Vec<f64> = w.iter().zip(&y).map(|(a, b)| a * b).collect();
    let sys = PenalizedSystem::new(n, 2, 50.0, None).unwrap();
    let mut ws = SolverWorkspace::default();

    let mut chol = vec![0.0; n];
    sys.solve(&w, &rhs, &mut chol, &mut ws).unwrap();
    let mut lu = vec![0.0; n];
    sys.solve_row_scaled(&w, &vec![1.0; n], None, &rhs, &mut lu, &mut ws)
        .unwrap();

    for (a, b) in chol.iter().zip(&lu) {
        assert_relative_eq!(*a, *b, epsilon = 1e-9);
    }
}

/// Test the LU path with row scaling and an extra term against a dense solve.
///
/// Verifies (W + D1^T D1 + diag(s) lambda D^T D) z = W y.
#[test]
fn test_row_scaled_with_extra_matches_dense() {
    let n = 14;
    let y = signal(n);
    let w: Vec<f64> = (0..n).map(|i| if i % 4 == 1 { 0.1 } else { 0.9 }).collect();
    let s: Vec<f64> = w.iter().map(|&wi| 1.0 - 0.5 * wi).collect();
    let rhs: Vec<f64> = w.iter().zip(&y).map(|(a, b)| a * b).collect();

    let sys = PenalizedSystem::new(n, 2, 30.0, None).unwrap();
    let d1 = first_order_penalty::<f64>(n, None).unwrap();
    let mut ws = SolverWorkspace::default();
    let mut z = vec![0.0; n];
    sys.solve_row_scaled(&w, &s, Some(&d1), &rhs, &mut z, &mut ws)
        .unwrap();

    let p = dense(sys.penalty());
    let e = dense(&d1);
    let mut a = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            a[i][j] = s[i] * p[i][j] + e[i][j];
        }
        a[i][i] += w[i];
    }
    let expected = dense_solve(a, rhs);
    for (got, want) in z.iter().zip(&expected) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
}

// ============================================================================
// Auxiliary Penalty Tests
// ============================================================================

/// Test adding and dropping an extra penalty term.
#[test]
fn test_add_penalty_and_reset() {
    let n = 8;
    let mut sys = PenalizedSystem::new(n, 2, 2.0, None).unwrap();
    let before = sys.penalty().get(3, 3);

    let mut d1 = first_order_penalty::<f64>(n, None).unwrap();
    d1.scale(0.5);
    sys.add_penalty(&d1).unwrap();
    assert_eq!(sys.num_bands(), 2);
    assert_relative_eq!(sys.penalty().get(3, 3), before + 1.0);
    assert_relative_eq!(sys.penalty().get(3, 4), 2.0 * -4.0 - 0.5);

    sys.reset(3.0, 2).unwrap();
    assert_eq!(sys.lambda(), 3.0);
    assert_relative_eq!(sys.penalty().get(3, 3), 18.0);
}

/// Test band counts across difference orders.
///
/// Verifies that the off-diagonal band count follows the order.
#[test]
fn test_num_bands_follow_order() {
    for order in 1..=4 {
        let sys = PenalizedSystem::<f64>::new(12, order, 1.0, None).unwrap();
        assert_eq!(sys.num_bands(), order);
        assert_eq!(sys.num_rows(), 2 * order + 1);
        assert_eq!(sys.main_diagonal_index(), order);
    }
}

/// Test switching lambda and difference order on an existing system.
///
/// Verifies that the result matches a freshly built system, with and
/// without coordinates.
#[test]
fn test_reset_to_new_order() {
    let n = 15;
    let x: Vec<f64> = (0..n).map(|i| (i as f64).powf(1.3)).collect();
    let y = signal(n);
    let w = vec![1.0; n];

    for coords in [None, Some(&x[..])] {
        let mut sys = PenalizedSystem::new(n, 2, 5.0, coords).unwrap();
        sys.add_penalty(&first_order_penalty(n, coords).unwrap()).unwrap();
        sys.reset(40.0, 3).unwrap();

        let fresh = PenalizedSystem::new(n, 3, 40.0, coords).unwrap();
        assert_eq!(sys.diff_order(), 3);
        assert_eq!(sys.lambda(), 40.0);
        assert_eq!(sys.num_bands(), 3);
        assert_eq!(sys.num_rows(), 7);
        for i in 0..n {
            for j in 0..n {
                assert_relative_eq!(
                    sys.penalty().get(i, j),
                    fresh.penalty().get(i, j),
                    epsilon = 1e-12
                );
            }
        }

        let mut ws = SolverWorkspace::default();
        let mut got = vec![0.0; n];
        let mut want = vec![0.0; n];
        sys.solve(&w, &y, &mut got, &mut ws).unwrap();
        fresh.solve(&w, &y, &mut want, &mut ws).unwrap();
        for (g, v) in got.iter().zip(&want) {
            assert_relative_eq!(*g, *v, epsilon = 1e-12);
        }

        // And back down to first order
        sys.reset(1.0, 1).unwrap();
        assert_eq!(sys.num_bands(), 1);
        assert_relative_eq!(sys.penalty().get(0, 0), fresh_diag(n, coords));
    }
}

// Corner entry of the unit-lambda first-order penalty.
fn fresh_diag(n: usize, x: Option<&[f64]>) -> f64 {
    PenalizedSystem::new(n, 1, 1.0, x).unwrap().penalty().get(0, 0)
}

/// Test the matrix-vector helper on a line.
///
/// Verifies that the first-order penalty maps constants to zero.
#[test]
fn test_apply_penalty_on_constant() {
    let d1 = first_order_penalty::<f64>(6, None).unwrap();
    let out = apply_penalty(&d1, &[2.0; 6]);
    assert!(out.iter().all(|v| v.abs() < 1e-14));

    let x = [0.0, 1.0, 3.0, 4.0, 6.0, 7.5];
    let d1x = first_order_penalty::<f64>(6, Some(&x[..])).unwrap();
    let out = apply_penalty(&d1x, &[5.0; 6]);
    assert!(out.iter().all(|v| v.abs() < 1e-12));
}
