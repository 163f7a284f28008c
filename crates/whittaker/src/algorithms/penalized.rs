//! Penalized least squares systems.
//!
//! ## Purpose
//!
//! This module assembles and solves the Whittaker system
//! `(W + lambda * D^T D) z = W y` and its variants. A [`PenalizedSystem`] owns
//! the scaled penalty for one signal length and difference order; every
//! reweighting iteration only supplies a new diagonal and right-hand side.
//!
//! ## Design notes
//!
//! * **Built once**: `D^T D` is formed once per fit (or once per x grid) and
//!   kept unscaled next to the scaled copy. `reset` only rebuilds it when the
//!   difference order changes.
//! * **Two solve paths**: Symmetric systems are factorized with banded
//!   Cholesky; systems whose penalty rows are scaled per point are not
//!   symmetric and go through banded LU.
//! * **Storage reuse**: Factorizations overwrite a caller-owned
//!   [`SolverWorkspace`] instead of allocating.
//!
//! ## Key concepts
//!
//! * **Added penalties**: Extra symmetric terms (for example a first-order
//!   smoothness term) can be folded into the penalty permanently with
//!   [`PenalizedSystem::add_penalty`]; the band grows if needed.
//! * **Row scaling**: `diag(s) · lambda D^T D` lets lambda vary per point.
//!
//! ## Invariants
//!
//! * The penalty has `2 * num_bands + 1` stored diagonals, centred on the
//!   main one; `num_bands` equals the difference order until terms are added.
//! * A solve either returns a finite solution or `SingularSystem`.
//!
//! ## Non-goals
//!
//! * This module does not choose weights or decide convergence.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::banded::BandedMatrix;
use crate::math::difference::{diff_penalty, penalty_from_x};
use crate::math::solver::{
    check_finite, cholesky_factor, cholesky_solve, lu_factor, lu_rows, lu_solve,
};
use crate::primitives::buffer::SolverWorkspace;
use crate::primitives::errors::BaselineError;

// ============================================================================
// Penalized System
// ============================================================================

/// `lambda * D^T D` for one signal length, ready to be combined with weights.
#[derive(Debug, Clone)]
pub struct PenalizedSystem<T> {
    x: Option<Vec<T>>,
    diff_order: usize,
    lambda: T,
    gram: BandedMatrix<T>,
    penalty: BandedMatrix<T>,
}

impl<T: Float> PenalizedSystem<T> {
    /// Build the penalty for `n` samples, optionally at coordinates `x`.
    pub fn new(n: usize, diff_order: usize, lambda: T, x: Option<&[T]>) -> Result<Self, BaselineError> {
        if n == 0 {
            return Err(BaselineError::EmptyInput);
        }
        if let Some(x) = x {
            if x.len() != n {
                return Err(BaselineError::MismatchedInputs {
                    x_len: x.len(),
                    y_len: n,
                });
            }
        }
        let gram = build_gram(n, diff_order, x)?;
        let mut penalty = gram.clone();
        penalty.scale(lambda);
        Ok(Self {
            x: x.map(<[T]>::to_vec),
            diff_order,
            lambda,
            gram,
            penalty,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of samples.
    #[inline]
    pub fn n(&self) -> usize {
        self.penalty.n()
    }

    /// Difference order of the penalty.
    #[inline]
    pub fn diff_order(&self) -> usize {
        self.diff_order
    }

    /// Current smoothing parameter.
    #[inline]
    pub fn lambda(&self) -> T {
        self.lambda
    }

    /// Number of sub- (and super-) diagonals of the penalty.
    ///
    /// Equals the difference order plus any widening from added terms.
    #[inline]
    pub fn num_bands(&self) -> usize {
        self.penalty.lower()
    }

    /// Number of stored diagonals, `2 * num_bands + 1`.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.penalty.num_rows()
    }

    /// Storage row of the main diagonal.
    #[inline]
    pub fn main_diagonal_index(&self) -> usize {
        self.penalty.main_diagonal_index()
    }

    /// The scaled penalty, including any added terms.
    #[inline]
    pub fn penalty(&self) -> &BandedMatrix<T> {
        &self.penalty
    }

    // ========================================================================
    // Modification
    // ========================================================================

    /// Fold a symmetric band matrix into the penalty, widening it if needed.
    pub fn add_penalty(&mut self, extra: &BandedMatrix<T>) -> Result<(), BaselineError> {
        self.penalty = self.penalty.add(extra)?;
        Ok(())
    }

    /// Switch to a new lambda and difference order, dropping any added terms.
    ///
    /// `D^T D` is rebuilt on the stored grid only when the order changes.
    pub fn reset(&mut self, lambda: T, diff_order: usize) -> Result<(), BaselineError> {
        if diff_order != self.diff_order {
            self.gram = build_gram(self.n(), diff_order, self.x.as_deref())?;
            self.diff_order = diff_order;
        }
        self.lambda = lambda;
        self.penalty = self.gram.clone();
        self.penalty.scale(lambda);
        Ok(())
    }

    // ========================================================================
    // Solvers
    // ========================================================================

    /// Solve `(diag(diagonal) + penalty) out = rhs` by banded Cholesky.
    pub fn solve(
        &self,
        diagonal: &[T],
        rhs: &[T],
        out: &mut [T],
        ws: &mut SolverWorkspace<T>,
    ) -> Result<(), BaselineError> {
        let n = self.n();
        let k = self.num_bands();
        let main = self.main_diagonal_index();

        // Lower storage: row t holds a(j + t, j), which is penalty row main + t
        ws.reset_bands(k + 1, n);
        let ab = ws.bands.as_vec_mut();
        for t in 0..=k {
            ab[t * n..(t + 1) * n].copy_from_slice(self.penalty.row(main + t));
        }
        for (a, &w) in ab[..n].iter_mut().zip(diagonal) {
            *a = *a + w;
        }

        cholesky_factor(ab, n, k)?;
        out[..n].copy_from_slice(&rhs[..n]);
        cholesky_solve(ab, n, k, &mut out[..n]);
        check_finite(&out[..n])
    }

    /// Solve `(diag(diagonal) + extra + diag(row_scale) · penalty) out = rhs`
    /// by banded LU with partial pivoting.
    pub fn solve_row_scaled(
        &self,
        diagonal: &[T],
        row_scale: &[T],
        extra: Option<&BandedMatrix<T>>,
        rhs: &[T],
        out: &mut [T],
        ws: &mut SolverWorkspace<T>,
    ) -> Result<(), BaselineError> {
        let n = self.n();
        let (kl, ku) = match extra {
            Some(e) => (
                self.penalty.lower().max(e.lower()),
                self.penalty.upper().max(e.upper()),
            ),
            None => (self.penalty.lower(), self.penalty.upper()),
        };
        let kv = kl + ku;

        ws.reset_bands(lu_rows(kl, ku), n);
        ws.reset_pivots(n);
        let ab = ws.bands.as_vec_mut();

        scatter(ab, n, kv, &self.penalty, Some(row_scale));
        if let Some(e) = extra {
            scatter(ab, n, kv, e, None);
        }
        for (a, &w) in ab[kv * n..(kv + 1) * n].iter_mut().zip(diagonal) {
            *a = *a + w;
        }

        lu_factor(ab, n, kl, ku, ws.pivots.as_vec_mut())?;
        out[..n].copy_from_slice(&rhs[..n]);
        lu_solve(ws.bands.as_vec(), n, kl, ku, ws.pivots.as_vec(), &mut out[..n]);
        check_finite(&out[..n])
    }
}

// Unscaled `D^T D` on a uniform grid or at coordinates `x`.
fn build_gram<T: Float>(n: usize, diff_order: usize, x: Option<&[T]>) -> Result<BandedMatrix<T>, BaselineError> {
    match x {
        Some(x) => penalty_from_x(x, diff_order),
        None => Ok(diff_penalty(n, diff_order)),
    }
}

/// Accumulate `diag(scale) · m` into LU band storage with `kv` super-diagonals.
fn scatter<T: Float>(ab: &mut [T], n: usize, kv: usize, m: &BandedMatrix<T>, scale: Option<&[T]>) {
    let upper = m.upper();
    for band in 0..m.num_rows() {
        // a(r, c) with r = c + band - upper goes to storage row kv + band - upper
        let dst = (kv + band - upper) * n;
        for (c, &v) in m.row(band).iter().enumerate() {
            let r = c + band;
            if r < upper || r - upper >= n {
                continue;
            }
            let s = scale.map_or(T::one(), |s| s[r - upper]);
            ab[dst + c] = ab[dst + c] + s * v;
        }
    }
}

// ============================================================================
// Auxiliary Penalties
// ============================================================================

/// First-order penalty `D_1^T D_1`, at coordinates `x` when given.
pub fn first_order_penalty<T: Float>(n: usize, x: Option<&[T]>) -> Result<BandedMatrix<T>, BaselineError> {
    build_gram(n, 1, x)
}

/// `out = m · y` as a fresh vector.
pub fn apply_penalty<T: Float>(m: &BandedMatrix<T>, y: &[T]) -> Vec<T> {
    let mut out = vec![T::zero(); m.n()];
    m.mul_vec(y, &mut out);
    out
}
