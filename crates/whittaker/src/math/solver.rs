//! Banded Cholesky and LU factorizations.
//!
//! ## Purpose
//!
//! This module solves `A x = b` for the banded systems produced by the
//! penalized least squares builder, in O(n·k²) time and O(n·k) memory.
//!
//! ## Design notes
//!
//! * **Cholesky (`LL^T`)**: For symmetric positive definite systems. Works on
//!   the lower layout (`k + 1` rows, row `t` holds `a(j + t, j)`), overwritten
//!   in place by `L`.
//! * **LU with partial pivoting**: For the row-scaled, non-symmetric systems.
//!   Uses the LAPACK `gbtf2` layout with `2·kl + ku + 1` rows; the top `kl`
//!   rows are fill-in space for the row interchanges. Element `a(r, c)` lives at
//!   `ab[(kl + ku + r - c) * n + c]`.
//! * **No clamping**: A bad pivot is reported, never patched.
//!
//! ## Invariants
//!
//! * A successful factorization has strictly positive (Cholesky) or non-zero
//!   (LU) finite pivots.
//! * Solves are performed in place on the right-hand side.
//!
//! ## Non-goals
//!
//! * Factorizations are not cached between calls; the storage is.

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::BaselineError;

#[inline]
fn singular<T: Float>(index: usize, pivot: T) -> BaselineError {
    BaselineError::SingularSystem {
        index,
        pivot: pivot.to_f64().unwrap_or(f64::NAN),
    }
}

// ============================================================================
// Cholesky
// ============================================================================

/// Factorize symmetric lower band storage in place (`A = L L^T`).
pub fn cholesky_factor<T: Float>(ab: &mut [T], n: usize, k: usize) -> Result<(), BaselineError> {
    for j in 0..n {
        let ajj = ab[j];
        if !(ajj > T::zero()) || !ajj.is_finite() {
            return Err(singular(j, ajj));
        }
        let ljj = ajj.sqrt();
        ab[j] = ljj;

        let kn = k.min(n - 1 - j);
        if kn == 0 {
            continue;
        }

        for t in 1..=kn {
            ab[t * n + j] = ab[t * n + j] / ljj;
        }

        // Symmetric rank-1 update of the trailing block
        for a in 1..=kn {
            let la = ab[a * n + j];
            if la == T::zero() {
                continue;
            }
            for b in a..=kn {
                let idx = (b - a) * n + (j + a);
                ab[idx] = ab[idx] - ab[b * n + j] * la;
            }
        }
    }
    Ok(())
}

/// Solve `L L^T x = b` in place using a factor from [`cholesky_factor`].
pub fn cholesky_solve<T: Float>(ab: &[T], n: usize, k: usize, b: &mut [T]) {
    // Forward: L y = b
    for i in 0..n {
        let mut s = b[i];
        for t in 1..=k.min(i) {
            s = s - ab[t * n + (i - t)] * b[i - t];
        }
        b[i] = s / ab[i];
    }

    // Backward: L^T x = y
    for i in (0..n).rev() {
        let mut s = b[i];
        for t in 1..=k.min(n - 1 - i) {
            s = s - ab[t * n + i] * b[i + t];
        }
        b[i] = s / ab[i];
    }
}

// ============================================================================
// LU with Partial Pivoting
// ============================================================================

/// Number of storage rows needed by [`lu_factor`].
#[inline]
pub fn lu_rows(kl: usize, ku: usize) -> usize {
    2 * kl + ku + 1
}

/// Factorize general band storage in place (`P A = L U`).
///
/// `ab` holds `lu_rows(kl, ku)` rows of length `n`; the matrix occupies rows
/// `kl..` and rows `0..kl` must be zero on entry.
pub fn lu_factor<T: Float>(
    ab: &mut [T],
    n: usize,
    kl: usize,
    ku: usize,
    pivots: &mut [usize],
) -> Result<(), BaselineError> {
    let kv = kl + ku;
    let at = |r: usize, c: usize| (kv + r - c) * n + c;

    let mut ju = 0usize;
    for j in 0..n {
        let km = kl.min(n - 1 - j);

        // Largest magnitude in column j, rows j..=j+km
        let mut jp = 0usize;
        let mut best = ab[at(j, j)].abs();
        for t in 1..=km {
            let v = ab[at(j + t, j)].abs();
            if v > best {
                best = v;
                jp = t;
            }
        }
        pivots[j] = j + jp;

        let pivot = ab[at(j + jp, j)];
        if pivot == T::zero() || !pivot.is_finite() {
            return Err(singular(j, pivot));
        }

        ju = ju.max((j + ku + jp).min(n - 1));

        if jp != 0 {
            for c in j..=ju {
                ab.swap(at(j, c), at(j + jp, c));
            }
        }

        if km > 0 {
            let inv = T::one() / ab[at(j, j)];
            for t in 1..=km {
                let idx = at(j + t, j);
                ab[idx] = ab[idx] * inv;
            }
            for c in (j + 1)..=ju {
                let u = ab[at(j, c)];
                if u == T::zero() {
                    continue;
                }
                for t in 1..=km {
                    let idx = at(j + t, c);
                    ab[idx] = ab[idx] - ab[at(j + t, j)] * u;
                }
            }
        }
    }
    Ok(())
}

/// Solve `A x = b` in place using a factor from [`lu_factor`].
pub fn lu_solve<T: Float>(ab: &[T], n: usize, kl: usize, ku: usize, pivots: &[usize], b: &mut [T]) {
    let kv = kl + ku;
    let at = |r: usize, c: usize| (kv + r - c) * n + c;

    // Forward: apply interchanges and unit-lower multipliers
    if kl > 0 {
        for j in 0..n.saturating_sub(1) {
            let lm = kl.min(n - 1 - j);
            let l = pivots[j];
            if l != j {
                b.swap(l, j);
            }
            let bj = b[j];
            for t in 1..=lm {
                b[j + t] = b[j + t] - ab[at(j + t, j)] * bj;
            }
        }
    }

    // Backward: U has kv super-diagonals
    for r in (0..n).rev() {
        let mut s = b[r];
        for c in (r + 1)..=(r + kv).min(n - 1) {
            s = s - ab[at(r, c)] * b[c];
        }
        b[r] = s / ab[at(r, r)];
    }
}

// ============================================================================
// Result Checking
// ============================================================================

/// Reject a solution containing NaN or infinite values.
pub fn check_finite<T: Float>(x: &[T]) -> Result<(), BaselineError> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(singular(i, x[i])),
        None => Ok(()),
    }
}
