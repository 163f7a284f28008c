//! Low-order polynomial least squares.
//!
//! ## Purpose
//!
//! The improved asymmetric least squares variant seeds its weights from the
//! residual of a quadratic fit. This module fits `c0 + c1 t + c2 t²` by
//! ordinary least squares.
//!
//! ## Design notes
//!
//! * **Domain mapping**: x is mapped affinely onto `[-1, 1]` before fitting,
//!   which keeps the 3×3 normal equations well conditioned.
//! * **Elimination**: The normal equations are solved by Gaussian
//!   elimination with partial pivoting; a degenerate system falls back to the
//!   lower-degree solution (zero coefficients for dropped terms).
//!
//! ## Non-goals
//!
//! * Weighted fits or degrees above two.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

/// Quadratic least-squares fit, evaluated at every sample.
///
/// With `x = None` the samples are taken as equally spaced.
pub fn fit_quadratic<T: Float>(x: Option<&[T]>, y: &[T]) -> Vec<T> {
    let n = y.len();
    if n == 0 {
        return Vec::new();
    }
    let t = mapped_domain(x, n);

    // Normal equations: moments sum(t^k) and sum(t^k y)
    let mut moments = [T::zero(); 5];
    let mut rhs = [T::zero(); 3];
    for (&ti, &yi) in t.iter().zip(y) {
        let mut p = T::one();
        for (k, m) in moments.iter_mut().enumerate() {
            *m = *m + p;
            if k < 3 {
                rhs[k] = rhs[k] + p * yi;
            }
            p = p * ti;
        }
    }

    let mut a = [[T::zero(); 3]; 3];
    for (r, row) in a.iter_mut().enumerate() {
        for (c, v) in row.iter_mut().enumerate() {
            *v = moments[r + c];
        }
    }
    let coeffs = solve3(a, rhs);

    t.iter()
        .map(|&ti| coeffs[0] + ti * (coeffs[1] + ti * coeffs[2]))
        .collect()
}

fn mapped_domain<T: Float>(x: Option<&[T]>, n: usize) -> Vec<T> {
    if n == 1 {
        return vec![T::zero()];
    }
    let two = T::from(2.0).unwrap();
    match x {
        Some(x) => {
            let lo = x[0];
            let span = x[n - 1] - lo;
            x.iter()
                .map(|&xi| two * (xi - lo) / span - T::one())
                .collect()
        }
        None => {
            let last = T::from(n - 1).unwrap();
            (0..n)
                .map(|i| two * T::from(i).unwrap() / last - T::one())
                .collect()
        }
    }
}

// Gaussian elimination with partial pivoting; singular pivots zero the
// corresponding coefficient.
fn solve3<T: Float>(mut a: [[T; 3]; 3], mut b: [T; 3]) -> [T; 3] {
    let tiny = T::epsilon() * (a[0][0].abs() + T::one());

    for col in 0..3 {
        let pivot = (col..3)
            .max_by(|&i, &j| {
                a[i][col]
                    .abs()
                    .partial_cmp(&a[j][col].abs())
                    .unwrap_or(core::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        a.swap(col, pivot);
        b.swap(col, pivot);

        if a[col][col].abs() <= tiny {
            continue;
        }
        for row in (col + 1)..3 {
            let f = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] = a[row][k] - f * a[col][k];
            }
            b[row] = b[row] - f * b[col];
        }
    }

    let mut out = [T::zero(); 3];
    for row in (0..3).rev() {
        if a[row][row].abs() <= tiny {
            continue;
        }
        let mut s = b[row];
        for k in (row + 1)..3 {
            s = s - a[row][k] * out[k];
        }
        out[row] = s / a[row][row];
    }
    out
}
