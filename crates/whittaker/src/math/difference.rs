//! Finite-difference operators and their penalty matrices.
//!
//! ## Purpose
//!
//! This module builds the d-th order difference operator `D` and the
//! smoothness penalty `D^T D` in band storage, for both uniformly and
//! irregularly spaced samples.
//!
//! ## Design notes
//!
//! * **Row stencils**: `D` is stored as `n - d` stencils of `d + 1`
//!   coefficients; row `r` touches columns `r..=r + d`.
//! * **Uniform spacing**: Stencils are the signed binomial coefficients
//!   `(-1)^(d-k) C(d, k)`.
//! * **Irregular spacing**: Divided differences. x is first rescaled to unit
//!   mean spacing and each order-k step divides by `(x[i+k] - x[i]) / k`, so
//!   equally spaced x reproduces the binomial stencils exactly.
//! * **Penalty assembly**: `D^T D` is accumulated stencil by stencil in
//!   O(n·d²), never through a dense product.
//!
//! ## Invariants
//!
//! * The penalty always has `d` sub- and `d` super-diagonals, whatever `n` is.
//! * When `n <= d` the operator has no rows and the penalty is all zeros.
//!
//! ## Non-goals
//!
//! * This module does not validate that x is sorted beyond rejecting repeats.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::math::banded::BandedMatrix;
use crate::primitives::errors::BaselineError;

// ============================================================================
// Stencils
// ============================================================================

/// Signed binomial stencil of the d-th order forward difference.
///
/// Order 0 is the identity stencil `[1]`.
pub fn difference_coefficients<T: Float>(order: usize) -> Vec<T> {
    let mut coeffs = Vec::with_capacity(order + 1);
    let mut binom = 1.0_f64;
    for k in 0..=order {
        let sign = if (order - k) % 2 == 0 { 1.0 } else { -1.0 };
        coeffs.push(T::from(sign * binom).unwrap());
        binom = binom * (order - k) as f64 / (k + 1) as f64;
    }
    coeffs
}

// ============================================================================
// Difference Operator
// ============================================================================

/// Row-stencil representation of an `(n - d) × n` difference matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceOperator<T> {
    n: usize,
    order: usize,
    coeffs: Vec<T>,
}

impl<T: Float> DifferenceOperator<T> {
    /// Difference operator for equally spaced samples.
    pub fn uniform(n: usize, order: usize) -> Self {
        let rows = n.saturating_sub(order);
        let stencil = difference_coefficients::<T>(order);
        let mut coeffs = Vec::with_capacity(rows * (order + 1));
        for _ in 0..rows {
            coeffs.extend_from_slice(&stencil);
        }
        Self { n, order, coeffs }
    }

    /// Divided-difference operator for strictly increasing `x`.
    pub fn from_x(x: &[T], order: usize) -> Result<Self, BaselineError> {
        let n = x.len();
        if n < 2 || order == 0 || order >= n {
            return Ok(Self::uniform(n, order));
        }
        for i in 1..n {
            if x[i] <= x[i - 1] {
                return Err(BaselineError::DuplicateX {
                    index: i,
                    value: x[i].to_f64().unwrap_or(f64::NAN),
                });
            }
        }

        let step = (x[n - 1] - x[0]) / T::from(n - 1).unwrap();
        let xs: Vec<T> = x.iter().map(|&xi| (xi - x[0]) / step).collect();

        // Order 0: identity stencils
        let mut prev: Vec<T> = vec![T::one(); n];
        for k in 1..=order {
            let width = k + 1;
            let rows = n - k;
            let kt = T::from(k).unwrap();
            let mut next = vec![T::zero(); rows * width];
            for i in 0..rows {
                let scale = kt / (xs[i + k] - xs[i]);
                let row = &mut next[i * width..(i + 1) * width];
                // prev rows have width k
                for t in 0..k {
                    row[t] = row[t] - prev[i * k + t] * scale;
                    row[t + 1] = row[t + 1] + prev[(i + 1) * k + t] * scale;
                }
            }
            prev = next;
        }

        Ok(Self {
            n,
            order,
            coeffs: prev,
        })
    }

    /// Number of columns (samples).
    pub fn n(&self) -> usize {
        self.n
    }

    /// Difference order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of stencil rows (`n - d`, or zero).
    pub fn rows(&self) -> usize {
        self.coeffs.len() / (self.order + 1)
    }

    /// Stencil of row `r`, applied to columns `r..=r + d`.
    pub fn row(&self, r: usize) -> &[T] {
        let w = self.order + 1;
        &self.coeffs[r * w..(r + 1) * w]
    }

    /// `D v`.
    pub fn apply(&self, v: &[T]) -> Vec<T> {
        (0..self.rows())
            .map(|r| {
                self.row(r)
                    .iter()
                    .zip(&v[r..])
                    .fold(T::zero(), |acc, (&c, &x)| acc + c * x)
            })
            .collect()
    }

    /// `D^T D` in band storage with `d` sub- and super-diagonals.
    pub fn gram(&self) -> BandedMatrix<T> {
        let d = self.order;
        let mut out = BandedMatrix::zeros(self.n, d, d);
        for r in 0..self.rows() {
            let stencil = self.row(r);
            for (p, &cp) in stencil.iter().enumerate() {
                for (q, &cq) in stencil.iter().enumerate() {
                    out.add_at(r + p, r + q, cp * cq);
                }
            }
        }
        out
    }
}

// ============================================================================
// Penalty Helpers
// ============================================================================

/// `D^T D` for equally spaced samples.
pub fn diff_penalty<T: Float>(n: usize, order: usize) -> BandedMatrix<T> {
    DifferenceOperator::uniform(n, order).gram()
}

/// `D^T D` for samples at `x` (strictly increasing).
pub fn penalty_from_x<T: Float>(x: &[T], order: usize) -> Result<BandedMatrix<T>, BaselineError> {
    Ok(DifferenceOperator::from_x(x, order)?.gram())
}

/// Raw diagonals of `D^T D`.
///
/// The full layout has `2d + 1` rows (highest super-diagonal first); the
/// lower layout has `d + 1` rows starting with the main diagonal. `padding`
/// adds that many zero diagonals on each side (full) or below (lower).
pub fn diff_penalty_diagonals<T: Float>(
    n: usize,
    order: usize,
    lower_only: bool,
    padding: usize,
) -> Result<Vec<T>, BaselineError> {
    if n == 0 {
        return Err(BaselineError::TooFewPoints { got: 0, min: 1 });
    }
    let penalty = diff_penalty::<T>(n, order);
    if lower_only {
        let mut bands = penalty.lower_bands();
        bands.resize((order + padding + 1) * n, T::zero());
        Ok(bands)
    } else {
        Ok(penalty
            .padded(order + padding, order + padding)
            .as_slice()
            .to_vec())
    }
}
