//! Banded matrix storage.
//!
//! ## Purpose
//!
//! This module stores the penalized systems `W + lambda * D^T D` without ever
//! forming an N×N matrix. Only the diagonals inside the band are kept.
//!
//! ## Design notes
//!
//! * **Layout**: LAPACK "full" band storage, one row per diagonal, row-major.
//!   Element `a(i, j)` lives at `data[(upper + i - j) * n + j]`, so row 0 is the
//!   highest super-diagonal and row `upper` is the main diagonal.
//! * **Padding cells**: Entries of a band row that fall outside the matrix are
//!   kept at zero so whole rows can be scaled or added blindly.
//! * **Lower storage**: [`BandedMatrix::lower_bands`] and
//!   [`BandedMatrix::from_lower`] convert to and from the symmetric lower layout
//!   used by the Cholesky factorization (row `t` holds `a(j + t, j)`).
//!
//! ## Invariants
//!
//! * `data.len() == (lower + upper + 1) * n`.
//! * Padding cells are zero.
//!
//! ## Non-goals
//!
//! * This module does not factorize or solve (see `solver`).
//! * General sparse formats are not supported.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use num_traits::Float;

// Internal dependencies
use crate::primitives::errors::BaselineError;

// ============================================================================
// Banded Matrix
// ============================================================================

/// Square banded matrix in LAPACK full band storage.
#[derive(Debug, Clone, PartialEq)]
pub struct BandedMatrix<T> {
    n: usize,
    lower: usize,
    upper: usize,
    data: Vec<T>,
}

impl<T: Float> BandedMatrix<T> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an all-zero `n`×`n` matrix with the given bandwidths.
    pub fn zeros(n: usize, lower: usize, upper: usize) -> Self {
        Self {
            n,
            lower,
            upper,
            data: vec![T::zero(); (lower + upper + 1) * n],
        }
    }

    /// Build a centred band matrix from stacked diagonals.
    ///
    /// `data` holds an odd number of rows of length `n`, highest
    /// super-diagonal first. Cells outside the matrix are cleared.
    pub fn from_diagonals(n: usize, data: Vec<T>) -> Result<Self, BaselineError> {
        if n == 0 || data.len() % n != 0 {
            return Err(BaselineError::BandMismatch {
                expected: n,
                got: data.len(),
            });
        }
        let rows = data.len() / n;
        if rows % 2 == 0 {
            return Err(BaselineError::BandMismatch {
                expected: rows + 1,
                got: rows,
            });
        }
        let half = rows / 2;
        let mut out = Self {
            n,
            lower: half,
            upper: half,
            data,
        };
        out.clear_padding();
        Ok(out)
    }

    /// Expand symmetric lower storage (`k + 1` rows) into full band storage.
    pub fn from_lower(n: usize, k: usize, lower: &[T]) -> Result<Self, BaselineError> {
        if lower.len() != (k + 1) * n {
            return Err(BaselineError::BandMismatch {
                expected: (k + 1) * n,
                got: lower.len(),
            });
        }
        let mut out = Self::zeros(n, k, k);
        for t in 0..=k {
            for j in 0..n.saturating_sub(t) {
                let v = lower[t * n + j];
                out.set(j + t, j, v);
                out.set(j, j + t, v);
            }
        }
        Ok(out)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Matrix dimension.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// Number of sub-diagonals.
    #[inline]
    pub fn lower(&self) -> usize {
        self.lower
    }

    /// Number of super-diagonals.
    #[inline]
    pub fn upper(&self) -> usize {
        self.upper
    }

    /// Number of stored diagonals.
    #[inline]
    pub fn num_rows(&self) -> usize {
        self.lower + self.upper + 1
    }

    /// Row of the storage holding the main diagonal.
    #[inline]
    pub fn main_diagonal_index(&self) -> usize {
        self.upper
    }

    /// Raw band storage.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// One stored diagonal (`band == upper` is the main diagonal).
    #[inline]
    pub fn row(&self, band: usize) -> &[T] {
        &self.data[band * self.n..(band + 1) * self.n]
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> Option<usize> {
        if i >= self.n || j >= self.n || i + self.upper < j || i > j + self.lower {
            return None;
        }
        Some((self.upper + i - j) * self.n + j)
    }

    /// Element `a(i, j)`; zero outside the band.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        self.offset(i, j).map_or(T::zero(), |k| self.data[k])
    }

    /// Overwrite `a(i, j)`. Writes outside the band are ignored.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        if let Some(k) = self.offset(i, j) {
            self.data[k] = value;
        }
    }

    /// Accumulate into `a(i, j)`. Writes outside the band are ignored.
    #[inline]
    pub fn add_at(&mut self, i: usize, j: usize, value: T) {
        if let Some(k) = self.offset(i, j) {
            self.data[k] = self.data[k] + value;
        }
    }

    // ========================================================================
    // Structural Operations
    // ========================================================================

    /// Copy into storage with wider bands. Narrower targets are clamped up.
    pub fn padded(&self, lower: usize, upper: usize) -> Self {
        let lower = lower.max(self.lower);
        let upper = upper.max(self.upper);
        let mut out = Self::zeros(self.n, lower, upper);
        let shift = upper - self.upper;
        for band in 0..self.num_rows() {
            let dst = (band + shift) * self.n;
            out.data[dst..dst + self.n].copy_from_slice(self.row(band));
        }
        out
    }

    /// Sum of two band matrices, widened to the larger bandwidths.
    pub fn add(&self, other: &Self) -> Result<Self, BaselineError> {
        let mut out = self.padded(other.lower, other.upper);
        out.add_scaled(other, T::one())?;
        Ok(out)
    }

    /// `self += scale * other`; `other` must fit inside this band.
    pub fn add_scaled(&mut self, other: &Self, scale: T) -> Result<(), BaselineError> {
        if other.n != self.n {
            return Err(BaselineError::BandMismatch {
                expected: self.n,
                got: other.n,
            });
        }
        if other.lower > self.lower || other.upper > self.upper {
            return Err(BaselineError::BandMismatch {
                expected: self.num_rows(),
                got: other.num_rows(),
            });
        }
        let shift = self.upper - other.upper;
        for band in 0..other.num_rows() {
            let dst = (band + shift) * self.n;
            for (d, &s) in self.data[dst..dst + self.n]
                .iter_mut()
                .zip(other.row(band))
            {
                *d = *d + scale * s;
            }
        }
        Ok(())
    }

    /// Multiply every entry by `scale`.
    pub fn scale(&mut self, scale: T) {
        for v in self.data.iter_mut() {
            *v = *v * scale;
        }
    }

    /// Add `diagonal[i]` to `a(i, i)`.
    pub fn add_diagonal(&mut self, diagonal: &[T]) {
        let start = self.upper * self.n;
        for (d, &w) in self.data[start..start + self.n].iter_mut().zip(diagonal) {
            *d = *d + w;
        }
    }

    /// Left-multiply by `diag(scale)`: row `i` is scaled by `scale[i]`.
    ///
    /// In band storage the row index of a cell depends on its diagonal, so the
    /// scale vector is read shifted by `band - upper`.
    pub fn scale_rows(&mut self, scale: &[T]) {
        let n = self.n;
        for band in 0..self.num_rows() {
            let row = &mut self.data[band * n..(band + 1) * n];
            for (j, v) in row.iter_mut().enumerate() {
                let i = j + band;
                if i >= self.upper && i - self.upper < n {
                    *v = *v * scale[i - self.upper];
                }
            }
        }
    }

    /// Right-multiply by `diag(scale)`: column `j` is scaled by `scale[j]`.
    pub fn scale_columns(&mut self, scale: &[T]) {
        let n = self.n;
        for band in 0..self.num_rows() {
            for (v, &s) in self.data[band * n..(band + 1) * n].iter_mut().zip(scale) {
                *v = *v * s;
            }
        }
    }

    /// `out = A v`.
    pub fn mul_vec(&self, v: &[T], out: &mut [T]) {
        let n = self.n;
        out[..n].fill(T::zero());
        for band in 0..self.num_rows() {
            let row = self.row(band);
            for (j, &a) in row.iter().enumerate() {
                let i = j + band;
                if i >= self.upper && i - self.upper < n {
                    out[i - self.upper] = out[i - self.upper] + a * v[j];
                }
            }
        }
    }

    /// Symmetric lower storage: row `t` holds `a(j + t, j)` for each column `j`.
    pub fn lower_bands(&self) -> Vec<T> {
        let n = self.n;
        let mut out = vec![T::zero(); (self.lower + 1) * n];
        for t in 0..=self.lower {
            for j in 0..n.saturating_sub(t) {
                out[t * n + j] = self.get(j + t, j);
            }
        }
        out
    }

    /// Whether `|a(i, j) - a(j, i)| <= tol` for every stored pair.
    pub fn is_symmetric(&self, tol: T) -> bool {
        if self.lower != self.upper {
            return false;
        }
        for t in 1..=self.lower {
            for j in 0..self.n.saturating_sub(t) {
                if (self.get(j + t, j) - self.get(j, j + t)).abs() > tol {
                    return false;
                }
            }
        }
        true
    }

    fn clear_padding(&mut self) {
        let n = self.n;
        for band in 0..self.num_rows() {
            for j in 0..n {
                let i = j + band;
                if i < self.upper || i - self.upper >= n {
                    self.data[band * n + j] = T::zero();
                }
            }
        }
    }
}
