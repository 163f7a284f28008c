//! Sorting utilities for irregularly sampled spectra.
//!
//! ## Purpose
//!
//! The non-uniform difference operator needs x-coordinates in ascending
//! order. This module sorts a spectrum by x, remembers the permutation, and
//! maps fitted values back to the caller's order.
//!
//! ## Design notes
//!
//! * **Stability**: Uses stable sorting so equal x-values keep their relative order
//!   (the validator then rejects them as duplicates).
//! * **Efficiency**: Already-sorted input takes an O(n) fast path.
//!
//! ## Key concepts
//!
//! ### Sort, fit, scatter back
//! 1. **Sort**: Signal (and any per-point inputs) are reordered by x.
//! 2. **Process**: The baseline is fitted on the sorted sequence.
//! 3. **Unsort**: Baseline and weights are mapped back in O(n) time.
//!
//! ## Invariants
//!
//! * `indices` is a permutation of `0..n`.
//!
//! ## Non-goals
//!
//! * This module does not validate finiteness or uniqueness of x.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

// External dependencies
use core::cmp::Ordering;
use num_traits::Float;

// ============================================================================
// Data Structures
// ============================================================================

/// Result of sorting a spectrum by its x-coordinates.
pub struct SortedData<T> {
    /// Sorted x-coordinates.
    pub x: Vec<T>,

    /// Signal reordered to match the sorted x-coordinates.
    pub y: Vec<T>,

    /// Input position of each sorted sample.
    pub indices: Vec<usize>,
}

impl<T: Float> SortedData<T> {
    /// Whether the input was already in ascending order.
    pub fn is_identity(&self) -> bool {
        self.indices.iter().enumerate().all(|(i, &j)| i == j)
    }
}

// ============================================================================
// Sorting Functions
// ============================================================================

/// Sort a spectrum by x-coordinates in ascending order.
#[inline]
pub fn sort_by_x<T: Float>(x: &[T], y: &[T]) -> SortedData<T> {
    let n = x.len();

    // Fast path: spectra are almost always recorded in order
    if x.windows(2).all(|w| w[0] <= w[1]) {
        return SortedData {
            x: x.to_vec(),
            y: y.to_vec(),
            indices: (0..n).collect(),
        };
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal));

    SortedData {
        x: permute(x, &order),
        y: permute(y, &order),
        indices: order,
    }
}

/// Reorder per-point values into sorted order using an existing mapping.
#[inline]
pub fn permute<T: Float>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&orig| values[orig]).collect()
}

/// Map sorted results back to the original input order in O(n) time.
#[inline]
pub fn unsort<T: Float>(sorted_values: &[T], indices: &[usize]) -> Vec<T> {
    let mut out = vec![T::zero(); indices.len()];
    for (&value, &pos) in sorted_values.iter().zip(indices) {
        out[pos] = value;
    }
    out
}
