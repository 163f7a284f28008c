//! Memory management and buffer recycling for baseline fits.
//!
//! ## Purpose
//!
//! This module provides reusable workspaces so that the reweighting loop does
//! not allocate once per iteration. A [`WhittakerBuffer`] owns every scratch
//! vector a fit needs; a caller fitting many spectra of the same length can
//! keep one buffer per thread and hand it to each fit.
//!
//! ## Design notes
//!
//! * **Centralized Ownership**: One struct holds the baseline, both weight
//!   vectors, residuals, the right-hand side and the factorization storage.
//! * **Lazy Expansion**: Slots are resized on demand but never shrunk.
//!
//! ## Key concepts
//!
//! * **Slot**: A reusable vector wrapper with automatic capacity management.
//! * **SolverWorkspace**: Band storage overwritten by the factorization and the pivot record.
//! * **WhittakerBuffer**: Working memory for the IRPLS executor.
//!
//! ## Invariants
//!
//! * Buffers are only logically cleared between iterations, never deallocated.
//! * After `prepare(n)` every per-point slot has length `n`.
//!
//! ## Non-goals
//!
//! * Thread-local automatic caching (buffers are passed explicitly, one per thread).
//! * Dynamic shrinking or memory reclamation.

// Feature-gated dependencies
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::ops::{Deref, DerefMut};
use num_traits::{One, Zero};

// ============================================================================
// Slot - Unified Vector Abstraction
// ============================================================================

/// A reusable vector slot with automatic capacity management.
#[derive(Debug, Clone)]
pub struct Slot<T>(Vec<T>);

impl<T> Slot<T> {
    /// Create a new slot with the given initial capacity.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Clear the slot (sets length to 0, preserves capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Get a reference to the underlying vector.
    #[inline]
    pub fn as_vec(&self) -> &Vec<T> {
        &self.0
    }

    /// Get a mutable reference to the underlying vector.
    #[inline]
    pub fn as_vec_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for Slot<T> {
    type Target = Vec<T>;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Slot<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for Slot<T> {
    fn from(v: Vec<T>) -> Self {
        Self(v)
    }
}

/// Helper trait to simplify resizing and filling vectors.
pub trait VecExt<T> {
    /// Resize the vector to `n` and fill with `val`.
    fn assign(&mut self, n: usize, val: T);
    /// Replaces the vector contents with `slice`, reusing capacity.
    fn assign_slice(&mut self, slice: &[T]);
}

impl<T: Clone> VecExt<T> for Vec<T> {
    fn assign(&mut self, n: usize, val: T) {
        if self.len() != n {
            self.clear();
            self.resize(n, val);
        } else {
            self.fill(val);
        }
    }

    fn assign_slice(&mut self, slice: &[T]) {
        self.clear();
        self.extend_from_slice(slice);
    }
}

// ============================================================================
// SolverWorkspace - Factorization Storage
// ============================================================================

/// Storage reused by the banded factorizations.
///
/// `bands` receives the assembled left-hand side and is overwritten in place
/// by the factor. `pivots` is only touched by the LU path.
#[derive(Debug, Clone)]
pub struct SolverWorkspace<T> {
    /// Band storage (layout depends on the factorization).
    pub bands: Slot<T>,

    /// Row interchanges recorded by partial pivoting.
    pub pivots: Slot<usize>,
}

impl<T> Default for SolverWorkspace<T> {
    fn default() -> Self {
        Self {
            bands: Slot::default(),
            pivots: Slot::default(),
        }
    }
}

impl<T: Clone + Zero> SolverWorkspace<T> {
    /// Zero `rows * n` band entries, reusing capacity.
    pub fn reset_bands(&mut self, rows: usize, n: usize) {
        self.bands.as_vec_mut().assign(rows * n, T::zero());
    }

    /// Reset the pivot record to `n` entries.
    pub fn reset_pivots(&mut self, n: usize) {
        self.pivots.as_vec_mut().assign(n, 0);
    }
}

// ============================================================================
// WhittakerBuffer - Working Memory for the IRPLS Executor
// ============================================================================

/// Working memory for the IRPLS executor.
#[derive(Debug, Clone)]
pub struct WhittakerBuffer<T> {
    /// Current baseline estimate.
    pub baseline: Slot<T>,

    /// Weights used by the current solve.
    pub weights: Slot<T>,

    /// Weights produced by the strategy (swapped in on the next iteration).
    pub new_weights: Slot<T>,

    /// Right-hand side of the current system.
    pub rhs: Slot<T>,

    /// Per-row scaling of the penalty for non-symmetric system forms.
    pub row_scale: Slot<T>,

    /// Factorization storage.
    pub solver: SolverWorkspace<T>,
}

impl<T> Default for WhittakerBuffer<T> {
    fn default() -> Self {
        Self {
            baseline: Slot::default(),
            weights: Slot::default(),
            new_weights: Slot::default(),
            rhs: Slot::default(),
            row_scale: Slot::default(),
            solver: SolverWorkspace::default(),
        }
    }
}

impl<T: Clone> WhittakerBuffer<T> {
    /// Create a buffer pre-allocated for `n` data points.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            baseline: Slot::new(n),
            weights: Slot::new(n),
            new_weights: Slot::new(n),
            rhs: Slot::new(n),
            row_scale: Slot::new(n),
            solver: SolverWorkspace {
                bands: Slot::new(n * 5),
                pivots: Slot::new(n),
            },
        }
    }

    /// Prepare buffers for a signal of size `n`.
    ///
    /// Weights start at one; everything else starts at zero.
    pub fn prepare(&mut self, n: usize)
    where
        T: Zero + One,
    {
        self.baseline.as_vec_mut().assign(n, T::zero());
        self.weights.as_vec_mut().assign(n, T::one());
        self.new_weights.as_vec_mut().assign(n, T::one());
        self.rhs.as_vec_mut().assign(n, T::zero());
        self.row_scale.as_vec_mut().assign(n, T::one());
    }
}
