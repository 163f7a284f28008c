//! Accepted spectrum containers.
//!
//! ## Purpose
//!
//! Spectra and their x grids arrive as slices, vectors, fixed-size arrays or
//! one-dimensional ndarray views. [`SpectrumInput`] borrows each of them as a
//! plain sample slice for the penalized solver.
//!
//! ## Design notes
//!
//! * **Borrowed samples**: No container is copied. A strided view (for
//!   example every second channel of a detector row) has no slice form and is
//!   refused with a hint to copy it first.
//! * **Row stacks**: Two-dimensional stacks go through the batch model's
//!   `fit_rows`, which copies strided rows itself.
//!
//! ## Invariants
//!
//! * The borrowed slice holds every sample in channel order.

// External dependencies
use ndarray::{ArrayBase, Data, Ix1};
use num_traits::Float;

// Export dependencies from whittaker crate
use whittaker::internals::primitives::errors::BaselineError;

/// A spectrum (or its x grid) that can be borrowed as contiguous samples.
pub trait SpectrumInput<T: Float> {
    /// Borrow the samples in channel order.
    fn samples(&self) -> Result<&[T], BaselineError>;
}

impl<T: Float> SpectrumInput<T> for [T] {
    fn samples(&self) -> Result<&[T], BaselineError> {
        Ok(self)
    }
}

impl<T: Float, const N: usize> SpectrumInput<T> for [T; N] {
    fn samples(&self) -> Result<&[T], BaselineError> {
        Ok(self.as_slice())
    }
}

impl<T: Float> SpectrumInput<T> for Vec<T> {
    fn samples(&self) -> Result<&[T], BaselineError> {
        Ok(self.as_slice())
    }
}

impl<T: Float, S> SpectrumInput<T> for ArrayBase<S, Ix1>
where
    S: Data<Elem = T>,
{
    fn samples(&self) -> Result<&[T], BaselineError> {
        self.as_slice().ok_or_else(|| {
            BaselineError::InvalidInput(format!(
                "spectrum of {} samples is a strided view (stride {}); copy it with `.to_owned()` before fitting",
                self.len(),
                self.strides()[0]
            ))
        })
    }
}
