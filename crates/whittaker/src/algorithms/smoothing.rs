//! Signal smoothing and numerical derivatives.
//!
//! ## Purpose
//!
//! The derivative-peak-screening reweighting rule looks at the first and second
//! derivatives of a smoothed copy of the signal. This module provides the
//! mollifier smoother and the finite-difference gradient it needs.
//!
//! ## Design notes
//!
//! * **Mollifier kernel**: `exp(-1 / (1 - t²))` sampled on `t ∈ [-1, 1]` with
//!   `2 * half_window + 1` points and normalized to unit sum. It is smooth
//!   and compactly supported, so repeated passes stay local.
//! * **Edge padding**: The signal is extended once by `half_window` samples on
//!   each side with a least-squares line through the outermost
//!   `2 * half_window + 1` samples. Every pass then convolves the padded
//!   signal, mirroring it at its own ends, and the padding is cut off last.
//! * **Gradient**: Central differences in the interior, one-sided at the ends,
//!   on a unit-spaced grid.
//!
//! ## Invariants
//!
//! * Smoothing preserves the signal length.
//! * A single pass reproduces a straight line exactly.
//!
//! ## Non-goals
//!
//! * This module does not smooth irregularly spaced data by distance.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::mem::swap;
use num_traits::Float;

// ============================================================================
// Kernel and Padding
// ============================================================================

/// Normalized mollifier `exp(-1 / (1 - t²))` with `2 * half_window + 1` taps.
///
/// The two end taps sit at `t = ±1` and are zero. `half_window == 0` gives
/// the identity kernel `[1]`.
pub fn mollifier_kernel<T: Float>(half_window: usize) -> Vec<T> {
    if half_window == 0 {
        return vec![T::one()];
    }
    let hw = T::from(half_window).unwrap();
    let mut kernel: Vec<T> = (0..=2 * half_window)
        .map(|i| {
            let t = (T::from(i).unwrap() - hw) / hw;
            let gap = T::one() - t * t;
            if gap > T::zero() {
                (-T::one() / gap).exp()
            } else {
                T::zero()
            }
        })
        .collect();
    let total = kernel.iter().fold(T::zero(), |acc, &k| acc + k);
    for k in kernel.iter_mut() {
        *k = *k / total;
    }
    kernel
}

// Least-squares line through (start + i, values[i]); returns (intercept, slope)
// with the intercept at position 0.
fn line_fit<T: Float>(values: &[T], start: usize) -> (T, T) {
    let m = values.len();
    if m < 2 {
        return (values.first().copied().unwrap_or_else(T::zero), T::zero());
    }
    let count = T::from(m).unwrap();
    let xs = || (0..m).map(|i| T::from(start + i).unwrap());
    let x_mean = xs().fold(T::zero(), |a, x| a + x) / count;
    let y_mean = values.iter().fold(T::zero(), |a, &y| a + y) / count;
    let (sxy, sxx) = xs()
        .zip(values)
        .fold((T::zero(), T::zero()), |(sxy, sxx), (x, &y)| {
            let dx = x - x_mean;
            (sxy + dx * (y - y_mean), sxx + dx * dx)
        });
    let slope = sxy / sxx;
    (y_mean - slope * x_mean, slope)
}

/// Extend `data` by `pad` samples on each side along straight lines fitted to
/// the outermost `2 * pad + 1` samples.
pub fn pad_linear<T: Float>(data: &[T], pad: usize) -> Vec<T> {
    let n = data.len();
    if pad == 0 || n == 0 {
        return data.to_vec();
    }
    let window = (2 * pad + 1).min(n);
    let (left_b, left_m) = line_fit(&data[..window], 0);
    let (right_b, right_m) = line_fit(&data[n - window..], n - window);

    let mut out = Vec::with_capacity(n + 2 * pad);
    for k in (1..=pad).rev() {
        out.push(left_b - left_m * T::from(k).unwrap());
    }
    out.extend_from_slice(data);
    for k in 0..pad {
        out.push(right_b + right_m * T::from(n + k).unwrap());
    }
    out
}

// ============================================================================
// Convolution
// ============================================================================

/// Convolve with an odd-length symmetric kernel, mirroring `data` at its ends
/// (`data[-k] = data[k]`). The output has the input's length.
pub fn convolve_reflect<T: Float>(data: &[T], kernel: &[T], out: &mut [T]) {
    let n = data.len();
    if n == 0 {
        return;
    }
    let half = kernel.len() / 2;
    let period = 2 * (n - 1);
    let at = |i: isize| -> T {
        if period == 0 {
            return data[0];
        }
        let mut j = i.rem_euclid(period as isize) as usize;
        if j >= n {
            j = period - j;
        }
        data[j]
    };

    for (i, o) in out.iter_mut().enumerate().take(n) {
        let base = i as isize - half as isize;
        *o = kernel
            .iter()
            .enumerate()
            .fold(T::zero(), |acc, (j, &k)| acc + k * at(base + j as isize));
    }
}

/// Smooth with `passes` mollifier convolutions of half width `half_window`.
///
/// `half_window == 0` returns the signal unchanged.
pub fn smooth<T: Float>(data: &[T], half_window: usize, passes: usize) -> Vec<T> {
    let n = data.len();
    if half_window == 0 || passes == 0 || n == 0 {
        return data.to_vec();
    }
    let kernel = mollifier_kernel::<T>(half_window);
    let mut current = pad_linear(data, half_window);
    let mut next = vec![T::zero(); current.len()];
    for _ in 0..passes {
        convolve_reflect(&current, &kernel, &mut next);
        swap(&mut current, &mut next);
    }
    current[half_window..half_window + n].to_vec()
}

// ============================================================================
// Derivatives
// ============================================================================

/// Unit-spacing gradient: central differences inside, one-sided at the edges.
pub fn gradient<T: Float>(data: &[T]) -> Vec<T> {
    let n = data.len();
    let mut out = vec![T::zero(); n];
    if n < 2 {
        return out;
    }
    let half = T::from(0.5).unwrap();
    out[0] = data[1] - data[0];
    out[n - 1] = data[n - 1] - data[n - 2];
    for i in 1..n - 1 {
        out[i] = (data[i + 1] - data[i - 1]) * half;
    }
    out
}
