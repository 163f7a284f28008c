#![cfg(feature = "dev")]
//! Tests for the pre-smoothing used by derivative peak screening.
//!
//! These tests verify the smoothing building blocks and the screen built on them:
//! - Mollifier kernel shape and normalization
//! - Linear edge padding and mirrored convolution
//! - Repeated smoothing passes
//! - Peak screening factors on a known peak
//!
//! ## Test Organization
//!
//! 1. **Kernel** - Taps, symmetry, unit sum
//! 2. **Padding and Convolution** - Edges and lines
//! 3. **Smoothing** - Passes, constants, mass
//! 4. **Peak Screen** - DerPsaLSA partial weights

use approx::assert_relative_eq;

use whittaker::internals::algorithms::smoothing::{
    convolve_reflect, gradient, mollifier_kernel, pad_linear, smooth,
};
use whittaker::internals::algorithms::weighting::{IterationState, Strategy, WeightingStrategy};

fn line(n: usize) -> Vec<f64> {
    (0..n).map(|i| 1.5 + 0.25 * i as f64).collect()
}

// ============================================================================
// Kernel Tests
// ============================================================================

/// Test the mollifier taps.
///
/// Verifies length, zero end taps, symmetry and unit sum.
#[test]
fn test_mollifier_kernel_shape() {
    let k = mollifier_kernel::<f64>(2);
    assert_eq!(k.len(), 5);
    assert_eq!(k[0], 0.0);
    assert_eq!(k[4], 0.0);
    assert_relative_eq!(k[1], k[3], epsilon = 1e-15);
    // exp(-1) / (exp(-1) + 2 exp(-4/3))
    assert_relative_eq!(k[2], 0.411_004_629_025_265_3, epsilon = 1e-12);
    assert_relative_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-14);

    let wide = mollifier_kernel::<f64>(7);
    assert_eq!(wide.len(), 15);
    assert_relative_eq!(wide.iter().sum::<f64>(), 1.0, epsilon = 1e-14);
    assert!(wide[7] > wide[6] && wide[6] > wide[5]);
}

/// Test the degenerate half windows.
#[test]
fn test_mollifier_kernel_identity() {
    assert_eq!(mollifier_kernel::<f64>(0), vec![1.0]);
    assert_eq!(mollifier_kernel::<f64>(1), vec![0.0, 1.0, 0.0]);
}

// ============================================================================
// Padding and Convolution Tests
// ============================================================================

/// Test that linear padding continues a straight line.
#[test]
fn test_pad_linear_extends_line() {
    let y = line(20);
    let padded = pad_linear(&y, 4);
    assert_eq!(padded.len(), 28);
    for (i, v) in padded.iter().enumerate() {
        let want = 1.5 + 0.25 * (i as f64 - 4.0);
        assert_relative_eq!(*v, want, epsilon = 1e-12);
    }
    assert_eq!(pad_linear(&y, 0), y);
}

/// Test that the fit uses only the outermost samples.
///
/// A kink in the middle must not leak into either extension.
#[test]
fn test_pad_linear_uses_edge_windows() {
    let y: Vec<f64> = (0..30)
        .map(|i| if i < 15 { 0.0 } else { (i - 15) as f64 })
        .collect();
    let padded = pad_linear(&y, 2);
    assert_eq!(&padded[..2], &[0.0, 0.0]);
    assert_relative_eq!(padded[32], 15.0, epsilon = 1e-12);
    assert_relative_eq!(padded[33], 16.0, epsilon = 1e-12);
}

/// Test mirrored convolution at the edges.
///
/// Verifies data[-k] = data[k] on both ends.
#[test]
fn test_convolve_reflect_edges() {
    let data = [1.0, 2.0, 4.0, 8.0];
    let kernel = [0.25, 0.5, 0.25];
    let mut out = [0.0; 4];
    convolve_reflect(&data, &kernel, &mut out);

    // Left neighbour of data[0] mirrors to data[1]
    assert_relative_eq!(out[0], 0.25 * 2.0 + 0.5 * 1.0 + 0.25 * 2.0, epsilon = 1e-15);
    assert_relative_eq!(out[1], 0.25 * 1.0 + 0.5 * 2.0 + 0.25 * 4.0, epsilon = 1e-15);
    assert_relative_eq!(out[3], 0.25 * 4.0 + 0.5 * 8.0 + 0.25 * 4.0, epsilon = 1e-15);
}

// ============================================================================
// Smoothing Tests
// ============================================================================

/// Test that one pass keeps a line and many passes keep a constant.
#[test]
fn test_smooth_preserves_simple_signals() {
    let y = line(40);
    let once = smooth(&y, 3, 1);
    for (s, v) in once.iter().zip(&y) {
        assert_relative_eq!(*s, *v, epsilon = 1e-12);
    }

    let flat = vec![3.0; 30];
    for v in smooth(&flat, 2, 16) {
        assert_relative_eq!(v, 3.0, epsilon = 1e-12);
    }

    // No window means no smoothing
    assert_eq!(smooth(&y, 0, 16), y);
}

/// Test that smoothing flattens a narrow peak but keeps its area.
#[test]
fn test_smooth_spreads_peak() {
    let y: Vec<f64> = (0..400)
        .map(|i| 10.0 * (-0.5 * ((i as f64 - 200.0) / 10.0).powi(2)).exp())
        .collect();
    let s = smooth(&y, 2, 16);

    assert_eq!(s.len(), 400);
    assert!(s[200] < y[200] - 0.2);
    assert_relative_eq!(s.iter().sum::<f64>(), y.iter().sum::<f64>(), epsilon = 1e-9);
}

/// Test the unit-spacing gradient on a quadratic.
#[test]
fn test_gradient_quadratic() {
    let y: Vec<f64> = (0..6).map(|i| (i * i) as f64).collect();
    let g = gradient(&y);
    assert_eq!(g, vec![1.0, 2.0, 4.0, 6.0, 8.0, 9.0]);
}

// ============================================================================
// Peak Screen Tests
// ============================================================================

/// Test the derivative peak screen on a single Gaussian peak.
///
/// Flat regions keep factor one; the flanks and apex of the peak, where the
/// first or second derivative is large, are screened out.
#[test]
fn test_derivative_screen_on_peak() {
    let n = 400;
    let y: Vec<f64> = (0..n)
        .map(|i| 10.0 * (-0.5 * ((i as f64 - 200.0) / 10.0).powi(2)).exp())
        .collect();
    let s = Strategy::DerPsaLSA {
        p: 0.01,
        k: 1.0,
        smooth_half_window: n / 200,
        num_smooths: 16,
    };
    let mut state = IterationState::default();
    s.prepare(&y, &mut state);

    let w = &state.partial_weights;
    assert_eq!(w.len(), n);
    assert!(w.iter().all(|&v| (0.0..=1.0).contains(&v)));
    assert!(w[20] > 0.999);
    assert!(w[380] > 0.999);
    assert!(w[190] < 0.01);

    let min_idx = (0..n).min_by(|&a, &b| w[a].partial_cmp(&w[b]).unwrap()).unwrap();
    assert!((195..=205).contains(&min_idx), "minimum at {}", min_idx);
}
