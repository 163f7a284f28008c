#![cfg(feature = "dev")]
//! Tests for the reweighting loop.
//!
//! These tests verify the execution engine end to end:
//! - Single solves against a dense reference
//! - Termination states and their bookkeeping
//! - Sample order, buffers and determinism
//! - Every weighting rule on a realistic spectrum
//!
//! ## Test Organization
//!
//! 1. **Single Solves** - One iteration, fixed points
//! 2. **Termination** - Convergence, budget, exhausted weights
//! 3. **Ordering and Buffers** - Unsorted x, buffer reuse, determinism
//! 4. **All Methods** - Every rule on one spectrum
//! 5. **Input Errors** - Invalid signals and coordinates

use approx::assert_relative_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};

use whittaker::internals::algorithms::weighting::{
    IterationState, StrategyParams, WeightUpdate, WeightingMethod, WeightingStrategy,
};
use whittaker::internals::engine::executor::{
    SolveConfig, WhittakerBuffer, WhittakerExecutor, solve_baseline, solve_baseline_with_buffer,
};
use whittaker::internals::engine::output::TerminationStatus;
use whittaker::internals::math::difference::diff_penalty;
use whittaker::internals::primitives::errors::BaselineError;

// Dense solve of (diag(w) + lambda D^T D) z = w * y.
fn dense_whittaker(y: &[f64], w: &[f64], lambda: f64, order: usize) -> Vec<f64> {
    let n = y.len();
    let p = diff_penalty::<f64>(n, order);
    let mut a: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| lambda * p.get(i, j)).collect())
        .collect();
    let mut b: Vec<f64> = (0..n).map(|i| w[i] * y[i]).collect();
    for i in 0..n {
        a[i][i] += w[i];
    }
    for j in 0..n {
        for r in j + 1..n {
            let f = a[r][j] / a[j][j];
            for c in j..n {
                a[r][c] -= f * a[j][c];
            }
            b[r] -= f * b[j];
        }
    }
    let mut z = vec![0.0; n];
    for i in (0..n).rev() {
        let s: f64 = (i + 1..n).map(|c| a[i][c] * z[c]).sum();
        z[i] = (b[i] - s) / a[i][i];
    }
    z
}

// Sloped background with one Gaussian peak centred at 50.
fn ramp_with_peak(n: usize) -> (Vec<f64>, Vec<f64>) {
    let ramp: Vec<f64> = (0..n).map(|i| 0.05 * i as f64 + 1.0).collect();
    let y = ramp
        .iter()
        .enumerate()
        .map(|(i, &b)| {
            let t = (i as f64 - 50.0) / 5.0;
            b + 10.0 * (-t * t).exp()
        })
        .collect();
    (ramp, y)
}

fn config(method: WeightingMethod, lambda: f64) -> SolveConfig<f64> {
    SolveConfig {
        method,
        lambda: Some(lambda),
        ..SolveConfig::default()
    }
}

// Keeps the all-ones weights forever.
struct Unit;

impl WeightingStrategy<f64> for Unit {
    fn name(&self) -> &'static str {
        "unit"
    }

    fn update(
        &self,
        _signal: &[f64],
        _baseline: &[f64],
        weights: &[f64],
        _state: &IterationState<f64>,
        new_weights: &mut [f64],
    ) -> WeightUpdate<f64> {
        new_weights.copy_from_slice(weights);
        WeightUpdate::Updated
    }
}

// Gives up after the first solve.
struct GiveUp;

impl WeightingStrategy<f64> for GiveUp {
    fn name(&self) -> &'static str {
        "give-up"
    }

    fn update(
        &self,
        _signal: &[f64],
        _baseline: &[f64],
        _weights: &[f64],
        _state: &IterationState<f64>,
        _new_weights: &mut [f64],
    ) -> WeightUpdate<f64> {
        WeightUpdate::Exhausted
    }
}

// ============================================================================
// Single Solve Tests
// ============================================================================

/// Test that one iteration with unit weights is the plain Whittaker smoother.
///
/// Verifies (I + lambda D^T D) z = y and that the returned weights are the
/// ones used for the solve.
#[test]
fn test_single_iteration_matches_dense() {
    let n = 12;
    let y: Vec<f64> = (0..n).map(|i| (0.6 * i as f64).sin() + 0.2 * i as f64).collect();
    let cfg = SolveConfig {
        max_iterations: 1,
        initial_weights: Some(vec![1.0; n]),
        ..config(WeightingMethod::AsLS, 10.0)
    };

    let result = solve_baseline(&y, None, &cfg).unwrap();
    let expected = dense_whittaker(&y, &vec![1.0; n], 10.0, 2);
    for (got, want) in result.baseline.iter().zip(&expected) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
    assert_eq!(result.weights, vec![1.0; n]);
    assert_eq!(result.iterations_run, 1);
    assert!(!result.converged);
    assert_eq!(result.status, TerminationStatus::MaxIterReached);
    assert_eq!(result.tol_history.len(), 1);
}

/// Test the smallest admissible signal.
///
/// Verifies that n = d + 1 is solvable and n = d is rejected.
#[test]
fn test_minimum_signal_length() {
    let result = solve_baseline(&[1.0_f64, 3.0, 2.0], None, &SolveConfig::default()).unwrap();
    assert_eq!(result.len(), 3);
    assert!(result.baseline.iter().all(|v| v.is_finite()));

    let err = solve_baseline(&[1.0, 3.0], None, &SolveConfig::default()).unwrap_err();
    assert_eq!(err, BaselineError::InvalidDifferenceOrder { order: 2, n: 2 });
}

/// Test that a straight line is its own baseline.
///
/// Lines lie in the null space of the second-order penalty, so every rule
/// reproduces them whatever its weights. With a mild lambda the roundoff is
/// small enough for the loop to settle; a stiff lambda still keeps the line.
#[test]
fn test_line_is_fixed_point() {
    let y: Vec<f64> = (0..60).map(|i| 2.0 + 0.5 * i as f64).collect();
    for lambda in [1e2, 1e6] {
        for method in WeightingMethod::ALL {
            let result = solve_baseline(&y, None, &config(method, lambda)).unwrap();
            let max_err = result
                .baseline
                .iter()
                .zip(&y)
                .map(|(z, v)| (z - v).abs())
                .fold(0.0, f64::max);

            if lambda < 1e3 {
                assert!(max_err < 1e-8, "{} moved the line by {}", method, max_err);
                assert!(result.converged, "{} did not settle on a line", method);
            } else {
                assert!(max_err < 1e-3, "{} moved the line by {}", method, max_err);
            }
            assert!(result.weights.iter().all(|w| w.is_finite()));
        }
    }
}

/// Test a custom strategy through the executor.
///
/// Verifies that unchanged weights converge on the first iteration.
#[test]
fn test_custom_strategy_converges_immediately() {
    let y: Vec<f64> = (0..20).map(|i| (0.3 * i as f64).cos()).collect();
    let out = WhittakerExecutor::new()
        .lambda(5.0)
        .run(&y, None, &Unit, None, None)
        .unwrap();

    assert!(out.converged);
    assert_eq!(out.status, TerminationStatus::Converged);
    assert_eq!(out.iterations_run, 1);
    assert_eq!(out.tol_history, vec![0.0]);

    let expected = dense_whittaker(&y, &vec![1.0; 20], 5.0, 2);
    for (got, want) in out.baseline.iter().zip(&expected) {
        assert_relative_eq!(*got, *want, epsilon = 1e-9);
    }
}

// ============================================================================
// Termination Tests
// ============================================================================

/// Test convergence on a sloped background with a peak.
///
/// Verifies that the baseline follows the ramp and the peak is down-weighted.
#[test]
fn test_asls_recovers_ramp_under_peak() {
    let (ramp, y) = ramp_with_peak(100);
    let cfg = SolveConfig {
        params: StrategyParams {
            p: Some(0.01),
            ..StrategyParams::default()
        },
        ..config(WeightingMethod::AsLS, 1e5)
    };
    let result = solve_baseline(&y, None, &cfg).unwrap();

    assert!(result.converged);
    assert_eq!(result.status, TerminationStatus::Converged);
    assert!(result.iterations_run < 50);
    assert_eq!(result.tol_history.len(), result.iterations_run);
    assert!(result.final_tolerance().unwrap() < 1e-3);

    let max_err = result
        .baseline
        .iter()
        .zip(&ramp)
        .map(|(z, b)| (z - b).abs())
        .fold(0.0, f64::max);
    assert!(max_err < 0.2, "max deviation {}", max_err);
    assert_relative_eq!(result.weights[50], 0.01, epsilon = 1e-12);
    assert_eq!(result.lambda_used, 1e5);
    assert_eq!(result.method, "asls");
}

/// Test that the metric trends down on a flat signal with white noise.
///
/// The per-iteration metric may wiggle, but it must end at its minimum and
/// well below where it started.
#[test]
fn test_asls_metric_decreases_on_flat_noise() {
    let dist = Normal::new(0.0, 0.1).unwrap();
    for seed in [7, 42, 1234] {
        let mut rng = StdRng::seed_from_u64(seed);
        let y: Vec<f64> = (0..200).map(|_| 1.0 + dist.sample(&mut rng)).collect();
        let cfg = SolveConfig {
            params: StrategyParams {
                p: Some(0.01),
                ..StrategyParams::default()
            },
            ..config(WeightingMethod::AsLS, 1e5)
        };
        let result = solve_baseline(&y, None, &cfg).unwrap();

        assert!(result.converged, "seed {}", seed);
        assert!(result.iterations_run <= 20, "seed {}", seed);
        let h = &result.tol_history;
        let last = h[h.len() - 1];
        assert!(last < 1e-3);
        assert!(h.iter().all(|&m| m >= last));
        assert!(h[h.len() - 2] + last < h[0] + h[1], "seed {}: {:?}", seed, h);
    }
}

/// Test that an exhausted rule stops with the current baseline.
#[test]
fn test_exhausted_weights_stop_early() {
    let y: Vec<f64> = (0..15).map(|i| i as f64).collect();
    let out = WhittakerExecutor::new()
        .lambda(1.0)
        .run(&y, None, &GiveUp, None, None)
        .unwrap();

    assert_eq!(out.status, TerminationStatus::Exhausted);
    assert!(out.converged);
    assert_eq!(out.iterations_run, 1);
    assert!(out.tol_history.is_empty());
    assert_eq!(out.weights, vec![1.0; 15]);
}

/// Test that every returned weight respects the floor.
#[test]
fn test_weights_respect_floor() {
    let (_, y) = ramp_with_peak(100);
    let cfg = SolveConfig {
        min_weight: 1e-3,
        ..config(WeightingMethod::AirPLS, 1e5)
    };
    let result = solve_baseline(&y, None, &cfg).unwrap();
    assert!(result.weights.iter().all(|&w| w >= 1e-3));
}

// ============================================================================
// Ordering and Buffer Tests
// ============================================================================

/// Test that unsorted coordinates give the sorted fit in caller order.
#[test]
fn test_reversed_x_matches_sorted_fit() {
    let (_, y) = ramp_with_peak(80);
    let x: Vec<f64> = (0..80).map(|i| 10.0 + 0.5 * i as f64).collect();
    let cfg = config(WeightingMethod::ArPLS, 1e4);

    let sorted = solve_baseline(&y, Some(&x[..]), &cfg).unwrap();
    let x_rev: Vec<f64> = x.iter().rev().copied().collect();
    let y_rev: Vec<f64> = y.iter().rev().copied().collect();
    let reversed = solve_baseline(&y_rev, Some(&x_rev[..]), &cfg).unwrap();

    assert_eq!(sorted.iterations_run, reversed.iterations_run);
    for (a, b) in sorted.baseline.iter().zip(reversed.baseline.iter().rev()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
    for (a, b) in sorted.weights.iter().zip(reversed.weights.iter().rev()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-12);
    }
}

/// Test that equally spaced coordinates match the index-based fit.
#[test]
fn test_uniform_x_matches_index_fit() {
    let (_, y) = ramp_with_peak(100);
    let x: Vec<f64> = (0..100).map(|i| 3.0 * i as f64).collect();
    let cfg = SolveConfig {
        max_iterations: 3,
        ..config(WeightingMethod::AsLS, 1e5)
    };

    let plain = solve_baseline(&y, None, &cfg).unwrap();
    let with_x = solve_baseline(&y, Some(&x[..]), &cfg).unwrap();
    for (a, b) in plain.baseline.iter().zip(&with_x.baseline) {
        assert_relative_eq!(*a, *b, epsilon = 1e-6);
    }
}

/// Test that a reused buffer gives identical results.
#[test]
fn test_buffer_reuse() {
    let (_, y) = ramp_with_peak(100);
    let cfg = config(WeightingMethod::IArPLS, 1e5);
    let mut buffer = WhittakerBuffer::default();

    let first = solve_baseline_with_buffer(&y, None, &cfg, Some(&mut buffer)).unwrap();
    let second = solve_baseline_with_buffer(&y, None, &cfg, Some(&mut buffer)).unwrap();
    let fresh = solve_baseline(&y, None, &cfg).unwrap();

    assert_eq!(first.baseline, second.baseline);
    assert_eq!(first.weights, second.weights);
    assert_eq!(first.baseline, fresh.baseline);

    // A shorter signal through the same buffer
    let short = solve_baseline_with_buffer(&y[..40], None, &cfg, Some(&mut buffer)).unwrap();
    assert_eq!(short.len(), 40);
}

/// Test that repeated fits are bit-identical.
#[test]
fn test_determinism() {
    let (_, y) = ramp_with_peak(100);
    let cfg = config(WeightingMethod::DrPLS, 1e5);
    let a = solve_baseline(&y, None, &cfg).unwrap();
    let b = solve_baseline(&y, None, &cfg).unwrap();
    assert_eq!(a.baseline, b.baseline);
    assert_eq!(a.weights, b.weights);
    assert_eq!(a.tol_history, b.tol_history);
}

/// Test the optional corrected signal.
#[test]
fn test_return_corrected() {
    let (_, y) = ramp_with_peak(60);
    let cfg = SolveConfig {
        return_corrected: true,
        ..config(WeightingMethod::AsLS, 1e4)
    };
    let result = solve_baseline(&y, None, &cfg).unwrap();
    let corrected = result.corrected.as_ref().unwrap();
    for i in 0..y.len() {
        assert_eq!(corrected[i], y[i] - result.baseline[i]);
    }
    assert_eq!(&result.corrected_signal(&y), corrected);

    let plain = solve_baseline(&y, None, &config(WeightingMethod::AsLS, 1e4)).unwrap();
    assert!(plain.corrected.is_none());
}

// ============================================================================
// All Methods Tests
// ============================================================================

/// Test every rule on a noisy spectrum with a peak.
///
/// Verifies finite output of the right length for each method.
#[test]
fn test_all_methods_run() {
    let n = 300;
    let y: Vec<f64> = (0..n)
        .map(|i| {
            let t = i as f64;
            let peak = 5.0 * (-((t - 150.0) / 10.0).powi(2)).exp();
            1.0 + 0.01 * t + peak + 0.05 * (1.3 * t).sin()
        })
        .collect();

    for method in WeightingMethod::ALL {
        let cfg = SolveConfig {
            max_iterations: 20,
            ..config(method, 1e4)
        };
        let result = solve_baseline(&y, None, &cfg)
            .unwrap_or_else(|e| panic!("{} failed: {}", method, e));
        assert_eq!(result.len(), n, "{}", method);
        assert_eq!(result.weights.len(), n, "{}", method);
        assert!(result.baseline.iter().all(|v| v.is_finite()), "{}", method);
        assert!(result.weights.iter().all(|w| w.is_finite() && *w > 0.0), "{}", method);
        assert!(result.iterations_run >= 1, "{}", method);
        assert_eq!(result.method, method.name());
    }
}

// ============================================================================
// Input Error Tests
// ============================================================================

/// Test rejection of non-finite samples before any solve.
#[test]
fn test_non_finite_input() {
    let cfg = SolveConfig::<f64>::default();
    let err = solve_baseline(&[1.0, f64::NAN, 2.0, 3.0], None, &cfg).unwrap_err();
    assert!(matches!(err, BaselineError::InvalidNumericValue(_)));

    let x = [0.0, 1.0, f64::INFINITY, 3.0];
    let err = solve_baseline(&[1.0, 2.0, 2.0, 3.0], Some(&x[..]), &cfg).unwrap_err();
    assert!(matches!(err, BaselineError::InvalidNumericValue(_)));
}

/// Test rejection of empty and mismatched inputs.
#[test]
fn test_shape_errors() {
    let cfg = SolveConfig::<f64>::default();
    assert_eq!(
        solve_baseline(&[], None, &cfg).unwrap_err(),
        BaselineError::EmptyInput
    );

    let x = [0.0, 1.0, 2.0];
    assert!(matches!(
        solve_baseline(&[1.0, 2.0, 3.0, 4.0], Some(&x[..]), &cfg),
        Err(BaselineError::MismatchedInputs { x_len: 3, y_len: 4 })
    ));

    let cfg = SolveConfig {
        initial_weights: Some(vec![1.0; 3]),
        ..SolveConfig::default()
    };
    assert!(matches!(
        solve_baseline(&[1.0, 2.0, 3.0, 4.0], None, &cfg),
        Err(BaselineError::MismatchedWeights { expected: 4, got: 3 })
    ));
}

/// Test rejection of repeated coordinates after sorting.
#[test]
fn test_duplicate_x() {
    let x = [3.0, 1.0, 2.0, 1.0];
    let err = solve_baseline(&[1.0, 2.0, 3.0, 4.0], Some(&x[..]), &SolveConfig::default())
        .unwrap_err();
    assert!(matches!(err, BaselineError::DuplicateX { .. }));
    assert!(err.is_configuration_error());
}
