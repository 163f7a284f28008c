//! Synthetic spectra for the baseline benchmarks.
//!
//! Every generator is seeded, so benchmark inputs are reproducible across runs
//! and machines.

use ndarray::Array2;
use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use std::f64::consts::PI;

// ============================================================================
// Building Blocks
// ============================================================================

fn gaussian(t: f64, centre: f64, width: f64, height: f64) -> f64 {
    let u = (t - centre) / width;
    height * (-0.5 * u * u).exp()
}

fn noise(rng: &mut StdRng, sd: f64, n: usize) -> Vec<f64> {
    let dist = Normal::new(0.0, sd).unwrap();
    (0..n).map(|_| dist.sample(rng)).collect()
}

// ============================================================================
// Generators
// ============================================================================

/// Polynomial background with a handful of narrow peaks and white noise.
pub fn raman_spectrum(size: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let centre = Uniform::new(0.05, 0.95).unwrap();
    let height = Uniform::new(2.0, 10.0).unwrap();

    let peaks: Vec<(f64, f64)> = (0..8)
        .map(|_| (centre.sample(&mut rng) * size as f64, height.sample(&mut rng)))
        .collect();
    let eps = noise(&mut rng, 0.1, size);

    let x: Vec<f64> = (0..size).map(|i| 200.0 + 3000.0 * i as f64 / size as f64).collect();
    let y = (0..size)
        .map(|i| {
            let t = i as f64 / size as f64;
            let background = 5.0 + 3.0 * t - 2.0 * t * t + 0.5 * (2.0 * PI * t).sin();
            let signal: f64 = peaks
                .iter()
                .map(|&(c, h)| gaussian(i as f64, c, size as f64 / 400.0 + 1.0, h))
                .sum();
            background + signal + eps[i]
        })
        .collect();
    (x, y)
}

/// Broad exponential background with wide peaks, as in fluorescence-heavy data.
pub fn fluorescence_spectrum(size: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let eps = noise(&mut rng, 0.05, size);

    let x: Vec<f64> = (0..size).map(|i| i as f64).collect();
    let y = (0..size)
        .map(|i| {
            let t = i as f64 / size as f64;
            let background = 20.0 * (-2.0 * t).exp() + 4.0;
            let signal = gaussian(t, 0.3, 0.03, 6.0) + gaussian(t, 0.7, 0.05, 4.0);
            background + signal + eps[i]
        })
        .collect();
    (x, y)
}

/// Unevenly sampled spectrum: sorted random positions on a sloped background.
pub fn uneven_spectrum(size: usize, seed: u64) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let pos = Uniform::new(0.0, 1000.0).unwrap();

    let mut x: Vec<f64> = (0..size).map(|_| pos.sample(&mut rng)).collect();
    x.sort_by(|a, b| a.total_cmp(b));
    x.dedup();
    let eps = noise(&mut rng, 0.1, x.len());

    let y = x
        .iter()
        .zip(&eps)
        .map(|(&v, &e)| 1.0 + 0.004 * v + gaussian(v, 420.0, 6.0, 5.0) + e)
        .collect();
    (x, y)
}

/// Stack of spectra on a shared axis, one per row, with drifting backgrounds.
pub fn spectrum_stack(rows: usize, size: usize, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let drift = Normal::new(0.0, 0.5).unwrap();

    let mut out = Array2::zeros((rows, size));
    for (r, mut row) in out.outer_iter_mut().enumerate() {
        let offset = drift.sample(&mut rng);
        let (_, y) = raman_spectrum(size, seed.wrapping_add(r as u64 + 1));
        for (dst, src) in row.iter_mut().zip(y) {
            *dst = src + offset;
        }
    }
    out
}
