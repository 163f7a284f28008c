//! Special functions.
//!
//! ## Purpose
//!
//! This module provides the scaled complementary error function
//! `erfcx(x) = exp(x²) · erfc(x)` needed by the Bayesian reweighting rule.
//!
//! ## Design notes
//!
//! * **Approximation**: W. J. Cody's rational Chebyshev approximations
//!   (Math. Comp. 1969), on three ranges: `|x| <= 0.46875`, `|x| <= 4` and
//!   beyond. Relative error is near machine precision in `f64`.
//! * **Large arguments**: The outer ranges evaluate `erfcx` directly, so the
//!   `exp(x²)` factor never has to be formed for positive `x`.
//! * **Negative arguments**: `erfcx(x) = 2·exp(x²) - erfcx(-x)`, with `x²`
//!   split to keep the exponent exact. This overflows to infinity for large
//!   `|x|`; callers treat that as weight zero.

// External dependencies
use num_traits::Float;

// Inner range, |x| <= 0.46875: erf(x) = x · A(x²) / B(x²)
const A: [f64; 5] = [
    3.161_123_743_870_565_6e0,
    1.138_641_541_510_501_6e2,
    3.774_852_376_853_020_2e2,
    3.209_377_589_138_469_5e3,
    1.857_777_061_846_031_5e-1,
];
const B: [f64; 4] = [
    2.360_129_095_234_412_1e1,
    2.440_246_379_344_441_7e2,
    1.282_616_526_077_372_3e3,
    2.844_236_833_439_170_6e3,
];

// Middle range, |x| <= 4: erfcx(x) = C(x) / D(x)
const C: [f64; 9] = [
    5.641_884_969_886_701e-1,
    8.883_149_794_388_376e0,
    6.611_919_063_714_163e1,
    2.986_351_381_974_001_3e2,
    8.819_522_212_417_691e2,
    1.712_047_612_634_070_6e3,
    2.051_078_377_826_071_5e3,
    1.230_339_354_797_997_2e3,
    2.153_115_354_744_038_5e-8,
];
const D: [f64; 8] = [
    1.574_492_611_070_983_5e1,
    1.176_939_508_913_125e2,
    5.371_811_018_620_099e2,
    1.621_389_574_566_690_2e3,
    3.290_799_235_733_459_6e3,
    4.362_619_090_143_247e3,
    3.439_367_674_143_721_6e3,
    1.230_339_354_803_749_42e3,
];

// Outer range: erfcx(x) = (1/sqrt(pi) - P(1/x²) / (x² Q(1/x²))) / x
const P: [f64; 6] = [
    3.053_266_349_612_323_4e-1,
    3.603_448_999_498_044_4e-1,
    1.257_817_261_112_292_5e-1,
    1.608_378_514_874_227_66e-2,
    6.587_491_615_298_378e-4,
    1.631_538_713_730_209_8e-2,
];
const Q: [f64; 5] = [
    2.568_520_192_289_822_4e0,
    1.872_952_849_923_467_3e0,
    5.279_051_029_514_284e-1,
    6.051_834_131_244_132e-2,
    2.335_204_976_268_691_8e-3,
];

const INV_SQRT_PI: f64 = 5.641_895_835_477_562_9e-1;

#[inline]
fn c<T: Float>(v: f64) -> T {
    T::from(v).unwrap()
}

/// Scaled complementary error function `exp(x²) · erfc(x)`.
pub fn erfcx<T: Float>(x: T) -> T {
    if x.is_nan() {
        return x;
    }
    let y = x.abs();

    if y <= c(0.46875) {
        let ysq = y * y;
        let mut num = c::<T>(A[4]) * ysq;
        let mut den = ysq;
        for i in 0..3 {
            num = (num + c(A[i])) * ysq;
            den = (den + c(B[i])) * ysq;
        }
        let erf = x * (num + c(A[3])) / (den + c(B[3]));
        return ysq.exp() * (T::one() - erf);
    }

    let positive = if y <= c(4.0) {
        let mut num = c::<T>(C[8]) * y;
        let mut den = y;
        for i in 0..7 {
            num = (num + c(C[i])) * y;
            den = (den + c(D[i])) * y;
        }
        (num + c(C[7])) / (den + c(D[7]))
    } else {
        let inv_sq = T::one() / (y * y);
        let mut num = c::<T>(P[5]) * inv_sq;
        let mut den = inv_sq;
        for i in 0..4 {
            num = (num + c(P[i])) * inv_sq;
            den = (den + c(Q[i])) * inv_sq;
        }
        let tail = inv_sq * (num + c(P[4])) / (den + c(Q[4]));
        (c::<T>(INV_SQRT_PI) - tail) / y
    };

    if x > T::zero() {
        return positive;
    }

    // exp(x²) with x² = s² + (x - s)(x + s), s = x rounded toward zero to 1/16
    let sixteen = c::<T>(16.0);
    let s = (x * sixteen).trunc() / sixteen;
    let rest = (x - s) * (x + s);
    c::<T>(2.0) * (s * s).exp() * rest.exp() - positive
}

/// Complementary error function, via [`erfcx`].
#[inline]
pub fn erfc<T: Float>(x: T) -> T {
    erfcx(x) * (-(x * x)).exp()
}
