//! # whittaker — Whittaker Baseline Correction for Rust
//!
//! Iteratively reweighted penalized least squares (IRPLS) baseline estimation
//! for one-dimensional signals such as Raman, IR and XRD spectra or
//! chromatograms.
//!
//! ## What is Whittaker baseline correction?
//!
//! The Whittaker smoother finds the curve `z` minimizing
//!
//! ```text
//! Σ wᵢ (yᵢ - zᵢ)² + λ Σ (Δᵈ z)ᵢ²
//! ```
//!
//! which is the solution of the banded system `(W + λ DᵀD) z = W y`. Baseline
//! methods repeat that solve, each time lowering the weights of points that
//! sit above the current fit (peaks) so the curve settles onto the lower
//! envelope of the signal. The variants (AsLS, airPLS, arPLS, drPLS, ...)
//! differ only in how the weights are recomputed.
//!
//! ## Quick Start
//!
//! ### Typical Use
//!
//! ```rust
//! use whittaker::prelude::*;
//!
//! // A sloped background with one peak on top
//! let y: Vec<f64> = (0..200)
//!     .map(|i| {
//!         let t = i as f64;
//!         0.02 * t + 5.0 * (-((t - 100.0) / 6.0).powi(2)).exp()
//!     })
//!     .collect();
//!
//! let model = Whittaker::new()
//!     .method(AsLS)
//!     .lambda(1e5)
//!     .p(0.01)
//!     .adapter(Batch)
//!     .build()?;
//!
//! let result = model.fit(&y)?;
//!
//! assert_eq!(result.baseline.len(), y.len());
//! // The baseline passes under the peak
//! assert!(result.baseline[100] < 3.0);
//! # Result::<(), BaselineError>::Ok(())
//! ```
//!
//! ### Full Features
//!
//! ```rust
//! use whittaker::prelude::*;
//!
//! let x: Vec<f64> = (0..120).map(|i| 400.0 + 2.5 * i as f64).collect();
//! let y: Vec<f64> = x
//!     .iter()
//!     .map(|&v| 1.0 + 1e-3 * v + 4.0 * (-((v - 550.0) / 8.0).powi(2)).exp())
//!     .collect();
//!
//! let model = Whittaker::new()
//!     .method(ArPLS)          // Logistic reweighting
//!     .lambda(1e4)            // Smoothness
//!     .difference_order(2)    // Penalize curvature
//!     .tolerance(1e-4)        // Convergence threshold
//!     .max_iterations(100)    // Iteration budget
//!     .return_corrected()     // Keep y - baseline
//!     .adapter(Batch)
//!     .build()?;
//!
//! // Non-uniform sampling is handled through x
//! let result = model.fit_with_x(&x, &y)?;
//! println!("{}", result);
//! # Result::<(), BaselineError>::Ok(())
//! ```
//!
//! ### String-keyed configuration
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use whittaker::prelude::*;
//!
//! let mut params = BTreeMap::new();
//! params.insert("eta".to_string(), 0.3);
//!
//! let model = Whittaker::<f64>::new()
//!     .configure("drpls", &params)
//!     .adapter(Batch)
//!     .build()?;
//! assert_eq!(model.method(), DrPLS);
//!
//! // Parameters the method does not use are rejected
//! params.insert("p".to_string(), 0.1);
//! let err = Whittaker::<f64>::new()
//!     .configure("drpls", &params)
//!     .adapter(Batch)
//!     .build()
//!     .unwrap_err();
//! assert!(err.is_configuration_error());
//! # Result::<(), BaselineError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! `fit` returns a `Result<BaselineResult<T>, BaselineError>`.
//!
//! - **`Ok(BaselineResult<T>)`**: The baseline, the weights of the final
//!   solve, the number of iterations and whether the fit converged. Running
//!   out of iterations is not an error; it shows up as `converged == false`.
//! - **`Err(BaselineError)`**: Either a configuration error (bad parameter,
//!   bad input) raised before any computation, or a singular system raised
//!   by the factorization.
//!
//! ## Minimal Usage (no_std / Embedded)
//!
//! The crate supports `no_std` environments with `alloc`:
//!
//! ```toml
//! [dependencies]
//! whittaker = { version = "0.1", default-features = false }
//! ```
//!
//! ## References
//!
//! - Eilers, P. H. C. (2003). "A Perfect Smoother"
//! - Eilers, P. H. C., Boelens, H. F. M. (2005). "Baseline Correction with Asymmetric Least Squares Smoothing"
//! - Zhang, Z.-M., Chen, S., Liang, Y.-Z. (2010). "Baseline correction using adaptive iteratively reweighted penalized least squares"
//! - Baek, S.-J., Park, A., Ahn, Y.-J., Choo, J. (2015). "Baseline correction using asymmetrically reweighted penalized least squares smoothing"
//!
//! ## License
//!
//! See the repository for license information and contribution guidelines.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
#[macro_use]
extern crate alloc;

// Layer 1: Primitives - errors, buffers and sorting.
mod primitives;

// Layer 2: Math - banded matrices, difference operators and solvers.
mod math;

// Layer 3: Algorithms - penalized systems and reweighting rules.
mod algorithms;

// Layer 4: Engine - validation and the reweighting loop.
mod engine;

// Layer 5: Adapters - execution mode adapters.
mod adapters;

// High-level fluent API for baseline correction.
mod api;

// Standard whittaker prelude.
pub mod prelude {
    pub use crate::api::{
        Adapter::Batch,
        BaselineError, BaselineResult, StrategyParams, TerminationStatus, WeightingMethod,
        WeightingMethod::AirPLS,
        WeightingMethod::ArPLS,
        WeightingMethod::AsLS,
        WeightingMethod::AsPLS,
        WeightingMethod::BrPLS,
        WeightingMethod::DerPsaLSA,
        WeightingMethod::DrPLS,
        WeightingMethod::IAsLS,
        WeightingMethod::IArPLS,
        WeightingMethod::LsrPLS,
        WeightingMethod::PsaLSA,
        WhittakerBuffer, WhittakerBuilder as Whittaker,
    };
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod primitives {
        pub use crate::primitives::*;
    }
    pub mod math {
        pub use crate::math::*;
    }
    pub mod algorithms {
        pub use crate::algorithms::*;
    }
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod adapters {
        pub use crate::adapters::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
}
