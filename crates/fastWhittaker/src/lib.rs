//! # Fast Whittaker baseline correction
//!
//! Parallel, ndarray-aware front-end for the `whittaker` crate.
//!
//! ## What does it add?
//!
//! The `whittaker` crate fits the baseline of one spectrum at a time. Real
//! measurements often come as a stack of spectra on a shared axis (a Raman
//! map, a chromatography run, a time series of IR scans). `fastWhittaker`
//! fits such stacks row by row across all CPU cores, and accepts ndarray
//! arrays wherever `whittaker` accepts slices.
//!
//! ## Quick Start
//!
//! ### Typical Use
//!
//! ```rust
//! use fastWhittaker::prelude::*;
//! use ndarray::Array1;
//!
//! let y = Array1::from_iter((0..200).map(|i| {
//!     let t = i as f64;
//!     0.01 * t + 4.0 * (-((t - 120.0) / 5.0).powi(2)).exp()
//! }));
//!
//! let model = Whittaker::new()
//!     .method(ArPLS)
//!     .lambda(1e5)
//!     .adapter(Batch)     // Parallel by default
//!     .build()?;
//!
//! let result = model.fit(&y)?;
//! assert_eq!(result.baseline.len(), 200);
//! # Result::<(), BaselineError>::Ok(())
//! ```
//!
//! ### Many Spectra
//!
//! ```rust
//! use fastWhittaker::prelude::*;
//! use ndarray::Array2;
//!
//! // 8 spectra of 150 samples, one per row
//! let signals = Array2::from_shape_fn((8, 150), |(r, c)| {
//!     let t = c as f64;
//!     1.0 + 0.1 * r as f64 + 0.02 * t + 3.0 * (-((t - 75.0) / 4.0).powi(2)).exp()
//! });
//!
//! let model = Whittaker::new()
//!     .method(AsLS)
//!     .lambda(1e5)
//!     .p(0.01)
//!     .adapter(Batch)
//!     .build()?;
//!
//! let baselines = model.baselines(&signals)?;
//! assert_eq!(baselines.dim(), (8, 150));
//! # Result::<(), BaselineError>::Ok(())
//! ```
//!
//! ### Result and Error Handling
//!
//! Every fit returns a `Result<_, BaselineError>`. Matrix fits stop at the
//! first row that fails and return its error.

#![allow(non_snake_case)]

// Layer 5: Engine - multi-spectrum execution.
mod engine;

// Layer 6: Adapters - execution mode adapters.
mod adapters;

// High-level fluent API for baseline correction.
mod api;

// Input data handling.
mod input;

// Standard fastWhittaker prelude.
pub mod prelude {
    pub use crate::api::{
        Adapter::Batch,
        BaselineError, BaselineResult, StrategyParams, TerminationStatus, WeightingMethod,
        WeightingMethod::{
            AirPLS, ArPLS, AsLS, AsPLS, BrPLS, DerPsaLSA, DrPLS, IAsLS, IArPLS, LsrPLS, PsaLSA,
        },
        WhittakerBuffer, WhittakerBuilder as Whittaker,
    };
    pub use crate::input::SpectrumInput;
}

// Internal modules for development and testing.
//
// This module re-exports internal modules for development and testing purposes.
// It is only available with the `dev` feature enabled.
#[cfg(feature = "dev")]
pub mod internals {
    pub mod engine {
        pub use crate::engine::*;
    }
    pub mod adapters {
        pub use crate::adapters::*;
    }
    pub mod api {
        pub use crate::api::*;
    }
    pub mod input {
        pub use crate::input::*;
    }
}
