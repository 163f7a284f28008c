//! Layer 6: Adapters
//!
//! This layer provides user-facing APIs that adapt the engine layer for
//! different execution modes:
//!
//! - **Batch**: Single spectra and row-wise matrices of spectra, with
//!   parallel execution over rows

// Unified batch adapter for baseline fits.
pub mod batch;
