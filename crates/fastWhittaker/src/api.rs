//! High-level API for Whittaker baseline fits with parallel execution support.
//!
//! ## Purpose
//!
//! This module provides the user-facing entry point of `fastWhittaker`. It
//! re-uses the `whittaker` builder and swaps in an adapter that accepts
//! ndarray inputs and fits matrices of spectra across all CPU cores.
//!
//! ## Design notes
//!
//! * **Fluent Integration**: Re-uses the base `whittaker` builder pattern.
//! * **Parallel-First**: Defaults to parallel execution over rows.
//! * **Transparent**: The `Batch` marker selects the parallel builder.
//!
//! ## Key concepts
//!
//! * **Parallel Support**: Uses `rayon` behind the `cpu` feature.
//! * **Extended Adapters**: Wraps the core batch adapter.
//!
//! ### Configuration Flow
//!
//! 1. Create a [`WhittakerBuilder`] via `Whittaker::new()`.
//! 2. Chain configuration methods (`.method()`, `.lambda()`, etc.).
//! 3. Select an adapter via `.adapter(Batch)` to get a parallel execution builder.

// External dependencies
use num_traits::Float;

// Import base marker types for delegation
use whittaker::internals::api::Batch as BaseBatch;

// Publicly re-exported types
pub use whittaker::internals::algorithms::weighting::{StrategyParams, WeightingMethod};
pub use whittaker::internals::api::{WhittakerAdapter, WhittakerBuilder};
pub use whittaker::internals::engine::output::{BaselineResult, TerminationStatus};
pub use whittaker::internals::primitives::buffer::WhittakerBuffer;
pub use whittaker::internals::primitives::errors::BaselineError;

// Internal dependencies
use crate::adapters::batch::ParallelBatchWhittakerBuilder;

// ============================================================================
// Adapter Module
// ============================================================================

/// Adapter selection namespace.
#[allow(non_snake_case)]
pub mod Adapter {
    pub use super::Batch;
}

// ============================================================================
// Adapter Marker Types
// ============================================================================

/// Marker for parallel in-memory batch processing.
#[derive(Debug, Clone, Copy)]
pub struct Batch;

impl<T: Float> WhittakerAdapter<T> for Batch {
    type Output = ParallelBatchWhittakerBuilder<T>;

    fn convert(builder: WhittakerBuilder<T>) -> Self::Output {
        // User choice, or parallel by default for fastWhittaker Batch
        let parallel = builder.parallel.unwrap_or(true);

        // Delegate to base implementation to create base builder
        let mut base = <BaseBatch as WhittakerAdapter<T>>::convert(builder);
        base = base.parallel(parallel);

        ParallelBatchWhittakerBuilder { base }
    }
}
