//! Multi-spectrum execution engine for Whittaker baseline fits.
//!
//! ## Purpose
//!
//! This module fits the baselines of many spectra that share one sampling
//! grid. Each spectrum runs its own reweighting loop through the `whittaker`
//! engine; the spectra are distributed across CPU cores.
//!
//! ## Design notes
//!
//! * **Parallelism**: Uses `rayon` for data-parallel execution over rows.
//! * **Buffer Reuse**: One `WhittakerBuffer` per worker thread via `map_init`.
//! * **Strided rows**: Rows that are not contiguous are copied before fitting.
//! * **Generics**: Generic over `Float` types.
//!
//! ## Key concepts
//!
//! * **Row independence**: Fits share no mutable state, so the parallel and
//!   sequential passes give identical results.
//! * **Error propagation**: The first failing row aborts the whole call.
//!
//! ## Invariants
//!
//! * Output has one result per input row, in row order.
//!
//! ## Non-goals
//!
//! * This module does not parallelize the banded solve inside one fit.
//! * This module does not validate the configuration (handled by the builder).

// Feature-gated imports
#[cfg(feature = "cpu")]
use rayon::prelude::*;

// External dependencies
use ndarray::{ArrayView1, ArrayView2, Axis};
use num_traits::Float;

// Export dependencies from whittaker crate
use whittaker::internals::engine::executor::{
    SolveConfig, WhittakerBuffer, solve_baseline_with_buffer,
};
use whittaker::internals::engine::output::BaselineResult;
use whittaker::internals::primitives::errors::BaselineError;

// ============================================================================
// Row Fitting
// ============================================================================

/// Fit one row, copying it first if it is strided.
pub fn fit_row<T: Float>(
    row: ArrayView1<'_, T>,
    x: Option<&[T]>,
    config: &SolveConfig<T>,
    buffer: &mut WhittakerBuffer<T>,
) -> Result<BaselineResult<T>, BaselineError> {
    match row.as_slice() {
        Some(y) => solve_baseline_with_buffer(y, x, config, Some(buffer)),
        None => {
            let y = row.to_vec();
            solve_baseline_with_buffer(&y, x, config, Some(buffer))
        }
    }
}

/// Fit every row of `signals` on the calling thread.
pub fn fit_rows_sequential<T: Float>(
    signals: ArrayView2<'_, T>,
    x: Option<&[T]>,
    config: &SolveConfig<T>,
) -> Result<Vec<BaselineResult<T>>, BaselineError> {
    let mut buffer = WhittakerBuffer::with_capacity(signals.ncols());
    signals
        .axis_iter(Axis(0))
        .map(|row| fit_row(row, x, config, &mut buffer))
        .collect()
}

/// Fit every row of `signals` in parallel.
#[cfg(feature = "cpu")]
pub fn fit_rows_parallel<T>(
    signals: ArrayView2<'_, T>,
    x: Option<&[T]>,
    config: &SolveConfig<T>,
) -> Result<Vec<BaselineResult<T>>, BaselineError>
where
    T: Float + Send + Sync,
{
    let n = signals.ncols();
    log::debug!(
        "fitting {} spectra of {} samples on {} threads",
        signals.nrows(),
        n,
        rayon::current_num_threads()
    );

    (0..signals.nrows())
        .into_par_iter()
        .map_init(
            || WhittakerBuffer::with_capacity(n),
            |buffer, i| fit_row(signals.row(i), x, config, buffer),
        )
        .collect()
}
