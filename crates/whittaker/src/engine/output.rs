//! Output types for baseline fits.
//!
//! ## Purpose
//!
//! This module defines [`BaselineResult`], which carries the fitted baseline
//! together with the final weights and the convergence record of the fit.
//!
//! ## Design notes
//!
//! * **Input order**: Every per-point vector is in the caller's original order,
//!   even when x-coordinates had to be sorted.
//! * **Optional outputs**: The corrected signal is only stored on request.
//! * **Ergonomics**: Implements `Display` for human-readable output.
//!
//! ## Key concepts
//!
//! * **Termination status**: Converged, iteration budget spent, or stopped
//!   early because the reweighting rule had nothing left to work with.
//! * **Tolerance history**: One convergence metric per inner iteration.
//!
//! ## Invariants
//!
//! * `baseline`, `weights` and `corrected` all have the signal's length.
//! * `tol_history` has one entry per solve whose weights could be updated.
//!
//! ## Non-goals
//!
//! * This module does not perform calculations; it only stores results.

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::fmt::{Debug, Display, Formatter, Result};
use num_traits::Float;

// ============================================================================
// Termination Status
// ============================================================================

/// Why the reweighting loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationStatus {
    /// The convergence metric fell below the tolerance.
    Converged,

    /// The iteration budget was spent first.
    MaxIterReached,

    /// The reweighting rule could not produce new weights (for example, fewer
    /// than two residuals were negative); the latest baseline is returned.
    Exhausted,
}

impl Display for TerminationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let label = match self {
            Self::Converged => "converged",
            Self::MaxIterReached => "max iterations reached",
            Self::Exhausted => "stopped early (weights exhausted)",
        };
        write!(f, "{}", label)
    }
}

// ============================================================================
// Result Structure
// ============================================================================

/// Baseline fit output.
#[derive(Debug, Clone, PartialEq)]
pub struct BaselineResult<T> {
    /// Fitted baseline.
    pub baseline: Vec<T>,

    /// Weights of the solve that produced `baseline`.
    pub weights: Vec<T>,

    /// Number of linear solves performed.
    pub iterations_run: usize,

    /// Whether the fit stopped on its own criterion rather than the budget.
    pub converged: bool,

    /// Why the loop stopped.
    pub status: TerminationStatus,

    /// Convergence metric of every iteration.
    pub tol_history: Vec<T>,

    /// Smoothing parameter used.
    pub lambda_used: T,

    /// Identifier of the weighting method.
    pub method: &'static str,

    /// Signal minus baseline, if requested.
    pub corrected: Option<Vec<T>>,
}

impl<T: Float> BaselineResult<T> {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.baseline.len()
    }

    /// Whether the result holds no samples.
    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty()
    }

    /// Last recorded convergence metric.
    pub fn final_tolerance(&self) -> Option<T> {
        self.tol_history.last().copied()
    }

    /// Signal minus baseline, computed from `signal` when not stored.
    pub fn corrected_signal(&self, signal: &[T]) -> Vec<T> {
        match &self.corrected {
            Some(c) => c.clone(),
            None => signal
                .iter()
                .zip(&self.baseline)
                .map(|(&y, &z)| y - z)
                .collect(),
        }
    }
}

// ============================================================================
// Display Implementation
// ============================================================================

impl<T: Float + Display + Debug> Display for BaselineResult<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        writeln!(f, "Summary:")?;
        writeln!(f, "  Data points: {}", self.baseline.len())?;
        writeln!(f, "  Method:      {}", self.method)?;
        writeln!(f, "  Lambda:      {}", self.lambda_used)?;
        writeln!(f, "  Iterations:  {}", self.iterations_run)?;
        writeln!(f, "  Status:      {}", self.status)?;
        if let Some(tol) = self.final_tolerance() {
            writeln!(f, "  Final tol:   {}", tol)?;
        }
        writeln!(f)?;

        writeln!(f, "Baseline:")?;
        let has_corrected = self.corrected.is_some();
        write!(f, "{:>8} {:>14} {:>12}", "Index", "Baseline", "Weight")?;
        if has_corrected {
            write!(f, " {:>14}", "Corrected")?;
        }
        writeln!(f)?;
        let line_width = 36 + if has_corrected { 15 } else { 0 };
        writeln!(f, "{:-<width$}", "", width = line_width)?;

        // Data rows (show first 10 and last 10 if more than 20 points)
        let n = self.baseline.len();
        let rows_to_show: Vec<usize> = if n <= 20 {
            (0..n).collect()
        } else {
            (0..10).chain(n - 10..n).collect()
        };

        let mut prev_idx = 0;
        for (i, &idx) in rows_to_show.iter().enumerate() {
            if i > 0 && idx != prev_idx + 1 {
                writeln!(f, "{:>8}", "...")?;
            }
            prev_idx = idx;

            write!(
                f,
                "{:>8} {:>14.6} {:>12.6}",
                idx, self.baseline[idx], self.weights[idx]
            )?;
            if let Some(c) = &self.corrected {
                write!(f, " {:>14.6}", c[idx])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
