//! Layer 2: Math
//!
//! # Purpose
//!
//! This layer provides the numerical building blocks of the Whittaker engine:
//! - Banded matrix storage and arithmetic
//! - Difference operators and their `D^T D` penalties
//! - Banded Cholesky and LU factorizations
//! - Summary statistics and special functions
//!
//! None of it knows about baselines or reweighting.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Adapters
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math ← You are here
//!   ↓
//! Layer 1: Primitives
//! ```

/// Banded matrix storage.
pub mod banded;

/// Finite-difference operators and penalties.
pub mod difference;

/// Banded factorizations.
pub mod solver;

/// Summary statistics.
pub mod stats;

/// Special functions.
pub mod special;
