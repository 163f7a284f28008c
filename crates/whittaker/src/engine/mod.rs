//! Layer 4: Engine
//!
//! # Purpose
//!
//! This layer orchestrates a baseline fit by coordinating the primitives
//! (buffers, sorting, errors) with the algorithms (penalized systems,
//! reweighting rules). It owns the iteration loop, convergence detection and
//! parameter validation.
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Adapters
//!   ↓
//! Layer 4: Engine ← You are here
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Reweighting loop and entry points.
pub mod executor;

/// Validation utilities.
pub mod validator;

/// Output types for baseline fits.
pub mod output;
