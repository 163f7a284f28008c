//! Layer 3: Algorithms
//!
//! This layer implements the Whittaker-specific logic: assembling and solving
//! the penalized system, and the reweighting rules of each baseline variant.
//! It is orchestrated by the engine layer.

// Penalized least squares system assembly and solves.
pub mod penalized;

// Reweighting rules and the strategy interface.
pub mod weighting;

// Mollifier smoothing and gradients.
pub mod smoothing;

// Quadratic least squares for initial weights.
pub mod polynomial;
