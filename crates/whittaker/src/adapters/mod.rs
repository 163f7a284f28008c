//! Layer 5: Adapters
//!
//! # Purpose
//!
//! This layer provides user-facing execution modes built on the engine layer:
//!
//! - **Batch**: One in-memory spectrum per call, sequential execution
//!
//! # Architecture
//!
//! ```text
//! Layer 6: API
//!   ↓
//! Layer 5: Adapters ← You are here
//!   ↓
//! Layer 4: Engine
//!   ↓
//! Layer 3: Algorithms
//!   ↓
//! Layer 2: Math
//!   ↓
//! Layer 1: Primitives
//! ```

/// Batch adapter for baseline fits.
pub mod batch;
