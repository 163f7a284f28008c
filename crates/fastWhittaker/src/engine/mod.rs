//! Layer 5: Engine
//!
//! This layer provides the multi-spectrum execution engine. It distributes
//! independent baseline fits across CPU cores.

// Parallel execution engine using CPU threads
pub mod executor;
