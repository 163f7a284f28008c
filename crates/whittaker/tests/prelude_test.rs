//! Tests for the prelude module.
//!
//! These tests verify that the prelude exports all necessary types for
//! baseline correction. The prelude should provide a one-stop import for
//! common usage.
//!
//! ## Test Organization
//!
//! 1. **Import Verification** - All prelude exports are accessible
//! 2. **Type Usage** - Types can be used without qualification

use whittaker::prelude::*;

// ============================================================================
// Import Verification Tests
// ============================================================================

/// Test that all prelude imports work correctly.
///
/// Verifies that a fit can be configured and run with prelude names only.
#[test]
fn test_prelude_imports() {
    let y: Vec<f64> = (0..30).map(|i| (i as f64 * 0.2).sin() + 2.0).collect();
    let result: Result<BaselineResult<f64>, BaselineError> =
        Whittaker::new().lambda(100.0).adapter(Batch).build().unwrap().fit(&y);
    assert!(result.is_ok(), "Basic fit should work with prelude imports");
}

/// Test that every weighting method is exported.
#[test]
fn test_prelude_methods() {
    let methods = [
        AsLS, IAsLS, AirPLS, ArPLS, DrPLS, IArPLS, AsPLS, PsaLSA, DerPsaLSA, BrPLS, LsrPLS,
    ];
    assert_eq!(methods.len(), WeightingMethod::ALL.len());
    for m in methods {
        let _ = Whittaker::<f64>::new().method(m);
    }
}

// ============================================================================
// Type Usage Tests
// ============================================================================

/// Test the remaining exported types.
#[test]
fn test_prelude_types() {
    let params = StrategyParams::<f64> {
        p: Some(0.05),
        ..StrategyParams::default()
    };
    assert_eq!(params.set_names(), vec!["p"]);

    let _buffer: WhittakerBuffer<f64> = WhittakerBuffer::default();
    assert_eq!(TerminationStatus::Converged.to_string(), "converged");
}
