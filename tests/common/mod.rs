//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;

use std::sync::Arc;
use telebind_rs::{config::TelemetryConfig, RuntimeMappingProvider, TelemetryService};

/// Service with default config over `provider`
pub fn test_service(provider: impl RuntimeMappingProvider + 'static) -> Arc<TelemetryService> {
    Arc::new(TelemetryService::new(
        &TelemetryConfig::default(),
        Arc::new(provider),
    ))
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
