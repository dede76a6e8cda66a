// Shared test helpers

// Note: Functions appear "unused" because each test binary compiles
// separately, but they ARE used across multiple test files. Suppress
// false-positive warnings.
#![allow(dead_code)]

use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing once per test binary (respects RUST_LOG)
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
