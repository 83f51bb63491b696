// tests/common.rs
//! Shared test utilities: tracing setup for integration tests

#![allow(dead_code)]

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Route `tracing` output through the test harness; respects RUST_LOG=
/// Call once at the start of any test that needs logs
pub fn setup() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok(); // idempotent
}

/// Force debug-level logging even if RUST_LOG is not set
pub fn setup_debug() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::new("debug"))
        .try_init()
        .ok();
}
