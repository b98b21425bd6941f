//! Shared test support utilities.
//!
//! This module provides the node types used across integration tests and a
//! tracing setup that routes log output through the test harness.

#![allow(dead_code)]

pub mod trees;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Filtered by `RUST_LOG`, so `RUST_LOG=tugwalk=trace cargo test` shows every
/// dispatch.
pub fn init_tracing() {
    TRACING.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_test_writer()
            .try_init();
    });
}
