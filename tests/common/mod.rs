//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// How long a test waits before deciding an operation is blocked.
pub const BLOCKED: Duration = Duration::from_millis(50);

/// Upper bound for operations that must complete.
pub const PROMPT: Duration = Duration::from_secs(2);

/// Install a test subscriber once; `RUST_LOG=objstream=debug` shows stream events.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
