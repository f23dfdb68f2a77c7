//! blackbox-exec library
//!
//! Core functionality for running blackbox executables and reporting verdicts:
//! - Process spawning with full stdio capture
//! - Outcome classification and wire formatting
//! - The execute service, reachable locally or over the TCP protocol
//! - The audit relay and its push client

pub mod audit;
pub mod capture;
pub mod outcome;
pub mod relay;
pub mod server;
pub mod service;
pub mod transport;

#[cfg(test)]
pub(crate) mod testutil;

use tracing_subscriber::EnvFilter;

/// Initialize logging on stderr, honoring `RUST_LOG` over the CLI level.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}
