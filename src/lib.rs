pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod pricing;
pub mod report;
pub mod traffic;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize tracing/logging
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so that
/// reports printed on stdout stay machine-readable.
///
/// Note: This function can only be called once.
pub fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
