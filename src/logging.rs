//! Tracing subscriber setup for the binary
//!
//! Library code only emits `tracing` events; the filter and output format are
//! chosen here, once, at startup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::env::EnvReader;

/// Crate-specific filter variable, consulted before `RUST_LOG`
pub const LOG_ENV: &str = "COGNIT_LOG";

/// Filter directives: `COGNIT_LOG`, then `RUST_LOG`, then `debug` when
/// verbose or `warn`
pub fn filter_directives(env: &dyn EnvReader, verbose: bool) -> String {
    env.var(LOG_ENV)
        .or_else(|| env.var("RUST_LOG"))
        .unwrap_or_else(|| if verbose { "debug" } else { "warn" }.to_string())
}

/// Initialize a tracing subscriber writing compact logs to stderr.
///
/// Calling it twice is an error from the second call on; the binary calls it
/// once at startup.
pub fn init(env: &dyn EnvReader, verbose: bool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_level(true)
        .compact();

    let filter_layer = EnvFilter::try_new(filter_directives(env, verbose))
        .or_else(|_| EnvFilter::try_new("warn"))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
