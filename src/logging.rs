//! Logging setup for the `cets` binary.
//!
//! Library code only emits `tracing` events; installing a subscriber is
//! left to the binary. Filters are chosen in this order: an explicit
//! filter string, then `RUST_LOG`, then the `-v` count. An explicit
//! filter that does not parse is an error.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CetsError;

/// Level for a `-v` count: warn, info, debug, then trace.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_filter(verbosity: u8, filter: Option<&str>) -> Result<EnvFilter, CetsError> {
    if let Some(directives) = filter {
        return EnvFilter::try_new(directives).map_err(|source| CetsError::LogFilter {
            directives: directives.to_string(),
            source,
        });
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            level_for_verbosity(verbosity)
        ))
    }))
}

/// Installs a stderr subscriber.
///
/// Returns `Ok(false)` if a global subscriber was already installed, in
/// which case the existing one is kept.
pub fn init_logging(verbosity: u8, filter: Option<&str>) -> Result<bool, CetsError> {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity >= 2);

    Ok(tracing_subscriber::registry()
        .with(build_filter(verbosity, filter)?)
        .with(layer)
        .try_init()
        .is_ok())
}
