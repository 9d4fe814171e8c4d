//! Logging initialization.

use crate::config::types::{LogFormat, Settings};
use tracing_subscriber::{EnvFilter, fmt};

/// Initialize the tracing subscriber. `RUST_LOG` wins over the settings,
/// `debug` forces the debug level.
pub fn init_logging(settings: &Settings, debug: bool) {
    let level = if debug { "debug" } else { settings.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = match settings.log_format {
        LogFormat::Json => fmt().json().with_env_filter(filter).with_writer(std::io::stderr).try_init(),
        LogFormat::Pretty => fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init(),
    };
    if let Err(e) = result {
        eprintln!("[lutris] Logging already initialized: {}", e);
    }
}
