//! Logger setup.

use crate::config::LogLevel;

/// Install the global logger at `level`.
///
/// `RUST_LOG` still overrides the level per module. Calling this more than
/// once keeps the first logger.
#[cfg(not(target_arch = "wasm32"))]
pub fn init(level: LogLevel) {
    let result = env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .format_timestamp_millis()
        .try_init();

    match result {
        Ok(()) => log::debug!("Logger initialized at {:?}", level),
        Err(_) => log::trace!("Logger already initialized"),
    }
}

/// Only adjusts the maximum level; the host installs the logger.
#[cfg(target_arch = "wasm32")]
pub fn init(level: LogLevel) {
    log::set_max_level(level.to_level_filter());
}
