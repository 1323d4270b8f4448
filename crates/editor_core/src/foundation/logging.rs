//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Honors `RUST_LOG`; falls back to `info` when it is unset.
pub fn init() {
    init_with_filter("info");
}

/// Initialize the logging system with a default filter string such as
/// `"debug"` or `"editor_core=trace"`. `RUST_LOG` still takes precedence.
///
/// Safe to call more than once; only the first call installs the logger.
pub fn init_with_filter(default_filter: &str) {
    let env = env_logger::Env::default().default_filter_or(default_filter);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::debug!("Logger already initialized, keeping existing configuration");
    }
}
