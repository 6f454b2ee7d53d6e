//! Switchable per-module logging.
//!
//! A module opts in by declaring two constants next to its imports:
//!
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//! const LOG_TARGET: &str = "eduscope::capture";
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("camera granted {}x{}", width, height);
//! ```
//!
//! Flipping `ENABLE_LOGS` silences a noisy module without touching the
//! global `RUST_LOG` filter. Every record carries `LOG_TARGET`, so filters
//! such as `RUST_LOG=eduscope::scoring=debug` still work.

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!(target: LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!(target: LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!(target: LOG_TARGET, $($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!(target: LOG_TARGET, $($arg)*);
        }
    };
}

/// Installs the `env_logger` backend.
///
/// `RUST_LOG` wins when set. Otherwise the level is `info`, or `debug` when
/// `EDUSCOPE_DEBUG` is `1`/`true`. Repeated calls are ignored.
pub fn init_logging() {
    let debug_mode = std::env::var("EDUSCOPE_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let level = if debug_mode {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
