//! Structured logging using **tracing**.
//!
//! The JSON subscriber writes to stderr so stdout stays clean for CLI output
//! and for the LSP transport.

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "constviz=info,constviz_core=info";

/// Filter used when advanced logging is switched on in the configuration.
const ADVANCED_FILTER: &str = "constviz=debug,constviz_core=debug";

/// Picks the filter directive for the given verbosity.
fn filter_directive(advanced: bool) -> &'static str {
    if advanced {
        ADVANCED_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initializes the global tracing subscriber.
///
/// Call once at startup. `RUST_LOG` takes precedence over `advanced`.
/// Calling it a second time is harmless: the later subscriber is ignored.
pub fn init_structured_logging(advanced: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(advanced)));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an info event.
pub fn log_info(message: &str) {
    info!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}
