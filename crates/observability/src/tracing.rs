//! Tracing subscriber initialization.
//!
//! JSON lines on stdout, filtered by `RUST_LOG` when set.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_FILTER: &str = "info";

/// Install the JSON subscriber. Returns `false` if one was already installed.
pub fn init(service: &str) -> bool {
    init_with_filter(service, EnvFilter::try_from_default_env().ok())
}

pub fn init_with_filter(service: &str, filter: Option<EnvFilter>) -> bool {
    let filter = filter.unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(true)
        .with_current_span(false)
        .try_init()
        .is_ok();

    if installed {
        ::tracing::info!(service, "logging initialized");
    }
    installed
}
