use crate::config::AppConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured
/// level; production emits JSON lines, everything else human-readable text.
pub fn init(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    if config.is_production() {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}
