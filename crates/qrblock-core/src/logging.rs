use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() {
    init_logging_with("info");
}

/// `RUST_LOG` wins over `default_directive` when set.
pub fn init_logging_with(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = fmt().with_env_filter(filter).try_init();
}

pub fn init_from_config(cfg: &LoggingConfig) {
    init_logging_with(cfg.level.as_deref().unwrap_or("info"));
}
