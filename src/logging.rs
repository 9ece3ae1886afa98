//! Structured logging initialization.
//!
//! Logs always go to stderr so stdout stays machine-readable for
//! `--json` output. `RUST_LOG` overrides the configured level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, LoggingConfig};

/// Build the filter: RUST_LOG when set, `default_level` otherwise
pub fn filter(default_level: &str) -> EnvFilter {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(env.as_deref(), default_level)
}

/// Directives from `env` when present and valid, `default_level` otherwise
fn filter_from(env: Option<&str>, default_level: &str) -> EnvFilter {
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Initialize human-readable logging.
///
/// # Example
/// ```no_run
/// use trust_fingerprint::logging;
///
/// logging::init("info");
/// tracing::info!("fingerprint started");
/// ```
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Initialize JSON logging for log aggregation.
pub fn init_json(default_level: &str) {
    tracing_subscriber::registry()
        .with(filter(default_level))
        .with(
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Initialize from the `[logging]` config section
pub fn init_from_config(config: &LoggingConfig) {
    match config.format {
        LogFormat::Text => init(&config.level),
        LogFormat::Json => init_json(&config.level),
    }
}
