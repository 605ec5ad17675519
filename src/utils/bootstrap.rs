//! Bootstrap utilities for aop-proxy binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{Config, ConfigError, LOG_ENV_VAR};

/// Environment variable selecting the log output format (`json` or `text`).
pub const LOG_FORMAT_ENV_VAR: &str = "AOP_PROXY_LOG_FORMAT";

/// Initialize tracing with the AOP_PROXY_LOG environment variable.
///
/// Defaults to "info" level if AOP_PROXY_LOG is not set. Output is plain
/// text unless AOP_PROXY_LOG_FORMAT is `json`.
pub fn init_tracing() {
    let json = std::env::var(LOG_FORMAT_ENV_VAR).is_ok_and(|format| format == "json");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV_VAR)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Initialize tracing, then load configuration from `path` and the environment.
pub fn bootstrap(path: Option<&str>) -> Result<Config, ConfigError> {
    init_tracing();
    let config = Config::load(path)?;
    tracing::debug!(proxy = ?config.proxy, "Configuration loaded");
    Ok(config)
}
