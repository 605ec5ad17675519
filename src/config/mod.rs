//! Proxy configuration.
//!
//! The recognised options of an advice plan, loadable from YAML files or
//! environment variables.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "AOP_PROXY_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "AOP_PROXY";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "AOP_PROXY_LOG";

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Options of an advice plan.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Force subclass-based proxying even when the target has interfaces.
    pub proxy_target_class: bool,
    /// Publish the proxy in the thread's proxy context for the duration of each call.
    pub expose_proxy: bool,
    /// Forbid advice changes on the factory once set.
    pub frozen: bool,
    /// Hide the `Advised` view of created proxies.
    pub opaque: bool,
    /// Allow proxies with no advisors at all.
    pub allow_empty_chain: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            proxy_target_class: false,
            expose_proxy: false,
            frozen: false,
            opaque: false,
            allow_empty_chain: true,
        }
    }
}

impl ProxyConfig {
    /// Subclass proxying with everything else at defaults.
    pub fn class_proxy() -> Self {
        Self {
            proxy_target_class: true,
            ..Self::default()
        }
    }

    pub fn with_expose_proxy(mut self, expose: bool) -> Self {
        self.expose_proxy = expose;
        self
    }

    pub fn with_frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    pub fn with_opaque(mut self, opaque: bool) -> Self {
        self.opaque = opaque;
        self
    }

    pub fn with_allow_empty_chain(mut self, allow: bool) -> Self {
        self.allow_empty_chain = allow;
        self
    }

    /// Parse a YAML document holding just the proxy options.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Defaults applied to proxies built from this configuration.
    pub proxy: ProxyConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}
