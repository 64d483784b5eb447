use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure for husky
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Configuration files handed to the loaders, lowest precedence first
    #[serde(default = "default_config_locations")]
    pub config_locations: Vec<PathBuf>,

    /// Resource roots scanned for capability manifests, in scan order
    #[serde(default = "default_resource_roots")]
    pub resource_roots: Vec<PathBuf>,

    /// Loader configuration
    #[serde(default)]
    pub loaders: LoaderConfig,

    /// Capability discovery configuration
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_config_locations() -> Vec<PathBuf> {
    vec![
        PathBuf::from("config/application.properties"),
        PathBuf::from("config/application.yml"),
        PathBuf::from("config/application.husky"),
    ]
}

fn default_resource_roots() -> Vec<PathBuf> {
    vec![PathBuf::from("plugins")]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_locations: default_config_locations(),
            resource_roots: default_resource_roots(),
            loaders: LoaderConfig::default(),
            discovery: DiscoveryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which file extensions each built-in loader claims
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoaderConfig {
    /// Extensions handled by the husky properties loader
    #[serde(default = "default_husky_extensions")]
    pub husky_extensions: Vec<String>,

    /// Extensions handled by the standard properties loader
    #[serde(default = "default_properties_extensions")]
    pub properties_extensions: Vec<String>,

    /// Whether `yml`/`yaml` files are loaded
    #[serde(default = "default_true")]
    pub yaml: bool,
}

fn default_husky_extensions() -> Vec<String> {
    vec!["husky".to_string()]
}

fn default_properties_extensions() -> Vec<String> {
    vec!["properties".to_string()]
}

const fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            husky_extensions: default_husky_extensions(),
            properties_extensions: default_properties_extensions(),
            yaml: true,
        }
    }
}

/// How discovery treats manifest entries that cannot be instantiated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscoveryPolicy {
    /// Skip the entry and log a warning
    #[default]
    Lenient,
    /// Fail the whole discovery
    Strict,
}

impl DiscoveryPolicy {
    /// Returns the string representation of this policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lenient => "lenient",
            Self::Strict => "strict",
        }
    }
}

/// Capability discovery configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DiscoveryConfig {
    /// Keep one instance per implementation for the registry's lifetime
    #[serde(default)]
    pub cache: bool,

    /// Failure policy applied by `providers`
    #[serde(default)]
    pub policy: DiscoveryPolicy,

    /// Deadline for discoveries run with a timeout, in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_timeout_ms() -> u64 {
    5000
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            cache: false,
            policy: DiscoveryPolicy::default(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
