use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Loader extension cannot be empty")]
    EmptyExtension,

    #[error("Invalid loader extension: '{0}'. Extensions are given without a leading dot")]
    InvalidExtension(String),

    #[error("Invalid discovery timeout_ms: 0. Must be at least 1")]
    ZeroTimeout,

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .husky/config.yaml (project config)
    /// 3. .husky/local.yaml (project local overrides, optional)
    /// 4. Environment variables (HUSKY_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".husky/config.yaml"))
            .merge(Yaml::file(".husky/local.yaml"))
            .merge(Env::prefixed("HUSKY_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override the file.
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("HUSKY_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let extensions = config
            .loaders
            .husky_extensions
            .iter()
            .chain(&config.loaders.properties_extensions);
        for extension in extensions {
            if extension.is_empty() {
                return Err(ConfigError::EmptyExtension);
            }
            if extension.starts_with('.') || extension.contains(['/', '\\']) {
                return Err(ConfigError::InvalidExtension(extension.clone()));
            }
        }

        if config.discovery.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if config.resource_roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "resource root cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::DiscoveryPolicy;
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.resource_roots, vec![PathBuf::from("plugins")]);
        assert_eq!(config.loaders.husky_extensions, vec!["husky".to_string()]);
        assert!(!config.discovery.cache);
        assert_eq!(config.discovery.policy, DiscoveryPolicy::Lenient);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
resource_roots: [plugins, vendor/plugins]
loaders:
  husky_extensions: [husky, hsk]
discovery:
  cache: true
  policy: strict
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.resource_roots.len(), 2);
        assert_eq!(config.loaders.husky_extensions, vec!["husky", "hsk"]);
        assert_eq!(config.loaders.properties_extensions, vec!["properties"]);
        assert!(config.discovery.cache);
        assert_eq!(config.discovery.policy, DiscoveryPolicy::Strict);
        assert_eq!(config.discovery.timeout_ms, 5000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            _ => panic!("Expected InvalidLogLevel error"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogFormat(format) => assert_eq!(format, "xml"),
            _ => panic!("Expected InvalidLogFormat error"),
        }
    }

    #[test]
    fn test_validate_extensions() {
        let mut config = Config::default();
        config.loaders.husky_extensions = vec![String::new()];
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::EmptyExtension
        ));

        config.loaders.husky_extensions = vec![".husky".to_string()];
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::InvalidExtension(_)
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.discovery.timeout_ms = 0;
        assert!(matches!(
            ConfigLoader::validate(&config).unwrap_err(),
            ConfigError::ZeroTimeout
        ));
    }

    #[test]
    fn test_env_override() {
        temp_env::with_vars(
            [
                ("HUSKY_DISCOVERY__POLICY", Some("strict")),
                ("HUSKY_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config: Config = Figment::new()
                    .merge(Serialized::defaults(Config::default()))
                    .merge(Env::prefixed("HUSKY_").split("__"))
                    .extract()
                    .unwrap();

                assert_eq!(config.discovery.policy, DiscoveryPolicy::Strict);
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_hierarchical_merging() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut base_file = NamedTempFile::new().unwrap();
        writeln!(
            base_file,
            "discovery:\n  cache: true\nlogging:\n  level: info\n  format: json"
        )
        .unwrap();
        base_file.flush().unwrap();

        let mut override_file = NamedTempFile::new().unwrap();
        writeln!(override_file, "logging:\n  level: debug").unwrap();
        override_file.flush().unwrap();

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .unwrap();

        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(config.logging.format, "json", "Base value should persist");
        assert!(config.discovery.cache);
    }

    #[test]
    fn test_load_from_file() {
        use std::io::Write;
        use tempfile::NamedTempFile;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "resource_roots: [extra]").unwrap();
        file.flush().unwrap();

        let config = ConfigLoader::load_from_file(file.path()).unwrap();
        assert_eq!(config.resource_roots, vec![PathBuf::from("extra")]);
    }
}
