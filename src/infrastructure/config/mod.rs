//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - YAML file loading
//! - Environment variable overrides
//! - Configuration validation
//! - Property sources as figment providers

pub mod loader;
pub mod property_provider;

pub use loader::{ConfigError, ConfigLoader};
