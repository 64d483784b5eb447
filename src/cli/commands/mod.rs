//! Subcommand implementations and the wiring they share.

pub mod get;
pub mod providers;
pub mod resolve;
pub mod sources;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::adapters::plugins::register_builtin_capabilities;
use crate::domain::models::Config;
use crate::services::{CapabilityRegistry, ConfigEnvironment, LoaderRegistry, RegistryBuilder};

/// Load every configured location into a fresh environment.
pub fn load_environment(config: &Config) -> Result<ConfigEnvironment> {
    let loaders = LoaderRegistry::from_config(&config.loaders);
    let mut environment = ConfigEnvironment::new();
    environment
        .load_locations(&loaders, &config.config_locations)
        .context("Failed to load configuration sources")?;
    Ok(environment)
}

/// Build the capability registry with the built-in factories.
pub fn build_registry(config: &Config) -> Result<Arc<CapabilityRegistry>> {
    let mut builder = RegistryBuilder::new()
        .resource_roots(config.resource_roots.iter().cloned())
        .options(config.discovery.clone());
    register_builtin_capabilities(&mut builder);
    let registry = builder.build().context("Failed to scan capability manifests")?;
    Ok(Arc::new(registry))
}
