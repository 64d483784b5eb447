//! Husky - configuration sources and capability discovery
//!
//! Two plugin points for a host process:
//!
//! - **Configuration sources**: [`ConfigSourceLoader`] implementations turn
//!   files recognized by extension into named, ordered, origin-tracked
//!   [`PropertySource`]s, which a [`ConfigEnvironment`] stacks and queries.
//! - **Capability discovery**: a [`CapabilityRegistry`] enumerates every
//!   implementation of a named capability listed in the manifests under its
//!   resource roots, isolating failures per entry.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, errors and port traits
//! - **Service Layer** (`services`): loaders, environment and registry
//! - **Adapters** (`adapters`): built-in capability implementations
//! - **Infrastructure Layer** (`infrastructure`): settings and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use husky::{ConfigEnvironment, LoaderRegistry};
//!
//! let mut environment = ConfigEnvironment::new();
//! environment.load_locations(&LoaderRegistry::new(), &["config/application.husky".into()])?;
//! println!("{}", environment.resolve("${husky.appname:default}")?);
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{
    DiscoveryError, InstantiationCause, InstantiationFailure, LoadError, ResolveError,
};
pub use domain::models::{
    Config, DiscoveryConfig, DiscoveryPolicy, FileDescriptor, ImplementationId, LoaderConfig,
    LoggingConfig, ManifestOrigin, Origin, PropertyEntry, PropertySource,
};
pub use domain::ports::{Capability, ConfigSourceLoader, Factory};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    CapabilityRegistry, ConfigEnvironment, Discovery, DiscoveryReport, LoaderRegistry,
    PropertiesSourceLoader, Provider, RegistryBuilder, YamlSourceLoader,
};
