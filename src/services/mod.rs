pub mod capability_registry;
pub mod config_environment;
pub mod loader_registry;
pub mod manifest_index;
pub mod properties_loader;
pub mod properties_parser;
pub mod yaml_loader;

pub use capability_registry::{
    CapabilityRegistry, Discovery, DiscoveryReport, Provider, RegistryBuilder,
};
pub use config_environment::ConfigEnvironment;
pub use loader_registry::LoaderRegistry;
pub use manifest_index::ManifestIndex;
pub use properties_loader::PropertiesSourceLoader;
pub use yaml_loader::YamlSourceLoader;
