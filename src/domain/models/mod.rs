pub mod config;
pub mod file_descriptor;
pub mod manifest;
pub mod property_source;

pub use config::{Config, DiscoveryConfig, DiscoveryPolicy, LoaderConfig, LoggingConfig};
pub use file_descriptor::FileDescriptor;
pub use manifest::{ImplementationId, ManifestCandidate, ManifestOrigin};
pub use property_source::{Location, Origin, PropertyEntry, PropertySource};
