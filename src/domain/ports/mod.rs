//! Port trait definitions
//!
//! - [`ConfigSourceLoader`]: turns a recognized file into property sources
//! - [`Capability`]: marks a trait-object type as discoverable through
//!   capability manifests

pub mod capability;
pub mod config_source_loader;

pub use capability::{Capability, Factory};
pub use config_source_loader::ConfigSourceLoader;
