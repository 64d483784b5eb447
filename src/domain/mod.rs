//! Domain layer for husky
//!
//! Property sources, capability manifests and the port traits that
//! configuration loaders and capabilities implement.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{
    DiscoveryError, InstantiationCause, InstantiationFailure, LoadError, ResolveError,
};
