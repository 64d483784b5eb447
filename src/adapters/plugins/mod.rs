//! Native capability plugins.
//!
//! Each sub-module defines a capability and its compiled-in
//! implementations. Registering a factory only makes an implementation
//! available; a manifest under a resource root decides whether it is
//! discovered.

pub mod names;

use crate::services::capability_registry::RegistryBuilder;

/// Capability names the built-in plugins provide.
pub const BUILTIN_CAPABILITIES: &[&str] = &[names::NAME_SERVICE];

/// Register the factories of every built-in implementation.
pub fn register_builtin_capabilities(builder: &mut RegistryBuilder) {
    names::register(builder);
}
