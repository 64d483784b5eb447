//! Capability port.
//!
//! A capability is a trait whose implementations are discovered at
//! runtime. The trait-object type carries the contract name that
//! manifests are keyed by:
//!
//! ```ignore
//! pub trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! impl Capability for dyn Greeter {
//!     const NAME: &'static str = "Greeter";
//! }
//! ```

use std::sync::Arc;

/// Marks a (usually `dyn Trait`) type as a discoverable capability.
pub trait Capability: Send + Sync + 'static {
    /// Contract name; manifests live at `services/<NAME>` under each
    /// resource root.
    const NAME: &'static str;
}

/// Factory producing a fresh instance of a capability implementation.
///
/// Returning an error (or panicking) marks only this implementation as
/// failed; discovery carries on with the remaining entries.
pub type Factory<C> = Arc<dyn Fn() -> anyhow::Result<Box<C>> + Send + Sync>;
