//! Built-in capability implementations.

pub mod plugins;
