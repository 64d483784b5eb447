//! Infrastructure layer module
//!
//! - Configuration management (figment layering, property sources as providers)
//! - Logging infrastructure (tracing subscriber, rolling files)

pub mod config;
pub mod logging;
