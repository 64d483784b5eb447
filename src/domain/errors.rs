//! Domain errors for husky.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::models::manifest::ManifestOrigin;

/// Errors raised while turning a file into property sources.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte stream could not be opened or read to completion.
    #[error("IO error loading '{source_name}' from {resource}: {source}")]
    Io {
        /// Name the property source would have been given.
        source_name: String,
        /// Human-readable description of the resource (path or file name).
        resource: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// The content is not valid for a format that has a grammar (YAML).
    #[error("Failed to parse '{source_name}' from {resource}: {reason}")]
    Parse {
        /// Name the property source would have been given.
        source_name: String,
        /// Human-readable description of the resource.
        resource: String,
        /// Parser message.
        reason: String,
    },

    /// No registered loader claims the file's extension.
    #[error("No loader registered for '{filename}' (extension '{extension}')")]
    UnsupportedExtension {
        /// File name that was dispatched.
        filename: String,
        /// Extension that nothing claimed.
        extension: String,
    },
}

/// Why a single manifest entry produced no instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstantiationCause {
    /// The manifest names an implementation no factory was registered for.
    #[error("no factory registered for this implementation")]
    UnknownImplementation,

    /// The factory returned an error.
    #[error("factory failed: {0}")]
    ConstructorFailed(String),

    /// The factory panicked.
    #[error("factory panicked: {0}")]
    Panicked(String),

    /// The manifest line is not a valid implementation identity.
    #[error("malformed implementation identity")]
    MalformedIdentity,

    /// A manifest for the capability exists but could not be read.
    #[error("manifest unreadable: {0}")]
    UnreadableManifest(String),
}

/// A manifest entry that could not be turned into a provider.
#[derive(Debug, Clone, Error)]
#[error("cannot instantiate '{implementation}' for capability '{capability}' ({origin}): {cause}")]
pub struct InstantiationFailure {
    /// Capability contract name.
    pub capability: String,
    /// Implementation identity as written in the manifest.
    pub implementation: String,
    /// Manifest file and line the entry came from.
    pub origin: ManifestOrigin,
    /// What went wrong.
    pub cause: InstantiationCause,
}

/// Errors surfaced by capability discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// A `services/` directory exists but could not be listed.
    #[error("IO error reading manifest directory {path}: {source}")]
    Manifest {
        /// Directory path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Strict discovery hit an entry that could not be instantiated.
    #[error(transparent)]
    Instantiation(#[from] InstantiationFailure),

    /// Discovery did not finish before the caller's deadline.
    #[error("Discovery of '{capability}' timed out after {after:?}")]
    TimedOut {
        /// Capability contract name.
        capability: String,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// The blocking worker running discovery failed.
    #[error("Discovery worker failed: {0}")]
    Worker(String),
}

/// Errors raised while resolving `${...}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// No source defines the key and the placeholder has no default.
    #[error("Could not resolve placeholder '{key}' in value \"{text}\"")]
    Unresolvable {
        /// Key that was looked up.
        key: String,
        /// Text being resolved.
        text: String,
    },

    /// A key's value refers back to itself.
    #[error("Circular placeholder reference '{key}' in property definitions")]
    Circular {
        /// Key that closes the cycle.
        key: String,
    },
}
