//! Capability manifest domain models.
//!
//! A manifest lists, one per line, the implementation identities that
//! satisfy a capability. Each line becomes a [`ManifestCandidate`] that
//! remembers the file and line it was read from.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Validated implementation identity, e.g. `husky.names.EnglishNameService`
/// or `husky::names::EnglishNameService`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ImplementationId(String);

impl ImplementationId {
    /// Parse an identity: identifier segments joined by `.` or `::`.
    ///
    /// An identifier starts with a letter or `_` and continues with
    /// letters, digits, `_` or `$`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let normalized = raw.replace("::", ".");
        let valid = normalized.split('.').all(is_identifier);
        valid.then(|| Self(raw.to_string()))
    }

    /// Identity as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Identity with every `::` separator written as `.`.
    ///
    /// Two identities naming the same implementation share a canonical form.
    pub fn canonical(&self) -> String {
        self.0.replace("::", ".")
    }
}

impl fmt::Display for ImplementationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Manifest file and 1-based line an entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ManifestOrigin {
    /// Manifest file path.
    pub path: PathBuf,
    /// Line number, starting at 1.
    pub line: usize,
}

impl fmt::Display for ManifestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.line)
    }
}

/// One manifest line naming an implementation of a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCandidate {
    /// Capability contract name (the manifest file name).
    pub capability: String,
    /// Line content with comments and surrounding whitespace removed.
    pub raw: String,
    /// Parsed identity; `None` when the line is malformed.
    pub id: Option<ImplementationId>,
    /// Where the line was read.
    pub origin: ManifestOrigin,
}
