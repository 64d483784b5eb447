//! Property source domain models.
//!
//! A [`PropertySource`] is the unit a configuration loader hands to the
//! host: a named, ordered set of string properties, each tagged with the
//! [`Origin`] that produced it so diagnostics can cite "file X, line N".

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// 1-based position of a property key inside its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number, starting at 1.
    pub column: usize,
}

/// Provenance of a single property.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Origin {
    resource: String,
    location: Option<Location>,
}

impl Origin {
    /// Origin pointing at a line and column of a resource.
    pub fn at(resource: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            resource: resource.into(),
            location: Some(Location { line, column }),
        }
    }

    /// Origin for formats that cannot attribute a property to a line.
    pub fn resource(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            location: None,
        }
    }

    /// Description of the resource (path or file name).
    pub fn resource_name(&self) -> &str {
        &self.resource
    }

    /// Position inside the resource, when known.
    pub fn location(&self) -> Option<Location> {
        self.location
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(Location { line, column }) => write!(f, "{}:{line}:{column}", self.resource),
            None => f.write_str(&self.resource),
        }
    }
}

/// A single `(key, value, origin)` triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyEntry {
    key: String,
    value: String,
    origin: Origin,
}

impl PropertyEntry {
    /// Create an entry.
    pub fn new(key: impl Into<String>, value: impl Into<String>, origin: Origin) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            origin,
        }
    }

    /// Property key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Property value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Where the value was defined.
    pub fn origin(&self) -> &Origin {
        &self.origin
    }
}

/// Named, ordered, read-only collection of properties.
///
/// Keys are unique. When built from entries that repeat a key, the last
/// assignment wins while the key keeps the position of its first
/// appearance. There is no mutating API: once constructed, a source only
/// changes by being replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertySource {
    name: String,
    entries: Vec<PropertyEntry>,
    index: HashMap<String, usize>,
}

impl PropertySource {
    /// Build a source from entries in definition order.
    pub fn from_entries(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = PropertyEntry>,
    ) -> Self {
        let mut ordered: Vec<PropertyEntry> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for entry in entries {
            if let Some(position) = index.get(entry.key()).copied() {
                ordered[position] = entry;
            } else {
                index.insert(entry.key.clone(), ordered.len());
                ordered.push(entry);
            }
        }

        Self {
            name: name.into(),
            entries: ordered,
            index,
        }
    }

    /// Identity of this source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Value for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(PropertyEntry::value)
    }

    /// Full entry for `key`, if present.
    pub fn entry(&self, key: &str) -> Option<&PropertyEntry> {
        self.index.get(key).map(|position| &self.entries[*position])
    }

    /// Origin of the value for `key`, if present.
    pub fn origin_of(&self, key: &str) -> Option<&Origin> {
        self.entry(key).map(PropertyEntry::origin)
    }

    /// Whether `key` is defined.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries in definition order.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &PropertyEntry> {
        self.entries.iter()
    }

    /// Keys in definition order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(PropertyEntry::key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the source holds no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
