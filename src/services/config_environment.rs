//! Configuration environment.
//!
//! Holds the property sources produced by the loaders, ordered from
//! highest to lowest precedence, and answers lookups against them.
//! Values may reference other keys with `${key}` or `${key:default}`.

use std::path::PathBuf;

use figment::Figment;
use serde::de::DeserializeOwned;

use crate::domain::errors::{LoadError, ResolveError};
use crate::domain::models::{PropertyEntry, PropertySource};
use crate::services::loader_registry::LoaderRegistry;

/// Ordered stack of property sources.
#[derive(Debug, Clone, Default)]
pub struct ConfigEnvironment {
    sources: Vec<PropertySource>,
}

impl ConfigEnvironment {
    /// Environment with no sources.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `source` with the highest precedence, replacing any source with
    /// the same name.
    pub fn add_first(&mut self, source: PropertySource) {
        self.remove(source.name());
        self.sources.insert(0, source);
    }

    /// Add `source` with the lowest precedence, replacing any source with
    /// the same name.
    pub fn add_last(&mut self, source: PropertySource) {
        self.remove(source.name());
        self.sources.push(source);
    }

    /// Remove the source called `name`, returning it.
    pub fn remove(&mut self, name: &str) -> Option<PropertySource> {
        let position = self.sources.iter().position(|s| s.name() == name)?;
        Some(self.sources.remove(position))
    }

    /// Sources from highest to lowest precedence.
    pub fn sources(&self) -> &[PropertySource] {
        &self.sources
    }

    /// Source called `name`.
    pub fn source(&self, name: &str) -> Option<&PropertySource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    /// Load every existing file in `locations` through `registry`.
    ///
    /// Locations are given lowest precedence first, so each loaded file
    /// overrides the ones before it. Missing files are skipped. Returns the
    /// number of sources added.
    pub fn load_locations(
        &mut self,
        registry: &LoaderRegistry,
        locations: &[PathBuf],
    ) -> Result<usize, LoadError> {
        let mut added = 0;

        for location in locations {
            if !location.is_file() {
                tracing::info!(
                    path = %location.display(),
                    "Configuration file not found, skipping"
                );
                continue;
            }

            for source in registry.load_path(location)? {
                tracing::debug!(
                    source = source.name(),
                    properties = source.len(),
                    "Adding property source"
                );
                self.add_first(source);
                added += 1;
            }
        }

        tracing::info!(sources = added, "Loaded configuration locations");
        Ok(added)
    }

    /// Entry for `key` from the first source that defines it.
    pub fn property(&self, key: &str) -> Option<&PropertyEntry> {
        self.sources.iter().find_map(|source| source.entry(key))
    }

    /// Raw value for `key` from the first source that defines it.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.property(key).map(PropertyEntry::value)
    }

    /// Raw value for `key`, or `default` when no source defines it.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Replace `${key}` and `${key:default}` placeholders in `text`.
    ///
    /// Values found for a key are themselves resolved. An unclosed `${`
    /// is left as-is.
    pub fn resolve(&self, text: &str) -> Result<String, ResolveError> {
        self.resolve_with(text, &mut Vec::new())
    }

    fn resolve_with(&self, text: &str, visiting: &mut Vec<String>) -> Result<String, ResolveError> {
        let mut result = String::with_capacity(text.len());
        let mut remaining = text;

        while let Some(start) = remaining.find("${") {
            result.push_str(&remaining[..start]);

            let after_open = &remaining[start + 2..];
            let Some(end) = closing_brace(after_open) else {
                result.push_str(&remaining[start..]);
                remaining = "";
                break;
            };

            let placeholder = &after_open[..end];
            let (raw_key, default) = match default_separator(placeholder) {
                Some(colon) => (&placeholder[..colon], Some(&placeholder[colon + 1..])),
                None => (placeholder, None),
            };
            let key = self.resolve_with(raw_key, visiting)?;

            if visiting.contains(&key) {
                return Err(ResolveError::Circular { key });
            }

            match (self.get(&key), default) {
                (Some(value), _) => {
                    visiting.push(key);
                    let resolved = self.resolve_with(value, visiting)?;
                    visiting.pop();
                    result.push_str(&resolved);
                }
                (None, Some(default)) => {
                    result.push_str(&self.resolve_with(default, visiting)?);
                }
                (None, None) => {
                    return Err(ResolveError::Unresolvable {
                        key,
                        text: text.to_string(),
                    });
                }
            }

            remaining = &after_open[end + 1..];
        }

        result.push_str(remaining);
        Ok(result)
    }

    /// A figment merging every source, highest precedence last.
    pub fn figment(&self) -> Figment {
        self.sources
            .iter()
            .rev()
            .fold(Figment::new(), |figment, source| figment.merge(source.clone()))
    }

    /// Extract a typed value from the merged sources.
    pub fn extract<T: DeserializeOwned>(&self) -> Result<T, figment::Error> {
        self.figment().extract()
    }
}

/// Byte offset of the `}` closing a placeholder whose `${` precedes `text`.
fn closing_brace(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'$' && bytes.get(i + 1) == Some(&b'{') {
            depth += 1;
            i += 2;
            continue;
        }
        if bytes[i] == b'}' {
            if depth == 0 {
                return Some(i);
            }
            depth -= 1;
        }
        i += 1;
    }
    None
}

/// Byte offset of the first `:` outside nested placeholders.
fn default_separator(placeholder: &str) -> Option<usize> {
    let bytes = placeholder.as_bytes();
    let mut depth = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                depth += 1;
                i += 1;
            }
            b'}' => depth = depth.saturating_sub(1),
            b':' if depth == 0 => return Some(i),
            _ => {}
        }
        i += 1;
    }
    None
}
