//! Properties-format configuration loader.
//!
//! [`PropertiesSourceLoader`] reads a file in properties syntax and hands
//! the host at most one [`PropertySource`], each property tagged with the
//! line and column it was defined at. The same loader serves the
//! `husky` extension and the plain `properties` extension; only the
//! claimed extensions differ.

use crate::domain::errors::LoadError;
use crate::domain::models::{FileDescriptor, Origin, PropertyEntry, PropertySource};
use crate::domain::ports::ConfigSourceLoader;
use crate::services::properties_parser;

/// Extension claimed by [`PropertiesSourceLoader::husky`].
pub const HUSKY_EXTENSION: &str = "husky";

/// Extension claimed by [`PropertiesSourceLoader::standard`].
pub const PROPERTIES_EXTENSION: &str = "properties";

/// Loads properties-syntax files into a single origin-tracked source.
#[derive(Debug, Clone)]
pub struct PropertiesSourceLoader {
    extensions: Vec<String>,
}

impl PropertiesSourceLoader {
    /// Loader claiming the given extensions (without leading dots).
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Loader for `.husky` files.
    pub fn husky() -> Self {
        Self::new([HUSKY_EXTENSION])
    }

    /// Loader for `.properties` files.
    pub fn standard() -> Self {
        Self::new([PROPERTIES_EXTENSION])
    }
}

impl Default for PropertiesSourceLoader {
    fn default() -> Self {
        Self::husky()
    }
}

impl ConfigSourceLoader for PropertiesSourceLoader {
    fn recognized_extensions(&self) -> &[String] {
        &self.extensions
    }

    fn load(
        &self,
        source_name: &str,
        file: FileDescriptor,
    ) -> Result<Vec<PropertySource>, LoadError> {
        let resource = file.describe();
        let bytes = file.read_all().map_err(|source| LoadError::Io {
            source_name: source_name.to_string(),
            resource: resource.clone(),
            source,
        })?;

        let text = properties_parser::decode(&bytes);
        let parsed = properties_parser::parse(&text);
        if parsed.is_empty() {
            tracing::debug!(
                source = source_name,
                resource = %resource,
                "File defines no properties"
            );
            return Ok(Vec::new());
        }

        let entries = parsed.into_iter().map(|property| {
            PropertyEntry::new(
                property.key,
                property.value,
                Origin::at(resource.as_str(), property.line, property.column),
            )
        });
        let source = PropertySource::from_entries(source_name, entries);

        tracing::debug!(
            source = source_name,
            resource = %resource,
            properties = source.len(),
            "Loaded properties source"
        );
        Ok(vec![source])
    }
}
