//! YAML configuration loader.
//!
//! Nested mappings flatten into dotted keys and sequences into indexed
//! keys, so `server: {ports: [80, 443]}` yields `server.ports[0]=80` and
//! `server.ports[1]=443`. Scalars are rendered as strings; `null`
//! becomes the empty string. YAML carries no per-key line information
//! here, so origins name the resource only.

use serde_yaml::Value;

use crate::domain::errors::LoadError;
use crate::domain::models::{FileDescriptor, Origin, PropertyEntry, PropertySource};
use crate::domain::ports::ConfigSourceLoader;

/// Loads `yml`/`yaml` files into a single flattened source.
#[derive(Debug, Clone)]
pub struct YamlSourceLoader {
    extensions: Vec<String>,
}

impl YamlSourceLoader {
    /// Loader claiming `yml` and `yaml`.
    pub fn new() -> Self {
        Self {
            extensions: vec!["yml".to_string(), "yaml".to_string()],
        }
    }
}

impl Default for YamlSourceLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSourceLoader for YamlSourceLoader {
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

        let parse_error = |reason: String| LoadError::Parse {
            source_name: source_name.to_string(),
            resource: resource.clone(),
            reason,
        };

        let document: Value =
            serde_yaml::from_slice(&bytes).map_err(|e| parse_error(e.to_string()))?;

        let mut flat = Vec::new();
        match document {
            Value::Null => {}
            Value::Mapping(_) => flatten("", &document, &mut flat).map_err(parse_error)?,
            _ => return Err(parse_error("top-level value must be a mapping".to_string())),
        }

        if flat.is_empty() {
            return Ok(Vec::new());
        }

        let entries = flat
            .into_iter()
            .map(|(key, value)| {
                PropertyEntry::new(key, value, Origin::resource(resource.as_str()))
            });
        let source = PropertySource::from_entries(source_name, entries);

        tracing::debug!(
            source = source_name,
            resource = %resource,
            properties = source.len(),
            "Loaded YAML source"
        );
        Ok(vec![source])
    }
}

fn flatten(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) -> Result<(), String> {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let key = scalar_key(key)?;
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out)?;
            }
        }
        Value::Sequence(items) => {
            for (i, child) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{i}]"), child, out)?;
            }
        }
        Value::Tagged(tagged) => flatten(prefix, &tagged.value, out)?,
        Value::Null => out.push((prefix.to_string(), String::new())),
        Value::Bool(b) => out.push((prefix.to_string(), b.to_string())),
        Value::Number(n) => out.push((prefix.to_string(), n.to_string())),
        Value::String(s) => out.push((prefix.to_string(), s.clone())),
    }
    Ok(())
}

fn scalar_key(key: &Value) -> Result<String, String> {
    match key {
        Value::String(s) => Ok(s.clone()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(format!("unsupported mapping key: {other:?}")),
    }
}
