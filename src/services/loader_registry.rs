//! Extension-keyed registry of configuration loaders.
//!
//! The host asks the registry which loader claims a file's extension and
//! dispatches to it without inspecting contents. Extensions are matched
//! case-sensitively; registering a loader for an extension that is
//! already claimed replaces the previous claim.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::domain::errors::LoadError;
use crate::domain::models::{FileDescriptor, LoaderConfig, PropertySource};
use crate::domain::ports::ConfigSourceLoader;
use crate::services::properties_loader::PropertiesSourceLoader;
use crate::services::yaml_loader::YamlSourceLoader;

/// Registry mapping file extensions to loaders.
#[derive(Clone)]
pub struct LoaderRegistry {
    by_extension: BTreeMap<String, Arc<dyn ConfigSourceLoader>>,
}

impl std::fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("extensions", &self.by_extension.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LoaderRegistry {
    /// Registry with no loaders.
    pub fn empty() -> Self {
        Self {
            by_extension: BTreeMap::new(),
        }
    }

    /// Registry with the built-in loaders: `husky`, `properties`, `yml` and `yaml`.
    pub fn new() -> Self {
        Self::from_config(&LoaderConfig::default())
    }

    /// Registry with the built-in loaders claiming the configured extensions.
    pub fn from_config(config: &LoaderConfig) -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(PropertiesSourceLoader::new(
            config.properties_extensions.iter().cloned(),
        )));
        registry.register(Arc::new(PropertiesSourceLoader::new(
            config.husky_extensions.iter().cloned(),
        )));
        if config.yaml {
            registry.register(Arc::new(YamlSourceLoader::new()));
        }
        registry
    }

    /// Claim every extension `loader` recognizes.
    pub fn register(&mut self, loader: Arc<dyn ConfigSourceLoader>) {
        for extension in loader.recognized_extensions() {
            if self
                .by_extension
                .insert(extension.clone(), Arc::clone(&loader))
                .is_some()
            {
                tracing::debug!(extension = %extension, "Replacing loader for extension");
            }
        }
    }

    /// Loader claiming `extension`, if any.
    pub fn loader_for(&self, extension: &str) -> Option<Arc<dyn ConfigSourceLoader>> {
        self.by_extension.get(extension).cloned()
    }

    /// All claimed extensions, sorted.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.by_extension.keys().map(String::as_str)
    }

    /// Dispatch `file` to the loader claiming its extension.
    pub fn load(
        &self,
        source_name: &str,
        file: FileDescriptor,
    ) -> Result<Vec<PropertySource>, LoadError> {
        let Some(loader) = self.by_extension.get(file.extension()) else {
            return Err(LoadError::UnsupportedExtension {
                filename: file.filename().to_string(),
                extension: file.extension().to_string(),
            });
        };
        loader.load(source_name, file)
    }

    /// Load a file on disk, naming the source after its path.
    pub fn load_path(&self, path: &Path) -> Result<Vec<PropertySource>, LoadError> {
        let source_name = path.display().to_string();
        self.load(&source_name, FileDescriptor::from_path(path))
    }
}
